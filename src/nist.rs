// read, check, and write the NIST leap-seconds.list

use anyhow::Context;
use std::io::Read;

use crate::date::*;
use crate::*;

mod check;
mod fmt;
mod hash;
mod parse;

pub use fmt::format;

/// IANA mirror of the NIST list.
pub const NIST_URL: &str = "https://data.iana.org/time-zones/data/leap-seconds.list";

const BUNDLED: &str = include_str!("../data/leap-seconds.list");

/// The copy of leap-seconds.list compiled into this crate.
pub fn bundled() -> Result<LeapSecondTable> {
    read_str(BUNDLED)
}

pub fn read_bytes(data: &[u8]) -> Result<LeapSecondTable> {
    read_str(std::str::from_utf8(data)?)
}

pub fn read_file<P>(name: P) -> anyhow::Result<LeapSecondTable>
where
    P: AsRef<std::path::Path>,
{
    let name = name.as_ref();
    let table = read_bytes(&load_file(name)?)
        .with_context(|| format!("failed to load {}", name.display()))?;
    log::info!("loaded {} leap seconds from {}", table.len(), name.display());
    Ok(table)
}

pub fn read_str(text: &str) -> Result<LeapSecondTable> {
    match parse::parse(text) {
        Ok((_, unchecked)) => check::check(unchecked),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => {
            Err(Error::Nom(nom::error::convert_error(text, err)))
        }
        Err(nom::Err::Incomplete(_)) => {
            Err(Error::Nom("incomplete input".to_string()))
        }
    }
}

#[cfg(feature = "fetch")]
pub fn read_url(url: &str) -> anyhow::Result<LeapSecondTable> {
    log::info!("fetching {}", url);
    let table = read_bytes(&load_url(url)?)
        .with_context(|| format!("failed to load {}", url))?;
    log::info!("loaded {} leap seconds from {}", table.len(), url);
    Ok(table)
}

#[cfg(not(feature = "fetch"))]
pub fn read_url(url: &str) -> anyhow::Result<LeapSecondTable> {
    anyhow::bail!("cannot fetch {}: built without the fetch feature", url)
}

////////////////////////////////////////////////////////////////////////

// public for error reporting
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Hash(pub [u32; 5]);

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let h = &self.0;
        write!(
            f,
            "{:08x} {:08x} {:08x} {:08x} {:08x}",
            h[0], h[1], h[2], h[3], h[4]
        )
    }
}

// NTP timestamp, DTAI, date from the comment
type UncheckedLeap = (i64, i64, Gregorian);

#[derive(Clone, Debug, Default)]
struct UncheckedList {
    pub updated: i64,
    pub expires: i64,
    pub leapsecs: Vec<UncheckedLeap>,
    pub hash: Hash,
}

fn load_file(name: &std::path::Path) -> anyhow::Result<Vec<u8>> {
    let ctx = || format!("failed to read {}", name.display());
    let mut fh = std::fs::File::open(name).with_context(ctx)?;
    let mut data = Vec::new();
    fh.read_to_end(&mut data).with_context(ctx)?;
    Ok(data)
}

#[cfg(feature = "fetch")]
fn load_url(url: &str) -> anyhow::Result<Vec<u8>> {
    let mut data = Vec::new();
    curl_get(url, &mut data)
        .with_context(|| format!("failed to fetch {}", url))?;
    Ok(data)
}

#[cfg(feature = "fetch")]
fn curl_get(url: &str, buffer: &mut Vec<u8>) -> anyhow::Result<()> {
    let mut ua = curl::easy::Easy::new();
    ua.useragent(&format!(
        "taiutc/{} curl/{}",
        env!("CARGO_PKG_VERSION"),
        curl::Version::get().version()
    ))?;
    ua.fail_on_error(true)?;
    ua.follow_location(true)?;
    ua.url(url)?;
    let mut xfer = ua.transfer();
    xfer.write_function(|chunk| {
        buffer.extend_from_slice(chunk);
        Ok(chunk.len())
    })?;
    xfer.perform()?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test {
    use crate::date::*;
    use crate::nist;
    use crate::*;

    #[test]
    fn test() {
        let original = nist::bundled().expect("bundled leap-seconds.list");
        assert_eq!(original.len(), 28);
        assert_eq!(
            original.first(),
            LeapSecondEntry::on(Gregorian(1972, 1, 1), 10)
        );
        assert_eq!(
            original.last(),
            LeapSecondEntry::on(Gregorian(2017, 1, 1), 37)
        );
        assert_eq!(original.expires(), Some(Gregorian(2026, 12, 28).mjd()));
        let printed = nist::format(&original, Gregorian(2026, 1, 5).mjd())
            .expect("formatting leap seconds");
        let parsed = nist::read_str(&printed).expect("re-parsing leap-seconds");
        assert_eq!(original, parsed);
    }

    #[test]
    fn checksum() {
        let text = super::BUNDLED.replace("8d438fa5", "8d438fa6");
        assert!(matches!(nist::read_str(&text), Err(Error::Checksum(..))));
    }

    #[test]
    fn garbage() {
        assert!(matches!(nist::read_str("#$\tnope\n"), Err(Error::Nom(_))));
        assert!(matches!(nist::read_bytes(b"\xff\xfe"), Err(Error::Unicode(_))));
        assert!(nist::read_file("/nonexistent/leap-seconds.list").is_err());
    }
}
