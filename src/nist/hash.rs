use ring::digest::*;
use std::convert::TryInto;
use std::fmt::Write;

use super::Hash;
use crate::date::*;
use crate::*;

fn sha1(input: &str) -> Hash {
    let hash = digest(&SHA1_FOR_LEGACY_USE_ONLY, input.as_bytes());
    let mut hash32: Hash = Default::default();
    for (word, chunk) in hash32.0.iter_mut().zip(hash.as_ref().chunks(4)) {
        // chunks of a 20 byte digest are all 4 bytes
        *word = u32::from_be_bytes(chunk.try_into().unwrap_or_default());
    }
    hash32
}

// the decimal digits of every number in the file, in order,
// excluding the dates in the comments
fn hashin(table: &LeapSecondTable, updated: MJD) -> Result<String> {
    let mut hashin = String::new();
    write!(hashin, "{}", updated.ntp())?;
    if let Some(expires) = table.expires() {
        write!(hashin, "{}", expires.ntp())?;
    }
    for leap in table.entries() {
        write!(hashin, "{}{}", unix2ntp(leap.effective_utc), leap.tai_minus_utc)?;
    }
    Ok(hashin)
}

pub fn hash(table: &LeapSecondTable, updated: MJD) -> Result<Hash> {
    Ok(sha1(&hashin(table, updated)?))
}

pub fn check(
    table: LeapSecondTable,
    updated: MJD,
    input: &Hash,
) -> Result<LeapSecondTable> {
    let hashin = hashin(&table, updated)?;
    let output = sha1(&hashin);
    if *input != output {
        Err(Error::Checksum(input.clone(), output, hashin))
    } else {
        Ok(table)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test() {
        // FIPS 180 test vector
        assert_eq!(
            sha1("abc"),
            Hash([0xa9993e36, 0x4706816a, 0xba3e2571, 0x7850c26c, 0x9cd0d89d])
        );
        let table = LeapSecondTable::new(vec![LeapSecondEntry::on(
            Gregorian(1972, 1, 1),
            10,
        )])
        .unwrap()
        .with_expiry(MJD(41500))
        .unwrap();
        assert_eq!(
            hashin(&table, MJD(41400)).unwrap(),
            format!("{}{}{}{}", MJD(41400).ntp(), MJD(41500).ntp(), 2272060800u32, 10)
        );
        let hash = hash(&table, MJD(41400)).unwrap();
        assert!(check(table.clone(), MJD(41400), &hash).is_ok());
        assert!(check(table, MJD(41401), &hash).is_err());
    }
}
