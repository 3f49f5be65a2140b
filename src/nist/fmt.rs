use std::fmt::Write;

use crate::date::*;
use crate::*;

/// Write a table in leap-seconds.list format, with a correct hash.
///
/// The table must have an expiry date, because the format requires one.
pub fn format(table: &LeapSecondTable, updated: MJD) -> Result<String> {
    let expires = match table.expires() {
        Some(expires) => expires,
        None => return Err(Error::NoExpiry),
    };
    let mut out = String::new();
    writeln!(out, "#")?;
    writeln!(out, "#\tupdated {}", Gregorian::from(updated))?;
    writeln!(out, "#\texpires {}", Gregorian::from(expires))?;
    writeln!(out, "#")?;
    writeln!(out, "#$\t{}", updated.ntp())?;
    writeln!(out, "#@\t{}", expires.ntp())?;
    writeln!(out, "#")?;
    for leap in table.entries() {
        let date = leap.date();
        writeln!(
            out,
            "{}\t{}\t# {} {} {}",
            unix2ntp(leap.effective_utc),
            leap.tai_minus_utc,
            date.day(),
            date.month_name(),
            date.year()
        )?;
    }
    writeln!(out, "#")?;
    writeln!(out, "#h\t{}", super::hash::hash(table, updated)?)?;
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test() {
        let table = LeapSecondTable::new(vec![
            LeapSecondEntry::on(Gregorian(1972, 1, 1), 10),
            LeapSecondEntry::on(Gregorian(1972, 7, 1), 11),
        ])
        .unwrap();
        assert!(format(&table, MJD(41400)).is_err());
        let table = table.with_expiry(Gregorian(1973, 1, 1).mjd()).unwrap();
        let text = format(&table, Gregorian(1972, 6, 1).mjd()).unwrap();
        assert!(text.contains("\n2287785600\t11\t# 1 Jul 1972\n"));
        assert!(text.contains("\n#@\t2303683200\n"));
        assert_eq!(crate::nist::read_str(&text).unwrap(), table);
    }
}
