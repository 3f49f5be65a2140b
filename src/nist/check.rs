use std::convert::TryFrom;

use super::{UncheckedLeap, UncheckedList};
use crate::date::*;
use crate::*;

// 10000-01-01, to keep the calendar arithmetic within i32
const NTP_MAX: i64 = 255_611_289_600;

// NTP timestamps in the list must be midnights no earlier than 1972
fn timestamp(ntp: i64) -> Result<MJD> {
    if ntp >= NTP_MAX {
        return Err(Error::NtpRange(ntp));
    }
    let (mjd, secs) = MJD::from_ntp(ntp);
    if secs != 0 {
        Err(Error::Midnight(ntp2unix(ntp)))
    } else if Gregorian::from(mjd).year() < 1972 {
        Err(Error::TooSoon(mjd))
    } else {
        Ok(mjd)
    }
}

fn check_next(
    acc: Result<Vec<LeapSecondEntry>>,
    &(ntp, dtai64, date): &UncheckedLeap,
) -> Result<Vec<LeapSecondEntry>> {
    let mut list = acc?;
    let mjd = timestamp(ntp)?;
    let dtai = i16::try_from(dtai64).map_err(|_| Error::DtaiRange(mjd, dtai64))?;
    if Gregorian::from(mjd) != date {
        return Err(Error::TimeDate(mjd, date));
    }
    let next = LeapSecondEntry::new(mjd.unix(), dtai);
    if let Some(&last) = list.last() {
        if next.effective_utc <= last.effective_utc {
            return Err(Error::OutOfOrder(last, next));
        } else if dtai == last.tai_minus_utc {
            return Err(Error::NoLeap(next));
        } else if (dtai as i32 - last.tai_minus_utc as i32).abs() != 1 {
            return Err(Error::LargeLeap(last, next));
        }
    } else if next != LeapSecondEntry::on(Gregorian(1972, 1, 1), 10) {
        return Err(Error::FalseStart(next));
    }
    list.push(next);
    Ok(list)
}

pub(super) fn check(u: UncheckedList) -> Result<LeapSecondTable> {
    let list = u.leapsecs.iter().fold(Ok(Vec::new()), check_next)?;
    let updated = timestamp(u.updated)?;
    let expires = timestamp(u.expires)?;
    let table = LeapSecondTable::new(list)?.with_expiry(expires)?;
    super::hash::check(table, updated, &u.hash)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nist::read_str;

    fn list(leapsecs: Vec<UncheckedLeap>) -> UncheckedList {
        UncheckedList {
            updated: 3976560000,
            expires: 4007404800,
            leapsecs,
            hash: Default::default(),
        }
    }

    #[test]
    fn test() {
        let jan72 = (2272060800, 10, Gregorian(1972, 1, 1));
        let jul72 = (2287785600, 11, Gregorian(1972, 7, 1));
        let bad = |leaps| check(list(leaps)).unwrap_err();
        assert!(matches!(bad(vec![]), Error::Empty));
        assert!(matches!(bad(vec![jul72]), Error::FalseStart(_)));
        assert!(matches!(bad(vec![jul72, jan72]), Error::FalseStart(_)));
        assert!(matches!(bad(vec![jan72, jan72]), Error::OutOfOrder(..)));
        assert!(matches!(
            bad(vec![jan72, (2287785600, 10, Gregorian(1972, 7, 1))]),
            Error::NoLeap(_)
        ));
        assert!(matches!(
            bad(vec![jan72, (2287785600, 12, Gregorian(1972, 7, 1))]),
            Error::LargeLeap(..)
        ));
        assert!(matches!(
            bad(vec![jan72, (2287785600, 11, Gregorian(1972, 7, 2))]),
            Error::TimeDate(..)
        ));
        assert!(matches!(
            bad(vec![jan72, (2287785601, 11, Gregorian(1972, 7, 1))]),
            Error::Midnight(_)
        ));
        assert!(matches!(
            bad(vec![(2240524800, 10, Gregorian(1971, 1, 1))]),
            Error::TooSoon(_)
        ));
        assert!(matches!(
            bad(vec![jan72, (2287785600, 99999, Gregorian(1972, 7, 1))]),
            Error::DtaiRange(..)
        ));
        assert!(matches!(
            bad(vec![jan72, (NTP_MAX, 11, Gregorian(10000, 1, 1))]),
            Error::NtpRange(_)
        ));
        // structurally fine but the hash is all zeroes
        assert!(matches!(bad(vec![jan72, jul72]), Error::Checksum(..)));
    }

    #[test]
    fn negative() {
        // a negative leap second is a valid NIST entry but
        // TAI-UTC going backwards is not a valid table
        let text = "#$\t3976560000\n#@\t4007404800\n\
                    2272060800\t10\t# 1 Jan 1972\n\
                    2287785600\t9\t# 1 Jul 1972\n\
                    #h\t0 0 0 0 0\n";
        assert!(matches!(read_str(text), Err(Error::Decreasing(..))));
    }
}
