use std::convert::TryFrom;
use thiserror::Error;

use crate::date::*;
use crate::nist::Hash;

// https://www.ucolick.org/~sla/leapsecs/dutc.html
//
// Before the year 4000 we expect there will be more than one leap
// second each month, at which point UTC as currently defined will no
// longer work. At that time DTAI is expected to be less than 4 hours,
// i.e. 14,400 seconds, which is less than 2^15.

/// TAI-UTC takes the value `tai_minus_utc` from the unix time
/// `effective_utc`, which is always a UTC midnight.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LeapSecondEntry {
    pub effective_utc: i64,
    pub tai_minus_utc: i16,
}

impl LeapSecondEntry {
    pub fn new(effective_utc: i64, tai_minus_utc: i16) -> Self {
        LeapSecondEntry { effective_utc, tai_minus_utc }
    }
    pub fn on(date: Gregorian, tai_minus_utc: i16) -> Self {
        Self::new(date.mjd().unix(), tai_minus_utc)
    }
    pub fn mjd(self) -> MJD {
        MJD::from_unix(self.effective_utc).0
    }
    pub fn date(self) -> Gregorian {
        Gregorian::from(self.mjd())
    }
    /// Start of this entry on the TAI scale.
    pub fn effective_tai(self) -> i64 {
        self.effective_utc + self.tai_minus_utc as i64
    }
    fn is_midnight(self) -> bool {
        self.effective_utc.rem_euclid(SECONDS_PER_DAY) == 0
    }
}

impl std::fmt::Display for LeapSecondEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_midnight() {
            write!(f, "{} DTAI {}", self.mjd(), self.tai_minus_utc)
        } else {
            write!(f, "unix {} DTAI {}", self.effective_utc, self.tai_minus_utc)
        }
    }
}

/// A validated leap second table.
///
/// Entries are strictly increasing in time, each starts at a UTC
/// midnight, and TAI-UTC never decreases. The table is never empty.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeapSecondTable {
    entries: Vec<LeapSecondEntry>,
    expires: Option<MJD>,
}

impl LeapSecondTable {
    pub fn new(entries: Vec<LeapSecondEntry>) -> Result<Self> {
        let (first, rest) = match entries.split_first() {
            Some(split) => split,
            None => return Err(Error::Empty),
        };
        if !first.is_midnight() {
            return Err(Error::Midnight(first.effective_utc));
        }
        let mut prev = *first;
        for &this in rest {
            if !this.is_midnight() {
                return Err(Error::Midnight(this.effective_utc));
            }
            if this.effective_utc <= prev.effective_utc {
                return Err(Error::OutOfOrder(prev, this));
            }
            if this.tai_minus_utc < prev.tai_minus_utc {
                return Err(Error::Decreasing(prev, this));
            }
            prev = this;
        }
        Ok(LeapSecondTable { entries, expires: None })
    }

    /// Record the date after which the table should not be trusted.
    pub fn with_expiry(mut self, expires: MJD) -> Result<Self> {
        let last = self.last();
        if expires <= last.mjd() {
            return Err(Error::TooLate(last, expires));
        }
        self.expires = Some(expires);
        Ok(self)
    }

    pub fn entries(&self) -> &[LeapSecondEntry] {
        &self.entries
    }

    pub fn first(&self) -> LeapSecondEntry {
        self.entries[0]
    }

    pub fn last(&self) -> LeapSecondEntry {
        self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn expires(&self) -> Option<MJD> {
        self.expires
    }

    pub fn is_expired(&self, today: MJD) -> bool {
        matches!(self.expires, Some(expires) if expires <= today)
    }

    pub fn check_expiry(&self, today: MJD) -> Result<()> {
        match self.expires {
            Some(expires) if expires <= today => Err(Error::Expired(expires)),
            _ => Ok(()),
        }
    }

    /// Number of entries in effect at `utc` unix seconds, so the
    /// current entry is the one before the returned index.
    pub(crate) fn position_utc(&self, utc: f64) -> usize {
        self.entries.partition_point(|e| e.effective_utc as f64 <= utc)
    }

    /// As `position_utc` but for TAI unix seconds.
    pub(crate) fn position_tai(&self, tai: f64) -> usize {
        self.entries.partition_point(|e| e.effective_tai() as f64 <= tai)
    }
}

impl TryFrom<Vec<LeapSecondEntry>> for LeapSecondTable {
    type Error = Error;
    fn try_from(entries: Vec<LeapSecondEntry>) -> Result<LeapSecondTable> {
        LeapSecondTable::new(entries)
    }
}

impl<'a> From<&'a LeapSecondTable> for &'a [LeapSecondEntry] {
    fn from(table: &'a LeapSecondTable) -> &'a [LeapSecondEntry] {
        &table.entries
    }
}

impl std::fmt::Display for LeapSecondTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut prev: Option<LeapSecondEntry> = None;
        for &entry in &self.entries {
            match prev {
                Some(p) if entry.tai_minus_utc > p.tai_minus_utc => {
                    writeln!(f, "{} +{}", entry, entry.tai_minus_utc - p.tai_minus_utc)?
                }
                _ => writeln!(f, "{}", entry)?,
            }
            prev = Some(entry);
        }
        if let Some(expires) = self.expires {
            writeln!(f, "{} ??", expires)?;
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("checksum failed {0} <> {1} data {2}")]
    Checksum(Hash, Hash, String),
    #[error("cannot read clock: {0}")]
    Clock(#[from] std::io::Error),
    #[error("TAI-UTC decreases ({0} -> {1})")]
    Decreasing(LeapSecondEntry, LeapSecondEntry),
    #[error("DTAI {1} out of range at {0}")]
    DtaiRange(MJD, i64),
    #[error("leap second table is empty")]
    Empty,
    #[error("leap second table has expired ({0})")]
    Expired(MJD),
    #[error("incorrect starting point {0}")]
    FalseStart(LeapSecondEntry),
    #[error("format error {0}")]
    Format(#[from] std::fmt::Error),
    #[error("imin={0} must be less than imax={1}")]
    IndexBounds(i64, i64),
    #[error("i0={0} must be >= imin={1} and <= imax={2}")]
    IndexStart(i64, i64, i64),
    #[error("leap is not +/-1 ({0} -> {1})")]
    LargeLeap(LeapSecondEntry, LeapSecondEntry),
    #[error("time is not midnight (unix {0})")]
    Midnight(i64),
    #[error("leap second table has no expiry date")]
    NoExpiry,
    #[error("no leap at {0}")]
    NoLeap(LeapSecondEntry),
    #[error("timestamp {0} is not finite")]
    NotFinite(f64),
    #[error("NTP timestamp {0} out of range")]
    NtpRange(i64),
    #[error("parse error {0}")]
    Nom(String),
    #[error("leap seconds are disordered ({0} >= {1})")]
    OutOfOrder(LeapSecondEntry, LeapSecondEntry),
    #[error("{0} < start of integer leap seconds = {1}")]
    OutOfRange(f64, i64),
    #[error("timestamp and date do not match ({0} <> {1})")]
    TimeDate(MJD, Gregorian),
    #[error("expiry date {1} is not after the last leap second {0}")]
    TooLate(LeapSecondEntry, MJD),
    #[error("date is before 1972 ({0})")]
    TooSoon(MJD),
    #[error("{0}")]
    Unicode(#[from] std::str::Utf8Error),
}
