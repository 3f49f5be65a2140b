// UTC <-> TAI in unix seconds
//
// On the day before a leap second, UTC is smeared: the change in TAI-UTC
// is spread evenly across the 86400 seconds before the boundary, so the
// conversion is continuous and monotonic. Away from those days TAI-UTC is
// the integer from the table.

use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::config::Config;
use crate::date::*;
use crate::*;

const DAY: f64 = SECONDS_PER_DAY as f64;

/// What to do with a time before the first entry in the table.
#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum BeforeFirst {
    /// Fail with `Error::OutOfRange`.
    Error,
    /// Use the first entry's TAI-UTC.
    Clamp,
}

impl Default for BeforeFirst {
    fn default() -> Self {
        BeforeFirst::Error
    }
}

/// The day before a leap second, during which UTC is smeared.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SmearWindow {
    /// unix UTC seconds, inclusive
    pub start: i64,
    /// unix UTC seconds, exclusive; the leap second takes effect here
    pub end: i64,
    /// TAI-UTC before the window
    pub tai_minus_utc: i16,
    /// change in TAI-UTC across the window, normally +1
    pub delta: i32,
}

impl SmearWindow {
    fn containing(
        utc: f64,
        this: LeapSecondEntry,
        next: Option<&LeapSecondEntry>,
    ) -> Option<SmearWindow> {
        let next = next?;
        let window = SmearWindow {
            start: next.effective_utc - SECONDS_PER_DAY,
            end: next.effective_utc,
            tai_minus_utc: this.tai_minus_utc,
            delta: next.tai_minus_utc as i32 - this.tai_minus_utc as i32,
        };
        if window.start as f64 <= utc && utc < window.end as f64 {
            Some(window)
        } else {
            None
        }
    }

    /// Fraction of the window elapsed at `utc`, in [0, 1).
    pub fn fraction(&self, utc: f64) -> f64 {
        let frac = (utc - self.start as f64) / DAY;
        frac.max(0.0).min(1.0 - f64::EPSILON)
    }

    /// Smeared TAI-UTC at `utc`.
    pub fn tai_minus_utc(&self, utc: f64) -> f64 {
        self.tai_minus_utc as f64 + self.delta as f64 * self.fraction(utc)
    }
}

#[derive(Clone, Debug)]
pub struct LeapSecondConverter {
    table: LeapSecondTable,
    before_first: BeforeFirst,
}

impl From<LeapSecondTable> for LeapSecondConverter {
    fn from(table: LeapSecondTable) -> Self {
        LeapSecondConverter::new(table)
    }
}

impl LeapSecondConverter {
    pub fn new(table: LeapSecondTable) -> Self {
        LeapSecondConverter { table, before_first: BeforeFirst::default() }
    }

    pub fn before_first(mut self, policy: BeforeFirst) -> Self {
        self.before_first = policy;
        self
    }

    pub fn table(&self) -> &LeapSecondTable {
        &self.table
    }

    // the entry in effect and the one after it, if any
    fn lookup(
        &self,
        time: f64,
        position: usize,
    ) -> Result<(LeapSecondEntry, Option<&LeapSecondEntry>)> {
        if !time.is_finite() {
            return Err(Error::NotFinite(time));
        }
        let entries = self.table.entries();
        match position {
            0 => match self.before_first {
                BeforeFirst::Error => Err(Error::OutOfRange(
                    time,
                    self.table.first().effective_utc,
                )),
                BeforeFirst::Clamp => Ok((entries[0], entries.get(1))),
            },
            i => Ok((entries[i - 1], entries.get(i))),
        }
    }

    /// The smearing window containing `utc`, if it is on the day
    /// before a leap second.
    pub fn smear_window(&self, utc: f64) -> Result<Option<SmearWindow>> {
        let (this, next) = self.lookup(utc, self.table.position_utc(utc))?;
        Ok(SmearWindow::containing(utc, this, next))
    }

    /// TAI-UTC in effect at `utc`, which is fractional while smearing.
    pub fn tai_minus_utc(&self, utc: f64) -> Result<f64> {
        let (this, next) = self.lookup(utc, self.table.position_utc(utc))?;
        Ok(match SmearWindow::containing(utc, this, next) {
            Some(window) => window.tai_minus_utc(utc),
            None => this.tai_minus_utc as f64,
        })
    }

    /// TAI in unix seconds, given UTC in unix seconds.
    ///
    /// Smears time evenly on the day before a leap second. After the
    /// last entry in the table the last known TAI-UTC is used, even
    /// when the table has expired, because future leap seconds are
    /// not predictable.
    pub fn tai_from_utc(&self, utc: f64) -> Result<f64> {
        Ok(utc + self.tai_minus_utc(utc)?)
    }

    /// UTC in unix seconds, given TAI in unix seconds.
    ///
    /// TAI-UTC is always an integer here, so this is not the inverse
    /// of `tai_from_utc` on the day before a leap second.
    pub fn utc_from_tai(&self, tai: f64) -> Result<f64> {
        let (this, _) = self.lookup(tai, self.table.position_tai(tai))?;
        Ok(tai - this.tai_minus_utc as f64)
    }
}

/// UTC as unix seconds or as a UTC Modified Julian Date.
///
/// Only scalar times are accepted: a smeared day has no sensible
/// civil time representation for its last second.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UtcTime {
    Unix(f64),
    Mjd(f64),
}

impl UtcTime {
    pub fn unix(self) -> f64 {
        match self {
            UtcTime::Unix(unix) => unix,
            UtcTime::Mjd(mjd) => mjd * DAY - MJD_MINUS_UNIX_SECONDS,
        }
    }
}

impl From<f64> for UtcTime {
    fn from(unix: f64) -> UtcTime {
        UtcTime::Unix(unix)
    }
}

/// TAI as a Modified Julian Date, given TAI in unix seconds.
pub fn tai_mjd_from_tai_unix(tai: f64) -> f64 {
    (MJD_MINUS_UNIX_SECONDS + tai) / DAY
}

////////////////////////////////////////////////////////////////////////

static DEFAULT: OnceCell<LeapSecondConverter> = OnceCell::new();

/// The process-wide converter, built from `Config::from_env` on
/// first use and never reloaded.
pub fn default_converter() -> anyhow::Result<&'static LeapSecondConverter> {
    DEFAULT.get_or_try_init(|| Config::from_env().converter())
}

/// TAI in unix seconds, given UTC in any supported form.
pub fn tai_from_utc<T: Into<UtcTime>>(utc: T) -> anyhow::Result<f64> {
    tai_from_utc_unix(utc.into().unix())
}

pub fn tai_from_utc_unix(utc: f64) -> anyhow::Result<f64> {
    Ok(default_converter()?.tai_from_utc(utc)?)
}

pub fn utc_from_tai_unix(tai: f64) -> anyhow::Result<f64> {
    Ok(default_converter()?.utc_from_tai(tai)?)
}
