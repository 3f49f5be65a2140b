// day numbers, civil dates, and the three second counts we care about:
// unix (1970), NTP (1900), and MJD seconds (1858-11-17)

pub const SECONDS_PER_DAY: i64 = 86400;

const MJD_UNIX_EPOCH: i32 = 40587;
const MJD_NTP_EPOCH: i32 = 15020;

/// MJD in seconds minus unix seconds
pub const MJD_MINUS_UNIX_SECONDS: f64 =
    MJD_UNIX_EPOCH as f64 * SECONDS_PER_DAY as f64;

#[derive(Copy, Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Gregorian(pub i32, pub i32, pub i32);

impl std::fmt::Display for Gregorian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl Gregorian {
    pub fn year(self) -> i32 {
        self.0
    }
    pub fn month(self) -> i32 {
        self.1
    }
    pub fn day(self) -> i32 {
        self.2
    }
    pub const fn mjd(self) -> MJD {
        let Gregorian(y, m, d) = self;
        // count from March so the leap day is at the end of the year
        let (y, m) = if m > 2 { (y, m + 1) } else { (y - 1, m + 13) };
        MJD(days_in_years(y) + muldiv(m, 153, 5) + d - 679004)
    }
    pub fn month_name(self) -> &'static str {
        [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep",
            "Oct", "Nov", "Dec",
        ][(self.month() - 1).rem_euclid(12) as usize]
    }
}

impl From<MJD> for Gregorian {
    fn from(mjd: MJD) -> Gregorian {
        let mut d = mjd.0 + 678881;
        let mut y = muldiv(d, 400, 146097) + 1;
        y -= (days_in_years(y) > d) as i32;
        d -= days_in_years(y) - 31;
        let m = muldiv(d, 17, 520);
        d -= muldiv(m, 520, 17);
        if m > 10 {
            Gregorian(y + 1, m - 10, d)
        } else {
            Gregorian(y, m + 2, d)
        }
    }
}

impl From<Gregorian> for MJD {
    fn from(date: Gregorian) -> MJD {
        date.mjd()
    }
}

const fn days_in_years(y: i32) -> i32 {
    muldiv(y, 1461, 4) - muldiv(y, 1, 100) + muldiv(y, 1, 400)
}

const fn muldiv(var: i32, mul: i32, div: i32) -> i32 {
    (var * mul).div_euclid(div)
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MJD(pub i32);

impl std::fmt::Display for MJD {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} mjd {}", Gregorian::from(*self), self.0)
    }
}

impl std::fmt::Debug for MJD {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MJD({})", self)
    }
}

impl From<i32> for MJD {
    fn from(mjd: i32) -> MJD {
        MJD(mjd)
    }
}

impl From<MJD> for i32 {
    fn from(mjd: MJD) -> i32 {
        mjd.0
    }
}

impl std::ops::Add<i32> for MJD {
    type Output = MJD;
    fn add(self, days: i32) -> MJD {
        MJD(self.0 + days)
    }
}

impl std::ops::Sub<MJD> for MJD {
    type Output = i32;
    fn sub(self, other: MJD) -> i32 {
        self.0 - other.0
    }
}

impl MJD {
    /// Unix seconds at midnight starting this day.
    pub fn unix(self) -> i64 {
        (self.0 - MJD_UNIX_EPOCH) as i64 * SECONDS_PER_DAY
    }

    /// NTP seconds at midnight starting this day.
    pub fn ntp(self) -> i64 {
        (self.0 - MJD_NTP_EPOCH) as i64 * SECONDS_PER_DAY
    }

    /// The day containing a unix timestamp, and the seconds into that day.
    pub fn from_unix(unix: i64) -> (MJD, i64) {
        let days = unix.div_euclid(SECONDS_PER_DAY) as i32;
        (MJD(days + MJD_UNIX_EPOCH), unix.rem_euclid(SECONDS_PER_DAY))
    }

    /// The day containing an NTP timestamp, and the seconds into that day.
    pub fn from_ntp(ntp: i64) -> (MJD, i64) {
        let days = ntp.div_euclid(SECONDS_PER_DAY) as i32;
        (MJD(days + MJD_NTP_EPOCH), ntp.rem_euclid(SECONDS_PER_DAY))
    }
}

pub fn ntp2unix(ntp: i64) -> i64 {
    ntp - MJD(MJD_UNIX_EPOCH).ntp()
}

pub fn unix2ntp(unix: i64) -> i64 {
    unix + MJD(MJD_UNIX_EPOCH).ntp()
}

/// The current system time in unix seconds, negative before 1970.
pub fn unix_now() -> f64 {
    use std::time::SystemTime;
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(since) => since.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    }
}

pub fn today() -> MJD {
    MJD::from_unix(unix_now().floor() as i64).0
}
