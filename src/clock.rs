// the current time on the TAI scale
//
// Linux has CLOCK_TAI, but it is only correct when something (chrony,
// ntpd, ptp4l) has told the kernel the TAI-UTC offset; otherwise it is
// an alias of CLOCK_REALTIME. So we check it once against our own
// calculation and decide which clock to use for the rest of the process.

use log::{debug, info, warn};
use once_cell::sync::OnceCell;

use crate::config::Config;
use crate::convert::{default_converter, LeapSecondConverter};
use crate::date::unix_now;
use crate::*;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TaiClock {
    /// clock_gettime(CLOCK_TAI)
    System,
    /// the UTC wall clock converted with the leap second table
    FromUtc,
}

impl std::fmt::Display for TaiClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaiClock::System => write!(f, "system TAI clock"),
            TaiClock::FromUtc => write!(f, "UTC clock and leap second table"),
        }
    }
}

impl TaiClock {
    /// Choose a clock according to the config.
    pub fn configured(config: &Config, conv: &LeapSecondConverter) -> TaiClock {
        if config.system_clock {
            TaiClock::probe(conv, config.tai_clock_tolerance)
        } else {
            info!("current TAI uses the {}; system clock disabled", TaiClock::FromUtc);
            TaiClock::FromUtc
        }
    }

    /// Use the system TAI clock if it agrees with `conv` to within
    /// `tolerance` seconds.
    pub fn probe(conv: &LeapSecondConverter, tolerance: f64) -> TaiClock {
        let utc = unix_now();
        let tai = system_tai();
        let clock = TaiClock::judge(conv, tolerance, utc, tai);
        info!("current TAI uses the {}", clock);
        clock
    }

    fn judge(
        conv: &LeapSecondConverter,
        tolerance: f64,
        utc: f64,
        tai: std::io::Result<f64>,
    ) -> TaiClock {
        let system = match tai {
            Ok(system) => system,
            Err(err) => {
                info!("no usable CLOCK_TAI: {}", err);
                return TaiClock::FromUtc;
            }
        };
        let expected = match conv.tai_from_utc(utc) {
            Ok(expected) => expected,
            Err(err) => {
                warn!("cannot check CLOCK_TAI: {}", err);
                return TaiClock::FromUtc;
            }
        };
        let error = expected - system;
        debug!("CLOCK_TAI differs from the leap second table by {:.6}s", error);
        if (system - utc).abs() < 0.5 {
            warn!("CLOCK_TAI is the same as CLOCK_REALTIME; the kernel TAI offset is not set");
            TaiClock::FromUtc
        } else if !(error.abs() <= tolerance) {
            warn!("CLOCK_TAI is off by {:.1} seconds", error);
            TaiClock::FromUtc
        } else {
            TaiClock::System
        }
    }

    /// Current TAI in unix seconds.
    pub fn now(self, conv: &LeapSecondConverter) -> Result<f64> {
        match self {
            TaiClock::System => Ok(system_tai()?),
            TaiClock::FromUtc => conv.tai_from_utc(unix_now()),
        }
    }
}

#[cfg(target_os = "linux")]
pub fn system_tai() -> std::io::Result<f64> {
    use std::mem::MaybeUninit;

    let mut c_time: MaybeUninit<libc::timespec> = MaybeUninit::uninit();
    let ret = unsafe { libc::clock_gettime(libc::CLOCK_TAI, c_time.as_mut_ptr()) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // clock_gettime succeeded so it filled in the timespec
    let ts = unsafe { c_time.assume_init() };
    Ok(ts.tv_sec as f64 + ts.tv_nsec as f64 * 1e-9)
}

#[cfg(not(target_os = "linux"))]
pub fn system_tai() -> std::io::Result<f64> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Other,
        "CLOCK_TAI is only available on linux",
    ))
}

////////////////////////////////////////////////////////////////////////

static CLOCK: OnceCell<TaiClock> = OnceCell::new();

/// The process-wide clock choice, probed once on first use.
pub fn current_clock() -> anyhow::Result<TaiClock> {
    let conv = default_converter()?;
    Ok(*CLOCK.get_or_init(|| TaiClock::configured(&Config::from_env(), conv)))
}

/// Current TAI in unix seconds, from the best available clock.
pub fn current_tai() -> anyhow::Result<f64> {
    let conv = default_converter()?;
    Ok(current_clock()?.now(conv)?)
}

/// Current TAI in unix seconds, always from the UTC clock.
pub fn current_tai_from_utc() -> anyhow::Result<f64> {
    Ok(TaiClock::FromUtc.now(default_converter()?)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::date::Gregorian;

    fn converter() -> LeapSecondConverter {
        LeapSecondConverter::new(
            LeapSecondTable::new(vec![
                LeapSecondEntry::on(Gregorian(2015, 7, 1), 36),
                LeapSecondEntry::on(Gregorian(2017, 1, 1), 37),
            ])
            .unwrap(),
        )
    }

    fn unsupported() -> std::io::Result<f64> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "nope"))
    }

    #[test]
    fn judge() {
        let conv = converter();
        let utc = 1600000000.25;
        let judge = |tai| TaiClock::judge(&conv, 1.1, utc, tai);
        assert_eq!(judge(Ok(utc + 37.0)), TaiClock::System);
        assert_eq!(judge(Ok(utc + 37.9)), TaiClock::System);
        assert_eq!(judge(Ok(utc + 36.0)), TaiClock::System);
        assert_eq!(judge(Ok(utc + 35.0)), TaiClock::FromUtc);
        assert_eq!(judge(Ok(utc)), TaiClock::FromUtc);
        assert_eq!(judge(Ok(f64::NAN)), TaiClock::FromUtc);
        assert_eq!(judge(unsupported()), TaiClock::FromUtc);
        // a time we cannot convert
        assert_eq!(
            TaiClock::judge(&conv, 1.1, 0.0, Ok(37.0)),
            TaiClock::FromUtc
        );
    }

    #[test]
    fn configured() {
        let conv = converter();
        let config = Config { system_clock: false, ..Config::default() };
        assert_eq!(TaiClock::configured(&config, &conv), TaiClock::FromUtc);
    }

    #[test]
    fn now() {
        let before = unix_now();
        let tai0 = TaiClock::FromUtc.now(&converter()).unwrap();
        let tai1 = current_tai_from_utc().unwrap();
        let tai2 = current_tai().unwrap();
        assert!(tai0 >= before + 37.0);
        assert!(tai1 >= tai0);
        assert!(tai1 - tai0 < 1.0);
        // the system clock, if chosen, agrees to within a smeared second
        assert!((tai2 - tai1).abs() < 1.2);
        assert!(current_clock().is_ok());
    }

    #[test]
    fn shared() {
        let threads: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| current_clock().unwrap()))
            .collect();
        let here = current_clock().unwrap();
        for thread in threads {
            assert_eq!(thread.join().unwrap(), here);
        }
    }
}
