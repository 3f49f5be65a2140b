use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::convert::{BeforeFirst, LeapSecondConverter};
use crate::date::today;
use crate::nist;
use crate::LeapSecondTable;

/// Names a leap-seconds.list to use instead of the bundled copy.
pub const LEAP_SECONDS_ENV: &str = "LEAP_SECONDS_LIST";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// local leap-seconds.list, preferred over `url`
    #[serde(default)]
    pub leap_seconds: Option<PathBuf>,
    /// leap-seconds.list to download once at startup
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub before_first: BeforeFirst,
    /// allow the operating system's TAI clock for the current time
    #[serde(default = "default_system_clock")]
    pub system_clock: bool,
    /// how far the system TAI clock may be from our own calculation
    #[serde(default = "default_tai_clock_tolerance")]
    pub tai_clock_tolerance: f64,
}

fn default_system_clock() -> bool {
    true
}

// a smeared day can be off by up to one second
fn default_tai_clock_tolerance() -> f64 {
    1.1
}

impl Default for Config {
    fn default() -> Self {
        Config {
            leap_seconds: None,
            url: None,
            before_first: BeforeFirst::default(),
            system_clock: default_system_clock(),
            tai_clock_tolerance: default_tai_clock_tolerance(),
        }
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

impl Config {
    /// Parse config from file
    pub fn from_file(file: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let file = file.as_ref();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perm = std::fs::metadata(file)?.permissions();
            if perm.mode() as libc::mode_t & libc::S_IWOTH != 0 {
                warn!("Unrestricted config file permissions: Others can write.");
            }
        }
        std::fs::read_to_string(file)?.parse()
    }

    /// Defaults, with the table file taken from the environment if set.
    pub fn from_env() -> Config {
        Config::default().with_env(|name| std::env::var_os(name))
    }

    pub fn with_env<F>(mut self, var: F) -> Config
    where
        F: Fn(&str) -> Option<OsString>,
    {
        match var(LEAP_SECONDS_ENV) {
            Some(path) if !path.is_empty() => {
                self.leap_seconds = Some(PathBuf::from(path))
            }
            _ => (),
        }
        self
    }

    /// Check that the config is reasonable
    pub fn check(&self) -> bool {
        let mut ok = true;

        if self.leap_seconds.is_some() && self.url.is_some() {
            warn!("Both leap-seconds and url are set; url is ignored.");
        }

        if !(self.tai_clock_tolerance > 0.0) {
            warn!("tai-clock-tolerance must be positive.");
            ok = false;
        }

        ok
    }

    pub fn load_table(&self) -> anyhow::Result<LeapSecondTable> {
        let table = match (&self.leap_seconds, &self.url) {
            (Some(path), _) => nist::read_file(path)?,
            (None, Some(url)) => nist::read_url(url)?,
            (None, None) => {
                let table = nist::bundled()
                    .context("bundled leap-seconds.list is broken")?;
                info!("using bundled leap second table");
                table
            }
        };
        if let Some(expires) = table.expires() {
            if table.is_expired(today()) {
                warn!("leap second table expired on {}", expires);
            }
        }
        Ok(table)
    }

    pub fn converter(&self) -> anyhow::Result<LeapSecondConverter> {
        let table = self.load_table()?;
        Ok(LeapSecondConverter::new(table).before_first(self.before_first))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error while reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("config toml parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::date::Gregorian;
    use crate::LeapSecondEntry;

    #[test]
    fn test() {
        let config: Config = r#"
            leap-seconds = "/usr/share/zoneinfo/leap-seconds.list"
            before-first = "clamp"
            system-clock = false
            tai-clock-tolerance = 0.5
        "#
        .parse()
        .unwrap();
        assert_eq!(
            config.leap_seconds,
            Some(PathBuf::from("/usr/share/zoneinfo/leap-seconds.list"))
        );
        assert_eq!(config.url, None);
        assert_eq!(config.before_first, BeforeFirst::Clamp);
        assert!(!config.system_clock);
        assert_eq!(config.tai_clock_tolerance, 0.5);
        assert!(config.check());

        let config: Config = "".parse().unwrap();
        assert_eq!(config, Config::default());
        assert!(config.check());

        assert!(matches!(
            "leap-second = \"typo\"".parse::<Config>(),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            "before-first = \"sometimes\"".parse::<Config>(),
            Err(ConfigError::Toml(_))
        ));
        let config: Config = "tai-clock-tolerance = -1.0".parse().unwrap();
        assert!(!config.check());
    }

    #[test]
    fn env() {
        let config = Config::default().with_env(|name| {
            assert_eq!(name, LEAP_SECONDS_ENV);
            Some(OsString::from("/tmp/leap-seconds.list"))
        });
        assert_eq!(
            config.leap_seconds,
            Some(PathBuf::from("/tmp/leap-seconds.list"))
        );
        let config = Config::default().with_env(|_| Some(OsString::new()));
        assert_eq!(config.leap_seconds, None);
        let config = Config::default().with_env(|_| None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load() {
        let table = Config::default().load_table().unwrap();
        assert_eq!(table, nist::bundled().unwrap());

        let path = std::env::temp_dir()
            .join(format!("taiutc-{}-leap-seconds.list", std::process::id()));
        let text = nist::format(&table, table.expires().unwrap() + -100).unwrap();
        std::fs::write(&path, text).unwrap();
        let config = Config { leap_seconds: Some(path.clone()), ..Config::default() };
        assert_eq!(config.load_table().unwrap(), table);
        let conv = config.converter().unwrap();
        assert_eq!(conv.tai_from_utc(1483228800.0).unwrap(), 1483228800.0 + 37.0);
        std::fs::remove_file(&path).unwrap();

        // an expired table still loads, with a warning
        let expired = LeapSecondTable::new(vec![
            LeapSecondEntry::on(Gregorian(1972, 1, 1), 10),
            LeapSecondEntry::on(Gregorian(1972, 7, 1), 11),
        ])
        .unwrap()
        .with_expiry(Gregorian(1973, 1, 1).mjd())
        .unwrap();
        assert!(expired.is_expired(today()));
        let path = std::env::temp_dir()
            .join(format!("taiutc-{}-expired.list", std::process::id()));
        let text = nist::format(&expired, Gregorian(1972, 7, 1).mjd()).unwrap();
        std::fs::write(&path, text).unwrap();
        let config = Config { leap_seconds: Some(path.clone()), ..Config::default() };
        assert_eq!(config.load_table().unwrap(), expired);
        let conv = config.converter().unwrap();
        assert_eq!(conv.tai_from_utc(1483228800.0).unwrap(), 1483228800.0 + 11.0);
        std::fs::remove_file(&path).unwrap();

        let config = Config {
            leap_seconds: Some(PathBuf::from("/nonexistent/leap-seconds.list")),
            ..Config::default()
        };
        assert!(config.converter().is_err());
        assert!(matches!(
            Config::from_file("/nonexistent/taiutc.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
