use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fern::colors::{Color, ColoredLevelConfig};
use std::path::PathBuf;

use taiutc::config::Config;
use taiutc::date::today;
use taiutc::{nist, TaiClock};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Set desired logging level
    #[clap(short, long, default_value_t = log::LevelFilter::Warn)]
    loglevel: log::LevelFilter,

    /// Configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// leap-seconds.list to use instead of the configured one
    #[clap(long)]
    leap_seconds: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current TAI in unix seconds
    Now,
    /// Convert UTC unix seconds to TAI unix seconds
    Tai {
        #[clap(allow_negative_numbers = true)]
        utc: f64,
    },
    /// Convert TAI unix seconds to UTC unix seconds
    Utc {
        #[clap(allow_negative_numbers = true)]
        tai: f64,
    },
    /// Print the leap second table
    Table,
    /// Print the leap second table in leap-seconds.list format
    Nist,
    /// Fail if the leap second table has expired
    Check,
}

fn setup_logger(level: log::LevelFilter) -> Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::BrightGreen)
        .debug(Color::BrightBlue)
        .trace(Color::BrightBlack);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%H:%M:%S.%f]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logger(args.loglevel).context("could not set up logging")?;

    let mut config = match &args.config {
        Some(file) => Config::from_file(file)
            .with_context(|| format!("failed to load {}", file.display()))?,
        None => Config::from_env(),
    };
    if let Some(path) = args.leap_seconds {
        config.leap_seconds = Some(path);
    }
    if !config.check() {
        bail!("invalid configuration");
    }

    let conv = config.converter()?;

    match args.command {
        Command::Now => {
            let clock = TaiClock::configured(&config, &conv);
            println!("{:.6}", clock.now(&conv)?);
        }
        Command::Tai { utc } => println!("{:.6}", conv.tai_from_utc(utc)?),
        Command::Utc { tai } => println!("{:.6}", conv.utc_from_tai(tai)?),
        Command::Table => print!("{}", conv.table()),
        Command::Nist => print!("{}", nist::format(conv.table(), today())?),
        Command::Check => {
            let table = conv.table();
            table.check_expiry(today())?;
            match table.expires() {
                Some(expires) => println!("ok, expires {}", expires),
                None => println!("ok, no expiry date"),
            }
        }
    }

    Ok(())
}
