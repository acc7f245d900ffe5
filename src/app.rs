//! Document the command line interface
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::{currencies, rates, scan, tag};
use crate::engine::{TagOptions, DEFAULT_MARKER_CLASS};
use crate::error::MissingFileError;
use crate::models::{currency_list, Currency, DisplayFormat, RateTable, DEFAULT_TARGET_FORMAT};
use crate::parser::{load_rates, Scanner};
use crate::{Error, List};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use colored::Colorize;

#[derive(Debug, StructOpt)]
enum Command {
    /// List the prices found in text
    Scan {
        #[structopt(flatten)]
        options: CommonOpts,
        /// Text to scan instead of the input files
        #[structopt(long = "text")]
        text: Option<String>,
    },
    /// Tag the prices of a page and print the page
    Tag(CommonOpts),
    /// Show the exchange rates
    #[structopt(alias = "prices")]
    Rates(CommonOpts),
    /// List the currencies looked for
    #[structopt(alias = "commodities")]
    Currencies(CommonOpts),
}

#[derive(Debug, StructOpt)]
#[structopt(about = "Finds prices in text and tags them with converted amounts",
version = env ! ("CARGO_PKG_VERSION"),
author = env ! ("CARGO_PKG_AUTHORS"),
name = "fxtag"
)]
struct Opt {
    #[structopt(subcommand)]
    cmd: Command,
}

/// Command line options
#[derive(Debug, StructOpt, Clone)]
pub struct CommonOpts {
    /// Input files, glob patterns are allowed
    #[structopt(short = "f", long = "file", number_of_values = 1)]
    pub input_files: Vec<String>,

    /// Ignore init file if it exists
    #[structopt(long = "--args-only")]
    args_only: bool,

    /// Init file
    #[structopt(long = "--init-file", parse(from_os_str))]
    init_file: Option<PathBuf>,

    /// Rates file, with one price directive per line
    #[structopt(long = "--rates", parse(from_os_str))]
    pub rates_file: Option<PathBuf>,

    /// Currency amounts are converted into
    #[structopt(long = "--target", default_value = "CZK")]
    pub target: String,

    /// How converted amounts look, given as a sample amount
    #[structopt(long = "--target-format", default_value = DEFAULT_TARGET_FORMAT)]
    pub target_format: String,

    /// Extra currency to look for, as CODE[:SYMBOL,...]
    #[structopt(long = "--currency", number_of_values = 1)]
    pub currencies: Vec<String>,

    /// Only look for the currencies given with --currency
    #[structopt(long = "--no-default-currencies")]
    pub no_default_currencies: bool,

    /// Class of the elements wrapping tagged prices
    #[structopt(long = "--marker-class", default_value = DEFAULT_MARKER_CLASS)]
    pub marker_class: String,

    /// Extra element whose text is never tagged
    #[structopt(long = "--exclude", number_of_values = 1)]
    pub exclude: Vec<String>,

    /// Age in hours after which rates are reported as stale
    #[structopt(long = "--max-rate-age", default_value = "24")]
    pub max_rate_age: u32,

    #[structopt(long = "now", parse(try_from_str = date_parser))]
    _now: Option<NaiveDate>,

    #[structopt(long = "--force-color")]
    pub force_color: bool,

    /// Log what is being done
    #[structopt(short = "v", long = "--verbose")]
    pub verbose: bool,
}

impl CommonOpts {
    pub fn new() -> Self {
        CommonOpts::from_iter(vec!["fxtag"].iter())
    }

    pub fn now(&self) -> NaiveDateTime {
        match self._now {
            Some(x) => x.and_hms_opt(0, 0, 0).unwrap_or_else(|| Utc::now().naive_utc()),
            None => Utc::now().naive_utc(),
        }
    }

    pub fn max_rate_age(&self) -> Duration {
        Duration::hours(i64::from(self.max_rate_age))
    }

    pub fn currencies(&self) -> Result<List<Currency>, Error> {
        currency_list(&self.currencies, !self.no_default_currencies)
    }

    pub fn scanner(&self) -> Result<Scanner, Error> {
        Ok(Scanner::new(self.currencies()?)?)
    }

    pub fn target(&self) -> Result<Currency, Error> {
        let code = self.target.trim();
        if code.len() < 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error {
                message: vec![
                    "Not a currency code: ".normal(),
                    code.to_string().bold().bright_red(),
                ],
            });
        }
        Ok(Currency::from(code))
    }

    pub fn display_format(&self) -> Result<DisplayFormat, Error> {
        Ok(DisplayFormat::parse(&self.target_format)?)
    }

    pub fn tag_options(&self) -> TagOptions {
        let mut options = TagOptions {
            marker_class: self.marker_class.clone(),
            ..TagOptions::default()
        };
        for tag_name in self.exclude.iter() {
            options.exclude(tag_name);
        }
        options
    }

    /// The rates from `--rates`, or a table that only knows the target currency
    ///
    /// Stale rates are still returned.
    pub fn rate_table(&self) -> Result<RateTable, Error> {
        let target = self.target()?;
        let table = match &self.rates_file {
            Some(path) => load_rates(&expand(path), target)?,
            None => {
                info!("no rates file, only the target currency is known");
                return Ok(RateTable::new(target));
            }
        };
        if table.is_stale(self.now(), self.max_rate_age()) {
            match table.as_of() {
                Some(date) => warn!(as_of = %date, "rates are stale"),
                None => warn!("rates file has no quotes"),
            }
        }
        Ok(table)
    }

    /// Every file matching the `-f` patterns, in the order given
    pub fn input_files(&self) -> Result<Vec<PathBuf>, Error> {
        let mut files = vec![];
        for pattern in self.input_files.iter() {
            let expanded = shellexpand::tilde(pattern).to_string();
            let mut matched: Vec<PathBuf> = match glob::glob(&expanded) {
                Ok(paths) => paths.filter_map(|x| x.ok()).collect(),
                Err(_) => vec![],
            };
            if matched.is_empty() {
                return Err(MissingFileError::InputFileDoesNotExistError(PathBuf::from(pattern)).into());
            }
            matched.sort();
            files.append(&mut matched);
        }
        Ok(files)
    }
}

impl Default for CommonOpts {
    fn default() -> Self {
        Self::new()
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

const INIT_FILE_FLAG: &str = "--init-file";
const NO_INIT_FILE_FLAG: &str = "--args-only";
const INIT_PATH_UNDER_HOME: &str = "~/.fxtagrc";
const INIT_PATH: &str = ".fxtagrc";
const LOG_ENV_VAR: &str = "FXTAG_LOG";

fn init_paths(args: &[String]) -> Vec<String> {
    let mut possible_paths: Vec<String> = Vec::new();
    for i in 0..args.len() {
        if args[i] == NO_INIT_FILE_FLAG {
            return vec![];
        } else if args[i] == INIT_FILE_FLAG {
            if let Some(path) = args.get(i + 1) {
                possible_paths.push(path.clone());
            }
        }
    }
    possible_paths.push(shellexpand::tilde(INIT_PATH_UNDER_HOME).to_string());
    possible_paths.push(INIT_PATH.to_string());
    possible_paths
}

/// Adds the options of an init file that are not already in the arguments
fn add_init_file_options(file: &Path, args: &mut Vec<String>) -> Result<(), Error> {
    let mut aliases = HashMap::new();
    aliases.insert("-f".to_string(), "--file".to_string());
    aliases.insert("-v".to_string(), "--verbose".to_string());
    let contents = read_to_string(file)?;
    for line in contents.lines() {
        let option = line.trim_start();
        match option.chars().next() {
            Some('-') if option.starts_with("--") => {
                let mut iter = option.split_whitespace();
                let name = match iter.next() {
                    Some(x) => x,
                    None => continue,
                };
                if !args
                    .iter()
                    .any(|x| (x == name) | (aliases.get(x).map_or(false, |a| a == name)))
                {
                    args.push(name.to_string());
                    let rest = iter.collect::<Vec<&str>>().join(" ");
                    if !rest.is_empty() {
                        args.push(rest);
                    }
                }
            }
            Some(';') | Some('#') | Some('!') | Some('%') => (), // a comment
            None => (),
            Some(_) => {
                return Err(Error {
                    message: vec![
                        format!("Bad config file {:?}\n", file).normal(),
                        line.to_string().bold(),
                    ],
                })
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default));
    // Only the first call installs a subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

/// Entry point for the command line app
///
/// Load the options from one of the files, add the to the supplied command line options
/// and call the command accordingly.
pub fn run_app(mut args: Vec<String>) -> Result<(), Error> {
    // Look for any file with configuration options
    let possible_paths = init_paths(&args);
    if let Some(i) = args.iter().position(|x| x == INIT_FILE_FLAG) {
        if let Some(path) = args.get(i + 1) {
            if !possible_paths.is_empty() && !Path::new(path).exists() {
                return Err(
                    MissingFileError::ConfigFileDoesNotExistError(PathBuf::from(path)).into(),
                );
            }
        }
    }
    let config_file = possible_paths
        .into_iter()
        .map(PathBuf::from)
        .find(|x| x.exists());
    if let Some(file) = config_file {
        add_init_file_options(&file, &mut args)?;
    }

    // Build options from the argument vector
    let opt: Opt = match Opt::from_iter_safe(args.iter()) {
        Ok(x) => x,
        Err(e) if e.use_stderr() => return Err(Error::new(&e.message)),
        Err(e) => {
            println!("{}", e.message);
            return Ok(());
        }
    };

    let options = match &opt.cmd {
        Command::Scan { options, .. } => options,
        Command::Tag(options) | Command::Rates(options) | Command::Currencies(options) => options,
    };
    init_logging(options.verbose);
    if options.force_color {
        env::set_var("CLICOLOR_FORCE", "1");
    }

    match opt.cmd {
        Command::Scan { options, text } => scan::execute(&options, text),
        Command::Tag(options) => tag::execute(&options),
        Command::Rates(options) => rates::execute(&options),
        Command::Currencies(options) => currencies::execute(&options),
    }
}

/// A parser for date expressions
pub fn date_parser(date: &str) -> Result<NaiveDate, Error> {
    lazy_static! {
        static ref RE_YEAR: Regex = Regex::new(r"^(\d{4})$").unwrap();
        static ref RE_MONTH: Regex = Regex::new(r"^(\d{4})[/-](\d\d?)$").unwrap();
        static ref RE_DATE: Regex = Regex::new(r"^(\d{4})[/-](\d\d?)[/-](\d\d?)$").unwrap();
    }
    let parts: Option<(&str, &str, &str)> = if let Some(captures) = RE_DATE.captures(date) {
        match (captures.get(1), captures.get(2), captures.get(3)) {
            (Some(y), Some(m), Some(d)) => Some((y.as_str(), m.as_str(), d.as_str())),
            _ => None,
        }
    } else if let Some(captures) = RE_MONTH.captures(date) {
        match (captures.get(1), captures.get(2)) {
            (Some(y), Some(m)) => Some((y.as_str(), m.as_str(), "1")),
            _ => None,
        }
    } else if let Some(captures) = RE_YEAR.captures(date) {
        captures.get(1).map(|y| (y.as_str(), "1", "1"))
    } else {
        None
    };
    parts
        .and_then(|(y, m, d)| {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
        })
        .ok_or_else(|| Error {
            message: vec![format!("Invalid date {}", date)
                .as_str()
                .bold()
                .bright_red()],
        })
}
