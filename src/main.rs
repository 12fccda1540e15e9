use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser};
use fare_feed::{select, FareError, FeedScanner, JsonStyle, Route, ScanConfig, SelectionMode};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Search fare feeds for flights on one route and print them as JSON.
#[derive(Debug, Parser)]
#[command(name = "fare-feed")]
struct Cli {
    #[command(flatten)]
    mode: ModeFlags,

    /// Airport the first leg must depart from [default: DXB]
    #[arg(long = "from", value_name = "CODE")]
    source: Option<String>,

    /// Airport the last leg must arrive at [default: BKK]
    #[arg(long = "to", value_name = "CODE")]
    destination: Option<String>,

    /// Separate JSON items with ", " and ": " and escape non-ASCII text as
    /// \uXXXX, like the older fare tool did
    #[arg(long)]
    legacy_json: bool,

    /// Feed files, scanned in order [default: RS_Via-3.xml RS_ViaOW.xml]
    #[arg(value_name = "FEED")]
    feeds: Vec<PathBuf>,
}

#[derive(Debug, Args)]
#[group(multiple = false)]
struct ModeFlags {
    /// Print all matching flights
    #[arg(long)]
    showall: bool,

    /// Print the most expensive flight
    #[arg(long)]
    maxprice: bool,

    /// Print the cheapest flight
    #[arg(long)]
    minprice: bool,

    /// Print the fastest flight
    #[arg(long)]
    mintime: bool,

    /// Print the slowest flight
    #[arg(long)]
    maxtime: bool,
}

impl ModeFlags {
    fn selected(&self) -> Option<SelectionMode> {
        [
            (self.showall, SelectionMode::ShowAll),
            (self.maxprice, SelectionMode::MaxPrice),
            (self.minprice, SelectionMode::MinPrice),
            (self.mintime, SelectionMode::MinTime),
            (self.maxtime, SelectionMode::MaxTime),
        ]
        .into_iter()
        .find_map(|(set, mode)| set.then_some(mode))
    }
}

impl Cli {
    fn json_style(&self) -> JsonStyle {
        if self.legacy_json {
            JsonStyle::Legacy
        } else {
            JsonStyle::default()
        }
    }

    fn to_config(&self) -> ScanConfig {
        let defaults = ScanConfig::default();
        ScanConfig {
            feeds: if self.feeds.is_empty() {
                defaults.feeds
            } else {
                self.feeds.clone()
            },
            route: Route::new(
                self.source.clone().unwrap_or(defaults.route.source),
                self.destination
                    .clone()
                    .unwrap_or(defaults.route.destination),
            ),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fare-feed: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), FareError> {
    let Some(mode) = cli.mode.selected() else {
        debug!("no report flag given, nothing to do");
        return Ok(());
    };

    let config = cli.to_config();
    let scanner = FeedScanner::new(config.route);
    let flights = scanner.scan_all(&config.feeds)?;

    let json = select(&flights, mode)?.to_json(cli.json_style())?;
    // the caption goes to stderr whatever the log level; stdout is JSON only
    eprintln!("{}", mode.caption());

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flag_selects_mode() {
        let cli = Cli::try_parse_from(["fare-feed", "--mintime"]).unwrap();
        assert_eq!(cli.mode.selected(), Some(SelectionMode::MinTime));

        let cli = Cli::try_parse_from(["fare-feed"]).unwrap();
        assert_eq!(cli.mode.selected(), None);
    }

    #[test]
    fn test_flags_are_mutually_exclusive() {
        let err = Cli::try_parse_from(["fare-feed", "--maxprice", "--minprice"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_defaults_come_from_scan_config() {
        let cli = Cli::try_parse_from(["fare-feed", "--showall"]).unwrap();
        assert_eq!(cli.to_config(), ScanConfig::default());
    }

    #[test]
    fn test_feeds_and_route_override_defaults() {
        let cli = Cli::try_parse_from([
            "fare-feed",
            "--showall",
            "--from",
            "NYC",
            "--to",
            "LON",
            "b.xml",
            "a.xml",
        ])
        .unwrap();
        let config = cli.to_config();
        assert_eq!(config.route, Route::new("NYC", "LON"));
        assert_eq!(config.feeds, vec![PathBuf::from("b.xml"), PathBuf::from("a.xml")]);
    }

    #[test]
    fn test_legacy_json_flag() {
        let cli = Cli::try_parse_from(["fare-feed", "--minprice"]).unwrap();
        assert_eq!(cli.json_style(), JsonStyle::Native);

        let cli = Cli::try_parse_from(["fare-feed", "--minprice", "--legacy-json"]).unwrap();
        assert_eq!(cli.json_style(), JsonStyle::Legacy);
    }

    #[test]
    fn test_run_without_mode_does_not_touch_feeds() {
        let cli = Cli::try_parse_from(["fare-feed", "does-not-exist.xml"]).unwrap();
        assert!(run(&cli).is_ok());
    }
}
