//! Command line definition

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tutorial runner for the Verdict rules engine
#[derive(Debug, Parser)]
#[command(name = "verdict", version)]
#[command(about = "Fire the Verdict tutorial rule sets against facts")]
pub struct Cli {
    /// Debug-level logs for the engine
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Engine parameters file (.yaml, .yml or .json); `VERDICT_*` variables otherwise
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// How the final facts are printed
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// If it rains, take an umbrella
    Weather(WeatherArgs),
    /// Greet someone in English and Chinese
    Hello(HelloArgs),
    /// Cool a room down until it is no longer hot
    Airco(AircoArgs),
    /// Fire a tutorial rule set against facts loaded from a JSON file
    Fire(FireArgs),
}

#[derive(Debug, Args)]
pub struct WeatherArgs {
    /// Whether it rains
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub rain: bool,
}

#[derive(Debug, Args)]
pub struct HelloArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub chinese_name: String,
}

#[derive(Debug, Args)]
pub struct AircoArgs {
    /// Starting temperature
    #[arg(long, default_value_t = 30)]
    pub temperature: i64,
}

#[derive(Debug, Args)]
pub struct FireArgs {
    /// JSON object of fact name to value
    #[arg(long)]
    pub facts: PathBuf,

    #[arg(long, value_enum)]
    pub tutorial: Tutorial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tutorial {
    Weather,
    Hello,
    Airco,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["verdict", "airco", "--temperature", "28", "--format", "json"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Airco(AircoArgs { temperature: 28 })));
    }

    #[test]
    fn weather_rain_defaults_to_true() {
        let cli = Cli::try_parse_from(["verdict", "weather"]).unwrap();
        assert!(matches!(cli.command, Commands::Weather(WeatherArgs { rain: true })));

        let cli = Cli::try_parse_from(["verdict", "--verbose", "weather", "--rain", "false"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Weather(WeatherArgs { rain: false })));
    }

    #[test]
    fn fire_requires_known_tutorial() {
        let cli =
            Cli::try_parse_from(["verdict", "fire", "--facts", "facts.json", "--tutorial", "hello"])
                .unwrap();
        let Commands::Fire(args) = cli.command else { panic!("expected fire") };
        assert_eq!(args.tutorial, Tutorial::Hello);

        assert!(
            Cli::try_parse_from(["verdict", "fire", "--facts", "f.json", "--tutorial", "nope"])
                .is_err()
        );
    }

    #[test]
    fn hello_needs_both_names() {
        assert!(Cli::try_parse_from(["verdict", "hello", "--name", "Mahmoud"]).is_err());
    }
}
