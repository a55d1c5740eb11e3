use clap::Parser;
use tracing::info;
use verdict_prelude::{Facts, RulesEngineParameters};

mod cli;
mod logging;
mod tutorials;

use cli::{Cli, Commands, OutputFormat, Tutorial};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Verdict");

    let parameters = load_parameters(&cli)?;
    let (tutorial, mut facts) = match cli.command {
        Commands::Weather(args) => {
            let mut facts = Facts::new();
            facts.put("rain", args.rain);
            (Tutorial::Weather, facts)
        }
        Commands::Hello(args) => {
            let mut facts = Facts::new();
            facts.put("name", args.name);
            facts.put("chinese_name", args.chinese_name);
            (Tutorial::Hello, facts)
        }
        Commands::Airco(args) => {
            let mut facts = Facts::new();
            facts.put("temperature", args.temperature);
            (Tutorial::Airco, facts)
        }
        Commands::Fire(args) => (args.tutorial, Facts::from_json_file(&args.facts)?),
    };

    tutorials::run(tutorial, parameters, &mut facts)?;
    println!("{}", render(&facts, cli.format)?);
    Ok(())
}

fn load_parameters(cli: &Cli) -> anyhow::Result<RulesEngineParameters> {
    let parameters = match &cli.config {
        Some(path) => RulesEngineParameters::from_file(path)?,
        None => RulesEngineParameters::from_environment()?,
    };
    Ok(parameters)
}

fn render(facts: &Facts, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => facts.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&facts.to_json())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_text_and_json() {
        let mut facts = Facts::new();
        facts.put("temperature", 25);
        facts.put("rain", false);

        assert_eq!(render(&facts, OutputFormat::Text).unwrap(), "Facts{rain=false, temperature=25}");
        let json: serde_json::Value =
            serde_json::from_str(&render(&facts, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"rain": false, "temperature": 25}));
    }
}
