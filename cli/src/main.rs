#![deny(missing_docs)]

//! # API Doc CLI
//!
//! Command Line Interface for the OpenAPI document generator.
//!
//! Supported Commands:
//! - `generate`: Manifest -> Registry -> Endpoints -> OpenAPI document.
//! - `routes`: Lists the assembled endpoints and their matching patterns.
//! - `match`: Resolves a concrete request path against the endpoints.

use apidoc_core::AppResult;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod generate;
mod routes;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI document generator")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the OpenAPI document from a manifest.
    Generate(generate::GenerateArgs),
    /// List the endpoints assembled from a manifest.
    Routes(routes::RoutesArgs),
    /// Find the endpoint answering a method and concrete path.
    Match(routes::MatchArgs),
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
        Commands::Routes(args) => routes::list(args)?,
        Commands::Match(args) => routes::resolve(args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::try_parse_from([
            "apidoc",
            "-v",
            "generate",
            "--input",
            "api.yaml",
            "--format",
            "yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.input.to_str(), Some("api.yaml"));
                assert_eq!(args.format, Some(generate::OutputFormat::Yaml));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
