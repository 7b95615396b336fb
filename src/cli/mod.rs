//! CLI module for PMP Prompt Chain
//!
//! Provides subcommands:
//! - `serve`: HTTP API driving one workflow step by step
//! - `run`: automatic mode over a local document

pub mod run;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// PMP Prompt Chain - Step-gated prompt chaining over an uploaded document
#[derive(Parser)]
#[command(name = "pmp-prompt-chain")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(serve::ServeArgs),

    /// Run all steps against a document and write the artifact
    Run(run::RunArgs),
}

/// Load `.env` and configuration, then install logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["pmp-prompt-chain", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Command::Serve(ref args) if args.port == Some(9000)));
    }

    #[test]
    fn test_run_requires_document() {
        assert!(Cli::try_parse_from(["pmp-prompt-chain", "run"]).is_err());
    }
}
