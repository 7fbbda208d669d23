//! Command-line entry points
//!
//! - `serve`: run the HTTP server
//! - `catalog`: print the provider catalog as JSON

pub mod catalog;
pub mod serve;

use clap::{Parser, Subcommand};

/// LLM chat relay - one chat interface over several LLM vendors
#[derive(Parser)]
#[command(name = "llm-chat-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Print the provider catalog as JSON
    Catalog(catalog::CatalogArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["llm-chat-relay", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));

        let cli = Cli::try_parse_from(["llm-chat-relay", "catalog", "--compact"]).unwrap();
        assert!(matches!(cli.command, Command::Catalog(ref args) if args.compact));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["llm-chat-relay"]).is_err());
    }
}
