use clap::Parser;
use llm_chat_relay::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Catalog(args) => cli::catalog::run(args),
    }
}
