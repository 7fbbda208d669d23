//! Catalog command - prints the providers and models the UI can offer

use clap::Args;

use crate::api::llm::models::CatalogResponse;

#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
    /// Print on one line instead of pretty-printing
    #[arg(long)]
    pub compact: bool,
}

pub fn run(args: CatalogArgs) -> anyhow::Result<()> {
    println!("{}", render(&args)?);
    Ok(())
}

fn render(args: &CatalogArgs) -> anyhow::Result<String> {
    let catalog = CatalogResponse::from_catalog();

    let json = if args.compact {
        serde_json::to_string(&catalog)?
    } else {
        serde_json::to_string_pretty(&catalog)?
    };

    Ok(json)
}
