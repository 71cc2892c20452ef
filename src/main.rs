use anyhow::Result;
use clap::Parser;

use ai::GeminiAssistant;
use cli::{Cli, Commands};
use store::PlanStore;
use types::OutputFmt;

mod ai;
mod cli;
mod commands;
mod db;
mod edit;
mod models;
mod reconcile;
mod session;
mod store;
mod types;
mod upload;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let fmt = if cli.json { OutputFmt::Json } else { OutputFmt::Text };

    let db_path = db::default_path()?;
    let pool = db::open(&db_path.to_string_lossy()).await?;
    let store = PlanStore::new(pool);

    match cli.cmd {
        Commands::Scan { file, date } => {
            let assistant = GeminiAssistant::new(types::api_key())?;
            commands::scan::handle(&store, &assistant, file, date).await?
        }
        Commands::Plan(cmd) => commands::plan::handle(cmd, &store, fmt).await?,
        Commands::Session(cmd) => commands::session::handle(cmd, &store).await?,
        Commands::Assist(cmd) => {
            let assistant = GeminiAssistant::new(types::api_key())?;
            commands::assist::handle(cmd, &store, &assistant).await?
        }
        Commands::Theme(cmd) => commands::theme::handle(cmd, &store).await?,
        Commands::Calendar { year, month } => {
            commands::calendar::handle(&store, year, month).await?
        }
        Commands::Config(cmd) => commands::config::handle(cmd).await?,
    }

    Ok(())
}
