mod bootstrap_helpers;
mod runtime;

use anyhow::Result;
use civic_cli::Cli;
use clap::Parser;

use crate::bootstrap_helpers::init_tracing;
use crate::runtime::Runtime;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let runtime = Runtime::from_cli(&cli)?;

    match cli.message.as_deref() {
        Some(message) => {
            println!("{}", runtime.answer(message).await?);
            Ok(())
        }
        None => runtime.run_stdin().await,
    }
}
