use clap::Parser;

use brokerdesk_cli::{Args, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    brokerdesk_observability::init();

    let args = Args::parse();
    let report = run(&args).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
