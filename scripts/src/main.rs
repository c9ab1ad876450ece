use clap::Parser;
use eyre::Result;
use scripts::{cli::Cli, constants::DEFAULT_LOG_FILTER, utils::setup_client};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        priv_key,
        rpc_url,
        account,
        command,
    } = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().pretty().with_env_filter(filter).init();

    let backend = setup_client(&priv_key, &rpc_url)?;

    command.run(backend, account).await?;
    Ok(())
}
