use bank_dapp::api::server;
use bank_dapp::BankConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger (set RUST_LOG=debug for verbose output, RUST_LOG=info for normal)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = BankConfig::from_env()?;

    log::info!("Starting bank session server on {}", config.bind_address);
    server::start_server(config).await?;
    Ok(())
}
