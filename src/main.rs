use reelserve::config::Config;
use reelserve::server::{Server, Shutdown};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let server = Server::bind(&cfg).await?;

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();

    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown signal received");
        on_signal.trigger();
    });

    // Held until `run` returns; dropping every sender ends the accept loop
    server.run(signal).await?;
    drop(shutdown);

    Ok(())
}
