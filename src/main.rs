use lichhen::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting lichhen");

    // Load configuration
    let config = startup::load_config()?;

    // Serve until shutdown
    startup::start_server(config).await
}
