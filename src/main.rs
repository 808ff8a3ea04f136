use apdu_replay::{config::Config, server::Server, setup::setup, telemetry};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let config = Config::load()?;
    tracing::info!("Loaded configuration: {:?}", config);

    let engine = setup(&config).await?;

    let server = Server::new(engine, &config).await?;
    server.run().await
}
