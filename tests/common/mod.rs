use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use apdu_replay::{config::Config, replay::ReplayEngine, server::Server, telemetry};

/// A running server and the engine behind it.
pub struct TestServer {
    pub addr: String,
    #[allow(dead_code)]
    pub engine: Arc<ReplayEngine>,
}

// Helper function to spawn a test server on a random port
pub async fn spawn_server(transcript_dir: &Path) -> TestServer {
    telemetry::init_tracing();

    let config = {
        let vars = HashMap::from([
            ("server.host".to_string(), "127.0.0.1".to_string()),
            // Use a random OS port
            ("server.port".to_string(), "0".to_string()),
            (
                "replay.transcript_dir".to_string(),
                transcript_dir.display().to_string(),
            ),
        ]);
        Config::load_with_sources(Some(vars)).unwrap()
    };

    let engine = Arc::new(ReplayEngine::new());
    let server = Server::new(engine.clone(), &config).await.unwrap();

    let port = server.port();
    tokio::spawn(async move {
        server.run().await.expect("failed to run server");
    });

    TestServer {
        addr: format!("http://{}:{}", config.server.host, port),
        engine,
    }
}
