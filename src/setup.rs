use crate::config::Config;
use crate::replay::{ReplayEngine, TranscriptSource};
use color_eyre::eyre::Context;
use std::sync::Arc;

/// Builds the replay engine and loads the startup transcript, if one is configured.
pub async fn setup(config: &Config) -> color_eyre::Result<Arc<ReplayEngine>> {
    let engine = Arc::new(ReplayEngine::new());

    if let Some(snoop_file) = &config.replay.snoop_file {
        tracing::info!("Replaying transcript {snoop_file} from startup configuration.");
        let transcript = TranscriptSource::File(snoop_file.clone())
            .read(&config.replay.transcript_dir)
            .await
            .wrap_err_with(|| format!("Failed to load startup transcript {snoop_file}"))?;
        engine.load(&transcript);
    } else {
        tracing::info!("No startup transcript, waiting for the harness to load one.");
    }

    Ok(engine)
}
