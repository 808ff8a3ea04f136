use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::index::CommandIndex;
use super::log::{TransactionLog, response_label};
use super::parser::CommandResponsePair;
use super::source::Transcript;

/// Response sent for commands with nothing left to replay.
pub const FAILURE_RESPONSE: [u8; 2] = [0x6F, 0x00];

/// Platform code for a deactivation caused by losing the NFC link.
const DEACTIVATION_LINK_LOSS: i64 = 0;
/// Platform code for a deactivation caused by the reader selecting another AID.
const DEACTIVATION_DESELECTED: i64 = 1;

/// Why the emulated session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeactivationReason {
    LinkLoss,
    Deselected,
}

impl DeactivationReason {
    /// Maps a platform reason code. Unknown codes count as a deselection.
    pub fn from_code(code: i64) -> Self {
        match code {
            DEACTIVATION_LINK_LOSS => Self::LinkLoss,
            _ => Self::Deselected,
        }
    }

    /// Maps a reason name such as `LINK_LOSS`. Unknown names count as a deselection.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("LINK_LOSS") {
            Self::LinkLoss
        } else {
            Self::Deselected
        }
    }

    fn log_entry(self) -> &'static str {
        match self {
            Self::LinkLoss => "Service has been deactivated due to NFC link loss",
            Self::Deselected => {
                "Service has been deactivated due to a different AID being selected"
            }
        }
    }
}

impl fmt::Display for DeactivationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkLoss => f.write_str("LINK_LOSS"),
            Self::Deselected => f.write_str("DESELECTED"),
        }
    }
}

/// Outcome of loading a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Command/response pairs read from the transcript
    pub pairs: usize,
    /// Distinct commands in the new index
    pub commands: usize,
}

/// Point-in-time view of the engine for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayStatus {
    pub snoop_file: Option<String>,
    pub commands: usize,
    pub pending_responses: usize,
    pub transaction_log: String,
}

#[derive(Debug, Default)]
struct ReplayState {
    index: CommandIndex,
    snoop_file: Option<String>,
}

/// Answers reader commands by replaying recorded responses.
///
/// One engine serves one emulation session. It is shared by reference (usually behind
/// an `Arc`) with whatever layer receives commands from the reader. Lookup and pop
/// happen under a single lock, so every recorded response is sent at most once even if
/// commands arrive concurrently.
#[derive(Debug, Default)]
pub struct ReplayEngine {
    state: Mutex<ReplayState>,
    log: TransactionLog,
}

impl ReplayEngine {
    /// Creates an engine with an empty index. Every command fails until a transcript is loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current index with the contents of `transcript`.
    pub fn load(&self, transcript: &Transcript) -> LoadSummary {
        let pairs = transcript.format.parser().parse(&transcript.text);
        if pairs.is_empty() {
            warn!(
                source = transcript.name.as_deref().unwrap_or("<inline>"),
                "Transcript contains no usable command/response pairs"
            );
        }
        self.replace(pairs, transcript.name.clone())
    }

    /// Replaces the current index with already parsed pairs.
    pub fn load_pairs(&self, pairs: Vec<CommandResponsePair>) -> LoadSummary {
        self.replace(pairs, None)
    }

    fn replace(&self, pairs: Vec<CommandResponsePair>, snoop_file: Option<String>) -> LoadSummary {
        let pair_count = pairs.len();
        let index = CommandIndex::from_pairs(pairs);
        let summary = LoadSummary {
            pairs: pair_count,
            commands: index.len(),
        };

        {
            let mut state = self.lock_state();
            state.index = index;
            state.snoop_file = snoop_file;
        }

        info!(
            pairs = summary.pairs,
            commands = summary.commands,
            "Loaded replay transcript"
        );
        summary
    }

    /// Answers one command frame from the reader.
    ///
    /// Pops the next recorded response for the command, or answers `6F 00` when the
    /// command was never recorded or all of its responses have been sent. A `None`
    /// command is logged as such and also answered with `6F 00`.
    pub fn handle_command(&self, command: Option<&[u8]>) -> Vec<u8> {
        let Some(command) = command else {
            warn!("Received null command");
            self.log.record("Received null command");
            return FAILURE_RESPONSE.to_vec();
        };

        let command_hex = hex::encode(command);
        let next = {
            let mut state = self.lock_state();
            let next = state.index.pop(&command_hex);
            if next.is_none() {
                if state.index.contains(&command_hex) {
                    debug!(command = %command_hex, "All recorded responses already sent");
                } else {
                    debug!(command = %command_hex, "Command not in transcript");
                }
            }
            next
        };

        let (response_hex, response) = match next {
            Some(response_hex) => match hex::decode(&response_hex) {
                Ok(response) => (response_hex, response),
                Err(e) => {
                    warn!(command = %command_hex, "Recorded response is not valid hex: {e}");
                    (hex::encode(FAILURE_RESPONSE), FAILURE_RESPONSE.to_vec())
                }
            },
            None => (hex::encode(FAILURE_RESPONSE), FAILURE_RESPONSE.to_vec()),
        };

        self.log.record(format!(
            "Received command: {command_hex}\n\n     Sent response: {}",
            response_label(&response_hex)
        ));
        response
    }

    /// Records the end of the emulated session. The index is left untouched.
    pub fn deactivate(&self, reason: DeactivationReason) {
        info!(%reason, "Emulated service deactivated");
        self.log.record(reason.log_entry());
    }

    /// Records polling frames observed before a reader starts sending commands.
    pub fn record_polling_frames<S: AsRef<str>>(&self, frames: &[S]) {
        for frame in frames {
            self.log
                .record(format!("Received polling frame {}", frame.as_ref()));
        }
    }

    /// Full transaction log text.
    pub fn current_log(&self) -> String {
        self.log.snapshot()
    }

    /// Receives the full transaction log text after each new entry.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.log.subscribe()
    }

    pub fn status(&self) -> ReplayStatus {
        let (snoop_file, commands, pending_responses) = {
            let state = self.lock_state();
            (
                state.snoop_file.clone(),
                state.index.len(),
                state.index.total_pending(),
            )
        };
        ReplayStatus {
            snoop_file,
            commands,
            pending_responses,
            transaction_log: self.log.snapshot(),
        }
    }

    /// Remaining responses recorded for a canonical command.
    pub fn pending(&self, command_hex: &str) -> usize {
        self.lock_state().index.pending(command_hex)
    }

    // A panic while holding the lock cannot leave the index half updated
    fn lock_state(&self) -> MutexGuard<'_, ReplayState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
