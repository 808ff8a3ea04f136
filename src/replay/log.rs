use std::sync::Mutex;

use tokio::sync::watch;

/// Blank line placed between two consecutive entries.
const ENTRY_SEPARATOR: &str = "\n\n";

/// Human readable labels for well known failure responses.
const RESPONSE_LABELS: [(&str, &str); 2] = [("6f00", "Failure"), ("6a82", "AID not found")];

/// Returns the log label for a response: its well known name, or the hex itself.
pub fn response_label(response_hex: &str) -> &str {
    let lower = response_hex.to_ascii_lowercase();
    RESPONSE_LABELS
        .iter()
        .find(|(code, _)| *code == lower)
        .map_or(response_hex, |(_, label)| *label)
}

/// Append-only transaction log.
///
/// Every append publishes the full text to subscribers.
#[derive(Debug)]
pub struct TransactionLog {
    text: Mutex<String>,
    publisher: watch::Sender<String>,
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionLog {
    pub fn new() -> Self {
        let (publisher, _) = watch::channel(String::new());
        Self {
            text: Mutex::new(String::new()),
            publisher,
        }
    }

    /// Appends an entry separated from previous content by a blank line.
    pub fn record(&self, entry: impl AsRef<str>) {
        let entry = entry.as_ref();
        let mut text = self.text.lock().unwrap_or_else(|e| e.into_inner());
        if !text.is_empty() {
            text.push_str(ENTRY_SEPARATOR);
        }
        text.push_str(entry);
        tracing::info!(target: "transaction_log", "{entry}");
        self.publisher.send_replace(text.clone());
    }

    /// Full log text as of now.
    pub fn snapshot(&self) -> String {
        self.text.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Receives the full log text after each append.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.publisher.subscribe()
    }
}
