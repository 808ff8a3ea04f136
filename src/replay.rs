//! Replay of recorded APDU exchanges.
//!
//! A transcript recorded from a real reader/card session is parsed into
//! command/response pairs, indexed by command, and replayed one response at a
//! time as the reader sends the same commands again.

mod engine;
mod index;
mod log;
mod parser;
mod source;

pub use engine::{DeactivationReason, FAILURE_RESPONSE, LoadSummary, ReplayEngine, ReplayStatus};
pub use index::CommandIndex;
pub use log::{TransactionLog, response_label};
pub use parser::{
    CommandResponsePair, DelimitedTextParser, LogParser, StructuredParser, canonicalize,
};
pub use source::{SourceError, Transcript, TranscriptFormat, TranscriptSource};
