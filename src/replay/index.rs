use std::collections::{HashMap, VecDeque};

use super::parser::CommandResponsePair;

/// Maps each recorded command to the responses recorded for it, oldest first.
///
/// Queues only ever shrink from the front. A command missing from the index was never recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandIndex {
    queues: HashMap<String, VecDeque<String>>,
}

impl CommandIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from pairs in recording order.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = CommandResponsePair>,
    {
        let mut queues: HashMap<String, VecDeque<String>> = HashMap::new();
        for CommandResponsePair { command, response } in pairs {
            queues.entry(command).or_default().push_back(response);
        }
        Self { queues }
    }

    /// Removes and returns the next response recorded for `command`.
    pub fn pop(&mut self, command: &str) -> Option<String> {
        self.queues.get_mut(command)?.pop_front()
    }

    /// Returns true if the command appears in the recording, even if its queue is exhausted.
    pub fn contains(&self, command: &str) -> bool {
        self.queues.contains_key(command)
    }

    /// Number of responses still queued for `command`.
    pub fn pending(&self, command: &str) -> usize {
        self.queues.get(command).map_or(0, VecDeque::len)
    }

    /// Number of responses still queued across all commands.
    pub fn total_pending(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Remaining responses for `command`, in replay order.
    pub fn responses(&self, command: &str) -> Option<&VecDeque<String>> {
        self.queues.get(command)
    }

    /// Number of distinct recorded commands.
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

impl FromIterator<CommandResponsePair> for CommandIndex {
    fn from_iter<T: IntoIterator<Item = CommandResponsePair>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(command: &str, response: &str) -> CommandResponsePair {
        CommandResponsePair::new(command, response)
    }

    #[test]
    fn test_queues_keep_recording_order() {
        let index = CommandIndex::from_pairs([
            pair("00a4", "90"),
            pair("00b0", "9000"),
            pair("00a4", "6a82"),
            pair("00a4", ""),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(
            index.responses("00a4"),
            Some(&VecDeque::from(["90".to_string(), "6a82".into(), "".into()]))
        );
        assert_eq!(index.total_pending(), 4);
    }

    #[test]
    fn test_pop_consumes_from_front() {
        let mut index: CommandIndex = [pair("00a4", "r1"), pair("00a4", "r2")].into_iter().collect();

        assert_eq!(index.pop("00a4").as_deref(), Some("r1"));
        assert_eq!(index.pending("00a4"), 1);
        assert_eq!(index.pop("00a4").as_deref(), Some("r2"));
        assert_eq!(index.pop("00a4"), None);

        // Exhausted commands stay known
        assert!(index.contains("00a4"));
        assert_eq!(index.pending("00a4"), 0);
    }

    #[test]
    fn test_pop_unknown_command() {
        let mut index = CommandIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.pop("00a4"), None);
        assert!(!index.contains("00a4"));
    }
}
