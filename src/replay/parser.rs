use serde_json::Value;
use tracing::{debug, warn};

/// Characters stripped from every recorded token before it is used as a key or value.
const STRIPPED_CHARS: [char; 7] = ['[', ']', '\'', '"', ' ', '\r', '\t'];

/// A single recorded exchange: the command sent by the reader and the response the card gave.
///
/// Both sides are canonical lowercase hex. An empty response means the card answered
/// with a zero-length payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandResponsePair {
    pub command: String,
    pub response: String,
}

impl CommandResponsePair {
    pub fn new(command: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            response: response.into(),
        }
    }
}

/// Converts a raw recorded transcript into ordered command/response pairs.
///
/// Parsing is best effort: malformed records are dropped, never reported as errors.
pub trait LogParser: Send + Sync {
    fn parse(&self, raw: &str) -> Vec<CommandResponsePair>;
}

/// Parser for `<commands>;<responses>` lines, each side a comma separated token list.
///
/// This is the format written by the snoop log extractor, e.g.
/// `['00a4040007a0000000041010', '00b2010c00'];['9000', '6a82']`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedTextParser;

impl LogParser for DelimitedTextParser {
    fn parse(&self, raw: &str) -> Vec<CommandResponsePair> {
        let mut pairs = Vec::new();

        for (line_no, line) in raw.split('\n').enumerate() {
            let fields: Vec<&str> = line.split(';').collect();
            let [commands, responses] = fields.as_slice() else {
                if !line.trim().is_empty() {
                    debug!(line = line_no + 1, "Skipping line without exactly two fields");
                }
                continue;
            };

            let commands: Vec<&str> = commands.split(',').collect();
            let responses: Vec<&str> = responses.split(',').collect();
            if commands.len() != responses.len() {
                debug!(
                    line = line_no + 1,
                    commands = commands.len(),
                    responses = responses.len(),
                    "Skipping line with mismatched token counts"
                );
                continue;
            }

            pairs.extend(pair_tokens(commands.into_iter().zip(responses)));
        }

        pairs
    }
}

/// Parser for a JSON array of `{ "commands": [...], "responses": [...] }` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredParser;

impl LogParser for StructuredParser {
    fn parse(&self, raw: &str) -> Vec<CommandResponsePair> {
        let records = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(records)) => records,
            Ok(other) => {
                warn!("Structured transcript is not an array (found {})", json_kind(&other));
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to parse structured transcript: {e}");
                return Vec::new();
            }
        };

        let mut pairs = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            let (Some(commands), Some(responses)) = (
                record.get("commands").and_then(Value::as_array),
                record.get("responses").and_then(Value::as_array),
            ) else {
                debug!(record = idx, "Skipping record without commands/responses arrays");
                continue;
            };

            if commands.len() != responses.len() {
                debug!(record = idx, "Skipping record with mismatched array lengths");
                continue;
            }

            // Only string elements carry a payload, anything else makes the record unusable
            let tokens: Option<Vec<(&str, &str)>> = commands
                .iter()
                .zip(responses)
                .map(|(c, r)| Some((c.as_str()?, r.as_str()?)))
                .collect();
            let Some(tokens) = tokens else {
                debug!(record = idx, "Skipping record with non-string elements");
                continue;
            };

            pairs.extend(pair_tokens(tokens));
        }

        pairs
    }
}

/// Strips bracket, quote and whitespace characters and lowercases the rest.
///
/// Canonicalizing an already canonical token returns it unchanged.
pub fn canonicalize(token: &str) -> String {
    token
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Returns true for a string `hex::decode` accepts. The empty string is valid.
fn is_canonical_hex(token: &str) -> bool {
    token.len() % 2 == 0 && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Canonicalizes positional token pairs, dropping any pair with a non-hex side.
fn pair_tokens<'a, I>(tokens: I) -> Vec<CommandResponsePair>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    tokens
        .into_iter()
        .filter_map(|(command, response)| {
            let command = canonicalize(command);
            let response = canonicalize(response);
            if is_canonical_hex(&command) && is_canonical_hex(&response) {
                Some(CommandResponsePair::new(command, response))
            } else {
                debug!(%command, %response, "Skipping pair with non-hex tokens");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
