use serde::{Deserialize, Serialize};

/// Visual category of a transcript line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// The operator's own command, echoed before it is sent
    UserEcho,
    /// Console notices (welcome banner)
    Info,
    /// Command executed by the gateway
    Success,
    /// Command refused by policy, or the request failed
    Error,
}

/// A single immutable line of the console transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptEntry {
    kind: EntryKind,
    text: String,
}

impl TranscriptEntry {
    pub fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Append-only record of command attempts and their outcomes.
///
/// Entries are never removed or reordered; insertion order is display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: EntryKind, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::new(kind, text));
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Entries appended after the first `offset` ones.
    pub fn since(&self, offset: usize) -> &[TranscriptEntry] {
        self.entries.get(offset..).unwrap_or(&[])
    }
}
