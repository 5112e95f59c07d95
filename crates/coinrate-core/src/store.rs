//! Ordered in-memory collection of saved entries, most recent first.
//!
//! The store itself knows nothing about persistence; the tracker writes the
//! whole collection out after every committed mutation.

use crate::entry::Entry;
use crate::error::ValidationError;

pub const MIN_SKILL: i64 = 1;
pub const MAX_SKILL: i64 = 6;

/// Rules applied by [`EntryStore::add`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddPolicy {
    /// Reject skills outside `MIN_SKILL..=MAX_SKILL`.
    pub enforce_skill_range: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryStore {
    entries: Vec<Entry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, ts: i64) -> Option<&Entry> {
        self.entries.iter().find(|e| e.ts == ts)
    }

    /// Validate and prepend a new entry stamped with `now_ms`.
    ///
    /// If another entry already owns `now_ms`, the next free millisecond is
    /// used so identities stay unique.
    pub fn add(
        &mut self,
        character: &str,
        skill: i64,
        cpm: Option<f64>,
        now_ms: i64,
        policy: AddPolicy,
    ) -> Result<&Entry, ValidationError> {
        let character = character.trim();
        if character.is_empty() {
            return Err(ValidationError::EmptyCharacter);
        }
        let cpm = match cpm {
            None => return Err(ValidationError::MissingResult),
            Some(v) if v.is_nan() => return Err(ValidationError::MissingResult),
            Some(v) if v.is_infinite() => return Err(ValidationError::NonFiniteResult(v)),
            Some(v) => v,
        };
        if policy.enforce_skill_range && !(MIN_SKILL..=MAX_SKILL).contains(&skill) {
            return Err(ValidationError::SkillOutOfRange(skill));
        }

        let mut ts = now_ms;
        while self.get(ts).is_some() {
            ts += 1;
        }
        self.entries.insert(
            0,
            Entry {
                character: character.to_string(),
                skill,
                cpm,
                ts,
            },
        );
        Ok(&self.entries[0])
    }

    /// Remove the entry with identity `ts`. Returns it if it existed.
    pub fn remove(&mut self, ts: i64) -> Option<Entry> {
        let idx = self.entries.iter().position(|e| e.ts == ts)?;
        Some(self.entries.remove(idx))
    }

    /// Drop everything. Returns how many entries were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn replace(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
    }
}
