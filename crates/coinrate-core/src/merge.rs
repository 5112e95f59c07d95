//! Identity-keyed reconciliation of two entry collections.
//!
//! The authoritative side (remote store on sign-in, imported file on import)
//! overwrites entries that share a `ts`; entries only the other side has are
//! kept.

use std::collections::BTreeMap;

use crate::entry::Entry;

/// Merge `authoritative` into `base`, newest first.
pub fn merge(base: &[Entry], authoritative: &[Entry]) -> Vec<Entry> {
    let mut by_ts: BTreeMap<i64, Entry> = BTreeMap::new();
    for entry in base.iter().chain(authoritative) {
        by_ts.insert(entry.ts, entry.clone());
    }
    by_ts.into_values().rev().collect()
}
