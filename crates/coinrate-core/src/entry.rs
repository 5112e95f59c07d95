//! Saved measurements.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One saved coins-per-minute measurement.
///
/// `ts` is the creation time in epoch milliseconds and doubles as the
/// entry's identity within a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub character: String,
    pub skill: i64,
    pub cpm: f64,
    pub ts: i64,
}

impl Entry {
    /// Build an entry from an arbitrary JSON value, defaulting every field
    /// that is missing or of the wrong type.
    pub fn coerce(value: &Value, now_ms: i64) -> Self {
        let field = |name: &str| value.as_object().and_then(|o| o.get(name));
        Self {
            character: field("character").map(coerce_string).unwrap_or_default(),
            skill: field("skill").and_then(coerce_integer).unwrap_or(1),
            cpm: field("cpm").and_then(coerce_number).unwrap_or(0.0),
            ts: field("ts").and_then(coerce_integer).unwrap_or(now_ms),
        }
    }
}

fn coerce_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn coerce_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn coerce_integer(v: &Value) -> Option<i64> {
    if let Some(i) = v.as_i64() {
        return Some(i);
    }
    coerce_number(v)
        .filter(|n| n.abs() < i64::MAX as f64)
        .map(|n| n.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_formed_record_is_kept() {
        let v = json!({"character": "A", "skill": 2, "cpm": 100, "ts": 5});
        assert_eq!(
            Entry::coerce(&v, 999),
            Entry { character: "A".into(), skill: 2, cpm: 100.0, ts: 5 }
        );
    }

    #[test]
    fn missing_fields_take_defaults() {
        let e = Entry::coerce(&json!({}), 42);
        assert_eq!(e, Entry { character: String::new(), skill: 1, cpm: 0.0, ts: 42 });
    }

    #[test]
    fn non_object_takes_defaults() {
        let e = Entry::coerce(&json!("hello"), 7);
        assert_eq!(e.ts, 7);
        assert_eq!(e.skill, 1);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let v = json!({"character": 12, "skill": "3", "cpm": " 55.5 ", "ts": "1700000000000"});
        let e = Entry::coerce(&v, 0);
        assert_eq!(e.character, "12");
        assert_eq!(e.skill, 3);
        assert_eq!(e.cpm, 55.5);
        assert_eq!(e.ts, 1_700_000_000_000);
    }

    #[test]
    fn wrong_types_fall_back() {
        let v = json!({"character": null, "skill": [1], "cpm": "fast", "ts": {"x": 1}});
        let e = Entry::coerce(&v, 9);
        assert_eq!(e, Entry { character: String::new(), skill: 1, cpm: 0.0, ts: 9 });
    }

    #[test]
    fn fractional_skill_truncates() {
        let e = Entry::coerce(&json!({"skill": 4.9}), 0);
        assert_eq!(e.skill, 4);
    }
}
