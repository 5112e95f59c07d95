//! Coins-per-minute calculation.
//!
//! `compute_rate` turns an elapsed `MM:SS` time, the starting coin count and
//! the item modifiers into a rate. No validation happens here: malformed
//! numbers become `NaN`, a zero duration becomes an infinity, and both are
//! returned unchanged for the caller to display. Saving such a result is
//! refused by the entry store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Multiplier granted by the coin bonus item.
pub const COIN_BONUS_MULTIPLIER: f64 = 1.3;

/// An in-game item that costs coins before the run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Score,
    CoinBonus,
    Exp,
    TimeExtend,
    Bomb,
    FiveToFour,
}

impl Modifier {
    /// Deduction priority order.
    pub const ALL: [Modifier; 6] = [
        Modifier::Score,
        Modifier::CoinBonus,
        Modifier::Exp,
        Modifier::TimeExtend,
        Modifier::Bomb,
        Modifier::FiveToFour,
    ];

    /// Flat coin cost of the item.
    pub fn deduction(self) -> f64 {
        match self {
            Modifier::Score | Modifier::CoinBonus | Modifier::Exp => 500.0,
            Modifier::TimeExtend => 1000.0,
            Modifier::Bomb => 1500.0,
            Modifier::FiveToFour => 1800.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Score => "score",
            Modifier::CoinBonus => "coin-bonus",
            Modifier::Exp => "exp",
            Modifier::TimeExtend => "time-extend",
            Modifier::Bomb => "bomb",
            Modifier::FiveToFour => "five-to-four",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Modifier::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| {
                let valid: Vec<_> = Modifier::ALL.iter().map(|m| m.as_str()).collect();
                format!("unknown item '{s}' (valid: {})", valid.join(", "))
            })
    }
}

/// The six item flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub score: bool,
    #[serde(default)]
    pub coin_bonus: bool,
    #[serde(default)]
    pub exp: bool,
    #[serde(default)]
    pub time_extend: bool,
    #[serde(default)]
    pub bomb: bool,
    #[serde(default)]
    pub five_to_four: bool,
}

impl Modifiers {
    /// Coin bonus and 5→4 checked, the rest off.
    pub fn usual() -> Self {
        Self {
            coin_bonus: true,
            five_to_four: true,
            ..Self::default()
        }
    }

    pub fn from_items<I: IntoIterator<Item = Modifier>>(items: I) -> Self {
        items.into_iter().fold(Self::default(), |m, item| m.with(item))
    }

    pub fn with(mut self, item: Modifier) -> Self {
        *self.flag_mut(item) = true;
        self
    }

    pub fn is_set(&self, item: Modifier) -> bool {
        match item {
            Modifier::Score => self.score,
            Modifier::CoinBonus => self.coin_bonus,
            Modifier::Exp => self.exp,
            Modifier::TimeExtend => self.time_extend,
            Modifier::Bomb => self.bomb,
            Modifier::FiveToFour => self.five_to_four,
        }
    }

    fn flag_mut(&mut self, item: Modifier) -> &mut bool {
        match item {
            Modifier::Score => &mut self.score,
            Modifier::CoinBonus => &mut self.coin_bonus,
            Modifier::Exp => &mut self.exp,
            Modifier::TimeExtend => &mut self.time_extend,
            Modifier::Bomb => &mut self.bomb,
            Modifier::FiveToFour => &mut self.five_to_four,
        }
    }

    /// Checked items in deduction priority order.
    pub fn items(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(|m| self.is_set(*m))
    }

    /// Sum of flat deductions of every checked item.
    pub fn total_deduction(&self) -> f64 {
        self.items().map(Modifier::deduction).sum()
    }
}

/// Where the coin bonus multiplier sits relative to the deductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusOrder {
    /// `(coins - deductions) * 1.3`
    #[default]
    DeductThenBonus,
    /// `coins * 1.3 - deductions`
    BonusThenDeduct,
}

impl FromStr for BonusOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "deduct_then_bonus" => Ok(BonusOrder::DeductThenBonus),
            "bonus_then_deduct" => Ok(BonusOrder::BonusThenDeduct),
            other => Err(format!(
                "unknown bonus order '{other}' (valid: deduct_then_bonus, bonus_then_deduct)"
            )),
        }
    }
}

/// Output of one calculation.
///
/// Non-finite fields serialize as `"NaN"`, `"Infinity"` or `"-Infinity"`
/// so they survive JSON output instead of collapsing to `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateResult {
    #[serde(with = "non_finite")]
    pub total_minutes: f64,
    /// Coins after deductions and bonus.
    #[serde(with = "non_finite")]
    pub adjusted_coins: f64,
    /// Coins per minute.
    #[serde(with = "non_finite")]
    pub cpm: f64,
    /// Coins per hour.
    #[serde(with = "non_finite")]
    pub per_hour: f64,
}

/// `f64` as a JSON number, or as text when it is not finite.
mod non_finite {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_str("-Infinity")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("not a number: '{other}'"))),
            },
        }
    }
}

/// Parse `MM:SS` into fractional minutes.
///
/// Blank parts count as zero, a missing or non-numeric part yields `NaN`.
pub fn parse_minutes(time: &str) -> f64 {
    let mut parts = time.split(':');
    let minutes = parse_part(parts.next());
    let seconds = parse_part(parts.next());
    minutes + seconds / 60.0
}

fn parse_part(part: Option<&str>) -> f64 {
    match part.map(str::trim) {
        None => f64::NAN,
        Some("") => 0.0,
        Some(s) => s.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// Apply deductions and the coin bonus to the starting coins.
pub fn adjusted_coins(coins: f64, modifiers: &Modifiers, order: BonusOrder) -> f64 {
    let deduction = modifiers.total_deduction();
    if !modifiers.coin_bonus {
        return coins - deduction;
    }
    match order {
        BonusOrder::DeductThenBonus => (coins - deduction) * COIN_BONUS_MULTIPLIER,
        BonusOrder::BonusThenDeduct => coins * COIN_BONUS_MULTIPLIER - deduction,
    }
}

/// Compute coins per minute.
pub fn compute_rate(time: &str, coins: f64, modifiers: &Modifiers, order: BonusOrder) -> RateResult {
    let total_minutes = parse_minutes(time);
    let adjusted = adjusted_coins(coins, modifiers, order);
    let cpm = adjusted / total_minutes;
    RateResult {
        total_minutes,
        adjusted_coins: adjusted,
        cpm,
        per_hour: cpm * 60.0,
    }
}
