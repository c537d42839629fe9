use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whale tiers over non-overlapping ETH balance bands, lower bound inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhaleClass {
    /// < 10 ETH
    Shrimp,
    /// 10 – 100 ETH
    SmallWhale,
    /// 100 – 1,000 ETH
    MediumWhale,
    /// 1,000 – 10,000 ETH
    LargeWhale,
    /// ≥ 10,000 ETH
    MegaWhale,
}

impl WhaleClass {
    pub const ALL: [WhaleClass; 5] = [
        WhaleClass::Shrimp,
        WhaleClass::SmallWhale,
        WhaleClass::MediumWhale,
        WhaleClass::LargeWhale,
        WhaleClass::MegaWhale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WhaleClass::Shrimp => "shrimp",
            WhaleClass::SmallWhale => "small_whale",
            WhaleClass::MediumWhale => "medium_whale",
            WhaleClass::LargeWhale => "large_whale",
            WhaleClass::MegaWhale => "mega_whale",
        }
    }

    /// Title-cased name, e.g. "Medium Whale".
    pub fn title(&self) -> &'static str {
        match self {
            WhaleClass::Shrimp => "Shrimp",
            WhaleClass::SmallWhale => "Small Whale",
            WhaleClass::MediumWhale => "Medium Whale",
            WhaleClass::LargeWhale => "Large Whale",
            WhaleClass::MegaWhale => "Mega Whale",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WhaleClass::Shrimp => "Retail holder",
            WhaleClass::SmallWhale => "Notable position",
            WhaleClass::MediumWhale => "Significant holder",
            WhaleClass::LargeWhale => "Major market participant",
            WhaleClass::MegaWhale => "Institutional-level holdings",
        }
    }

    /// Inclusive lower bound of the band, in ETH.
    pub fn lower_bound(&self) -> Decimal {
        match self {
            WhaleClass::Shrimp => Decimal::ZERO,
            WhaleClass::SmallWhale => Decimal::from(10),
            WhaleClass::MediumWhale => Decimal::from(100),
            WhaleClass::LargeWhale => Decimal::from(1_000),
            WhaleClass::MegaWhale => Decimal::from(10_000),
        }
    }
}

impl fmt::Display for WhaleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a balance into exactly one whale band.
///
/// Total over all inputs; anything below 10 ETH (including negative input)
/// is a shrimp.
pub fn classify(eth_balance: Decimal) -> WhaleClass {
    WhaleClass::ALL
        .iter()
        .rev()
        .copied()
        .find(|class| eth_balance >= class.lower_bound())
        .unwrap_or(WhaleClass::Shrimp)
}

/// Render an optional class the way reports and movement records expect.
pub fn class_or_unknown(class: Option<WhaleClass>) -> &'static str {
    class.map(|c| c.as_str()).unwrap_or("unknown")
}

/// How noteworthy a single movement is, by ETH value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Notable,
    Significant,
    Major,
    Critical,
    Mega,
}

impl Significance {
    pub fn of(value_eth: Decimal) -> Self {
        if value_eth >= Decimal::from(10_000) {
            Significance::Mega
        } else if value_eth >= Decimal::from(5_000) {
            Significance::Critical
        } else if value_eth >= Decimal::from(1_000) {
            Significance::Major
        } else if value_eth >= Decimal::from(500) {
            Significance::Significant
        } else {
            Significance::Notable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Significance::Mega => "MEGA MOVEMENT",
            Significance::Critical => "CRITICAL",
            Significance::Major => "MAJOR",
            Significance::Significant => "SIGNIFICANT",
            Significance::Notable => "NOTABLE",
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
