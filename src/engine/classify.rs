//! Price classification.
//!
//! Two independent bases: absolute euro thresholds for the result list and
//! map, and a ratio against the user's price ceiling for the calendar.

use serde::Serialize;

/// Five price tiers, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Bargain,
    Cheap,
    Fair,
    Pricey,
    Expensive,
}

/// Color key for cells without data.
pub const NO_DATA_COLOR: &str = "rgba(255,255,255,0.03)";

impl PriceTier {
    pub const ALL: [PriceTier; 5] = [
        PriceTier::Bargain,
        PriceTier::Cheap,
        PriceTier::Fair,
        PriceTier::Pricey,
        PriceTier::Expensive,
    ];

    /// Zero-based position, 0 = cheapest.
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-based rank, "tier N of 5".
    pub fn rank(self) -> usize {
        self.index() + 1
    }

    pub fn color(self) -> &'static str {
        match self {
            PriceTier::Bargain => "#22c55e",
            PriceTier::Cheap => "#84cc16",
            PriceTier::Fair => "#eab308",
            PriceTier::Pricey => "#f97316",
            PriceTier::Expensive => "#ef4444",
        }
    }
}

/// Classify by absolute price: <30, <50, <70, <100, >=100.
pub fn classify_absolute(price: f64) -> PriceTier {
    if price < 30.0 {
        PriceTier::Bargain
    } else if price < 50.0 {
        PriceTier::Cheap
    } else if price < 70.0 {
        PriceTier::Fair
    } else if price < 100.0 {
        PriceTier::Pricey
    } else {
        PriceTier::Expensive
    }
}

/// Classify by `price / ceiling` with breakpoints 0.30, 0.50, 0.70, 0.85.
///
/// A non-positive ceiling makes every price expensive.
pub fn classify_relative(price: f64, ceiling: f64) -> PriceTier {
    if ceiling.is_nan() || ceiling <= 0.0 {
        return PriceTier::Expensive;
    }
    let ratio = price / ceiling;
    if ratio < 0.30 {
        PriceTier::Bargain
    } else if ratio < 0.50 {
        PriceTier::Cheap
    } else if ratio < 0.70 {
        PriceTier::Fair
    } else if ratio < 0.85 {
        PriceTier::Pricey
    } else {
        PriceTier::Expensive
    }
}

/// Rendering of a calendar cell: a tier, or the neutral no-data look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tier")]
pub enum CellShade {
    NoData,
    Tier(PriceTier),
}

impl CellShade {
    pub fn for_price(price: Option<f64>, ceiling: f64) -> Self {
        match price {
            Some(p) => CellShade::Tier(classify_relative(p, ceiling)),
            None => CellShade::NoData,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            CellShade::NoData => NO_DATA_COLOR,
            CellShade::Tier(tier) => tier.color(),
        }
    }
}
