use serde::{Deserialize, Serialize};

/// Whether a bar shows a gain or a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarDirection {
    /// `profit_loss >= 0`
    Gain,
    Loss,
}

impl BarDirection {
    pub fn from_value(value: f64) -> Self {
        if value >= 0.0 {
            BarDirection::Gain
        } else {
            BarDirection::Loss
        }
    }

    /// Hex color used by the bar chart (green for gains, red for losses).
    pub fn color(&self) -> &'static str {
        match self {
            BarDirection::Gain => "#16a34a",
            BarDirection::Loss => "#dc2626",
        }
    }
}

impl std::fmt::Display for BarDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BarDirection::Gain => write!(f, "gain"),
            BarDirection::Loss => write!(f, "loss"),
        }
    }
}

/// A single bar of the per-symbol P&L chart.
///
/// The core computes the numbers; the frontend only renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlBar {
    /// Trading pair (bar label)
    pub symbol: String,

    /// Realized P&L in quote currency (bar height)
    pub value: f64,

    pub direction: BarDirection,
}
