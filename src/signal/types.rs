//! Signal types

use crate::candles::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
            Direction::Hold => "hold",
        })
    }
}

/// Confidence score, clamped to `0..=100`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Confidence(u8);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0);
    pub const MAX: Confidence = Confidence(100);

    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Round and clamp a floating point score
    pub fn from_score(score: f64) -> Self {
        if !score.is_finite() || score <= 0.0 {
            return Self::ZERO;
        }
        Self(score.round().min(100.0) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Outcome of one strategy run, before it is tied to an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analysis {
    pub direction: Direction,
    pub confidence: Confidence,
}

impl Analysis {
    pub fn new(direction: Direction, confidence: Confidence) -> Self {
        Self {
            direction,
            confidence,
        }
    }

    /// The neutral `{hold, 0}` outcome
    pub fn hold() -> Self {
        Self::new(Direction::Hold, Confidence::ZERO)
    }

    /// Downgrade to hold when below `min_confidence`
    pub fn gate(self, min_confidence: Confidence) -> Self {
        if self.direction == Direction::Hold || self.confidence < min_confidence {
            Self::hold()
        } else {
            self
        }
    }
}

/// A trading signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Unique signal identifier
    pub id: Uuid,
    pub asset: String,
    pub timeframe: Option<Timeframe>,
    pub direction: Direction,
    pub confidence: Confidence,
    pub generated_at: DateTime<Utc>,
    /// Name of the strategy that produced it, empty when none ran
    pub source_strategy: String,
}

impl Signal {
    pub fn new(
        asset: impl Into<String>,
        timeframe: Option<Timeframe>,
        analysis: Analysis,
        source_strategy: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset: asset.into(),
            timeframe,
            direction: analysis.direction,
            confidence: analysis.confidence,
            generated_at: Utc::now(),
            source_strategy: source_strategy.into(),
        }
    }

    /// Whether the signal should be kept and forwarded
    pub fn is_actionable(&self) -> bool {
        self.direction != Direction::Hold && self.confidence > Confidence::ZERO
    }
}
