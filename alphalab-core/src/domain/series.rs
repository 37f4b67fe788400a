//! PriceSeries — an ordered, immutable sequence of bars.

use crate::domain::Bar;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Ordered bar sequence with strictly increasing timestamps.
///
/// Constructed once by the data collaborator and borrowed read-only by the
/// engine. An empty series is valid: it flows through the whole pipeline as
/// empty signals, an empty equity curve, and zeroed statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps.
    pub fn new(bars: Vec<Bar>) -> Result<Self, CoreError> {
        if bars.windows(2).any(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(CoreError::UnorderedTimestamps);
        }
        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Extract the close column.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
