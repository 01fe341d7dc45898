use serde::Serialize;
use utoipa::ToSchema;

/// Summary statistics over a window of weight measurements.
///
/// The window is whatever the caller selected (for example the trailing
/// three months); `start_weight` is the first entry *of the window*, not of
/// the user's full history.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProgressStats {
    pub current_weight: f64,
    pub start_weight: f64,
    pub lowest_weight: f64,
    pub highest_weight: f64,
    /// Start minus current; negative when weight was gained.
    pub total_weight_loss: f64,
    pub average_weight: f64,
    pub total_entries: usize,
}

impl ProgressStats {
    /// Compute window statistics from weights ordered ascending by entry
    /// date. An empty window has no statistics: `None`, so callers can tell
    /// "no data" apart from "no change".
    pub fn from_weights(weights: &[f64]) -> Option<Self> {
        let (&first, &last) = (weights.first()?, weights.last()?);

        let mut lowest = f64::INFINITY;
        let mut highest = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &weight in weights {
            lowest = lowest.min(weight);
            highest = highest.max(weight);
            sum += weight;
        }

        Some(Self {
            current_weight: last,
            start_weight: first,
            lowest_weight: lowest,
            highest_weight: highest,
            total_weight_loss: first - last,
            average_weight: sum / weights.len() as f64,
            total_entries: weights.len(),
        })
    }
}

/// Progress toward the target weight, relative to a window start.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeightProgress {
    pub current_weight: f64,
    pub start_weight: f64,
    pub target_weight: f64,
    pub weight_lost: f64,
    /// 0..=100; when the start already equals the target there is nothing
    /// to lose and the percentage is defined as 0.
    pub progress_percentage: i64,
    pub remaining_weight: f64,
}

impl WeightProgress {
    pub fn toward_target(start_weight: f64, current_weight: f64, target_weight: f64) -> Self {
        let total_to_lose = (start_weight - target_weight).abs();
        let weight_lost = (start_weight - current_weight).abs();
        let progress_percentage = if total_to_lose > 0.0 {
            (weight_lost / total_to_lose * 100.0).round() as i64
        } else {
            0
        };

        Self {
            current_weight,
            start_weight,
            target_weight,
            weight_lost,
            progress_percentage,
            remaining_weight: (current_weight - target_weight).abs(),
        }
    }
}
