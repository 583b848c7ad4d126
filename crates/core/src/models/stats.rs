//! Per-team statistics derived from a throw log

use serde::{Deserialize, Serialize};

use super::{TeamId, Throw};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub total_throws: u32,
    pub total_darts: u32,
    pub total_points: u32,
    /// Points per throw, rounded half-up to two decimals
    pub average: f64,
}

impl TeamStats {
    /// Fold the throws credited to `team_id`. Always recomputed from the log.
    pub fn compute(throws: &[Throw], team_id: TeamId) -> Self {
        let (total_throws, total_darts, total_points) = throws
            .iter()
            .filter(|t| t.team_id == team_id)
            .fold((0u32, 0u32, 0u32), |(n, darts, points), t| {
                (n + 1, darts + u32::from(t.darts_used), points + t.points)
            });

        if total_throws == 0 {
            return Self::default();
        }

        Self {
            total_throws,
            total_darts,
            total_points,
            average: round_average(total_points, total_throws),
        }
    }
}

/// `points / throws` rounded half-up at the second decimal, computed in
/// integer hundredths so ties are exact.
fn round_average(points: u32, throws: u32) -> f64 {
    let points = u64::from(points);
    let throws = u64::from(throws);
    let hundredths = (points * 200 + throws) / (throws * 2);
    hundredths as f64 / 100.0
}
