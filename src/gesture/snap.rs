//! Release resolution: turns a finished drag into the discrete panel index
//! the view settles on.

use super::tracker::DragSummary;

/// Minimum travel, in panel widths, for a slow drag to commit to the
/// neighboring panel instead of springing back
const COMMIT_DISTANCE: f32 = 0.6;

/// Resolve the panel a finished drag settles on.
///
/// A release with residual speed above `flick_threshold` commits in the
/// direction of travel regardless of position: a positive smoothed delta
/// (finger moving right, content headed to the previous panel) floors the
/// fractional index, a negative one ceils it. Slow releases fall back to
/// distance: travel past [`COMMIT_DISTANCE`] rounds to the nearest panel,
/// anything shorter is an aborted gesture and returns to its start.
///
/// The result is integer-valued and in range, because `end_index` was
/// clamped while tracking.
pub fn settle(summary: &DragSummary, flick_threshold: f32) -> f32 {
    if summary.smoothed_delta.abs() > flick_threshold {
        if summary.smoothed_delta > 0.0 {
            summary.end_index.floor()
        } else {
            summary.end_index.ceil()
        }
    } else if (summary.start_index - summary.end_index).abs() > COMMIT_DISTANCE {
        summary.end_index.round()
    } else {
        // Aborted: too slow and too short. Targets are integers even when
        // the drag began mid-animation on a fractional index.
        summary.start_index.round()
    }
}
