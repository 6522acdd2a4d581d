//! Per-drag gesture tracking: axis classification, delta smoothing and
//! fractional-index computation.

/// Exponential smoothing factor applied to per-sample horizontal deltas.
/// Halves the weight of history each sample, which damps pointer jitter
/// without lagging a real flick.
const DELTA_SMOOTHING: f32 = 0.5;

/// Direction lock for a drag, decided once on the first move sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisLock {
    /// No move sample seen yet
    Undecided,
    /// Mostly-horizontal motion; the session drives the pager
    Horizontal,
    /// Mostly-vertical motion; the session belongs to native scrolling
    Vertical,
}

/// Bookkeeping for one pointer-down → pointer-up drag.
///
/// Created on pointer-down and consumed on release; nothing about a drag
/// outlives the session that owns it.
#[derive(Debug)]
pub struct DragSession {
    /// Pager width in pixels, sampled once when the session opens
    viewport_width: f32,
    /// Fractional index when the drag began; the reference for hysteresis
    /// and the change notification
    start_index: f32,
    /// Index the displacement formula measures from. Starts equal to
    /// `start_index` and is rebased onto the boundary whenever a sample
    /// clamps, so motion past the edge accumulates no rubber-band debt.
    anchor_index: f32,
    /// X the displacement formula measures from; rebased with `anchor_index`
    anchor_x: f32,
    start_y: f32,
    last_x: f32,
    /// Current clamped fractional index
    index: f32,
    /// Exponentially smoothed horizontal delta (positive = finger moving
    /// right)
    smoothed_delta: f32,
    axis: AxisLock,
}

/// What a finished horizontal drag hands to snap resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSummary {
    /// Fractional index when the drag began
    pub start_index: f32,
    /// Clamped fractional index at release
    pub end_index: f32,
    /// Smoothed horizontal delta at release
    pub smoothed_delta: f32,
}

impl DragSession {
    /// Open a session at pointer position (`x`, `y`).
    pub fn begin(x: f32, y: f32, viewport_width: f32, start_index: f32) -> Self {
        Self {
            viewport_width,
            start_index,
            anchor_index: start_index,
            anchor_x: x,
            start_y: y,
            last_x: x,
            index: start_index,
            smoothed_delta: 0.0,
            axis: AxisLock::Undecided,
        }
    }

    /// Feed one move sample. Returns the new fractional index, clamped to
    /// `[0, max_index]`, or `None` when the session is classified as a
    /// vertical scroll and the pager must leave it alone.
    pub fn track(&mut self, x: f32, y: f32, max_index: f32) -> Option<f32> {
        // One-time test; `anchor_x` is still the down position here because
        // rebasing only happens on later samples
        if self.axis == AxisLock::Undecided {
            self.axis = if (self.start_y - y).abs() > (self.anchor_x - x).abs() {
                AxisLock::Vertical
            } else {
                AxisLock::Horizontal
            };
            log::trace!("drag classified as {:?}", self.axis);
        }

        if self.axis == AxisLock::Vertical {
            return None;
        }

        self.smoothed_delta =
            self.smoothed_delta * DELTA_SMOOTHING + (x - self.last_x) * (1.0 - DELTA_SMOOTHING);
        self.last_x = x;

        // An unmeasured viewport contributes no displacement rather than a
        // division by zero
        let mut index = if self.viewport_width > 0.0 {
            self.anchor_index + (self.anchor_x - x) / self.viewport_width
        } else {
            self.anchor_index
        };

        if index < 0.0 {
            index = 0.0;
            self.anchor_x = x;
            self.anchor_index = 0.0;
        } else if index > max_index {
            index = max_index;
            self.anchor_x = x;
            self.anchor_index = max_index;
        }

        self.index = index;
        Some(index)
    }

    /// Close the session. Vertical scrolls yield `None`; everything else
    /// hands its summary to snap resolution. A tap (no move sample) ends
    /// where it began and resolves back to its start.
    pub fn finish(self) -> Option<DragSummary> {
        if self.axis == AxisLock::Vertical {
            return None;
        }

        Some(DragSummary {
            start_index: self.start_index,
            end_index: self.index,
            smoothed_delta: self.smoothed_delta,
        })
    }
}
