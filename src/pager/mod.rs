//! The pager controller: wires pointer events to gesture tracking, resolves
//! releases into a settled panel, and drives the offset and height springs.

mod frame;

pub use frame::{AdvanceResult, Frame};

use crate::animation::{SpringConfig, SpringState};
use crate::gesture::{settle, DragSession};

/// Default quick-flick cutoff for the smoothed release delta, in pixels per
/// sample
const DEFAULT_FLICK_THRESHOLD: f32 = 5.0;

/// Convergence epsilon for deciding a spring channel is done moving
const SETTLE_EPSILON: f32 = 1e-3;

/// Normalized pointer input consumed by [`Pager::handle_event`].
///
/// Coordinates are in pixels, in whatever space the host dispatches from;
/// the pager only ever looks at differences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer made contact
    Down { x: f32, y: f32 },
    /// Pointer moved while down
    Move { x: f32, y: f32 },
    /// Pointer released
    Up,
    /// Gesture cancelled by the platform (focus loss, palm rejection, ...)
    Cancel,
}

/// Whether the pager consumed an event, or the host should let native
/// handling (vertical scrolling, most importantly) proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Handled,
}

/// Callback invoked with the new panel index after a swipe settles on a
/// different panel than it started on
pub type ChangeCallback = Box<dyn FnMut(usize)>;

/// Pull-based probe asking the host for the rendered pixel height of a
/// panel; `None` while unmeasured
pub type HeightProbe = Box<dyn FnMut(usize) -> Option<f32>>;

/// A swipeable paged view controller.
///
/// The pager owns the authoritative index state, consumes normalized
/// pointer events, and emits one [`Frame`] per display tick for the host's
/// renderer to apply. It never touches a layout tree itself: the host
/// reports the viewport width and answers height probes, the pager answers
/// with numbers.
///
/// ```
/// use sfoglia::pager::{Pager, PointerEvent};
///
/// let mut pager = Pager::new(3).viewport_width(360.0);
/// pager.handle_event(&PointerEvent::Down { x: 300.0, y: 10.0 });
/// pager.handle_event(&PointerEvent::Move { x: 270.0, y: 10.0 });
/// pager.handle_event(&PointerEvent::Up);
/// ```
pub struct Pager {
    child_count: usize,
    threshold: f32,
    disabled: bool,
    viewport_width: f32,
    /// Fractional position; drives the offset spring while dragging
    current_index: f32,
    /// Last settled panel; drives both springs while idle
    target_index: usize,
    dragging: bool,
    session: Option<DragSession>,
    /// External override received mid-drag, applied when the session ends
    pending_index: Option<usize>,
    offset_spring: SpringState,
    height_spring: SpringState,
    /// Height target from the last tick's probe, kept for `is_animating`
    height_target: f32,
    on_change_index: Option<ChangeCallback>,
    measure_height: Option<HeightProbe>,
    last_frame: Option<Frame>,
}

impl Pager {
    /// Create a pager over `child_count` ordered panels, showing the first
    pub fn new(child_count: usize) -> Self {
        Self {
            child_count,
            threshold: DEFAULT_FLICK_THRESHOLD,
            disabled: false,
            viewport_width: 0.0,
            current_index: 0.0,
            target_index: 0,
            dragging: false,
            session: None,
            pending_index: None,
            offset_spring: SpringState::new(0.0),
            height_spring: SpringState::new(0.0),
            height_target: 0.0,
            on_change_index: None,
            measure_height: None,
            last_frame: None,
        }
    }

    /// Start on `index` instead of the first panel (clamped to range)
    pub fn initial_index(mut self, index: usize) -> Self {
        let index = self.clamp_index(index);
        self.target_index = index;
        self.current_index = index as f32;
        self.offset_spring = SpringState::new(index as f32);
        self
    }

    /// Set the quick-flick cutoff. A release whose smoothed delta exceeds
    /// this commits in the direction of travel regardless of position.
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Suppress gesture handling entirely
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Report the pager's laid-out width in pixels. Sampled once per drag,
    /// at pointer-down.
    pub fn viewport_width(mut self, width: f32) -> Self {
        self.viewport_width = width;
        self
    }

    /// Set the callback invoked when a swipe settles on a new panel.
    /// Fires exactly once per completed drag, never for scroll-classified
    /// or aborted sessions, and never for external overrides.
    pub fn on_change_index<F: FnMut(usize) + 'static>(mut self, callback: F) -> Self {
        self.on_change_index = Some(Box::new(callback));
        self
    }

    /// Set the probe the pager uses to ask for a panel's rendered height.
    /// An absent probe (or a `None` answer) targets height 0 until a
    /// measurement appears.
    pub fn measure_height<F: FnMut(usize) -> Option<f32> + 'static>(mut self, probe: F) -> Self {
        self.measure_height = Some(Box::new(probe));
        self
    }

    /// Update the laid-out width; the host calls this from layout
    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    /// External index override. Applied immediately while idle; while a
    /// session is live it is deferred to the end of the session, so it
    /// cannot fight the user's finger.
    pub fn set_index(&mut self, index: usize) {
        let index = self.clamp_index(index);
        if self.session.is_some() {
            self.pending_index = Some(index);
        } else {
            self.apply_index(index);
        }
    }

    /// Enable or disable gesture handling. Disabling mid-drag cancels the
    /// live session.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled && self.session.is_some() {
            self.cancel_session();
        }
    }

    /// Rebuild against a different panel count, re-clamping indices
    pub fn set_child_count(&mut self, child_count: usize) {
        self.child_count = child_count;
        self.target_index = self.clamp_index(self.target_index);
        self.current_index = self.current_index.clamp(0.0, self.max_index());
    }

    /// Feed one pointer event. [`EventResponse::Ignored`] means the pager
    /// wants nothing from this gesture and native handling should proceed
    /// uninhibited.
    pub fn handle_event(&mut self, event: &PointerEvent) -> EventResponse {
        match *event {
            PointerEvent::Down { x, y } => self.pointer_down(x, y),
            PointerEvent::Move { x, y } => self.pointer_move(x, y),
            PointerEvent::Up => self.pointer_up(),
            PointerEvent::Cancel => self.pointer_cancel(),
        }
    }

    /// Advance the springs by `dt_secs` and produce this frame's visual
    /// sample. The host's frame scheduler calls this once per display
    /// frame; nothing else mutates the springs.
    pub fn tick(&mut self, dt_secs: f32) -> AdvanceResult<Frame> {
        let (config, offset_target) = if self.dragging {
            (SpringConfig::DRAGGING, self.current_index)
        } else {
            (SpringConfig::IDLE, self.target_index as f32)
        };
        self.height_target = self.probe_height();
        let height_target = self.height_target;

        self.offset_spring.step(offset_target, &config, dt_secs);
        self.height_spring.step(height_target, &config, dt_secs);

        // Pin converged channels so the output goes exactly quiet
        if self.offset_spring.is_settled(offset_target, SETTLE_EPSILON) {
            self.offset_spring.snap_to(offset_target);
        }
        if self.height_spring.is_settled(height_target, SETTLE_EPSILON) {
            self.height_spring.snap_to(height_target);
        }

        let frame = Frame {
            offset_percent: self.offset_spring.value * 100.0,
            height: self.height_spring.value,
        };

        if self.last_frame == Some(frame) {
            AdvanceResult::NoChange
        } else {
            self.last_frame = Some(frame);
            AdvanceResult::Changed(frame)
        }
    }

    /// True while another tick would visibly move something
    pub fn is_animating(&self) -> bool {
        let offset_target = if self.dragging {
            self.current_index
        } else {
            self.target_index as f32
        };
        self.dragging
            || !self.offset_spring.is_settled(offset_target, SETTLE_EPSILON)
            || !self.height_spring.is_settled(self.height_target, SETTLE_EPSILON)
    }

    /// Panel the view is settled on or settling toward
    pub fn index(&self) -> usize {
        self.target_index
    }

    /// Fractional position, live during a drag
    pub fn fractional_index(&self) -> f32 {
        self.current_index
    }

    /// True between the first horizontal move sample and release
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn child_count(&self) -> usize {
        self.child_count
    }

    fn pointer_down(&mut self, x: f32, y: f32) -> EventResponse {
        if self.disabled || self.child_count == 0 {
            return EventResponse::Ignored;
        }

        self.session = Some(DragSession::begin(
            x,
            y,
            self.viewport_width,
            self.current_index,
        ));
        EventResponse::Handled
    }

    fn pointer_move(&mut self, x: f32, y: f32) -> EventResponse {
        let max_index = self.max_index();
        let Some(session) = self.session.as_mut() else {
            return EventResponse::Ignored;
        };

        match session.track(x, y, max_index) {
            Some(index) => {
                self.dragging = true;
                self.current_index = index;
                EventResponse::Handled
            }
            // Vertical scroll: keep our hands off so the platform scrolls
            None => EventResponse::Ignored,
        }
    }

    fn pointer_up(&mut self) -> EventResponse {
        let Some(session) = self.session.take() else {
            return EventResponse::Ignored;
        };
        self.dragging = false;

        let response = match session.finish() {
            Some(summary) => {
                let settled = settle(&summary, self.threshold);
                let settled_index = settled.max(0.0) as usize;
                log::debug!("drag settled: {} -> {}", summary.start_index, settled_index);

                self.target_index = settled_index;
                self.current_index = settled;

                if settled != summary.start_index.round() {
                    if let Some(callback) = self.on_change_index.as_mut() {
                        callback(settled_index);
                    }
                }
                EventResponse::Handled
            }
            None => EventResponse::Ignored,
        };

        self.flush_pending_index();
        response
    }

    fn pointer_cancel(&mut self) -> EventResponse {
        if self.session.is_none() {
            return EventResponse::Ignored;
        }
        self.cancel_session();
        EventResponse::Handled
    }

    /// Discard the live session with no resolution and no notification
    fn cancel_session(&mut self) {
        self.session = None;
        self.dragging = false;
        self.current_index = self.target_index as f32;
        self.flush_pending_index();
    }

    fn flush_pending_index(&mut self) {
        if let Some(index) = self.pending_index.take() {
            log::debug!("applying deferred index override: {}", index);
            self.apply_index(index);
        }
    }

    fn apply_index(&mut self, index: usize) {
        self.target_index = index;
        self.current_index = index as f32;
    }

    fn probe_height(&mut self) -> f32 {
        match self.measure_height.as_mut() {
            Some(probe) => probe(self.target_index).unwrap_or(0.0),
            None => 0.0,
        }
    }

    fn max_index(&self) -> f32 {
        self.child_count.saturating_sub(1) as f32
    }

    fn clamp_index(&self, index: usize) -> usize {
        index.min(self.child_count.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// A pager over three 100 px panels with a shared change log
    fn pager_with_log() -> (Pager, Rc<RefCell<Vec<usize>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let pager = Pager::new(3)
            .viewport_width(100.0)
            .on_change_index(move |index| sink.borrow_mut().push(index));
        (pager, log)
    }

    fn down(pager: &mut Pager, x: f32) -> EventResponse {
        pager.handle_event(&PointerEvent::Down { x, y: 0.0 })
    }

    fn move_to(pager: &mut Pager, x: f32) -> EventResponse {
        pager.handle_event(&PointerEvent::Move { x, y: 0.0 })
    }

    fn up(pager: &mut Pager) -> EventResponse {
        pager.handle_event(&PointerEvent::Up)
    }

    /// Run the springs until everything is quiet
    fn run_until_settled(pager: &mut Pager) {
        for _ in 0..600 {
            pager.tick(1.0 / 60.0);
            if !pager.is_animating() {
                return;
            }
        }
        panic!("pager never settled");
    }

    #[test]
    fn test_quick_flick_advances_and_notifies_once() {
        let (mut pager, log) = pager_with_log();

        down(&mut pager, 200.0);
        move_to(&mut pager, 190.0); // smoothed -5
        move_to(&mut pager, 175.0); // smoothed -10: a flick
        assert!(pager.is_dragging());
        assert_eq!(up(&mut pager), EventResponse::Handled);

        assert_eq!(pager.index(), 1);
        assert!(!pager.is_dragging());
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn test_slow_long_drag_commits_by_distance() {
        let (mut pager, log) = pager_with_log();

        down(&mut pager, 200.0);
        // 4 px samples keep the smoothed delta at -4, under the cutoff;
        // total travel is 68 px, past the commit distance
        let mut x = 196.0;
        while x >= 132.0 {
            move_to(&mut pager, x);
            x -= 4.0;
        }
        up(&mut pager);

        assert_eq!(pager.index(), 1);
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn test_slow_short_drag_aborts_silently() {
        let (mut pager, log) = pager_with_log();

        down(&mut pager, 200.0);
        for x in [198.0, 196.0, 192.0, 188.0, 184.0, 180.0, 176.0, 172.0] {
            move_to(&mut pager, x);
        }
        up(&mut pager);

        assert_eq!(pager.index(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_vertical_scroll_is_left_alone() {
        let (mut pager, log) = pager_with_log();

        down(&mut pager, 200.0);
        // First sample is mostly vertical: the whole session belongs to
        // native scrolling
        assert_eq!(
            pager.handle_event(&PointerEvent::Move { x: 198.0, y: 40.0 }),
            EventResponse::Ignored
        );
        assert_eq!(
            pager.handle_event(&PointerEvent::Move { x: 120.0, y: 45.0 }),
            EventResponse::Ignored
        );
        assert!(!pager.is_dragging());
        assert_eq!(up(&mut pager), EventResponse::Ignored);

        assert_eq!(pager.index(), 0);
        assert_eq!(pager.fractional_index(), 0.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_boundary_drag_clamps_and_stays_silent() {
        let (mut pager, log) = pager_with_log();

        // Rightward drag on the first panel: nowhere to go
        down(&mut pager, 100.0);
        move_to(&mut pager, 130.0);
        move_to(&mut pager, 180.0);
        assert_eq!(pager.fractional_index(), 0.0);
        up(&mut pager);

        assert_eq!(pager.index(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_flick_past_last_panel_clamps() {
        let (mut pager, log) = pager_with_log();
        pager.set_index(2);

        down(&mut pager, 200.0);
        move_to(&mut pager, 185.0);
        move_to(&mut pager, 165.0);
        up(&mut pager);

        assert_eq!(pager.index(), 2);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_indices_stay_in_range_across_sessions() {
        let (mut pager, _log) = pager_with_log();

        for step in 0..20 {
            let start = 200.0 + (step % 5) as f32 * 17.0;
            down(&mut pager, start);
            move_to(&mut pager, start - 30.0 * ((step % 3) as f32 - 1.0));
            move_to(&mut pager, start + 90.0 * ((step % 7) as f32 - 3.0));
            up(&mut pager);

            assert!(pager.index() < 3);
            assert!(pager.fractional_index() >= 0.0);
            assert!(pager.fractional_index() <= 2.0);
        }
    }

    #[test]
    fn test_cancel_discards_session_without_notifying() {
        let (mut pager, log) = pager_with_log();

        down(&mut pager, 200.0);
        move_to(&mut pager, 150.0);
        assert!(pager.is_dragging());
        assert_eq!(
            pager.handle_event(&PointerEvent::Cancel),
            EventResponse::Handled
        );

        assert!(!pager.is_dragging());
        assert_eq!(pager.index(), 0);
        assert_eq!(pager.fractional_index(), 0.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_override_applies_immediately_while_idle() {
        let (mut pager, log) = pager_with_log();

        pager.set_index(2);
        assert_eq!(pager.index(), 2);
        assert_eq!(pager.fractional_index(), 2.0);
        // Overrides are not swipes: no notification
        assert!(log.borrow().is_empty());

        // Out-of-range overrides clamp, never surface
        pager.set_index(9);
        assert_eq!(pager.index(), 2);
    }

    #[test]
    fn test_override_is_deferred_while_dragging() {
        let (mut pager, _log) = pager_with_log();

        down(&mut pager, 200.0);
        move_to(&mut pager, 170.0);
        pager.set_index(2);
        // The finger still owns the view
        assert_eq!(pager.index(), 0);

        up(&mut pager);
        assert_eq!(pager.index(), 2);
    }

    #[test]
    fn test_disable_mid_drag_cancels_session() {
        let (mut pager, log) = pager_with_log();

        down(&mut pager, 200.0);
        move_to(&mut pager, 150.0);
        pager.set_disabled(true);

        assert!(!pager.is_dragging());
        assert_eq!(pager.fractional_index(), 0.0);
        assert_eq!(move_to(&mut pager, 100.0), EventResponse::Ignored);
        assert_eq!(down(&mut pager, 100.0), EventResponse::Ignored);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_empty_pager_is_inert() {
        let mut pager = Pager::new(0);
        assert_eq!(down(&mut pager, 100.0), EventResponse::Ignored);
        assert_eq!(pager.index(), 0);

        let frame = match pager.tick(1.0 / 60.0) {
            AdvanceResult::Changed(frame) => frame,
            AdvanceResult::NoChange => panic!("first tick always reports a frame"),
        };
        assert_eq!(frame.offset_percent, 0.0);
        assert_eq!(frame.height, 0.0);
    }

    #[test]
    fn test_springs_settle_on_target_then_go_quiet() {
        let (mut pager, _log) = pager_with_log();

        down(&mut pager, 200.0);
        move_to(&mut pager, 190.0);
        move_to(&mut pager, 175.0);
        up(&mut pager);
        run_until_settled(&mut pager);

        let frame = match pager.tick(1.0 / 60.0) {
            AdvanceResult::Changed(frame) => frame,
            AdvanceResult::NoChange => {
                // Already pinned on a previous tick; read the pinned values
                Frame {
                    offset_percent: pager.offset_spring.value * 100.0,
                    height: pager.height_spring.value,
                }
            }
        };
        assert_eq!(frame.offset_percent, 100.0);

        // Once pinned, further ticks report no change
        assert_eq!(pager.tick(1.0 / 60.0), AdvanceResult::NoChange);
        assert_eq!(pager.tick(1.0 / 60.0), AdvanceResult::NoChange);
    }

    #[test]
    fn test_height_follows_probe_for_target_panel() {
        let mut pager = Pager::new(3)
            .viewport_width(100.0)
            .measure_height(|index| if index == 1 { Some(240.0) } else { Some(80.0) });

        run_until_settled(&mut pager);
        assert_eq!(pager.height_spring.value, 80.0);

        pager.set_index(1);
        run_until_settled(&mut pager);
        assert_eq!(pager.height_spring.value, 240.0);
    }

    #[test]
    fn test_missing_height_measurement_targets_zero() {
        let mut pager = Pager::new(2)
            .viewport_width(100.0)
            .measure_height(|_| None);

        run_until_settled(&mut pager);
        assert_eq!(pager.height_spring.value, 0.0);
    }

    #[test]
    fn test_initial_index_builder_clamps_and_rests() {
        let pager = Pager::new(3).initial_index(7);
        assert_eq!(pager.index(), 2);
        assert_eq!(pager.fractional_index(), 2.0);
        assert_eq!(pager.offset_spring.value, 2.0);
    }

    #[test]
    fn test_shrinking_child_count_reclamps() {
        let (mut pager, _log) = pager_with_log();
        pager.set_index(2);
        pager.set_child_count(2);

        assert_eq!(pager.index(), 1);
        assert!(pager.fractional_index() <= 1.0);
    }
}
