use crate::coords::{Mat4, Vec2, Viewport};

use super::constants::TemporalVsConstants;
use super::mode::JitterPattern;

/// Ping-pong index plus the jitter and render-target ratio of the current and
/// previous frame.
///
/// Slot 0 of each pair is the frame being rendered, slot 1 the frame before.
/// The history pair is only meaningful while a temporal resolve mode is active.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TemporalState {
    buffer_index: usize,
    jitter: [Vec2; 2],
    rt_ratio: [Vec2; 2],
}

impl Default for TemporalState {
    fn default() -> Self {
        Self {
            buffer_index: 0,
            jitter: [Vec2::zero(); 2],
            rt_ratio: [Vec2::splat(1.0); 2],
        }
    }
}

impl TemporalState {
    /// Forgets history: both ratios set to `rt_ratio`, both jitters zeroed.
    pub fn reset(&mut self, rt_ratio: Vec2) {
        self.jitter = [Vec2::zero(); 2];
        self.rt_ratio = [rt_ratio; 2];
    }

    /// Selects the buffer pair written this frame.
    ///
    /// Flips between 0 and 1 for history-based resolves, pinned to 0 otherwise.
    pub fn advance_buffer(&mut self, uses_history: bool) {
        self.buffer_index = if uses_history {
            1 - self.buffer_index
        } else {
            0
        };
    }

    /// Shifts current into previous and computes this frame's jitter.
    ///
    /// `viewport` is the active dynamic viewport the jitter is relative to.
    /// Returns the jitter to apply to the scene projection.
    pub fn update_jitter(
        &mut self,
        pattern: JitterPattern,
        viewport: Viewport,
        rt_ratio: Vec2,
    ) -> Vec2 {
        self.jitter[1] = self.jitter[0];
        self.rt_ratio[1] = self.rt_ratio[0];

        self.jitter[0] = pattern.offset(self.buffer_index, viewport);
        self.rt_ratio[0] = rt_ratio;
        self.jitter[0]
    }

    #[inline]
    pub fn buffer_index(&self) -> usize {
        self.buffer_index
    }

    #[inline]
    pub fn current_jitter(&self) -> Vec2 {
        self.jitter[0]
    }

    #[inline]
    pub fn previous_jitter(&self) -> Vec2 {
        self.jitter[1]
    }

    #[inline]
    pub fn current_rt_ratio(&self) -> Vec2 {
        self.rt_ratio[0]
    }

    #[inline]
    pub fn previous_rt_ratio(&self) -> Vec2 {
        self.rt_ratio[1]
    }
}

/// What the temporal resolve pass samples this frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResolveView {
    /// Buffer pair sampled as the current frame.
    pub current_index: usize,
    /// Buffer pair sampled as history.
    pub previous_index: usize,
    pub jitter_current: Vec2,
    pub jitter_previous: Vec2,
    pub rt_ratio_current: Vec2,
    pub rt_ratio_previous: Vec2,
}

impl ResolveView {
    pub fn vs_constants(&self) -> TemporalVsConstants {
        TemporalVsConstants {
            rt_ratio0: self.rt_ratio_current,
            offset0: self.jitter_current,
            rt_ratio1: self.rt_ratio_previous,
            offset1: self.jitter_previous,
        }
    }
}

/// Derives the resolve inputs from `state`.
///
/// While paused the buffer index is frozen. If it froze on 1, the jittered
/// buffer would be shown as current and faded against an unjittered history,
/// which flickers; so the view keeps buffer 0 as current and swaps the
/// jitter and ratio pairs to match.
pub fn resolve_view(state: &TemporalState, paused: bool) -> ResolveView {
    let straight = ResolveView {
        current_index: state.buffer_index,
        previous_index: 1 - state.buffer_index,
        jitter_current: state.jitter[0],
        jitter_previous: state.jitter[1],
        rt_ratio_current: state.rt_ratio[0],
        rt_ratio_previous: state.rt_ratio[1],
    };

    if !(paused && state.buffer_index == 1) {
        return straight;
    }

    ResolveView {
        current_index: 0,
        previous_index: 1,
        jitter_current: straight.jitter_previous,
        jitter_previous: straight.jitter_current,
        rt_ratio_current: straight.rt_ratio_previous,
        rt_ratio_previous: straight.rt_ratio_current,
    }
}

/// Applies `jitter` to the current and previous view-projection matrices.
///
/// Both matrices get the same clip-space translation of `2 * jitter` (the
/// jitter is in `[0, 1]` texture units, clip space spans 2), so the jitter
/// never shows up as velocity.
pub fn apply_jitter(
    current_view_proj: Mat4,
    previous_view_proj: Mat4,
    jitter: Vec2,
) -> (Mat4, Mat4) {
    let j = Mat4::from_translation_xy(jitter * 2.0);
    (j * current_view_proj, j * previous_view_proj)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport::new(1000.0, 500.0);

    // ── buffer index ──────────────────────────────────────────────────────

    #[test]
    fn history_modes_ping_pong() {
        let mut s = TemporalState::default();
        s.advance_buffer(true);
        assert_eq!(s.buffer_index(), 1);
        s.advance_buffer(true);
        assert_eq!(s.buffer_index(), 0);
    }

    #[test]
    fn other_modes_pin_index_zero() {
        let mut s = TemporalState::default();
        s.advance_buffer(true);
        s.advance_buffer(false);
        assert_eq!(s.buffer_index(), 0);
        s.advance_buffer(false);
        assert_eq!(s.buffer_index(), 0);
    }

    // ── jitter registers ──────────────────────────────────────────────────

    #[test]
    fn update_shifts_current_into_previous() {
        let mut s = TemporalState::default();
        s.advance_buffer(true);
        let j1 = s.update_jitter(JitterPattern::Asymmetric, VP, Vec2::splat(0.8));
        assert_eq!(j1, Vec2::new(0.5 / 1000.0, 0.5 / 500.0));

        s.advance_buffer(true);
        let j0 = s.update_jitter(JitterPattern::Asymmetric, VP, Vec2::splat(0.6));
        assert_eq!(j0, Vec2::zero());
        assert_eq!(s.previous_jitter(), j1);
        assert_eq!(s.current_rt_ratio(), Vec2::splat(0.6));
        assert_eq!(s.previous_rt_ratio(), Vec2::splat(0.8));
    }

    #[test]
    fn symmetric_jitter_alternates_sign() {
        let mut s = TemporalState::default();
        s.advance_buffer(true);
        let a = s.update_jitter(JitterPattern::Symmetric, VP, Vec2::splat(1.0));
        s.advance_buffer(true);
        let b = s.update_jitter(JitterPattern::Symmetric, VP, Vec2::splat(1.0));
        assert_eq!(a, Vec2::new(0.25 / 1000.0, 0.25 / 500.0));
        assert_eq!(b, Vec2::new(-0.25 / 1000.0, -0.25 / 500.0));
    }

    #[test]
    fn reset_clears_history() {
        let mut s = TemporalState::default();
        s.advance_buffer(true);
        s.update_jitter(JitterPattern::Asymmetric, VP, Vec2::splat(0.5));
        s.reset(Vec2::splat(0.7));
        assert_eq!(s.current_jitter(), Vec2::zero());
        assert_eq!(s.previous_jitter(), Vec2::zero());
        assert_eq!(s.current_rt_ratio(), Vec2::splat(0.7));
        assert_eq!(s.previous_rt_ratio(), Vec2::splat(0.7));
    }

    // ── resolve view ──────────────────────────────────────────────────────

    fn state_on_buffer_one() -> TemporalState {
        let mut s = TemporalState::default();
        s.advance_buffer(true);
        s.update_jitter(JitterPattern::Asymmetric, VP, Vec2::splat(0.9));
        s.advance_buffer(true);
        s.update_jitter(JitterPattern::Asymmetric, VP, Vec2::splat(0.7));
        s.advance_buffer(true);
        s.update_jitter(JitterPattern::Asymmetric, VP, Vec2::splat(0.5));
        assert_eq!(s.buffer_index(), 1);
        s
    }

    #[test]
    fn running_view_passes_through() {
        let s = state_on_buffer_one();
        let v = resolve_view(&s, false);
        assert_eq!(v.current_index, 1);
        assert_eq!(v.previous_index, 0);
        assert_eq!(v.jitter_current, s.current_jitter());
        assert_eq!(v.rt_ratio_previous, s.previous_rt_ratio());
    }

    #[test]
    fn paused_on_buffer_one_reads_buffer_zero_swapped() {
        let s = state_on_buffer_one();
        let v = resolve_view(&s, true);
        assert_eq!(v.current_index, 0);
        assert_eq!(v.previous_index, 1);
        assert_eq!(v.jitter_current, s.previous_jitter());
        assert_eq!(v.jitter_previous, s.current_jitter());
        assert_eq!(v.rt_ratio_current, Vec2::splat(0.7));
        assert_eq!(v.rt_ratio_previous, Vec2::splat(0.5));
        // the stored registers are untouched
        assert_eq!(s.current_rt_ratio(), Vec2::splat(0.5));
    }

    #[test]
    fn paused_on_buffer_zero_passes_through() {
        let mut s = TemporalState::default();
        s.update_jitter(JitterPattern::Asymmetric, VP, Vec2::splat(0.5));
        assert_eq!(resolve_view(&s, true), resolve_view(&s, false));
    }

    #[test]
    fn vs_constants_follow_view_order() {
        let s = state_on_buffer_one();
        let c = resolve_view(&s, true).vs_constants();
        assert_eq!(c.rt_ratio0, Vec2::splat(0.7));
        assert_eq!(c.offset0, Vec2::zero());
        assert_eq!(c.rt_ratio1, Vec2::splat(0.5));
        assert_eq!(c.offset1, Vec2::new(0.5 / 1000.0, 0.5 / 500.0));
    }

    // ── projection jitter ─────────────────────────────────────────────────

    #[test]
    fn jitter_translates_both_matrices_identically() {
        let scale = Mat4::from_cols([
            [2.0, 0.0, 0.0, 0.0],
            [0.0, 3.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let jitter = Vec2::new(0.25, -0.5);
        let (cur, prev) = apply_jitter(scale, Mat4::IDENTITY, jitter);

        let p = [1.0, 1.0, 0.0, 1.0];
        assert_eq!(cur.transform(p), [2.5, 2.0, 0.0, 1.0]);
        assert_eq!(prev.transform(p), [1.5, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn zero_jitter_is_identity() {
        let (cur, prev) = apply_jitter(Mat4::IDENTITY, Mat4::IDENTITY, Vec2::zero());
        assert_eq!(cur, Mat4::IDENTITY);
        assert_eq!(prev, Mat4::IDENTITY);
    }
}
