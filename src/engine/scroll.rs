//! Scroll animation state machine
//!
//! `Idle -> Spinning -> Snapping -> Idle`. The spin advances a pixel offset by a
//! constant amount each tick. Stopping computes an offset that centers the
//! pre-chosen row and hands back a `SnapPlan` for the eased transition. The
//! session token returned on start must be presented to `finish`, so a
//! completion from a session destroyed by a list rebuild is ignored.

use super::tiles::visible_rows;
use crate::config::ScrollConfig;
use crate::consts::{SNAP_EASING, TILE_COUNT};
use crate::error::ValidationError;

/// Identifies one spin session
pub type SessionToken = u64;

/// Animator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPhase {
    #[default]
    Idle,
    /// Constant-speed spin driven by ticks
    Spinning,
    /// Eased transition to the winning row
    Snapping,
}

/// Result of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session began
    Spinning(SessionToken),
    /// Only one item: select it without a session
    Immediate,
    /// A session is already running; nothing changed
    AlreadyActive,
}

/// Target of the decelerating snap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapPlan {
    pub token: SessionToken,
    pub winning_index: usize,
    pub from_offset: f32,
    pub target_offset: f32,
    pub duration_ms: u32,
    /// CSS timing function for the transition
    pub easing: &'static str,
}

#[derive(Debug, Clone)]
struct ScrollSession {
    token: SessionToken,
    item_count: usize,
    tiled_item_count: usize,
    snap: Option<SnapPlan>,
}

/// Per-list animation driver
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    config: ScrollConfig,
    phase: ScrollPhase,
    session: Option<ScrollSession>,
    /// Last applied offset (pixels, translated upward)
    offset: f32,
    next_token: SessionToken,
}

impl ScrollAnimator {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            phase: ScrollPhase::Idle,
            session: None,
            offset: 0.0,
            next_token: 1,
        }
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn token(&self) -> Option<SessionToken> {
        self.session.as_ref().map(|s| s.token)
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Offset at which the spin wraps back
    fn wrap_length(&self, tiled_item_count: usize) -> f32 {
        tiled_item_count as f32 * self.config.row_height * self.config.spin_loop_multiplier
    }

    /// Begin a spin over `item_count` items
    pub fn start(&mut self, item_count: usize) -> Result<StartOutcome, ValidationError> {
        if self.is_active() {
            return Ok(StartOutcome::AlreadyActive);
        }
        match item_count {
            0 => Err(ValidationError::NothingToSelect),
            1 => Ok(StartOutcome::Immediate),
            _ => {
                let token = self.next_token;
                self.next_token += 1;

                let tiled_item_count = item_count * TILE_COUNT;
                let wrap = self.wrap_length(tiled_item_count);
                if wrap > 0.0 {
                    self.offset %= wrap;
                }

                self.session = Some(ScrollSession {
                    token,
                    item_count,
                    tiled_item_count,
                    snap: None,
                });
                self.phase = ScrollPhase::Spinning;
                Ok(StartOutcome::Spinning(token))
            }
        }
    }

    /// Advance the spin by one tick, returning the new offset
    pub fn tick(&mut self) -> Option<f32> {
        if self.phase != ScrollPhase::Spinning {
            return None;
        }
        let tiled = self.session.as_ref()?.tiled_item_count;
        let wrap = self.wrap_length(tiled);
        self.offset += self.config.spin_speed;
        if wrap > 0.0 && self.offset >= wrap {
            self.offset %= wrap;
        }
        Some(self.offset)
    }

    /// Leave the spin and snap to `winning_index`
    ///
    /// `extra_loops` is clamped to `1..=max_extra_loops`. Returns `None` when no
    /// spin is running.
    pub fn stop(&mut self, winning_index: usize, extra_loops: usize) -> Option<SnapPlan> {
        if self.phase != ScrollPhase::Spinning {
            return None;
        }
        let session = self.session.as_mut()?;
        let extra_loops = extra_loops.clamp(1, self.config.max_extra_loops.max(1));
        let winning_index = winning_index.min(session.item_count - 1);

        let plan = SnapPlan {
            token: session.token,
            winning_index,
            from_offset: self.offset,
            target_offset: target_offset(winning_index, session.item_count, extra_loops, &self.config),
            duration_ms: self.config.snap_duration_ms,
            easing: SNAP_EASING,
        };
        session.snap = Some(plan);
        self.phase = ScrollPhase::Snapping;
        self.offset = plan.target_offset;
        Some(plan)
    }

    /// Eased offset `elapsed_ms` into the snap
    pub fn snap_offset_at(&self, elapsed_ms: f32) -> Option<f32> {
        let plan = self.session.as_ref()?.snap?;
        let t = if plan.duration_ms == 0 {
            1.0
        } else {
            elapsed_ms / plan.duration_ms as f32
        };
        Some(plan.from_offset + (plan.target_offset - plan.from_offset) * ease_out_cubic(t))
    }

    /// Complete the snap. Returns the winning index if `token` is the live session.
    pub fn finish(&mut self, token: SessionToken) -> Option<usize> {
        if self.phase != ScrollPhase::Snapping {
            return None;
        }
        let session = self.session.as_ref()?;
        if session.token != token {
            log::debug!("Ignoring stale snap completion (token {})", token);
            return None;
        }
        let winning = session.snap.map(|p| p.winning_index);
        self.session = None;
        self.phase = ScrollPhase::Idle;
        winning
    }

    /// Drop any session. Returns true if one was running.
    pub fn abort(&mut self) -> bool {
        let was_active = self.session.take().is_some();
        self.phase = ScrollPhase::Idle;
        was_active
    }

    /// Forget the offset (list rebuilt)
    pub fn reset(&mut self) {
        self.abort();
        self.offset = 0.0;
    }
}

/// Offset that centers `winning_index` in the viewport, `tile_depth + extra_loops`
/// tile copies into the list
pub fn target_offset(
    winning_index: usize,
    item_count: usize,
    extra_loops: usize,
    config: &ScrollConfig,
) -> f32 {
    let center_offset = (visible_rows(item_count) / 2) as f32 * config.row_height;
    let row = winning_index + (config.tile_depth + extra_loops) * item_count;
    row as f32 * config.row_height - center_offset
}

/// Decelerating ease for `t` in [0, 1]
#[inline]
fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn animator() -> ScrollAnimator {
        ScrollAnimator::new(ScrollConfig::default())
    }

    #[test]
    fn test_start_rejects_empty() {
        let mut a = animator();
        assert_eq!(a.start(0), Err(ValidationError::NothingToSelect));
        assert_eq!(a.phase(), ScrollPhase::Idle);
        assert!(!a.is_active());
    }

    #[test]
    fn test_single_item_is_immediate() {
        let mut a = animator();
        assert_eq!(a.start(1), Ok(StartOutcome::Immediate));
        assert!(!a.is_active());
        assert_eq!(a.tick(), None);
    }

    #[test]
    fn test_start_while_active_is_noop() {
        let mut a = animator();
        let first = a.start(4).unwrap();
        assert!(matches!(first, StartOutcome::Spinning(_)));
        assert_eq!(a.start(4), Ok(StartOutcome::AlreadyActive));
        assert_eq!(a.token(), match first {
            StartOutcome::Spinning(t) => Some(t),
            _ => None,
        });
    }

    #[test]
    fn test_stop_without_session_is_noop() {
        let mut a = animator();
        assert_eq!(a.stop(0, 1), None);
        assert_eq!(a.phase(), ScrollPhase::Idle);
    }

    #[test]
    fn test_tick_wraps_offset() {
        let config = ScrollConfig::default();
        let mut a = ScrollAnimator::new(config.clone());
        a.start(2).unwrap();
        let wrap = 2.0 * TILE_COUNT as f32 * config.row_height * config.spin_loop_multiplier;
        for _ in 0..1000 {
            let offset = a.tick().unwrap();
            assert!(offset >= 0.0 && offset < wrap);
        }
    }

    #[test]
    fn test_full_cycle() {
        let mut a = animator();
        let StartOutcome::Spinning(token) = a.start(5).unwrap() else {
            panic!("expected spin");
        };
        a.tick();
        let plan = a.stop(3, 2).unwrap();
        assert_eq!(a.phase(), ScrollPhase::Snapping);
        assert_eq!(plan.token, token);
        assert_eq!(plan.winning_index, 3);
        assert_eq!(plan.easing, SNAP_EASING);
        assert!(plan.target_offset > plan.from_offset);

        assert_eq!(a.snap_offset_at(0.0), Some(plan.from_offset));
        let mid = a.snap_offset_at(plan.duration_ms as f32 / 2.0).unwrap();
        assert!(mid > plan.from_offset && mid < plan.target_offset);
        assert_eq!(a.snap_offset_at(plan.duration_ms as f32 * 2.0), Some(plan.target_offset));

        assert_eq!(a.finish(token), Some(3));
        assert_eq!(a.phase(), ScrollPhase::Idle);
        assert_eq!(a.offset(), plan.target_offset);
    }

    #[test]
    fn test_stale_token_ignored() {
        let mut a = animator();
        let StartOutcome::Spinning(old) = a.start(3).unwrap() else {
            panic!("expected spin");
        };
        a.stop(0, 1);
        a.abort();
        let StartOutcome::Spinning(new) = a.start(3).unwrap() else {
            panic!("expected spin");
        };
        assert_ne!(old, new);
        a.stop(1, 1);
        assert_eq!(a.finish(old), None);
        assert_eq!(a.phase(), ScrollPhase::Snapping);
        assert_eq!(a.finish(new), Some(1));
    }

    #[test]
    fn test_target_offset_formula() {
        let config = ScrollConfig::default();
        // 12 items: 5 visible rows, center row 2
        let target = target_offset(4, 12, 1, &config);
        let expected = (4 + (config.tile_depth + 1) * 12) as f32 * config.row_height
            - 2.0 * config.row_height;
        assert_eq!(target, expected);
    }

    proptest! {
        #[test]
        fn prop_snap_centers_winner_inside_list(
            count in 2usize..40,
            pick in 0usize..40,
            loops in 1usize..=3,
        ) {
            let config = ScrollConfig::default();
            let winner = pick % count;
            let target = target_offset(winner, count, loops, &config);
            let visible = visible_rows(count);

            let top_row = (target / config.row_height).round() as usize;
            let center_row = top_row + visible / 2;
            prop_assert_eq!(center_row % count, winner);
            prop_assert!(center_row / count >= config.tile_depth);
            // The whole viewport is backed by rendered rows
            prop_assert!(top_row + visible <= count * TILE_COUNT);
        }

        #[test]
        fn prop_snap_moves_forward(count in 2usize..40, ticks in 0usize..500, pick in 0usize..40) {
            let mut a = ScrollAnimator::new(ScrollConfig::default());
            a.start(count).unwrap();
            for _ in 0..ticks {
                a.tick();
            }
            let plan = a.stop(pick % count, 1).unwrap();
            prop_assert!(plan.target_offset >= plan.from_offset);
        }

        #[test]
        fn prop_sanitized_config_snaps_forward_inside_list(
            multiplier in 0.01f32..3.0,
            loops in 0usize..10,
            depth in 0usize..12,
            count in 2usize..40,
            ticks in 0usize..2000,
            pick in 0usize..40,
        ) {
            let config = ScrollConfig {
                spin_loop_multiplier: multiplier,
                max_extra_loops: loops,
                tile_depth: depth,
                ..Default::default()
            }
            .sanitized();
            prop_assert!(config.tile_depth >= crate::consts::TILE_DEPTH);

            let mut a = ScrollAnimator::new(config.clone());
            a.start(count).unwrap();
            for _ in 0..ticks {
                a.tick();
            }
            let plan = a.stop(pick % count, config.max_extra_loops).unwrap();
            prop_assert!(plan.target_offset >= plan.from_offset);

            let top_row = (plan.target_offset / config.row_height).round() as usize;
            prop_assert!(top_row + visible_rows(count) <= count * TILE_COUNT);
        }
    }
}
