//! Enter/update/exit transitions for nodes and links.
//!
//! Each element owns at most one in-flight animation. A [`Transition`] is
//! an explicit finite-state object; the [`TransformScheduler`] keeps one per
//! element keyed by stable identity and advances them all with
//! [`TransformScheduler::advance`].
//!
//! # Invariants
//!
//! 1. A zero-duration schedule applies its end state and fires its
//!    completion callback before returning.
//! 2. A completion callback fires at most once.
//! 3. Scheduling over an in-flight animation drops the old callback without
//!    calling it; the new animation starts from the current interpolated
//!    position.
//! 4. A leaving element is detached only after its exit animation settles.

use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::geometry::{translate, Orientation, Point};

/// Completion callback for a transition.
pub type OnSettled = Box<dyn FnOnce()>;

/// Wraps a closure as a completion callback.
pub fn on_settled<F: FnOnce() + 'static>(f: F) -> Option<OnSettled> {
    Some(Box::new(f))
}

// ---------------------------------------------------------------------------
// Easing
// ---------------------------------------------------------------------------

/// Easing curve applied to normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    /// Cubic ease-in-out, the usual default for diagram transitions.
    #[default]
    CubicInOut,
}

impl Easing {
    /// Maps `t` in [0, 1] to eased progress in [0, 1].
    #[inline]
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle phase of an element's transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Not mounted yet.
    Idle,
    /// Fading in from the parent's position.
    Entering,
    /// Mounted; updates animate between positions.
    SteadyState,
    /// Fading out towards the parent's position.
    Leaving,
}

/// Visual state produced by a transition, ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionState {
    pub opacity: f64,
    pub transform: String,
    pub is_animating: bool,
}

/// Position and opacity at one end of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub position: Point,
    pub opacity: f64,
}

impl Keyframe {
    #[must_use]
    pub const fn new(position: Point, opacity: f64) -> Self {
        Self { position, opacity }
    }

    /// Fully opaque at `position`.
    #[must_use]
    pub const fn visible(position: Point) -> Self {
        Self::new(position, 1.0)
    }

    /// Fully transparent at `position`.
    #[must_use]
    pub const fn hidden(position: Point) -> Self {
        Self::new(position, 0.0)
    }

    fn lerp(&self, other: &Self, t: f64) -> Self {
        Self::new(
            self.position.lerp(&other.position, t),
            self.opacity + (other.opacity - self.opacity) * t,
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: Keyframe,
    to: Keyframe,
    elapsed: Duration,
    duration: Duration,
}

impl Tween {
    fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }
}

/// Per-element transition state machine.
pub struct Transition {
    phase: Phase,
    current: Keyframe,
    orientation: Orientation,
    easing: Easing,
    tween: Option<Tween>,
    on_settled: Option<OnSettled>,
    is_transforming: bool,
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("phase", &self.phase)
            .field("current", &self.current)
            .field("orientation", &self.orientation)
            .field("tween", &self.tween)
            .field("has_callback", &self.on_settled.is_some())
            .field("is_transforming", &self.is_transforming)
            .finish()
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(Easing::default())
    }
}

impl Transition {
    /// A transition that has not been mounted yet.
    #[must_use]
    pub const fn new(easing: Easing) -> Self {
        Self {
            phase: Phase::Idle,
            current: Keyframe::hidden(Point::origin()),
            orientation: Orientation::Vertical,
            easing,
            tween: None,
            on_settled: None,
            is_transforming: false,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current interpolated keyframe in logical space.
    #[must_use]
    pub const fn current(&self) -> Keyframe {
        self.current
    }

    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Time left until the in-flight animation settles.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.tween.as_ref().map_or(Duration::ZERO, Tween::remaining)
    }

    /// True while an exit animation is in flight.
    #[must_use]
    pub const fn is_transforming(&self) -> bool {
        self.is_transforming
    }

    /// Snapshot of the visual state.
    #[must_use]
    pub fn state(&self) -> TransitionState {
        TransitionState {
            opacity: self.current.opacity,
            transform: translate(self.current.position, self.orientation),
            is_animating: self.is_animating(),
        }
    }

    /// Mounts the element: starts hidden at `origin` and animates to
    /// visible at `target`.
    pub fn enter(
        &mut self,
        origin: Point,
        target: Point,
        orientation: Orientation,
        duration_ms: u64,
        on_settled: Option<OnSettled>,
    ) {
        self.phase = Phase::Entering;
        self.animate(
            Some(Keyframe::hidden(origin)),
            Keyframe::visible(target),
            orientation,
            duration_ms,
            on_settled,
        );
    }

    /// Moves a mounted element to `target`.
    ///
    /// An element that has not entered yet is entered from `target` itself.
    pub fn update(
        &mut self,
        target: Keyframe,
        orientation: Orientation,
        duration_ms: u64,
        on_settled: Option<OnSettled>,
    ) {
        let from = match self.phase {
            Phase::Idle => Some(Keyframe::hidden(target.position)),
            Phase::Entering | Phase::SteadyState | Phase::Leaving => None,
        };
        self.phase = Phase::SteadyState;
        self.is_transforming = false;
        self.animate(from, target, orientation, duration_ms, on_settled);
    }

    /// Starts the exit animation towards `anchor`, fading out.
    pub fn leave(
        &mut self,
        anchor: Point,
        orientation: Orientation,
        duration_ms: u64,
        on_settled: Option<OnSettled>,
    ) {
        self.phase = Phase::Leaving;
        if duration_ms > 0 {
            self.is_transforming = true;
        }
        self.animate(
            None,
            Keyframe::hidden(anchor),
            orientation,
            duration_ms,
            on_settled,
        );
    }

    /// Animates from `from` (or the current state) to `to`.
    ///
    /// Replaces any in-flight animation. Its callback is dropped unfired.
    pub fn animate(
        &mut self,
        from: Option<Keyframe>,
        to: Keyframe,
        orientation: Orientation,
        duration_ms: u64,
        on_settled: Option<OnSettled>,
    ) {
        if self.tween.take().is_some() && self.on_settled.is_some() {
            trace!(phase = ?self.phase, "preempting in-flight transition");
        }
        self.orientation = orientation;
        self.on_settled = on_settled;
        if let Some(from) = from {
            self.current = from;
        }

        if duration_ms == 0 {
            self.current = to;
            self.settle();
            return;
        }

        self.tween = Some(Tween {
            from: self.current,
            to,
            elapsed: Duration::ZERO,
            duration: Duration::from_millis(duration_ms),
        });
    }

    /// Advances the in-flight animation by `dt`.
    ///
    /// Returns `true` when this call settled the animation.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(mut tween) = self.tween.take() else {
            return false;
        };
        tween.elapsed = tween.elapsed.saturating_add(dt);
        let t = self.easing.apply(tween.progress());
        self.current = tween.from.lerp(&tween.to, t);

        if tween.is_complete() {
            self.current = tween.to;
            self.settle();
            true
        } else {
            self.tween = Some(tween);
            false
        }
    }

    fn settle(&mut self) {
        self.tween = None;
        self.is_transforming = false;
        if self.phase == Phase::Entering {
            self.phase = Phase::SteadyState;
        }
        if let Some(done) = self.on_settled.take() {
            done();
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Owns the transitions of every element in one diagram, keyed by id.
#[derive(Debug, Default)]
pub struct TransformScheduler {
    transitions: IndexMap<String, Transition>,
    easing: Easing,
}

impl TransformScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `easing` for transitions created from now on.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Animates element `id` from `current` to `target`.
    ///
    /// An unknown id is mounted (enter phase); a known one is updated. The
    /// completion callback replaces whatever callback the element had.
    pub fn schedule(
        &mut self,
        id: &str,
        current: Keyframe,
        target: Keyframe,
        orientation: Orientation,
        duration_ms: u64,
        on_settled: Option<OnSettled>,
    ) -> TransitionState {
        let easing = self.easing;
        let transition = self
            .transitions
            .entry(id.to_string())
            .or_insert_with(|| Transition::new(easing));
        // A schedule on a leaving element cancels the exit.
        if transition.phase() == Phase::Idle {
            transition.phase = Phase::Entering;
        } else {
            transition.phase = Phase::SteadyState;
            transition.is_transforming = false;
        }
        debug!(id, phase = ?transition.phase(), duration_ms, "scheduling transition");
        transition.animate(Some(current), target, orientation, duration_ms, on_settled);
        transition.state()
    }

    /// Mounts element `id`, entering from `origin`.
    pub fn enter(
        &mut self,
        id: &str,
        origin: Point,
        target: Point,
        orientation: Orientation,
        duration_ms: u64,
        on_settled: Option<OnSettled>,
    ) -> TransitionState {
        let easing = self.easing;
        let transition = self
            .transitions
            .entry(id.to_string())
            .or_insert_with(|| Transition::new(easing));
        debug!(id, duration_ms, "entering");
        transition.enter(origin, target, orientation, duration_ms, on_settled);
        transition.state()
    }

    /// Moves element `id` to `target`, mounting it first if needed.
    pub fn update(
        &mut self,
        id: &str,
        target: Keyframe,
        orientation: Orientation,
        duration_ms: u64,
        on_settled: Option<OnSettled>,
    ) -> TransitionState {
        let easing = self.easing;
        let transition = self
            .transitions
            .entry(id.to_string())
            .or_insert_with(|| Transition::new(easing));
        trace!(id, duration_ms, "updating");
        transition.update(target, orientation, duration_ms, on_settled);
        transition.state()
    }

    /// Starts the exit animation of element `id`.
    ///
    /// A zero duration detaches the element immediately. Unknown ids still
    /// get their callback fired so callers can rely on completion.
    pub fn leave(
        &mut self,
        id: &str,
        anchor: Point,
        orientation: Orientation,
        duration_ms: u64,
        on_settled: Option<OnSettled>,
    ) -> Option<TransitionState> {
        let Some(transition) = self.transitions.get_mut(id) else {
            debug!(id, "leave requested for unknown element");
            if let Some(done) = on_settled {
                done();
            }
            return None;
        };
        debug!(id, duration_ms, "leaving");
        transition.leave(anchor, orientation, duration_ms, on_settled);
        let state = transition.state();
        if !transition.is_animating() {
            self.transitions.shift_remove(id);
            debug!(id, "detached");
        }
        Some(state)
    }

    /// Advances every in-flight animation by `dt`.
    ///
    /// Returns the ids of leaving elements that settled and were detached.
    pub fn advance(&mut self, dt: Duration) -> Vec<String> {
        let mut detached = Vec::new();
        for (id, transition) in &mut self.transitions {
            if transition.advance(dt) && transition.phase() == Phase::Leaving {
                detached.push(id.clone());
            }
        }
        for id in &detached {
            self.transitions.shift_remove(id);
            debug!(id = id.as_str(), "detached");
        }
        detached
    }

    /// Advances until nothing is animating. `step` must be non-zero.
    pub fn settle_all(&mut self, step: Duration) -> Vec<String> {
        let mut detached = Vec::new();
        if step.is_zero() {
            return detached;
        }
        while self.is_animating() {
            detached.extend(self.advance(step));
        }
        detached
    }

    /// Jumps every in-flight animation to its end state.
    ///
    /// Completion callbacks fire as they would under `advance`.
    pub fn finish_all(&mut self) -> Vec<String> {
        let mut detached = Vec::new();
        while let Some(longest) = self.longest_remaining() {
            detached.extend(self.advance(longest));
        }
        detached
    }

    /// Longest remaining time of any in-flight animation.
    #[must_use]
    pub fn longest_remaining(&self) -> Option<Duration> {
        self.transitions
            .values()
            .filter(|t| t.is_animating())
            .map(Transition::remaining)
            .max()
    }

    /// Whether any element is animating.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.transitions.values().any(Transition::is_animating)
    }

    /// Visual state of element `id`.
    #[must_use]
    pub fn state(&self, id: &str) -> Option<TransitionState> {
        self.transitions.get(id).map(Transition::state)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Transition> {
        self.transitions.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.transitions.contains_key(id)
    }

    /// Ids currently held, in mount order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.transitions.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
