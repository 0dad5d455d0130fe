/// Upper bound (exclusive) for the simulated ramp.
pub const SIMULATED_CEILING: f64 = 95.0;
/// Largest advance a single simulated tick may make.
pub const MAX_SIMULATED_STEP: f64 = 10.0;

const COMPLETE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressPhase {
    #[default]
    Simulated,
    Reported,
    Finalizing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    /// Percentage in 0.0..=100.0.
    pub value: f64,
    pub phase: ProgressPhase,
}

/// Owns the progress shown for one submission attempt.
///
/// The value never decreases while an attempt is active: simulated ticks only
/// move it forward and reported fractions below the current value are
/// ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressTracker {
    state: Option<ProgressState>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.state = Some(ProgressState {
            value: 0.0,
            phase: ProgressPhase::Simulated,
        });
    }

    pub fn state(&self) -> Option<ProgressState> {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Advances the simulated ramp by `sample * MAX_SIMULATED_STEP`, where
    /// `sample` is a pseudo-random value in `0.0..1.0`. Near the ceiling the
    /// step shrinks to half of the remaining headroom so the ramp keeps
    /// creeping without ever reaching [`SIMULATED_CEILING`].
    ///
    /// Returns whether the value changed.
    pub fn simulated_tick(&mut self, sample: f64) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if state.phase != ProgressPhase::Simulated || !sample.is_finite() {
            return false;
        }
        let step = sample.clamp(0.0, 1.0) * MAX_SIMULATED_STEP;
        let headroom = SIMULATED_CEILING - state.value;
        let next = if step < headroom {
            state.value + step
        } else {
            state.value + headroom / 2.0
        };
        if next >= SIMULATED_CEILING || next <= state.value {
            return false;
        }
        state.value = next;
        true
    }

    /// Applies a server-reported fraction (0.0..=1.0). Switches the tracker to
    /// the reported phase; the value only moves forward.
    ///
    /// Returns whether anything visible changed.
    pub fn report(&mut self, fraction: f64) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if state.phase == ProgressPhase::Finalizing || !fraction.is_finite() {
            return false;
        }
        let target = fraction.clamp(0.0, 1.0) * COMPLETE;
        let mut changed = false;
        if state.phase != ProgressPhase::Reported {
            state.phase = ProgressPhase::Reported;
            changed = true;
        }
        if target > state.value {
            state.value = target;
            changed = true;
        }
        changed
    }

    /// Forces the value to 100 and holds it in the finalizing phase.
    pub fn finalize(&mut self) {
        self.state = Some(ProgressState {
            value: COMPLETE,
            phase: ProgressPhase::Finalizing,
        });
    }

    pub fn discard(&mut self) {
        self.state = None;
    }

    /// Whole percent for display, rounded down so the simulated ramp never
    /// shows 95.
    pub fn percent(&self) -> Option<u8> {
        self.state
            .map(|state| state.value.clamp(0.0, COMPLETE).floor() as u8)
    }
}
