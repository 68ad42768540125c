//! Intro sequence: `loading → fog → ready`, plus the loading overlay counter.

use crate::constants::{
    FOG_DWELL_SEC, LOADING_COUNTER_RATE, LOADING_COUNTER_RATE_DONE, LOAD_SETTLE_SEC,
    REVEAL_NOTICE_SEC,
};
use crate::curve::approach;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScenePhase {
    Loading,
    Fog,
    Ready,
}

impl ScenePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ScenePhase::Loading => "loading",
            ScenePhase::Fog => "fog",
            ScenePhase::Ready => "ready",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseStep {
    Entered(ScenePhase),
    Revealed,
}

/// Forward-only phase machine driven by load progress and elapsed time.
#[derive(Clone, Debug)]
pub struct PhaseMachine {
    phase: ScenePhase,
    progress: f32,
    /// Time since progress reached 100, while still loading.
    settle: Option<f32>,
    fog_elapsed: f32,
    revealed: bool,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            phase: ScenePhase::Loading,
            progress: 0.0,
            settle: None,
            fog_elapsed: 0.0,
            revealed: false,
        }
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_ready(&self) -> bool {
        self.phase == ScenePhase::Ready
    }

    /// Load progress only matters while loading. A drop below 100 before
    /// the settle delay elapses cancels the pending transition.
    pub fn set_progress(&mut self, percent: f32) {
        if self.phase != ScenePhase::Loading || !percent.is_finite() {
            return;
        }
        self.progress = percent.clamp(0.0, 100.0);
        if self.progress >= 100.0 {
            self.settle.get_or_insert(0.0);
        } else {
            self.settle = None;
        }
    }

    pub fn update(&mut self, dt_sec: f32) -> SmallVec<[PhaseStep; 2]> {
        let mut steps = SmallVec::new();
        match self.phase {
            ScenePhase::Loading => {
                if let Some(t) = self.settle.as_mut() {
                    *t += dt_sec;
                    if *t >= LOAD_SETTLE_SEC {
                        self.settle = None;
                        self.enter(ScenePhase::Fog, &mut steps);
                    }
                }
            }
            ScenePhase::Fog => {
                self.fog_elapsed += dt_sec;
                if !self.revealed && self.fog_elapsed >= REVEAL_NOTICE_SEC {
                    self.revealed = true;
                    steps.push(PhaseStep::Revealed);
                }
                if self.fog_elapsed >= FOG_DWELL_SEC {
                    self.enter(ScenePhase::Ready, &mut steps);
                }
            }
            ScenePhase::Ready => {}
        }
        steps
    }

    /// Opacity of the intro fog overlay: opaque while loading, clearing
    /// linearly through the fog dwell.
    pub fn fog_opacity(&self) -> f32 {
        match self.phase {
            ScenePhase::Loading => 1.0,
            ScenePhase::Fog => (1.0 - self.fog_elapsed / FOG_DWELL_SEC).clamp(0.0, 1.0),
            ScenePhase::Ready => 0.0,
        }
    }

    fn enter(&mut self, next: ScenePhase, steps: &mut SmallVec<[PhaseStep; 2]>) {
        if next <= self.phase {
            return;
        }
        log::info!("scene phase: {} -> {}", self.phase.as_str(), next.as_str());
        self.phase = next;
        steps.push(PhaseStep::Entered(next));
    }
}

/// Displayed percentage that chases real load progress.
#[derive(Clone, Debug, Default)]
pub struct LoadingOverlay {
    display: f32,
}

impl LoadingOverlay {
    pub fn update(&mut self, progress: f32) {
        let rate = if progress >= 100.0 {
            LOADING_COUNTER_RATE_DONE
        } else {
            LOADING_COUNTER_RATE
        };
        self.display = approach(self.display, progress.clamp(0.0, 100.0), rate);
    }

    pub fn percent(&self) -> u32 {
        (self.display.round() as u32).min(100)
    }

    /// 1 at 0 %, 0 at 100 %.
    pub fn glitch_intensity(&self) -> f32 {
        (1.0 - self.percent() as f32 / 100.0).max(0.0)
    }
}
