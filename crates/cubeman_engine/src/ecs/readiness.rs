//! Readiness gate
//!
//! The frame loop stays idle until both the level and the models have been
//! delivered. An optional watchdog turns an endless wait into an error.

/// Result of ticking the gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateStatus {
    /// Both loads completed
    Open,
    /// Still waiting; seconds waited so far
    Waiting {
        /// Seconds spent waiting
        waited: f32,
    },
    /// Waited longer than the configured timeout
    TimedOut {
        /// Seconds spent waiting
        waited: f32,
    },
}

/// Two load flags ANDed together, plus a watchdog
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    level_loaded: bool,
    models_loaded: bool,
    waited: f32,
    timeout: Option<f32>,
    warned_secs: u32,
}

impl ReadinessGate {
    /// Create a closed gate; `timeout` of `None` waits forever
    pub fn new(timeout: Option<f32>) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Level data arrived
    pub fn mark_level_loaded(&mut self) {
        self.level_loaded = true;
    }

    /// Model data arrived
    pub fn mark_models_loaded(&mut self) {
        self.models_loaded = true;
    }

    /// Whether level data arrived
    pub fn level_loaded(&self) -> bool {
        self.level_loaded
    }

    /// Whether model data arrived
    pub fn models_loaded(&self) -> bool {
        self.models_loaded
    }

    /// Whether both loads completed
    pub fn is_open(&self) -> bool {
        self.level_loaded && self.models_loaded
    }

    /// Seconds spent waiting while closed
    pub fn waited(&self) -> f32 {
        self.waited
    }

    /// Account one frame of `delta` seconds
    pub fn tick(&mut self, delta: f32) -> GateStatus {
        if self.is_open() {
            return GateStatus::Open;
        }
        self.waited += delta.max(0.0);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole_secs = self.waited as u32;
        if whole_secs > self.warned_secs {
            self.warned_secs = whole_secs;
            log::warn!(
                "Still waiting for load data after {:.1}s (level: {}, models: {})",
                self.waited,
                self.level_loaded,
                self.models_loaded
            );
        }

        match self.timeout {
            Some(limit) if self.waited > limit => GateStatus::TimedOut { waited: self.waited },
            _ => GateStatus::Waiting { waited: self.waited },
        }
    }
}
