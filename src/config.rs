use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Name of the recurring delivery job registered in `Cron` mode.
pub const SCHEDULED_JOB_NAME: &str = "publish-domain-events";

/// Selects what invokes the publisher, and how often.
///
/// Chosen once from configuration at process start and threaded into the
/// components that need it; nothing re-reads it mid-process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingMode {
    /// Deliver only on the fixed schedule. Robust across restarts, up to
    /// one interval of latency.
    Cron,
    /// Deliver right after each request. Near-immediate, but a crash
    /// between commit and trigger leaves events waiting for the safety
    /// net (if enabled).
    #[default]
    Pipeline,
}

impl ProcessingMode {
    pub fn is_cron(&self) -> bool {
        matches!(self, ProcessingMode::Cron)
    }

    pub fn is_pipeline(&self) -> bool {
        matches!(self, ProcessingMode::Pipeline)
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingMode::Cron => write!(f, "Cron"),
            ProcessingMode::Pipeline => write!(f, "Pipeline"),
        }
    }
}

impl FromStr for ProcessingMode {
    type Err = ParseModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("cron") {
            Ok(ProcessingMode::Cron)
        } else if value.eq_ignore_ascii_case("pipeline") {
            Ok(ProcessingMode::Pipeline)
        } else {
            Err(ParseModeError(value.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError(String);

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unrecognized processing mode {:?} (expected \"Cron\" or \"Pipeline\")",
            self.0
        )
    }
}

impl std::error::Error for ParseModeError {}

/// Outbox configuration, loaded once at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboxSettings {
    pub mode: ProcessingMode,
    /// Cadence of the scheduled sweep, in seconds.
    pub sweep_interval_secs: u64,
    /// In `Pipeline` mode, also run the scheduled sweep as a safety net
    /// for events whose wakeup signal was dropped.
    pub pipeline_safety_net: bool,
    /// Capacity of the bounded wakeup buffer between pipeline and worker.
    pub signal_buffer: usize,
    /// Maximum events claimed per delivery pass.
    pub batch_size: usize,
    /// Claim lease in seconds; expired claims become claimable again.
    pub lease_secs: u64,
}

impl Default for OutboxSettings {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::Pipeline,
            sweep_interval_secs: 10,
            pipeline_safety_net: false,
            signal_buffer: 64,
            batch_size: 100,
            lease_secs: 60,
        }
    }
}

impl OutboxSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_sweep_interval_secs(mut self, secs: u64) -> Self {
        self.sweep_interval_secs = secs;
        self
    }

    pub fn with_safety_net(mut self, enabled: bool) -> Self {
        self.pipeline_safety_net = enabled;
        self
    }

    pub fn with_signal_buffer(mut self, capacity: usize) -> Self {
        self.signal_buffer = capacity;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_lease_secs(mut self, secs: u64) -> Self {
        self.lease_secs = secs;
        self
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn lease(&self) -> Duration {
        Duration::from_secs(self.lease_secs)
    }
}
