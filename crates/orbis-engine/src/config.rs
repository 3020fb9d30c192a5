//! Run configuration, validation, and error types.
//!
//! [`RunConfig`] carries everything a [`Simulation`](crate::Simulation)
//! needs besides its communicator, initial bodies and trajectory sink.
//! [`validate()`](RunConfig::validate) checks structural invariants at
//! startup.

use std::error::Error;
use std::fmt;

use orbis_core::SimError;

// ── RunConfigError ─────────────────────────────────────────────────

/// Errors detected during [`RunConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum RunConfigError {
    /// `dt` is zero.
    ZeroDt,
    /// `dt` is NaN or infinite.
    NonFiniteDt {
        /// The invalid value.
        value: f64,
    },
    /// `max_body_size` is zero.
    ZeroCapacity,
    /// `output_frequency` is zero.
    ZeroOutputFrequency,
    /// `history_depth` is zero.
    ZeroHistoryDepth,
    /// `split_odds` is zero.
    ZeroSplitOdds,
}

impl fmt::Display for RunConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDt => write!(f, "dt must be non-zero"),
            Self::NonFiniteDt { value } => write!(f, "dt must be finite, got {value}"),
            Self::ZeroCapacity => write!(f, "max_body_size must be at least 1"),
            Self::ZeroOutputFrequency => write!(f, "output_frequency must be at least 1"),
            Self::ZeroHistoryDepth => write!(f, "history_depth must be at least 1"),
            Self::ZeroSplitOdds => write!(f, "split_odds must be at least 1"),
        }
    }
}

impl Error for RunConfigError {}

impl From<RunConfigError> for SimError {
    fn from(e: RunConfigError) -> Self {
        SimError::InvalidConfig {
            reason: e.to_string(),
        }
    }
}

// ── RunConfig ──────────────────────────────────────────────────────

/// Parameters of one simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Number of timesteps to run. Default: 1000.
    pub num_timesteps: u64,
    /// Timestep length in seconds. Default: 1.0.
    pub dt: f64,
    /// Record a history sample every this many timesteps. Default: 10.
    pub output_frequency: u64,
    /// Log progress every this many timesteps; `0` disables it.
    /// Default: 10000.
    pub display_frequency: u64,
    /// Fixed body capacity. Default: 100.
    pub max_body_size: usize,
    /// Samples buffered per body before the history is flushed.
    /// Default: 10000.
    pub history_depth: usize,
    /// Seed for the coordinator's random generator. Default: 8759.
    pub seed: u64,
    /// Colliding asteroids split with probability `1 / split_odds`.
    /// Default: 10.
    pub split_odds: u32,
    /// A comet spawns each timestep with probability `1 / comet_odds`;
    /// `0` disables spawning. Default: 3000000.
    pub comet_odds: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_timesteps: 1000,
            dt: 1.0,
            output_frequency: 10,
            display_frequency: 10_000,
            max_body_size: 100,
            history_depth: 10_000,
            seed: 8759,
            split_odds: 10,
            comet_odds: 3_000_000,
        }
    }
}

impl RunConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), RunConfigError> {
        if !self.dt.is_finite() {
            return Err(RunConfigError::NonFiniteDt { value: self.dt });
        }
        if self.dt == 0.0 {
            return Err(RunConfigError::ZeroDt);
        }
        if self.max_body_size == 0 {
            return Err(RunConfigError::ZeroCapacity);
        }
        if self.output_frequency == 0 {
            return Err(RunConfigError::ZeroOutputFrequency);
        }
        if self.history_depth == 0 {
            return Err(RunConfigError::ZeroHistoryDepth);
        }
        if self.split_odds == 0 {
            return Err(RunConfigError::ZeroSplitOdds);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_dt_is_rejected() {
        let cfg = RunConfig {
            dt: 0.0,
            ..RunConfig::default()
        };
        match cfg.validate() {
            Err(RunConfigError::ZeroDt) => {}
            other => panic!("expected ZeroDt, got {other:?}"),
        }
    }

    #[test]
    fn nan_dt_is_rejected() {
        let cfg = RunConfig {
            dt: f64::NAN,
            ..RunConfig::default()
        };
        match cfg.validate() {
            Err(RunConfigError::NonFiniteDt { value }) => assert!(value.is_nan()),
            other => panic!("expected NonFiniteDt, got {other:?}"),
        }
    }

    #[test]
    fn negative_dt_runs_backwards() {
        let cfg = RunConfig {
            dt: -1.0,
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_counts_are_rejected() {
        let cases = [
            (
                RunConfig {
                    max_body_size: 0,
                    ..RunConfig::default()
                },
                RunConfigError::ZeroCapacity,
            ),
            (
                RunConfig {
                    output_frequency: 0,
                    ..RunConfig::default()
                },
                RunConfigError::ZeroOutputFrequency,
            ),
            (
                RunConfig {
                    history_depth: 0,
                    ..RunConfig::default()
                },
                RunConfigError::ZeroHistoryDepth,
            ),
            (
                RunConfig {
                    split_odds: 0,
                    ..RunConfig::default()
                },
                RunConfigError::ZeroSplitOdds,
            ),
        ];
        for (cfg, expected) in cases {
            assert_eq!(cfg.validate(), Err(expected));
        }
    }

    #[test]
    fn config_errors_become_fatal_sim_errors() {
        let e: SimError = RunConfigError::ZeroHistoryDepth.into();
        match e {
            SimError::InvalidConfig { reason } => assert!(reason.contains("history_depth")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }
}
