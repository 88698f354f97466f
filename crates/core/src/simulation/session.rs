//! Simulation session state
//!
//! Owns the smoke field together with the run/paused flag and the
//! continuous source emission that a driving loop would otherwise keep as
//! free-standing globals. The driver calls [`SimulationSession::tick`]
//! once per logical frame; a paused session ignores ticks, and a skipped
//! tick only delays simulated time. It can never misalign the field's
//! buffers, because buffer identity is owned entirely by the field.
//!
//! Emission is stochastic (the source puffs with a configured probability
//! each tick) but driven by a seeded RNG, so a session replays identically
//! for the same seed and tick sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SmokeError;
use crate::simulation::smoke_field::{SmokeField, SmokeParams};

/// Configuration for a simulation session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Chance per tick that the smoke source emits a puff, in `[0, 1]`.
    pub emission_probability: f32,
    /// Density deposited at the source center per puff.
    pub emission_amount: f32,
    /// Seed for the emission draw; a fixed seed keeps runs reproducible.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            emission_probability: 0.3,
            emission_amount: 0.5,
            seed: 0x5eed,
        }
    }
}

impl SessionConfig {
    /// Validate the emission settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the probability is outside `[0, 1]`
    /// or the amount is negative or non-finite.
    pub fn validate(&self) -> Result<(), SmokeError> {
        if !self.emission_probability.is_finite()
            || !(0.0..=1.0).contains(&self.emission_probability)
        {
            return Err(SmokeError::InvalidParameter(format!(
                "emission probability must be within [0, 1], got {}",
                self.emission_probability
            )));
        }
        if !self.emission_amount.is_finite() || self.emission_amount < 0.0 {
            return Err(SmokeError::InvalidParameter(format!(
                "emission amount must be non-negative and finite, got {}",
                self.emission_amount
            )));
        }
        Ok(())
    }
}

/// A running or paused smoke simulation.
pub struct SimulationSession {
    field: SmokeField,
    config: SessionConfig,
    rng: StdRng,
    running: bool,
    ticks_advanced: u64,
}

impl SimulationSession {
    /// Create a paused session with default solver parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` for a zero-sized grid and
    /// `InvalidParameter` for an invalid config.
    pub fn new(width: usize, height: usize, config: SessionConfig) -> Result<Self, SmokeError> {
        Self::with_params(width, height, SmokeParams::default(), config)
    }

    /// Create a paused session with explicit solver parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` for a zero-sized grid and
    /// `InvalidParameter` for invalid parameters or config.
    pub fn with_params(
        width: usize,
        height: usize,
        params: SmokeParams,
        config: SessionConfig,
    ) -> Result<Self, SmokeError> {
        config.validate()?;
        let field = SmokeField::with_params(width, height, params)?;
        info!(
            "Session created: {}x{} grid, emission p={:.2}",
            width, height, config.emission_probability
        );
        Ok(Self {
            field,
            config,
            rng: StdRng::seed_from_u64(config.seed),
            running: false,
            ticks_advanced: 0,
        })
    }

    /// Begin advancing on `tick()` calls.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            info!("Session started");
        }
    }

    /// Stop advancing; the field keeps its last-known values.
    pub fn pause(&mut self) {
        if self.running {
            self.running = false;
            info!("Session paused");
        }
    }

    /// Whether `tick()` currently advances the simulation.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pause and zero the field. Wind, source position, and parameters
    /// keep their values, so a restarted session picks up where the
    /// controls left them.
    pub fn reset(&mut self) {
        self.running = false;
        self.field.reset();
        self.ticks_advanced = 0;
        info!("Session reset");
    }

    /// Advance one tick if running: maybe emit a puff at the source, then
    /// step the field. Returns whether the field actually advanced.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        if self.rng.random::<f32>() < self.config.emission_probability {
            let (sx, sy) = self.field.smoke_source_position();
            // Emission inputs are validated when set; treat a failure as
            // a skipped puff rather than a panic.
            if let Err(err) = self.field.add_smoke(sx, sy, self.config.emission_amount) {
                debug!("source emission skipped: {err}");
            }
        }

        self.field.update();
        self.ticks_advanced += 1;
        true
    }

    /// Run up to `ticks` ticks, stopping early if paused. Returns how many
    /// ticks actually advanced.
    pub fn run_for(&mut self, ticks: u64) -> u64 {
        let mut advanced = 0;
        for _ in 0..ticks {
            if !self.tick() {
                break;
            }
            advanced += 1;
        }
        advanced
    }

    /// The owned smoke field.
    #[must_use]
    pub fn field(&self) -> &SmokeField {
        &self.field
    }

    /// Mutable access to the owned smoke field, for wind and source
    /// updates from UI collaborators.
    pub fn field_mut(&mut self) -> &mut SmokeField {
        &mut self.field
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Ticks advanced since creation or the last reset.
    #[must_use]
    pub fn ticks_advanced(&self) -> u64 {
        self.ticks_advanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_emitting() -> SessionConfig {
        SessionConfig {
            emission_probability: 1.0,
            emission_amount: 0.5,
            seed: 7,
        }
    }

    #[test]
    fn test_paused_session_ignores_ticks() {
        let mut session = SimulationSession::new(10, 10, always_emitting()).unwrap();
        assert!(!session.is_running());
        assert!(!session.tick());
        assert_eq!(session.ticks_advanced(), 0);
        assert_eq!(session.field().total_density(), 0.0);
    }

    #[test]
    fn test_running_session_emits_and_advances() {
        let mut session = SimulationSession::new(16, 16, always_emitting()).unwrap();
        session.start();
        assert!(session.tick());
        assert_eq!(session.ticks_advanced(), 1);
        assert!(session.field().total_density() > 0.0);
    }

    #[test]
    fn test_run_for_stops_when_paused() {
        let mut session = SimulationSession::new(10, 10, always_emitting()).unwrap();
        assert_eq!(session.run_for(5), 0);
        session.start();
        assert_eq!(session.run_for(5), 5);
        assert_eq!(session.ticks_advanced(), 5);
    }

    #[test]
    fn test_reset_pauses_and_zeroes() {
        let mut session = SimulationSession::new(12, 12, always_emitting()).unwrap();
        session.start();
        session.run_for(3);
        assert!(session.field().total_density() > 0.0);

        session.reset();

        assert!(!session.is_running());
        assert_eq!(session.ticks_advanced(), 0);
        assert_eq!(session.field().total_density(), 0.0);
    }

    #[test]
    fn test_same_seed_replays_identically() {
        let config = SessionConfig {
            emission_probability: 0.4,
            emission_amount: 0.5,
            seed: 42,
        };
        let mut a = SimulationSession::new(14, 10, config).unwrap();
        let mut b = SimulationSession::new(14, 10, config).unwrap();
        a.start();
        b.start();
        a.run_for(20);
        b.run_for(20);
        assert_eq!(a.field().densities(), b.field().densities());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SessionConfig {
            emission_probability: 1.5,
            ..SessionConfig::default()
        };
        assert!(SimulationSession::new(10, 10, config).is_err());

        let config = SessionConfig {
            emission_amount: -1.0,
            ..SessionConfig::default()
        };
        assert!(SimulationSession::new(10, 10, config).is_err());
    }
}
