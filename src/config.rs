use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Over-relaxation schedule for the pressure solve.
///
/// The weight starts at `initial`, drops by `decay` after every sweep and
/// never goes below `floor`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Relaxation {
    pub initial: f64,
    pub floor: f64,
    pub decay: f64,
}

impl Relaxation {
    /// Weight used for sweep number `sweep` (zero based).
    pub fn weight(&self, sweep: usize) -> f64 {
        (self.initial - self.decay * sweep as f64).max(self.floor)
    }
}

impl Default for Relaxation {
    fn default() -> Self {
        Self {
            initial: 1.9,
            floor: 1.5,
            decay: 0.01,
        }
    }
}

/// Tunable parameters of a [`VelocityField`](crate::VelocityField).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FieldConfig {
    /// Fixed time step used by [`step_default`](crate::VelocityField::step_default).
    pub dt: f64,
    /// Relaxation sweeps per projection. 4-10 is fine for real time, 20+ for accuracy.
    pub solver_iterations: usize,
    /// Cell spacing `h` of the divergence and gradient stencils.
    pub cell_spacing: f64,
    /// Factor applied to edge-normal velocities on the wrap-around faces after every pass.
    pub edge_damping: f64,
    pub relaxation: Relaxation,
    /// Seed of the initial perturbation. `None` starts from an exactly zero field.
    pub seed: Option<u64>,
    /// Largest magnitude of the initial random perturbation.
    pub seed_amplitude: f64,
    /// Steps run after seeding, before the field is handed out.
    pub prewarm_steps: usize,
    /// Magnitude that infinite or runaway velocities are clamped to.
    pub speed_limit: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            solver_iterations: 6,
            cell_spacing: 1.0,
            edge_damping: 0.95,
            relaxation: Relaxation::default(),
            seed: None,
            seed_amplitude: 0.05,
            prewarm_steps: 8,
            speed_limit: 1.0e6,
        }
    }
}

impl FieldConfig {
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_solver_iterations(mut self, iterations: usize) -> Self {
        self.solver_iterations = iterations;
        self
    }

    pub fn with_cell_spacing(mut self, spacing: f64) -> Self {
        self.cell_spacing = spacing;
        self
    }

    pub fn with_edge_damping(mut self, damping: f64) -> Self {
        self.edge_damping = damping;
        self
    }

    pub fn with_relaxation(mut self, relaxation: Relaxation) -> Self {
        self.relaxation = relaxation;
        self
    }

    /// Seed the field with a small random perturbation and pre-warm it.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_seed_amplitude(mut self, amplitude: f64) -> Self {
        self.seed_amplitude = amplitude;
        self
    }

    pub fn with_prewarm_steps(mut self, steps: usize) -> Self {
        self.prewarm_steps = steps;
        self
    }

    pub fn with_speed_limit(mut self, limit: f64) -> Self {
        self.speed_limit = limit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt < 0.0 {
            return Err(Error::InvalidConfig("dt must be finite and non-negative"));
        }
        if !self.cell_spacing.is_finite() || self.cell_spacing <= 0.0 {
            return Err(Error::InvalidConfig("cell_spacing must be finite and positive"));
        }
        if !(0.0..=1.0).contains(&self.edge_damping) {
            return Err(Error::InvalidConfig("edge_damping must lie in [0, 1]"));
        }

        let r = &self.relaxation;
        if !(r.initial.is_finite() && r.floor.is_finite() && r.decay.is_finite()) {
            return Err(Error::InvalidConfig("relaxation weights must be finite"));
        }
        // SOR diverges outside (0, 2).
        if r.floor <= 0.0 || r.initial < r.floor || r.initial >= 2.0 || r.decay < 0.0 {
            return Err(Error::InvalidConfig(
                "relaxation needs 0 < floor <= initial < 2 and decay >= 0",
            ));
        }

        if !self.seed_amplitude.is_finite() || self.seed_amplitude < 0.0 {
            return Err(Error::InvalidConfig("seed_amplitude must be finite and non-negative"));
        }
        if !self.speed_limit.is_finite() || self.speed_limit <= 0.0 {
            return Err(Error::InvalidConfig("speed_limit must be finite and positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_relaxation_schedule() {
        let r = Relaxation::default();

        assert_abs_diff_eq!(r.weight(0), 1.9);
        assert_abs_diff_eq!(r.weight(10), 1.8, epsilon = 1e-12);
        assert_abs_diff_eq!(r.weight(40), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(r.weight(1000), 1.5);
    }

    #[test]
    fn test_default_is_valid() {
        assert_eq!(FieldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            FieldConfig::default().with_dt(f64::NAN),
            FieldConfig::default().with_cell_spacing(0.0),
            FieldConfig::default().with_edge_damping(1.5),
            FieldConfig::default().with_speed_limit(f64::INFINITY),
            FieldConfig::default().with_seed_amplitude(-1.0),
            FieldConfig::default().with_relaxation(Relaxation {
                initial: 2.0,
                floor: 1.5,
                decay: 0.01,
            }),
            FieldConfig::default().with_relaxation(Relaxation {
                initial: 1.2,
                floor: 1.5,
                decay: 0.01,
            }),
        ];

        for config in bad.iter() {
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
    }
}
