//! Eddy is a small stable-fluids velocity field for driving passive tracers.
//!
//! Every [`VelocityField::step`] advects each velocity component along the
//! previous step's flow (semi-Lagrangian), then projects the result toward a
//! divergence free field with a few over-relaxation sweeps. The grid wraps
//! around on `x` and `z` and is bounded by free-slip walls at both ends of `y`.
//!
//! ```
//! use cgmath::vec3;
//! use eddy::{Axis, FieldConfig, Grid, VelocityField};
//!
//! let grid = Grid::planar(32, 16)?;
//! let mut field = VelocityField::new(grid, FieldConfig::default())?;
//!
//! field.add_disturbance(vec3(16.0, 8.0, 0.0), 4.0, vec3(1.0, 0.0, 0.0))?;
//! field.step(0.1, 6);
//!
//! let u = field.sample(vec3(16.0, 8.0, 0.0), Axis::X)?;
//! assert!(u > 0.0);
//! # Ok::<(), eddy::Error>(())
//! ```

pub mod advect;
pub mod boundary;
mod config;
mod error;
mod field;
mod grid;
pub mod interp;
pub mod linear;
pub mod project;

pub use config::{FieldConfig, Relaxation};
pub use error::{Error, Result};
pub use field::{StepStats, VelocityField};
pub use grid::{Axis, Grid};
