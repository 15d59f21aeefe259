use crate::advect::advect;
use crate::boundary::correct_edges;
use crate::interp::interpolate_linear;
use crate::project::{mean_abs_divergence, project, Projection};
use crate::{Axis, Error, FieldConfig, Grid, Result};
use cgmath::{vec3, Vector3};
use ndarray::{Array1, ArrayView1, ArrayView3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Diagnostics of the most recent [`VelocityField::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepStats {
    /// Mean absolute divergence over interior cells right after advection.
    pub divergence_advected: f64,
    /// Mean absolute divergence over interior cells after projection.
    pub divergence_projected: f64,
    /// Velocity values replaced because they were non-finite or above the speed limit.
    pub clamped: usize,
}

/// A double-buffered velocity field on a grid with wrap-around `x`/`z` and
/// free-slip walls at the two ends of `y`.
///
/// Positions taken by [`sample`](Self::sample) and
/// [`add_disturbance`](Self::add_disturbance) are in cell units: cell
/// `(i, j, k)` covers `[i, i + 1) x [j, j + 1) x [k, k + 1)`.
///
/// The field is not internally synchronised; [`step`](Self::step) takes
/// `&mut self`, so it always completes before the next read.
#[derive(Clone, Debug)]
pub struct VelocityField {
    grid: Grid,
    config: FieldConfig,
    // One set of velocity components per arena; `current` names the live one.
    arenas: [Vec<Array1<f64>>; 2],
    current: usize,
    pressure: Array1<f64>,
    divergence: Array1<f64>,
    seeded: bool,
    last_step: StepStats,
}

impl VelocityField {
    /// Create a field at rest, or seeded and pre-warmed when `config.seed` is set.
    pub fn new(grid: Grid, config: FieldConfig) -> Result<Self> {
        config.validate()?;

        let seeded = config.seed.is_some();
        let mut field = Self::zeroed(grid, config, seeded);
        field.seed();

        log::debug!(
            "velocity field {}x{}x{} created (seed {:?})",
            grid.size_x(),
            grid.size_y(),
            grid.size_z(),
            field.config.seed
        );
        Ok(field)
    }

    /// Create a field from caller supplied components, one flat array per axis
    /// in `x + y * size_x + z * size_x * size_y` order.
    ///
    /// The seed in `config` is not used; [`reset`](Self::reset) returns this field to rest.
    pub fn from_components(grid: Grid, config: FieldConfig, components: Vec<Array1<f64>>) -> Result<Self> {
        config.validate()?;

        if components.len() != grid.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: grid.dimensions(),
                found: components.len(),
            });
        }
        for component in components.iter() {
            if component.len() != grid.len() {
                return Err(Error::DimensionMismatch {
                    expected: grid.len(),
                    found: component.len(),
                });
            }
            if !component.iter().all(|e| e.is_finite()) {
                return Err(Error::InvalidArgument("velocity components must be finite"));
            }
        }

        let mut field = Self::zeroed(grid, config, false);
        field.arenas[field.current] = components;
        let damping = field.config.edge_damping;
        for (axis, component) in Axis::VELOCITY.iter().zip(field.arenas[field.current].iter_mut()) {
            correct_edges(&grid, *axis, component, damping);
        }

        Ok(field)
    }

    fn zeroed(grid: Grid, config: FieldConfig, seeded: bool) -> Self {
        let arena = || vec![Array1::<f64>::zeros(grid.len()); grid.dimensions()];

        Self {
            grid,
            config,
            arenas: [arena(), arena()],
            current: 0,
            pressure: Array1::zeros(grid.len()),
            divergence: Array1::zeros(grid.len()),
            seeded,
            last_step: StepStats::default(),
        }
    }

    fn seed(&mut self) {
        let seed = match (self.seeded, self.config.seed) {
            (true, Some(seed)) => seed,
            _ => return,
        };

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let amplitude = self.config.seed_amplitude;
        let damping = self.config.edge_damping;
        let grid = self.grid;

        for (axis, component) in Axis::VELOCITY.iter().zip(self.arenas[self.current].iter_mut()) {
            grid.for_each_interior(|_, _, _, k| {
                component[k] = rng.gen_range(-amplitude..=amplitude);
            });
            correct_edges(&grid, *axis, component, damping);
        }

        for _ in 0..self.config.prewarm_steps {
            self.step_default();
        }
    }

    /// Return every buffer to the state right after construction.
    pub fn reset(&mut self) {
        for arena in self.arenas.iter_mut() {
            for component in arena.iter_mut() {
                component.fill(0.0);
            }
        }
        self.pressure.fill(0.0);
        self.divergence.fill(0.0);
        self.current = 0;
        self.last_step = StepStats::default();

        self.seed();
        log::debug!("velocity field reset");
    }

    /// Advance by `dt` with the configured time step and solver iterations.
    pub fn step_default(&mut self) {
        self.step(self.config.dt, self.config.solver_iterations);
    }

    /// Advance the field by `dt`: swap buffers, advect every component along
    /// the previous velocity, then project with `iterations` relaxation sweeps.
    ///
    /// Drivers should call this a whole number of times per frame with a
    /// fixed `dt` rather than passing the frame time.
    pub fn step(&mut self, dt: f64, iterations: usize) {
        let grid = self.grid;
        let damping = self.config.edge_damping;
        let h = self.config.cell_spacing;

        self.current ^= 1;
        let (next, prev) = split_arenas(&mut self.arenas, self.current);

        for ((axis, dest), src) in Axis::VELOCITY.iter().zip(next.iter_mut()).zip(prev.iter()) {
            advect(&grid, dest, src, prev, *axis, dt, damping);
        }

        let divergence_advected = mean_abs_divergence(&grid, next, h);

        let projection = Projection {
            cell_spacing: h,
            edge_damping: damping,
            relaxation: &self.config.relaxation,
            iterations,
        };
        project(&grid, next, &mut self.pressure, &mut self.divergence, &projection);

        let clamped = clamp_velocities(next, self.config.speed_limit);
        let divergence_projected = mean_abs_divergence(&grid, next, h);

        self.last_step = StepStats {
            divergence_advected,
            divergence_projected,
            clamped,
        };

        log::trace!(
            "step dt={} iterations={} divergence {:.3e} -> {:.3e}",
            dt,
            iterations,
            divergence_advected,
            divergence_projected
        );
        if clamped > 0 {
            log::warn!("clamped {} unstable velocity values", clamped);
        }
    }

    /// Interpolated velocity component at `pos`. `pos.z` is ignored on planar grids.
    pub fn sample(&self, pos: Vector3<f64>, axis: Axis) -> Result<f64> {
        let component = self.component(axis)?;
        let p = to_index_space(pos)?;

        Ok(interpolate_linear(&self.grid, component, p))
    }

    /// Interpolated velocity vector at `pos`; `z` is 0 on planar grids.
    pub fn sample_velocity(&self, pos: Vector3<f64>) -> Result<Vector3<f64>> {
        let p = to_index_space(pos)?;
        let mut v = [0.0; 3];
        for (e, component) in v.iter_mut().zip(self.arenas[self.current].iter()) {
            *e = interpolate_linear(&self.grid, component, p);
        }

        Ok(vec3(v[0], v[1], v[2]))
    }

    /// Add `delta` to every interior cell whose centre lies closer than
    /// `radius` to `center`, scaled by `1 - distance / radius`.
    ///
    /// Distances wrap around on `x` and `z`. The wall rows are never touched:
    /// tangential flow on the walls catches up with the disturbance on the
    /// next [`step`](Self::step), so samples near a wall lag until then.
    pub fn add_disturbance(&mut self, center: Vector3<f64>, radius: f64, delta: Vector3<f64>) -> Result<()> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::InvalidArgument("radius must be finite and positive"));
        }
        if !(finite(center) && finite(delta)) {
            return Err(Error::InvalidArgument("center and delta must be finite"));
        }

        let grid = self.grid;
        let components = &mut self.arenas[self.current];
        let delta = [delta.x, delta.y, delta.z];

        grid.for_each_interior(|x, y, z, k| {
            let dx = wrapped_distance(x as f64 + 0.5 - center.x, grid.size_x());
            let dy = y as f64 + 0.5 - center.y;
            let dz = if grid.is_planar() {
                0.0
            } else {
                wrapped_distance(z as f64 + 0.5 - center.z, grid.size_z())
            };

            let distance = (dx * dx + dy * dy + dz * dz).sqrt();
            if distance >= radius {
                return;
            }

            // Stronger closer to the centre.
            let falloff = 1.0 - distance / radius;
            for (component, d) in components.iter_mut().zip(delta.iter()) {
                component[k] += d * falloff;
            }
        });

        let clamped = clamp_velocities(components, self.config.speed_limit);
        if clamped > 0 {
            log::warn!("clamped {} velocity values after disturbance", clamped);
        }
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn last_step(&self) -> StepStats {
        self.last_step
    }

    /// Raw current buffer of one velocity component.
    pub fn velocity(&self, axis: Axis) -> Result<ArrayView1<'_, f64>> {
        Ok(self.component(axis)?.view())
    }

    /// Current buffer of one velocity component shaped `(size_z, size_y, size_x)`.
    pub fn velocity_grid(&self, axis: Axis) -> Result<ArrayView3<'_, f64>> {
        let component = self.component(axis)?;
        let shape = (self.grid.size_z(), self.grid.size_y(), self.grid.size_x());

        component
            .view()
            .into_shape(shape)
            .map_err(|_| Error::DimensionMismatch {
                expected: self.grid.len(),
                found: component.len(),
            })
    }

    /// Pressure solved during the last step.
    pub fn pressure(&self) -> ArrayView1<'_, f64> {
        self.pressure.view()
    }

    /// Divergence the last pressure solve was run against.
    pub fn divergence(&self) -> ArrayView1<'_, f64> {
        self.divergence.view()
    }

    /// Mean absolute divergence of the current velocity over interior cells.
    pub fn mean_abs_divergence(&self) -> f64 {
        mean_abs_divergence(&self.grid, &self.arenas[self.current], self.config.cell_spacing)
    }

    fn component(&self, axis: Axis) -> Result<&Array1<f64>> {
        let slot = axis.velocity_index()?;
        self.arenas[self.current]
            .get(slot)
            .ok_or(Error::InvalidAxis(axis))
    }
}

fn split_arenas(
    arenas: &mut [Vec<Array1<f64>>; 2],
    current: usize,
) -> (&mut Vec<Array1<f64>>, &Vec<Array1<f64>>) {
    let (a, b) = arenas.split_at_mut(1);
    if current == 0 {
        (&mut a[0], &b[0])
    } else {
        (&mut b[0], &a[0])
    }
}

/// Replace NaN by zero and clamp infinite or runaway values to `limit`.
fn clamp_velocities(components: &mut [Array1<f64>], limit: f64) -> usize {
    let mut clamped = 0;
    for e in components.iter_mut().flat_map(|c| c.iter_mut()) {
        if e.is_nan() {
            *e = 0.0;
            clamped += 1;
        } else if e.abs() > limit {
            *e = limit.copysign(*e);
            clamped += 1;
        }
    }
    clamped
}

fn to_index_space(pos: Vector3<f64>) -> Result<Vector3<f64>> {
    if !finite(pos) {
        return Err(Error::InvalidArgument("position must be finite"));
    }
    Ok(pos - vec3(0.5, 0.5, 0.5))
}

fn finite(v: Vector3<f64>) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

fn wrapped_distance(d: f64, size: usize) -> f64 {
    let n = size as f64;
    let d = d.rem_euclid(n);
    d.min(n - d)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_buffers_swap_without_reallocation() {
        let grid = Grid::planar(6, 5).unwrap();
        let mut field = VelocityField::new(grid, FieldConfig::default()).unwrap();
        let ptrs: Vec<*const f64> = field
            .arenas
            .iter()
            .flat_map(|a| a.iter().map(|c| c.as_ptr()))
            .collect();

        for i in 1..=3 {
            field.step(0.1, 4);
            assert_eq!(field.current, i % 2);
        }

        let after: Vec<*const f64> = field
            .arenas
            .iter()
            .flat_map(|a| a.iter().map(|c| c.as_ptr()))
            .collect();
        assert_eq!(ptrs, after);
        assert!(field.arenas.iter().flatten().all(|c| c.len() == grid.len()));
    }

    #[test]
    fn test_clamp_velocities() {
        let mut components = vec![Array1::from(vec![f64::NAN, 1.0, f64::INFINITY, -5.0])];

        assert_eq!(clamp_velocities(&mut components, 2.0), 3);
        assert_eq!(components[0], Array1::from(vec![0.0, 1.0, 2.0, -2.0]));
    }

    #[test]
    fn test_wrapped_distance() {
        assert_abs_diff_eq!(wrapped_distance(0.5, 4), 0.5);
        assert_abs_diff_eq!(wrapped_distance(3.5, 4), 0.5);
        assert_abs_diff_eq!(wrapped_distance(-3.5, 4), 0.5);
        assert_abs_diff_eq!(wrapped_distance(2.0, 4), 2.0);
    }

    #[test]
    fn test_non_finite_step_is_contained() {
        let grid = Grid::planar(6, 5).unwrap();
        let mut field = VelocityField::new(grid, FieldConfig::default()).unwrap();
        field
            .add_disturbance(vec3(3.0, 2.5, 0.0), 2.0, vec3(1.0, 0.5, 0.0))
            .unwrap();

        field.step(f64::NAN, 4);

        assert!(field.last_step().clamped > 0);
        for axis in [Axis::X, Axis::Y].iter() {
            assert!(field.velocity(*axis).unwrap().iter().all(|e| e.is_finite()));
        }
        let v = field.sample_velocity(vec3(1.0, 2.0, 0.0)).unwrap();
        assert!(v.x.is_finite() && v.y.is_finite());
    }
}
