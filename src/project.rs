use crate::boundary::correct_edges;
use crate::linear::lin_solve_sor;
use crate::{Axis, Grid, Relaxation};
use ndarray::Array1;

/// Negative centred divergence of `velocity`, scaled by the cell spacing `h`,
/// written to the interior rows of `out`.
pub fn divergence(grid: &Grid, velocity: &[Array1<f64>], h: f64, out: &mut Array1<f64>) {
    assert_eq!(velocity.len(), grid.dimensions());
    assert_eq!(out.len(), grid.len());

    grid.for_each_interior(|x, y, z, k| {
        out[k] = -0.5 * h * centred_sum(grid, velocity, x, y, z);
    });
}

/// Mean absolute divergence over the interior cells.
pub fn mean_abs_divergence(grid: &Grid, velocity: &[Array1<f64>], h: f64) -> f64 {
    assert_eq!(velocity.len(), grid.dimensions());

    let mut total = 0.0;
    grid.for_each_interior(|x, y, z, _| {
        total += (0.5 * h * centred_sum(grid, velocity, x, y, z)).abs();
    });

    total / grid.interior_len() as f64
}

fn centred_sum(grid: &Grid, velocity: &[Array1<f64>], x: usize, y: usize, z: usize) -> f64 {
    Axis::VELOCITY
        .iter()
        .zip(velocity)
        .filter_map(|(&axis, component)| {
            grid.neighbors(axis, x, y, z)
                .map(|(before, after)| component[after] - component[before])
        })
        .sum()
}

/// Parameters of one projection pass.
#[derive(Clone, Copy, Debug)]
pub struct Projection<'a> {
    pub cell_spacing: f64,
    pub edge_damping: f64,
    pub relaxation: &'a Relaxation,
    pub iterations: usize,
}

/// Make `velocity` approximately divergence free.
///
/// `pressure` and `div` are scratch buffers; on return they hold the relaxed
/// pressure and the divergence it was solved against. Only a few relaxation
/// sweeps are run, so some divergence remains.
pub fn project(
    grid: &Grid,
    velocity: &mut [Array1<f64>],
    pressure: &mut Array1<f64>,
    div: &mut Array1<f64>,
    params: &Projection,
) {
    assert_eq!(pressure.len(), grid.len());
    let h = params.cell_spacing;

    divergence(grid, velocity, h, div);
    grid.for_each_interior(|_, _, _, k| pressure[k] = 0.0);

    correct_edges(grid, Axis::Undefined, div, params.edge_damping);
    correct_edges(grid, Axis::Undefined, pressure, params.edge_damping);

    lin_solve_sor(grid, pressure, div, params.relaxation, params.iterations);

    let p: &Array1<f64> = pressure;
    for (&axis, component) in Axis::VELOCITY.iter().zip(velocity.iter_mut()) {
        grid.for_each_interior(|x, y, z, k| {
            if let Some((before, after)) = grid.neighbors(axis, x, y, z) {
                component[k] -= 0.5 * (p[after] - p[before]) / h;
            }
        });

        correct_edges(grid, axis, component, params.edge_damping);
    }
}
