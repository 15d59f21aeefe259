use crate::grid::wrap_coordinate;
use crate::Grid;
use cgmath::Vector3;
use ndarray::Array1;

/// Linearly interpolate `q` at `p`, given in index space (centre of cell `i` at `i`).
///
/// `y` is clamped to `[0.5, size_y - 1.5]` so the stencil stays on or inside
/// the wall rows; `x` and `z` wrap. Planar grids ignore `p.z`.
pub fn interpolate_linear(grid: &Grid, q: &Array1<f64>, p: Vector3<f64>) -> f64 {
    debug_assert_eq!(q.len(), grid.len());

    let (i0, i1, s1) = wrap_coordinate(p.x, grid.size_x());
    let s0 = 1.0 - s1;

    let y = p.y.max(0.5).min(grid.size_y() as f64 - 1.5);
    let j0 = (y as usize).min(grid.size_y() - 2);
    let j1 = j0 + 1;
    let t1 = y - j0 as f64;
    let t0 = 1.0 - t1;

    let plane = |k: usize| {
        (q[grid.index(i0, j0, k)] * t0 + q[grid.index(i0, j1, k)] * t1) * s0
            + (q[grid.index(i1, j0, k)] * t0 + q[grid.index(i1, j1, k)] * t1) * s1
    };

    if grid.is_planar() {
        return plane(0);
    }

    let (k0, k1, u1) = wrap_coordinate(p.z, grid.size_z());
    let u0 = 1.0 - u1;

    plane(k0) * u0 + plane(k1) * u1
}
