use crate::boundary::correct_edges;
use crate::interp::interpolate_linear;
use crate::{Axis, Grid};
use cgmath::vec3;
use ndarray::Array1;

/// Semi-Lagrangian advection of one velocity component.
///
/// Every interior cell of `dest` receives `src` sampled at the point the flow
/// `velocity` (the full previous-step vector, one array per component) carries
/// to the cell centre in `dt`. The edges of `dest` are then corrected for `axis`.
pub fn advect(
    grid: &Grid,
    dest: &mut Array1<f64>,
    src: &Array1<f64>,
    velocity: &[Array1<f64>],
    axis: Axis,
    dt: f64,
    edge_damping: f64,
) {
    assert_eq!(dest.len(), grid.len());
    assert_eq!(src.len(), grid.len());
    assert_eq!(velocity.len(), grid.dimensions());

    grid.for_each_interior(|x, y, z, k| {
        let w = if grid.is_planar() { 0.0 } else { velocity[2][k] };
        let from = vec3(
            x as f64 - dt * velocity[0][k],
            y as f64 - dt * velocity[1][k],
            z as f64 - dt * w,
        );

        dest[k] = interpolate_linear(grid, src, from);
    });

    correct_edges(grid, axis, dest, edge_damping);
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_velocity_is_identity_inside() {
        let grid = Grid::planar(5, 5).unwrap();
        let src = Array1::from_shape_fn(grid.len(), |k| k as f64);
        let velocity = vec![Array1::zeros(grid.len()), Array1::zeros(grid.len())];
        let mut dest = Array1::zeros(grid.len());

        advect(&grid, &mut dest, &src, &velocity, Axis::Undefined, 0.1, 0.95);

        grid.for_each_interior(|_, _, _, k| assert_eq!(dest[k], src[k]));
    }

    #[test]
    fn test_uniform_flow_shifts_and_wraps() {
        let grid = Grid::planar(4, 4).unwrap();
        let mut src = Array1::zeros(grid.len());
        for y in 0..4 {
            src[grid.index(0, y, 0)] = 1.0;
        }
        // one cell per unit time to the right
        let velocity = vec![
            Array1::from_elem(grid.len(), 1.0),
            Array1::zeros(grid.len()),
        ];
        let mut dest = Array1::zeros(grid.len());

        advect(&grid, &mut dest, &src, &velocity, Axis::Undefined, 0.5, 1.0);

        for y in grid.interior_rows() {
            // x = 0 samples at -0.5, half from the wrapped last column
            assert_abs_diff_eq!(dest[grid.index(0, y, 0)], 0.5);
            assert_abs_diff_eq!(dest[grid.index(1, y, 0)], 0.5);
            assert_abs_diff_eq!(dest[grid.index(2, y, 0)], 0.0);
            assert_abs_diff_eq!(dest[grid.index(3, y, 0)], 0.0);
        }
    }

    #[test]
    fn test_backtrace_uses_full_vector() {
        let grid = Grid::volumetric(4, 6, 4).unwrap();
        let src = Array1::from_shape_fn(grid.len(), |k| (k as f64 * 0.1).cos());
        let velocity = vec![
            Array1::from_elem(grid.len(), 1.0),
            Array1::from_elem(grid.len(), -2.0),
            Array1::from_elem(grid.len(), 0.5),
        ];
        let mut dest = Array1::zeros(grid.len());

        advect(&grid, &mut dest, &src, &velocity, Axis::Undefined, 0.25, 1.0);

        let k = grid.index(1, 2, 3);
        let expected = interpolate_linear(&grid, &src, vec3(0.75, 2.5, 2.875));
        assert_abs_diff_eq!(dest[k], expected);
    }

    #[test]
    fn test_normal_component_walls() {
        let grid = Grid::planar(4, 5).unwrap();
        let src = Array1::from_elem(grid.len(), 1.0);
        let velocity = vec![Array1::zeros(grid.len()), src.clone()];
        let mut dest = Array1::zeros(grid.len());

        advect(&grid, &mut dest, &src, &velocity, Axis::Y, 0.1, 0.95);

        for x in 0..4 {
            assert_eq!(dest[grid.index(x, 0, 0)], 0.0);
            assert_eq!(dest[grid.index(x, 4, 0)], 0.0);
        }
    }
}
