use crate::boundary::correct_edges;
use crate::{Axis, Grid, Relaxation};
use ndarray::Array1;

/// Successive over-relaxation of `p` toward `-laplacian(p) = b`.
///
/// Runs exactly `iterations` in-place sweeps over the interior rows, each
/// followed by the `Undefined` edge rule. There is no convergence check:
/// 4-10 sweeps are fine for real time, upwards of 20 for accuracy.
pub fn lin_solve_sor(
    grid: &Grid,
    p: &mut Array1<f64>,
    b: &Array1<f64>,
    relaxation: &Relaxation,
    iterations: usize,
) {
    assert_eq!(p.len(), grid.len());
    assert_eq!(b.len(), grid.len());

    let neighbors = 2.0 * grid.dimensions() as f64;

    for sweep in 0..iterations {
        let w = relaxation.weight(sweep);

        grid.for_each_interior(|x, y, z, k| {
            let sum = neighbor_sum(grid, p, x, y, z);
            let delta = w * ((sum + b[k]) / neighbors - p[k]);
            p[k] += delta;
        });

        correct_edges(grid, Axis::Undefined, p, 1.0);
    }
}

#[inline]
fn neighbor_sum(grid: &Grid, p: &Array1<f64>, x: usize, y: usize, z: usize) -> f64 {
    let (xl, xr) = grid.x_neighbors(x);
    let mut sum = p[grid.index(xl, y, z)]
        + p[grid.index(xr, y, z)]
        + p[grid.index(x, y - 1, z)]
        + p[grid.index(x, y + 1, z)];

    if !grid.is_planar() {
        let (zb, zf) = grid.z_neighbors(z);
        sum += p[grid.index(x, y, zb)] + p[grid.index(x, y, zf)];
    }
    sum
}

/// Largest absolute residual of `-laplacian(p) = b` over interior cells.
pub fn residual(grid: &Grid, p: &Array1<f64>, b: &Array1<f64>) -> f64 {
    let neighbors = 2.0 * grid.dimensions() as f64;
    let mut err = 0.0f64;

    grid.for_each_interior(|x, y, z, k| {
        let sum = neighbor_sum(grid, p, x, y, z);
        err = err.max((neighbors * p[k] - sum - b[k]).abs());
    });

    err
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    // Sums to zero, so the wall/wrap problem has a solution.
    fn source(grid: &Grid) -> Array1<f64> {
        let tau = std::f64::consts::PI * 2.0;
        let (nx, nz) = (grid.size_x() as f64, grid.size_z() as f64);
        let mut b = Array1::zeros(grid.len());
        grid.for_each_interior(|x, y, z, k| {
            b[k] = (tau * x as f64 / nx).sin() * y as f64;
            if !grid.is_planar() {
                b[k] += (tau * z as f64 / nz).cos();
            }
        });
        b
    }

    #[test]
    fn test_zero_iterations_is_noop() {
        let grid = Grid::planar(4, 4).unwrap();
        let mut p = Array1::from_elem(grid.len(), 0.25);
        let b = source(&grid);

        lin_solve_sor(&grid, &mut p, &b, &Relaxation::default(), 0);

        assert!(p.iter().all(|&e| e == 0.25));
    }

    #[test]
    fn test_zero_source_stays_zero() {
        let grid = Grid::volumetric(4, 5, 3).unwrap();
        let mut p = Array1::zeros(grid.len());
        let b = Array1::zeros(grid.len());

        lin_solve_sor(&grid, &mut p, &b, &Relaxation::default(), 20);

        assert!(p.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_single_sweep_planar() {
        let grid = Grid::planar(3, 3).unwrap();
        let mut p = Array1::zeros(grid.len());
        let mut b = Array1::zeros(grid.len());
        b[grid.index(0, 1, 0)] = 4.0;
        let relaxation = Relaxation {
            initial: 1.0,
            floor: 1.0,
            decay: 0.0,
        };

        lin_solve_sor(&grid, &mut p, &b, &relaxation, 1);

        // plain Gauss-Seidel: (0 + 4) / 4, then the neighbour sees it
        assert_abs_diff_eq!(p[grid.index(0, 1, 0)], 1.0);
        assert_abs_diff_eq!(p[grid.index(1, 1, 0)], 0.25);
        assert_abs_diff_eq!(p[grid.index(2, 1, 0)], (1.0 + 0.25) / 4.0);
        // wall rows copy the interior
        assert_abs_diff_eq!(p[grid.index(0, 0, 0)], 1.0);
        assert_abs_diff_eq!(p[grid.index(0, 2, 0)], 1.0);
    }

    #[test]
    fn test_more_sweeps_reduce_residual() {
        for grid in [Grid::planar(8, 8).unwrap(), Grid::volumetric(6, 6, 6).unwrap()].iter() {
            let b = source(grid);

            let mut few = Array1::zeros(grid.len());
            lin_solve_sor(grid, &mut few, &b, &Relaxation::default(), 4);
            let mut many = Array1::zeros(grid.len());
            lin_solve_sor(grid, &mut many, &b, &Relaxation::default(), 200);

            assert!(residual(grid, &many, &b) < residual(grid, &few, &b));
            assert!(residual(grid, &many, &b) < 1e-6);
        }
    }
}
