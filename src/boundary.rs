//! Edge conditions applied after every pass that only writes interior rows.
//!
//! `x` and `z` wrap around, so their end faces only get friction. The two
//! walls at `y = 0` and `y = size_y - 1` are free-slip: no flow through the
//! wall, tangential flow copies the neighbouring interior row.

use crate::{Axis, Grid};
use ndarray::Array1;

pub fn correct_edges(grid: &Grid, axis: Axis, data: &mut Array1<f64>, edge_damping: f64) {
    assert_eq!(data.len(), grid.len());

    match axis {
        Axis::X => {
            damp_x_faces(grid, data, edge_damping);
            copy_wall_rows(grid, data);
        }
        Axis::Z => {
            damp_z_faces(grid, data, edge_damping);
            copy_wall_rows(grid, data);
        }
        Axis::Y => zero_wall_rows(grid, data),
        Axis::Undefined => copy_wall_rows(grid, data),
    }
}

// Friction on the wrap-around faces keeps a perpetual current from forming.
fn damp_x_faces(grid: &Grid, data: &mut Array1<f64>, damping: f64) {
    let last = grid.size_x() - 1;
    for z in 0..grid.size_z() {
        for y in 0..grid.size_y() {
            data[grid.index(0, y, z)] *= damping;
            data[grid.index(last, y, z)] *= damping;
        }
    }
}

fn damp_z_faces(grid: &Grid, data: &mut Array1<f64>, damping: f64) {
    if grid.is_planar() {
        return;
    }

    let last = grid.size_z() - 1;
    for y in 0..grid.size_y() {
        for x in 0..grid.size_x() {
            data[grid.index(x, y, 0)] *= damping;
            data[grid.index(x, y, last)] *= damping;
        }
    }
}

fn copy_wall_rows(grid: &Grid, data: &mut Array1<f64>) {
    let top = grid.size_y() - 1;
    for z in 0..grid.size_z() {
        for x in 0..grid.size_x() {
            data[grid.index(x, 0, z)] = data[grid.index(x, 1, z)];
            data[grid.index(x, top, z)] = data[grid.index(x, top - 1, z)];
        }
    }
}

fn zero_wall_rows(grid: &Grid, data: &mut Array1<f64>) {
    let top = grid.size_y() - 1;
    for z in 0..grid.size_z() {
        for x in 0..grid.size_x() {
            data[grid.index(x, 0, z)] = 0.0;
            data[grid.index(x, top, z)] = 0.0;
        }
    }
}
