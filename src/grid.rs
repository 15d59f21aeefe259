use crate::{Error, Result};

/// Axis tag used to select a velocity component or a boundary rule.
///
/// `Undefined` only selects the boundary rule for pressure and divergence;
/// it never names a velocity component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    Undefined,
}

impl Axis {
    pub const VELOCITY: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Slot of this axis' velocity component.
    pub fn velocity_index(self) -> Result<usize> {
        match self {
            Axis::X => Ok(0),
            Axis::Y => Ok(1),
            Axis::Z => Ok(2),
            Axis::Undefined => Err(Error::InvalidAxis(self)),
        }
    }
}

/// Cell counts of a field. `x` and `z` wrap around, `y` is bounded by walls.
///
/// A grid with `size_z == 1` is planar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    size_x: usize,
    size_y: usize,
    size_z: usize,
}

impl Grid {
    pub fn planar(size_x: usize, size_y: usize) -> Result<Self> {
        Self::volumetric(size_x, size_y, 1)
    }

    pub fn volumetric(size_x: usize, size_y: usize, size_z: usize) -> Result<Self> {
        let invalid = Error::InvalidDimensions {
            size_x,
            size_y,
            size_z,
        };

        if size_x < 2 || size_y < 3 || size_z < 1 {
            return Err(invalid);
        }
        size_x
            .checked_mul(size_y)
            .and_then(|n| n.checked_mul(size_z))
            .ok_or(invalid)?;

        Ok(Self {
            size_x,
            size_y,
            size_z,
        })
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }

    pub fn size_y(&self) -> usize {
        self.size_y
    }

    pub fn size_z(&self) -> usize {
        self.size_z
    }

    pub fn is_planar(&self) -> bool {
        self.size_z == 1
    }

    /// Number of velocity components: 2 for planar grids, 3 otherwise.
    pub fn dimensions(&self) -> usize {
        if self.is_planar() {
            2
        } else {
            3
        }
    }

    /// Length of every buffer belonging to this grid.
    pub fn len(&self) -> usize {
        self.size_x * self.size_y * self.size_z
    }

    /// Linear offset of a cell. Coordinates must already be wrapped/clamped.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.size_x + z * self.size_x * self.size_y
    }

    /// Previous and next column on the wrap-around x axis.
    #[inline]
    pub fn x_neighbors(&self, x: usize) -> (usize, usize) {
        wrap_pair(x, self.size_x)
    }

    /// Previous and next layer on the wrap-around z axis.
    #[inline]
    pub fn z_neighbors(&self, z: usize) -> (usize, usize) {
        wrap_pair(z, self.size_z)
    }

    /// Flat indices of the cells before and after `(x, y, z)` along `axis`.
    ///
    /// `x` and `z` wrap around; `y` must be an interior row. `Axis::Undefined`
    /// has no direction and yields `None`.
    #[inline]
    pub fn neighbors(&self, axis: Axis, x: usize, y: usize, z: usize) -> Option<(usize, usize)> {
        match axis {
            Axis::X => {
                let (xl, xr) = self.x_neighbors(x);
                Some((self.index(xl, y, z), self.index(xr, y, z)))
            }
            Axis::Y => Some((self.index(x, y - 1, z), self.index(x, y + 1, z))),
            Axis::Z => {
                let (zb, zf) = self.z_neighbors(z);
                Some((self.index(x, y, zb), self.index(x, y, zf)))
            }
            Axis::Undefined => None,
        }
    }

    /// Rows strictly between the two walls.
    pub fn interior_rows(&self) -> std::ops::Range<usize> {
        1..self.size_y - 1
    }

    /// Number of cells in the interior rows.
    pub fn interior_len(&self) -> usize {
        self.size_x * (self.size_y - 2) * self.size_z
    }

    /// Visit every interior cell as `(x, y, z, index)`, x fastest.
    pub fn for_each_interior<F: FnMut(usize, usize, usize, usize)>(&self, mut f: F) {
        for z in 0..self.size_z {
            for y in self.interior_rows() {
                for x in 0..self.size_x {
                    f(x, y, z, self.index(x, y, z));
                }
            }
        }
    }
}

#[inline]
fn wrap_pair(i: usize, n: usize) -> (usize, usize) {
    let prev = if i == 0 { n - 1 } else { i - 1 };
    let next = if i + 1 == n { 0 } else { i + 1 };
    (prev, next)
}

/// Wrap a continuous coordinate into `[0, size)`, returning the cell pair
/// `(i0, i1)` and the weight of `i1`.
#[inline]
pub(crate) fn wrap_coordinate(v: f64, size: usize) -> (usize, usize, f64) {
    let n = size as f64;
    let v = v.rem_euclid(n);
    // rem_euclid may round up to n for tiny negative inputs.
    let v = if v >= n { 0.0 } else { v };

    let i0 = (v as usize).min(size - 1);
    let i1 = if i0 + 1 == size { 0 } else { i0 + 1 };

    (i0, i1, v - i0 as f64)
}
