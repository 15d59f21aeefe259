use crate::Axis;

/// Errors reported by field construction and the caller-facing operations.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Grid sizes that cannot hold a wrap-around axis or an interior row.
    InvalidDimensions {
        size_x: usize,
        size_y: usize,
        size_z: usize,
    },
    /// A supplied buffer (or set of buffers) does not match the grid.
    DimensionMismatch { expected: usize, found: usize },
    /// The axis has no velocity component on this field.
    InvalidAxis(Axis),
    /// A non-finite or out-of-range argument to an operation.
    InvalidArgument(&'static str),
    /// A configuration value outside its valid range.
    InvalidConfig(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidDimensions {
                size_x,
                size_y,
                size_z,
            } => write!(
                f,
                "invalid grid dimensions {}x{}x{} (need x >= 2, y >= 3, z >= 1)",
                size_x, size_y, size_z
            ),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {}, found {}", expected, found)
            }
            Error::InvalidAxis(axis) => write!(f, "no velocity component for axis {:?}", axis),
            Error::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
            Error::InvalidConfig(what) => write!(f, "invalid configuration: {}", what),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
