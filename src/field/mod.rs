//! # Field
//!
//! A scalar potential sampled on a regular, axis-aligned grid, typically read from a Gaussian cube
//! file. The field is queried at arbitrary positions in Ångström by trilinear interpolation between
//! the eight surrounding grid nodes. Queries outside the grid, or landing on undefined data, return
//! zero so a field covering only part of a device can be applied to the whole of it.

mod cube;

use crate::error::FieldError;
use crate::hamiltonian::Potential;
use itertools::iproduct;
use nalgebra::{Point3, Vector3};
use ndarray::Array3;
use std::path::Path;
use std::str::FromStr;

#[derive(Clone, Debug)]
/// A potential field on a regular grid
pub struct Field {
    values: Array3<f64>,
    origin: Point3<f64>,
    spacing: Vector3<f64>,
    origin_shift: Vector3<f64>,
    scale: f64,
}

impl Field {
    /// Reads a field from a Gaussian cube file
    pub fn from_cube<P: AsRef<Path>>(path: P) -> Result<Self, FieldError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        tracing::info!("Reading potential field from {}", path.as_ref().display());
        contents.parse()
    }

    /// Wraps an existing grid whose node `[i, j, k]` sits at `origin + (i, j, k) * spacing`
    pub fn from_grid(
        values: Array3<f64>,
        origin: Point3<f64>,
        spacing: Vector3<f64>,
    ) -> Result<Self, FieldError> {
        for (axis, &value) in spacing.iter().enumerate() {
            if !(value > 0_f64) || !value.is_finite() {
                return Err(FieldError::Spacing {
                    axis,
                    spacing: value,
                });
            }
        }
        let (nx, ny, nz) = values.dim();
        if nx * ny * nz == 0 {
            return Err(FieldError::Shape {
                expected: 1,
                found: 0,
            });
        }
        Ok(Self {
            values,
            origin,
            spacing,
            origin_shift: Vector3::zeros(),
            scale: 1_f64,
        })
    }

    /// Multiplies every value returned by the field
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Moves the field: every later query at `r` samples the grid at `r - origin`
    pub fn set_origin(&mut self, origin: Vector3<f64>) {
        self.origin_shift = origin;
    }

    /// The number of grid nodes along each axis
    pub fn shape(&self) -> (usize, usize, usize) {
        self.values.dim()
    }

    /// The interpolated value at `position`, zero outside the grid
    pub fn value_at(&self, position: &Point3<f64>) -> f64 {
        let local = position.coords - self.origin_shift - self.origin.coords;
        let (nx, ny, nz) = self.values.dim();
        let weights = (
            axis_weights(local.x / self.spacing.x, nx),
            axis_weights(local.y / self.spacing.y, ny),
            axis_weights(local.z / self.spacing.z, nz),
        );
        let value = match weights {
            (Some(x), Some(y), Some(z)) => iproduct!(x, y, z)
                .map(|((i, wx), (j, wy), (k, wz))| wx * wy * wz * self.values[[i, j, k]])
                .sum::<f64>(),
            _ => return 0_f64,
        };
        if value.is_nan() {
            return 0_f64;
        }
        self.scale * value
    }

    /// Interpolated values at each of `positions`
    pub fn values_at(&self, positions: &[Point3<f64>]) -> Vec<f64> {
        positions
            .iter()
            .map(|position| self.value_at(position))
            .collect()
    }
}

/// The two bracketing nodes and their linear weights for a fractional grid coordinate
fn axis_weights(coordinate: f64, nodes: usize) -> Option<[(usize, f64); 2]> {
    let last = (nodes - 1) as f64;
    if !(coordinate >= 0_f64 && coordinate <= last) {
        return None;
    }
    if nodes == 1 {
        return Some([(0, 1_f64), (0, 0_f64)]);
    }
    let lower = (coordinate.floor() as usize).min(nodes - 2);
    let fraction = coordinate - lower as f64;
    Some([(lower, 1_f64 - fraction), (lower + 1, fraction)])
}

impl FromStr for Field {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cube = cube::parse(s)?;
        Self::from_grid(cube.values, cube.origin, cube.spacing)
    }
}

impl Potential for Field {
    fn potential(&self, position: &Point3<f64>) -> f64 {
        self.value_at(position)
    }
}
