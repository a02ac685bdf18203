//! Reader for Gaussian cube files
//!
//! The layout is two comment lines, a line holding the atom count and the grid origin, three axis
//! lines `n vx vy vz`, one record per atom and finally the volumetric data with `z` varying fastest.
//! A negative count on the first axis line means every length in the header is in Ångström,
//! otherwise lengths are in Bohr.

use crate::constants::BOHR_TO_ANGSTROM;
use crate::error::FieldError;
use nalgebra::{Point3, Vector3};
use ndarray::Array3;

/// A parsed cube grid, with lengths converted to Ångström
#[derive(Debug)]
pub(crate) struct Cube {
    pub(crate) origin: Point3<f64>,
    pub(crate) spacing: Vector3<f64>,
    pub(crate) values: Array3<f64>,
}

struct HeaderLine {
    count: i64,
    vector: [f64; 3],
}

fn parse_header_line(line: Option<(usize, &str)>) -> Result<HeaderLine, FieldError> {
    let (idx, line) = line.ok_or_else(|| FieldError::Parse {
        line: 0,
        message: "unexpected end of file in the header".into(),
    })?;
    let number = idx + 1;
    let mut fields = line.split_whitespace();
    let count = fields
        .next()
        .ok_or_else(|| FieldError::Parse {
            line: number,
            message: "empty header line".into(),
        })?
        .parse::<i64>()
        .map_err(|e| FieldError::Parse {
            line: number,
            message: e.to_string(),
        })?;
    let mut vector = [0_f64; 3];
    for component in vector.iter_mut() {
        *component = fields
            .next()
            .ok_or_else(|| FieldError::Parse {
                line: number,
                message: "expected three coordinates".into(),
            })?
            .parse::<f64>()
            .map_err(|e| FieldError::Parse {
                line: number,
                message: e.to_string(),
            })?;
    }
    Ok(HeaderLine { count, vector })
}

pub(crate) fn parse(contents: &str) -> Result<Cube, FieldError> {
    let mut lines = contents.lines().enumerate();
    // Two free-form comment lines
    lines.next();
    lines.next();

    let atoms = parse_header_line(lines.next())?;
    let axes = [
        parse_header_line(lines.next())?,
        parse_header_line(lines.next())?,
        parse_header_line(lines.next())?,
    ];

    let unit = if axes[0].count < 0 {
        1_f64
    } else {
        BOHR_TO_ANGSTROM
    };
    let origin = Point3::from(Vector3::from(atoms.vector) * unit);

    let mut spacing = Vector3::zeros();
    let mut shape = [0_usize; 3];
    for (axis, line) in axes.iter().enumerate() {
        shape[axis] = line.count.unsigned_abs() as usize;
        spacing[axis] = line.vector[axis] * unit;
        if line
            .vector
            .iter()
            .enumerate()
            .any(|(component, value)| component != axis && *value != 0_f64)
        {
            tracing::warn!(
                "Axis {} of the cube grid is not aligned with the coordinate axes, off-diagonal components are ignored",
                axis
            );
        }
        if !(spacing[axis] > 0_f64) {
            return Err(FieldError::Spacing {
                axis,
                spacing: spacing[axis],
            });
        }
    }

    for _ in 0..atoms.count.unsigned_abs() {
        lines.next().ok_or_else(|| FieldError::Parse {
            line: 0,
            message: "unexpected end of file in the atom records".into(),
        })?;
    }

    let mut data = Vec::with_capacity(shape.iter().product());
    for (idx, line) in lines {
        for token in line.split_whitespace() {
            data.push(token.parse::<f64>().map_err(|e| FieldError::Parse {
                line: idx + 1,
                message: e.to_string(),
            })?);
        }
    }

    let expected = shape.iter().product();
    if data.len() != expected {
        return Err(FieldError::Shape {
            expected,
            found: data.len(),
        });
    }
    let values = Array3::from_shape_vec((shape[0], shape[1], shape[2]), data).map_err(|e| {
        FieldError::Parse {
            line: 0,
            message: e.to_string(),
        }
    })?;

    tracing::debug!(
        "Read a {}x{}x{} cube grid with origin {:?}",
        shape[0],
        shape[1],
        shape[2],
        origin
    );

    Ok(Cube {
        origin,
        spacing,
        values,
    })
}
