//! Borrowed views of the caller's coordinate and value data.

use crate::error::Error;
use ndarray::{ArrayView1, ArrayView2, Axis};
use num_complex::Complex64;

/// Collection of sample points.
///
/// We place the following constraints on the contained array:
/// - axis 0 is the slow axis and it corresponds to the coordinate dimension.
/// - axis 1 is the fast axis. The length along this axis coincides with the
///   number of points.
/// - In other words the shape of the array is `(D, n_points)`, where `D` is
///   the number of coordinate dimensions and `n_points` is the number of
///   points. Equivalently: `D` parallel length-`n_points` coordinate
///   sequences.
pub struct Sample<'a> {
    coords: ArrayView2<'a, f64>,
    n_points: usize,
    n_dims: usize,
}

impl<'a> Sample<'a> {
    /// create a new instance from a `(D, n_points)` view
    pub fn new(coords: ArrayView2<'a, f64>) -> Result<Sample<'a>, Error> {
        let n_dims = coords.shape()[0];
        let n_points = coords.shape()[1];
        if n_dims == 0 {
            return Err(Error::dim_count("the sample", 1, 0));
        }
        Ok(Self {
            coords,
            n_points,
            n_dims,
        })
    }

    /// create a new instance from an `(n_points, D)` view (one row per
    /// point), the transpose of the layout [`Sample::new`] expects
    pub fn from_rows(rows: ArrayView2<'a, f64>) -> Result<Sample<'a>, Error> {
        Sample::new(rows.reversed_axes())
    }

    pub fn n_points(&self) -> usize {
        self.n_points
    }

    pub fn n_dims(&self) -> usize {
        self.n_dims
    }

    /// the coordinate sequence along dimension `d`
    pub(crate) fn coord(&self, d: usize) -> ArrayView1<'_, f64> {
        self.coords.index_axis(Axis(0), d)
    }

    pub(crate) fn all_finite(&self) -> bool {
        self.coords.iter().all(|x| x.is_finite())
    }
}

/// the underlying value storage (decided once, before any reduction work)
pub(crate) enum ValueData<'a> {
    Real(ArrayView2<'a, f64>),
    Complex(ArrayView2<'a, Complex64>),
}

/// The value rows that a statistic is computed over.
///
/// Internally this is always a `(Vdim, n_values)` view. A scalar (single
/// row) input is remembered as such, so that the leading shape of the
/// statistic grid can round-trip the caller's input shape: scalar inputs
/// produce a bare `(n_0, ..., n_{D-1})` grid, multi-component inputs a
/// `(Vdim, n_0, ..., n_{D-1})` grid.
pub struct Values<'a> {
    data: ValueData<'a>,
    scalar: bool,
}

impl<'a> Values<'a> {
    /// a single row of real values
    pub fn real(row: ArrayView1<'a, f64>) -> Values<'a> {
        Values {
            data: ValueData::Real(row.insert_axis(Axis(0))),
            scalar: true,
        }
    }

    /// `Vdim` parallel rows of real values, as a `(Vdim, n_values)` view
    pub fn real_components(rows: ArrayView2<'a, f64>) -> Values<'a> {
        Values {
            data: ValueData::Real(rows),
            scalar: false,
        }
    }

    /// a single row of complex values
    pub fn complex(row: ArrayView1<'a, Complex64>) -> Values<'a> {
        Values {
            data: ValueData::Complex(row.insert_axis(Axis(0))),
            scalar: true,
        }
    }

    /// `Vdim` parallel rows of complex values, as a `(Vdim, n_values)` view
    pub fn complex_components(rows: ArrayView2<'a, Complex64>) -> Values<'a> {
        Values {
            data: ValueData::Complex(rows),
            scalar: false,
        }
    }

    /// the number of value components (`Vdim`)
    pub fn n_components(&self) -> usize {
        match &self.data {
            ValueData::Real(v) => v.shape()[0],
            ValueData::Complex(v) => v.shape()[0],
        }
    }

    /// the number of entries per component
    pub fn n_values(&self) -> usize {
        match &self.data {
            ValueData::Real(v) => v.shape()[1],
            ValueData::Complex(v) => v.shape()[1],
        }
    }

    pub(crate) fn data(&self) -> &ValueData<'a> {
        &self.data
    }

    pub(crate) fn is_scalar(&self) -> bool {
        self.scalar
    }
}
