//! Turns the flat per-bin reduction output into the final D-dimensional
//! statistic grid: reshape over the unstripped `bin_count + 2` slot counts,
//! slice away the outlier sentinels, and reconcile the leading axis with the
//! shape of the caller's value input.

use crate::assign::BinGrid;
use crate::reduce::ResultBuffer;
use ndarray::{Array2, ArrayD, Axis, IxDyn, Slice};
use num_complex::Complex64;

/// The statistic grid. Real for most statistics; complex when complex
/// values flow through a statistic that preserves them.
pub enum StatisticArray {
    Real(ArrayD<f64>),
    Complex(ArrayD<Complex64>),
}

impl StatisticArray {
    pub fn shape(&self) -> &[usize] {
        match self {
            StatisticArray::Real(a) => a.shape(),
            StatisticArray::Complex(a) => a.shape(),
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, StatisticArray::Complex(_))
    }

    pub fn as_real(&self) -> Option<&ArrayD<f64>> {
        match self {
            StatisticArray::Real(a) => Some(a),
            StatisticArray::Complex(_) => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ArrayD<Complex64>> {
        match self {
            StatisticArray::Complex(a) => Some(a),
            StatisticArray::Real(_) => None,
        }
    }
}

pub(crate) fn shape_result(
    buffer: ResultBuffer,
    grid: &BinGrid,
    scalar_values: bool,
) -> StatisticArray {
    match buffer {
        ResultBuffer::Real(flat) => StatisticArray::Real(shape_one(flat, grid, scalar_values)),
        ResultBuffer::Complex(flat) => {
            StatisticArray::Complex(shape_one(flat, grid, scalar_values))
        }
    }
}

fn shape_one<T: Clone>(flat: Array2<T>, grid: &BinGrid, scalar_values: bool) -> ArrayD<T> {
    let vdim = flat.shape()[0];
    let mut full_shape = Vec::with_capacity(1 + grid.n_dims());
    full_shape.push(vdim);
    full_shape.extend_from_slice(grid.slot_counts());
    let full = flat
        .into_shape_with_order(IxDyn(&full_shape))
        .expect("Bug: the reduction buffer disagrees with the bin grid");

    // slice away the two outlier sentinel slots per dimension
    let interior = full
        .slice_each_axis(|ad| {
            if ad.axis.index() == 0 {
                Slice::from(..)
            } else {
                Slice::new(1, Some(-1), 1)
            }
        })
        .to_owned();

    // this can only trip over an implementation defect, never over user
    // input
    let expected = grid.interior_counts();
    assert!(
        interior.shape()[1..] == expected[..],
        "internal shape error: stripped grid is {:?}, declared bin counts are {:?}",
        &interior.shape()[1..],
        expected,
    );

    if scalar_values {
        interior.index_axis_move(Axis(0), 0)
    } else {
        interior
    }
}
