//! Groups the value rows by flat bin index and computes the requested
//! aggregate per bin, per value component.
//!
//! The output representation (real vs complex) is negotiated exactly once,
//! before any grouping work: complex values promote mean/nanmean/sum/custom
//! output to complex, count and std always produce real output, and the
//! ordering statistics (median/min/max) reject complex input outright. The
//! one exception is a custom reducer that unexpectedly produces a complex
//! value from real input; that reallocates the buffer and reruns the pass,
//! once.

use crate::assign::CompactBinNumbers;
use crate::error::Error;
use crate::input::{ValueData, Values};
use crate::statistic::{CustomReducer, NamedStatistic, StatValue, Statistic};
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

/// the dense per-bin output over the full (unstripped) flat index space,
/// with shape `(Vdim, Π(bin_count_d + 2))`
pub(crate) enum ResultBuffer {
    Real(Array2<f64>),
    Complex(Array2<Complex64>),
}

/// the element-level operations shared by the real and complex reduction
/// paths
trait Element:
    Copy + Default + core::ops::AddAssign + core::ops::Div<f64, Output = Self>
{
    fn nan() -> Self;
    fn is_nan(self) -> bool;
    /// the squared distance to `other`, always real (this is what feeds the
    /// std accumulation, `Σ(v - mean)·conj(v - mean)`)
    fn dist_sqr(self, other: Self) -> f64;
}

impl Element for f64 {
    fn nan() -> f64 {
        f64::NAN
    }

    fn is_nan(self) -> bool {
        self.is_nan()
    }

    fn dist_sqr(self, other: f64) -> f64 {
        (self - other) * (self - other)
    }
}

impl Element for Complex64 {
    fn nan() -> Complex64 {
        Complex64::new(f64::NAN, f64::NAN)
    }

    fn is_nan(self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }

    fn dist_sqr(self, other: Complex64) -> f64 {
        (self - other).norm_sqr()
    }
}

/// Compute the requested statistic over the full flat bin-index space.
///
/// `values` may only be `None` for the count statistic. All argument
/// validation (value lengths, statistic-name resolution) happens before
/// this point.
pub(crate) fn reduce(
    statistic: &Statistic,
    values: Option<&Values>,
    binnumbers: &CompactBinNumbers,
) -> Result<ResultBuffer, Error> {
    if statistic.is_count() {
        return Ok(reduce_count(values, binnumbers));
    }
    let values = values.ok_or_else(|| Error::missing_values(statistic.label()))?;
    match statistic {
        Statistic::Named(named) => reduce_named(*named, values, binnumbers),
        Statistic::Custom(reducer) => match values.data() {
            ValueData::Real(rows) => custom_real(*reducer, rows, binnumbers),
            ValueData::Complex(rows) => custom_complex(*reducer, rows, binnumbers),
        },
    }
}

fn reduce_named(
    named: NamedStatistic,
    values: &Values,
    binnumbers: &CompactBinNumbers,
) -> Result<ResultBuffer, Error> {
    use NamedStatistic::*;
    match (named, values.data()) {
        (Mean, ValueData::Real(rows)) => Ok(ResultBuffer::Real(mean_grid(rows, binnumbers))),
        (Mean, ValueData::Complex(rows)) => Ok(ResultBuffer::Complex(mean_grid(rows, binnumbers))),
        (NanMean, ValueData::Real(rows)) => Ok(ResultBuffer::Real(nanmean_grid(rows, binnumbers))),
        (NanMean, ValueData::Complex(rows)) => {
            Ok(ResultBuffer::Complex(nanmean_grid(rows, binnumbers)))
        }
        (Sum, ValueData::Real(rows)) => Ok(ResultBuffer::Real(sum_grid(rows, binnumbers))),
        (Sum, ValueData::Complex(rows)) => Ok(ResultBuffer::Complex(sum_grid(rows, binnumbers))),
        // the std of complex values is still real
        (Std, ValueData::Real(rows)) => Ok(ResultBuffer::Real(std_grid(rows, binnumbers))),
        (Std, ValueData::Complex(rows)) => Ok(ResultBuffer::Real(std_grid(rows, binnumbers))),
        (Median, ValueData::Real(rows)) => Ok(ResultBuffer::Real(median_grid(rows, binnumbers))),
        (Min, ValueData::Real(rows)) => {
            Ok(ResultBuffer::Real(extremum_grid(rows, binnumbers, true)))
        }
        (Max, ValueData::Real(rows)) => {
            Ok(ResultBuffer::Real(extremum_grid(rows, binnumbers, false)))
        }
        (Median, ValueData::Complex(_)) => Err(Error::complex_ordering("median")),
        (Min, ValueData::Complex(_)) => Err(Error::complex_ordering("min")),
        (Max, ValueData::Complex(_)) => Err(Error::complex_ordering("max")),
        (Count, _) => panic!("Bug: count is dispatched before reduce_named"),
    }
}

/// the number of points per flat bin
fn flat_counts(binnumbers: &CompactBinNumbers) -> Vec<usize> {
    let mut counts = vec![0_usize; binnumbers.grid().flat_len()];
    for &b in binnumbers.flat() {
        counts[b] += 1;
    }
    counts
}

/// the per-bin sums of one value row
fn flat_sums<T: Element>(binnumbers: &CompactBinNumbers, row: ndarray::ArrayView1<T>) -> Vec<T> {
    let mut sums = vec![T::default(); binnumbers.grid().flat_len()];
    for (&b, &v) in binnumbers.flat().iter().zip(row.iter()) {
        sums[b] += v;
    }
    sums
}

fn reduce_count(values: Option<&Values>, binnumbers: &CompactBinNumbers) -> ResultBuffer {
    let flat_len = binnumbers.grid().flat_len();
    let vdim = values.map_or(1, Values::n_components);
    let counts = flat_counts(binnumbers);
    let mut out = Array2::<f64>::zeros((vdim, flat_len));
    for vv in 0..vdim {
        for (b, &c) in counts.iter().enumerate() {
            out[[vv, b]] = c as f64;
        }
    }
    ResultBuffer::Real(out)
}

fn sum_grid<T: Element>(rows: &ArrayView2<T>, binnumbers: &CompactBinNumbers) -> Array2<T> {
    let flat_len = binnumbers.grid().flat_len();
    let vdim = rows.shape()[0];
    let mut out = Array2::<T>::default((vdim, flat_len));
    for vv in 0..vdim {
        let sums = flat_sums(binnumbers, rows.row(vv));
        for (b, &s) in sums.iter().enumerate() {
            out[[vv, b]] = s;
        }
    }
    out
}

fn mean_grid<T: Element>(rows: &ArrayView2<T>, binnumbers: &CompactBinNumbers) -> Array2<T> {
    let flat_len = binnumbers.grid().flat_len();
    let vdim = rows.shape()[0];
    let counts = flat_counts(binnumbers);
    let mut out = Array2::from_elem((vdim, flat_len), T::nan());
    for vv in 0..vdim {
        let sums = flat_sums(binnumbers, rows.row(vv));
        for b in 0..flat_len {
            if counts[b] > 0 {
                out[[vv, b]] = sums[b] / counts[b] as f64;
            }
        }
    }
    out
}

fn nanmean_grid<T: Element>(rows: &ArrayView2<T>, binnumbers: &CompactBinNumbers) -> Array2<T> {
    let flat_len = binnumbers.grid().flat_len();
    let vdim = rows.shape()[0];
    let mut out = Array2::from_elem((vdim, flat_len), T::nan());
    for vv in 0..vdim {
        let mut sums = vec![T::default(); flat_len];
        let mut counts = vec![0_usize; flat_len];
        for (&b, &v) in binnumbers.flat().iter().zip(rows.row(vv).iter()) {
            if v.is_nan() {
                continue;
            }
            sums[b] += v;
            counts[b] += 1;
        }
        for b in 0..flat_len {
            if counts[b] > 0 {
                out[[vv, b]] = sums[b] / counts[b] as f64;
            }
        }
    }
    out
}

/// population std (ddof = 0); bins holding 0 or 1 points come out as 0
fn std_grid<T: Element>(rows: &ArrayView2<T>, binnumbers: &CompactBinNumbers) -> Array2<f64> {
    let flat_len = binnumbers.grid().flat_len();
    let vdim = rows.shape()[0];
    let counts = flat_counts(binnumbers);
    let mut out = Array2::<f64>::zeros((vdim, flat_len));
    for vv in 0..vdim {
        let row = rows.row(vv);
        let sums = flat_sums(binnumbers, row);
        let means: Vec<T> = sums
            .iter()
            .zip(&counts)
            .map(|(&s, &c)| if c > 0 { s / c as f64 } else { T::default() })
            .collect();
        let mut ssd = vec![0.0_f64; flat_len];
        for (&b, &v) in binnumbers.flat().iter().zip(row.iter()) {
            ssd[b] += v.dist_sqr(means[b]);
        }
        for b in 0..flat_len {
            if counts[b] > 0 {
                out[[vv, b]] = (ssd[b] / counts[b] as f64).sqrt();
            }
        }
    }
    out
}

fn extremum_grid(
    rows: &ArrayView2<f64>,
    binnumbers: &CompactBinNumbers,
    take_min: bool,
) -> Array2<f64> {
    let flat_len = binnumbers.grid().flat_len();
    let vdim = rows.shape()[0];
    let mut out = Array2::from_elem((vdim, flat_len), f64::NAN);
    for vv in 0..vdim {
        for (&b, &v) in binnumbers.flat().iter().zip(rows.row(vv).iter()) {
            // NaN values never become the extremum
            if v.is_nan() {
                continue;
            }
            let cur = out[[vv, b]];
            if cur.is_nan() || (take_min && v < cur) || (!take_min && v > cur) {
                out[[vv, b]] = v;
            }
        }
    }
    out
}

fn median_grid(rows: &ArrayView2<f64>, binnumbers: &CompactBinNumbers) -> Array2<f64> {
    let flat_len = binnumbers.grid().flat_len();
    let vdim = rows.shape()[0];
    let groups = BinGroups::new(binnumbers);
    let mut out = Array2::from_elem((vdim, flat_len), f64::NAN);
    for vv in 0..vdim {
        let row = rows.row(vv);
        for b in 0..flat_len {
            let members = groups.members(b);
            if members.is_empty() {
                continue;
            }
            let mut vals: Vec<f64> = members.iter().map(|&i| row[i]).collect();
            vals.sort_unstable_by(f64::total_cmp);
            let n = vals.len();
            out[[vv, b]] = if n % 2 == 1 {
                vals[n / 2]
            } else {
                0.5 * (vals[n / 2 - 1] + vals[n / 2])
            };
        }
    }
    out
}

fn custom_real(
    reducer: &dyn CustomReducer,
    rows: &ArrayView2<f64>,
    binnumbers: &CompactBinNumbers,
) -> Result<ResultBuffer, Error> {
    let flat_len = binnumbers.grid().flat_len();
    let vdim = rows.shape()[0];
    let groups = BinGroups::new(binnumbers);

    // the empty-bin fill value: whatever the reducer makes of an empty
    // sequence, or NaN if it declines
    let null = reducer.reduce(&[]).unwrap_or(StatValue::Real(f64::NAN));

    if let StatValue::Real(null_real) = null {
        let mut out = Array2::from_elem((vdim, flat_len), null_real);
        let mut promote = false;
        'pass: for vv in 0..vdim {
            let row = rows.row(vv);
            for b in 0..flat_len {
                let members = groups.members(b);
                if members.is_empty() {
                    continue;
                }
                let vals: Vec<f64> = members.iter().map(|&i| row[i]).collect();
                match reducer.reduce(&vals) {
                    Some(StatValue::Real(x)) => out[[vv, b]] = x,
                    Some(StatValue::Complex(_)) => {
                        promote = true;
                        break 'pass;
                    }
                    None => return Err(Error::custom_reducer(b, vals.len())),
                }
            }
        }
        if !promote {
            return Ok(ResultBuffer::Real(out));
        }
    }

    // the reducer produced a complex value (or a complex empty fill), so
    // rerun the pass with a complex buffer. This happens at most once.
    let mut out = Array2::from_elem((vdim, flat_len), null.as_complex());
    for vv in 0..vdim {
        let row = rows.row(vv);
        for b in 0..flat_len {
            let members = groups.members(b);
            if members.is_empty() {
                continue;
            }
            let vals: Vec<f64> = members.iter().map(|&i| row[i]).collect();
            match reducer.reduce(&vals) {
                Some(v) => out[[vv, b]] = v.as_complex(),
                None => return Err(Error::custom_reducer(b, vals.len())),
            }
        }
    }
    Ok(ResultBuffer::Complex(out))
}

fn custom_complex(
    reducer: &dyn CustomReducer,
    rows: &ArrayView2<Complex64>,
    binnumbers: &CompactBinNumbers,
) -> Result<ResultBuffer, Error> {
    let flat_len = binnumbers.grid().flat_len();
    let vdim = rows.shape()[0];
    let groups = BinGroups::new(binnumbers);

    let null = reducer
        .reduce_complex(&[])
        .unwrap_or(Complex64::new(f64::NAN, f64::NAN));
    let mut out = Array2::from_elem((vdim, flat_len), null);
    for vv in 0..vdim {
        let row = rows.row(vv);
        for b in 0..flat_len {
            let members = groups.members(b);
            if members.is_empty() {
                continue;
            }
            let vals: Vec<Complex64> = members.iter().map(|&i| row[i]).collect();
            match reducer.reduce_complex(&vals) {
                Some(z) => out[[vv, b]] = z,
                None => return Err(Error::custom_reducer(b, vals.len())),
            }
        }
    }
    Ok(ResultBuffer::Complex(out))
}

/// Point indices grouped by flat bin (a counting sort). Only the paths that
/// need each bin's full value sequence (median, custom reducers) build one.
struct BinGroups {
    /// `offsets[b]..offsets[b + 1]` delimits bin `b`'s slice of `order`
    offsets: Vec<usize>,
    order: Vec<usize>,
}

impl BinGroups {
    fn new(binnumbers: &CompactBinNumbers) -> BinGroups {
        let flat_len = binnumbers.grid().flat_len();
        let mut offsets = vec![0_usize; flat_len + 1];
        for &b in binnumbers.flat() {
            offsets[b + 1] += 1;
        }
        for b in 0..flat_len {
            offsets[b + 1] += offsets[b];
        }
        let mut cursor = offsets.clone();
        let mut order = vec![0_usize; binnumbers.len()];
        for (i, &b) in binnumbers.flat().iter().enumerate() {
            order[cursor[b]] = i;
            cursor[b] += 1;
        }
        BinGroups { offsets, order }
    }

    fn members(&self, b: usize) -> &[usize] {
        &self.order[self.offsets[b]..self.offsets[b + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::assign_bins;
    use crate::input::Sample;
    use ndarray::{ArrayView1, ArrayView2};

    fn binnumbers_1d(coords: &[f64], edges: Vec<f64>) -> CompactBinNumbers {
        let view = ArrayView2::from_shape((1, coords.len()), coords).unwrap();
        let sample = Sample::new(view).unwrap();
        assign_bins(&sample, &[edges]).unwrap()
    }

    #[test]
    fn grouping_covers_every_point_once() {
        let coords = [0.5, 1.5, 0.6, 2.5, 0.7];
        let binnumbers = binnumbers_1d(&coords, vec![0.0, 1.0, 2.0, 3.0]);
        let groups = BinGroups::new(&binnumbers);

        assert_eq!(groups.members(1), &[0, 2, 4]);
        assert_eq!(groups.members(2), &[1]);
        assert_eq!(groups.members(3), &[3]);
        let total: usize = (0..binnumbers.grid().flat_len())
            .map(|b| groups.members(b).len())
            .sum();
        assert_eq!(total, coords.len());
    }

    #[test]
    fn mean_sum_and_count_agree() {
        let coords = [0.5, 0.6, 1.5];
        let data = [10.0, 30.0, 5.0];
        let binnumbers = binnumbers_1d(&coords, vec![0.0, 1.0, 2.0]);
        let values = Values::real(ArrayView1::from(&data));

        let ValueData::Real(rows) = values.data() else {
            unreachable!()
        };
        let means = mean_grid(rows, &binnumbers);
        let sums = sum_grid(rows, &binnumbers);
        let counts = flat_counts(&binnumbers);

        // slot 1 holds {10, 30}, slot 2 holds {5}, the rest are empty
        assert_eq!(means[[0, 1]], 20.0);
        assert_eq!(means[[0, 2]], 5.0);
        assert!(means[[0, 0]].is_nan());
        assert_eq!(sums[[0, 0]], 0.0);
        assert_eq!(sums[[0, 1]], 40.0);
        assert_eq!(counts, vec![0, 2, 1, 0]);
    }

    #[test]
    fn std_handles_empty_and_singleton_bins() {
        let coords = [0.5, 0.6, 1.5];
        let data = [1.0, 3.0, 7.0];
        let binnumbers = binnumbers_1d(&coords, vec![0.0, 1.0, 2.0]);
        let rows = ArrayView2::from_shape((1, 3), &data).unwrap();

        let stds = std_grid(&rows, &binnumbers);
        assert_eq!(stds[[0, 0]], 0.0); // empty
        assert_eq!(stds[[0, 1]], 1.0); // {1, 3}, population std
        assert_eq!(stds[[0, 2]], 0.0); // singleton
    }

    #[test]
    fn median_of_even_and_odd_bins() {
        let coords = [0.5, 0.6, 0.7, 1.5, 1.6];
        let data = [3.0, 1.0, 2.0, 9.0, 5.0];
        let binnumbers = binnumbers_1d(&coords, vec![0.0, 1.0, 2.0]);
        let rows = ArrayView2::from_shape((1, 5), &data).unwrap();

        let medians = median_grid(&rows, &binnumbers);
        assert_eq!(medians[[0, 1]], 2.0);
        assert_eq!(medians[[0, 2]], 7.0);
        assert!(medians[[0, 0]].is_nan());
    }

    #[test]
    fn extrema_ignore_nan_values() {
        let coords = [0.5, 0.6, 0.7];
        let data = [4.0, f64::NAN, 2.0];
        let binnumbers = binnumbers_1d(&coords, vec![0.0, 1.0]);
        let rows = ArrayView2::from_shape((1, 3), &data).unwrap();

        let mins = extremum_grid(&rows, &binnumbers, true);
        let maxs = extremum_grid(&rows, &binnumbers, false);
        assert_eq!(mins[[0, 1]], 2.0);
        assert_eq!(maxs[[0, 1]], 4.0);
    }

    #[test]
    fn nanmean_excludes_nan_values() {
        let coords = [0.5, 0.6, 1.5];
        let data = [2.0, f64::NAN, f64::NAN];
        let binnumbers = binnumbers_1d(&coords, vec![0.0, 1.0, 2.0]);
        let rows = ArrayView2::from_shape((1, 3), &data).unwrap();

        let out = nanmean_grid(&rows, &binnumbers);
        assert_eq!(out[[0, 1]], 2.0);
        // a bin holding only NaN values stays NaN
        assert!(out[[0, 2]].is_nan());
    }
}
