//! Maps every sample point to a flat bin index.
//!
//! Along each dimension, a point lands in one of `bin_count + 2` slots: slot
//! 0 is the below-range sentinel, slots `1..=bin_count` are the interior
//! bins (the interval `[edge_i, edge_{i+1})`, except the last interior bin
//! which also includes its upper edge), and slot `bin_count + 1` is the
//! above-range sentinel. The per-dimension slots are then linearized in
//! row-major order over the `bin_count_d + 2` slot counts.

use crate::error::Error;
use crate::input::Sample;
use ndarray::{Array2, ArrayView2};

/// The slot-count geometry of the (unstripped) bin grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BinGrid {
    /// `bin_count_d + 2` per dimension (the two extra slots are the
    /// outlier sentinels)
    slot_counts: Vec<usize>,
}

impl BinGrid {
    pub(crate) fn from_edges(edges: &[Vec<f64>]) -> BinGrid {
        BinGrid {
            slot_counts: edges.iter().map(|e| e.len() + 1).collect(),
        }
    }

    pub(crate) fn n_dims(&self) -> usize {
        self.slot_counts.len()
    }

    pub(crate) fn slot_counts(&self) -> &[usize] {
        &self.slot_counts
    }

    /// the size of the flat index space, `Π(bin_count_d + 2)`
    pub(crate) fn flat_len(&self) -> usize {
        self.slot_counts.iter().product()
    }

    /// the interior bin count per dimension
    pub(crate) fn interior_counts(&self) -> Vec<usize> {
        self.slot_counts.iter().map(|&n| n - 2).collect()
    }

    /// invert the row-major linearization for one flat index
    pub(crate) fn unravel(&self, flat: usize) -> Vec<usize> {
        let mut slots = vec![0_usize; self.n_dims()];
        let mut rest = flat;
        for d in (0..self.n_dims()).rev() {
            slots[d] = rest % self.slot_counts[d];
            rest /= self.slot_counts[d];
        }
        slots
    }
}

/// The compact (flat, linearized) point-to-bin assignment.
///
/// This is the only form that can re-enter a later computation through
/// [`crate::ReuseBundle`]; the expanded form deliberately can't.
#[derive(Clone)]
pub struct CompactBinNumbers {
    flat: Vec<usize>,
    grid: BinGrid,
}

impl CompactBinNumbers {
    /// the number of assigned points
    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// one flat bin index per point
    pub fn flat(&self) -> &[usize] {
        &self.flat
    }

    pub(crate) fn grid(&self) -> &BinGrid {
        &self.grid
    }

    /// unravel every flat index into its per-dimension slot tuple, using the
    /// unstripped (`bin_count + 2`) slot counts
    pub(crate) fn expand(&self) -> ExpandedBinNumbers {
        let n_dims = self.grid.n_dims();
        let mut per_dim = Array2::<usize>::zeros((n_dims, self.flat.len()));
        for (i, &flat) in self.flat.iter().enumerate() {
            for (d, slot) in self.grid.unravel(flat).into_iter().enumerate() {
                per_dim[[d, i]] = slot;
            }
        }
        ExpandedBinNumbers { per_dim }
    }
}

/// The expanded (per-dimension slot tuple) point-to-bin assignment, for
/// callers that want to inspect bin placement dimension by dimension.
pub struct ExpandedBinNumbers {
    /// shape `(D, n_points)`; row `d` holds the slot indices along
    /// dimension `d` (0 and `bin_count + 1` are the outlier sentinels)
    per_dim: Array2<usize>,
}

impl ExpandedBinNumbers {
    pub fn per_dim(&self) -> ArrayView2<'_, usize> {
        self.per_dim.view()
    }
}

/// The point-to-bin assignment returned from a computation.
pub enum BinNumbers {
    Compact(CompactBinNumbers),
    Expanded(ExpandedBinNumbers),
}

/// the slot index of `x` within `edges`: the number of edges at or below
/// `x`, so 0 means below-range and `edges.len()` means above-range (NaN
/// coordinates land above-range)
fn digitize(x: f64, edges: &[f64]) -> usize {
    if x.is_nan() {
        return edges.len();
    }
    edges.partition_point(|&e| e <= x)
}

/// round `x` to `decimal` decimal places
fn round_decimal(x: f64, decimal: i32) -> f64 {
    let scale = 10_f64.powi(decimal);
    (x * scale).round() / scale
}

/// Assign every sample point its flat bin index.
///
/// A coordinate numerically on the last edge (to within a tolerance derived
/// from the smallest edge width) is pulled back into the last interior bin
/// rather than the above-range sentinel; this is what closes the last bin on
/// its upper end.
pub(crate) fn assign_bins(
    sample: &Sample,
    edges: &[Vec<f64>],
) -> Result<CompactBinNumbers, Error> {
    let grid = BinGrid::from_edges(edges);
    let n_points = sample.n_points();
    let mut flat = vec![0_usize; n_points];

    for (d, dim_edges) in edges.iter().enumerate() {
        let min_width = dim_edges
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min);
        if min_width == 0.0 {
            return Err(Error::bin_edge(d, "the smallest edge difference is numerically 0"));
        }
        // the rounding precision used to snap near-boundary coordinates
        // onto the last edge
        let decimal = (-min_width.log10()) as i32 + 6;
        let last_edge = *dim_edges.last().unwrap();
        let last_edge_rounded = round_decimal(last_edge, decimal);
        let n_slots = grid.slot_counts()[d];

        for (i, &x) in sample.coord(d).iter().enumerate() {
            let mut slot = digitize(x, dim_edges);
            if slot == dim_edges.len()
                && !x.is_nan()
                && round_decimal(x, decimal) == last_edge_rounded
            {
                slot -= 1;
            }
            flat[i] = flat[i] * n_slots + slot;
        }
    }

    Ok(CompactBinNumbers { flat, grid })
}
