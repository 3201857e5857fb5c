/*!
Computes multidimensional binned statistics: given N points in D-dimensional
coordinate space and one or more rows of associated values, partition the
points into a D-dimensional grid of bins and compute an aggregate statistic
per bin.

A histogram is the special case where the statistic is `"count"`; everything
else (mean, median, sum, std, min, max, nanmean, or a caller-supplied
reducer) generalizes it into an arbitrary-statistic grouping operation.

# High-Level: the pipeline

Every computation runs the same forward-only pipeline:

1. derive per-dimension bin edges (from an integer count plus a coordinate
   range, or an explicit edge list),
2. assign each point a flat bin index (two extra "outlier" sentinel bins per
   dimension catch out-of-range coordinates),
3. group the value rows by flat bin index and reduce each group,
4. reshape the flat per-bin output into the D-dimensional grid, strip the
   sentinels, and reconcile the leading shape with the value input.

The `(edges, binnumbers)` pair of one result can be replayed into a later
computation (via [`ReuseBundle`]) to skip steps 1–2 when only the values or
the statistic change.

# Example

```
use binstat::{BinSpec, BinnedStatisticBuilder, Sample, Values};
use ndarray::{ArrayView1, ArrayView2};

let coords = [0.5, 1.5, 2.5];
let data = [10.0, 20.0, 30.0];
let sample = Sample::new(ArrayView2::from_shape((1, 3), &coords).unwrap()).unwrap();
let values = Values::real(ArrayView1::from(&data));

let out = BinnedStatisticBuilder::new()
    .statistic("sum")
    .bins(BinSpec::Uniform(1))
    .range(&[(0.0, 3.0)])
    .compute(&sample, Some(&values))
    .unwrap();

assert_eq!(out.statistic().as_real().unwrap().as_slice().unwrap(), &[60.0]);
```
*/

#![deny(rustdoc::broken_intra_doc_links)]

// inform build-system of the modules in this package
mod assign;
mod bins;
mod compute;
mod error;
mod input;
mod reduce;
mod shape;
mod statistic;

// pull in the symbols that are visible outside of the package
pub use assign::{BinNumbers, CompactBinNumbers, ExpandedBinNumbers};
pub use bins::BinSpec;
pub use compute::{BinnedStatistic, BinnedStatisticBuilder, ReuseBundle};
pub use error::Error;
pub use input::{Sample, Values};
pub use shape::StatisticArray;
pub use statistic::{CustomReducer, StatValue};
