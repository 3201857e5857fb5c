//! The public entry point: a builder that configures one binned-statistic
//! computation and runs the pipeline (validate → edges → assignment →
//! reduction → shaping).

use crate::assign::{self, BinNumbers, CompactBinNumbers};
use crate::bins::{self, BinSpec};
use crate::error::Error;
use crate::input::{Sample, Values};
use crate::reduce;
use crate::shape::{self, StatisticArray};
use crate::statistic::{CustomReducer, NamedStatistic, Statistic};

/// the statistic argument as the caller supplied it; name resolution is
/// deferred to [`BinnedStatisticBuilder::compute`] so that an unknown name
/// is rejected there, before any other work
enum StatisticChoice<'a> {
    Named(String),
    Custom(&'a dyn CustomReducer),
}

/// Configures and runs a binned-statistic computation.
///
/// ```
/// use binstat::{BinSpec, BinnedStatisticBuilder, Sample};
/// use ndarray::ArrayView2;
///
/// let coords = [0.0, 1.0, 2.0, 9.0];
/// let sample = Sample::new(ArrayView2::from_shape((1, 4), &coords).unwrap()).unwrap();
///
/// let out = BinnedStatisticBuilder::new()
///     .statistic("count")
///     .bins(BinSpec::Uniform(2))
///     .range(&[(0.0, 10.0)])
///     .compute(&sample, None)
///     .unwrap();
///
/// assert_eq!(out.edges(), &[vec![0.0, 5.0, 10.0]]);
/// assert_eq!(out.statistic().as_real().unwrap().as_slice().unwrap(), &[3.0, 1.0]);
/// ```
pub struct BinnedStatisticBuilder<'a> {
    statistic: StatisticChoice<'a>,
    bins: BinSpec<'a>,
    range: Option<&'a [(f64, f64)]>,
    expand_binnumbers: bool,
    reuse: Option<ReuseBundle<'a>>,
}

impl<'a> BinnedStatisticBuilder<'a> {
    pub fn new() -> Self {
        BinnedStatisticBuilder {
            statistic: StatisticChoice::Named("mean".to_owned()),
            bins: BinSpec::default(),
            range: None,
            expand_binnumbers: false,
            reuse: None,
        }
    }

    /// select one of the named statistics (the default is `"mean"`); unknown
    /// names are rejected by [`BinnedStatisticBuilder::compute`]
    pub fn statistic(mut self, name: &str) -> Self {
        self.statistic = StatisticChoice::Named(name.to_owned());
        self
    }

    /// select a caller-supplied reducer instead of a named statistic
    pub fn custom_statistic(mut self, reducer: &'a dyn CustomReducer) -> Self {
        self.statistic = StatisticChoice::Custom(reducer);
        self
    }

    /// the bin specification (the default is 10 bins along every dimension);
    /// ignored when a reuse bundle is supplied
    pub fn bins(mut self, spec: BinSpec<'a>) -> Self {
        self.bins = spec;
        self
    }

    /// one `(min, max)` pair per dimension, used by integer bin counts in
    /// place of the data-derived range; ignored when a reuse bundle is
    /// supplied
    pub fn range(mut self, range: &'a [(f64, f64)]) -> Self {
        self.range = Some(range);
        self
    }

    /// return the bin numbers in expanded (per-dimension tuple) form instead
    /// of the compact flat form. An expanded result can't seed a reuse
    /// bundle.
    pub fn expand_binnumbers(mut self, expand: bool) -> Self {
        self.expand_binnumbers = expand;
        self
    }

    /// replay the `(edges, binnumbers)` pair of a previous computation,
    /// skipping edge derivation and bin assignment
    pub fn reuse(mut self, bundle: ReuseBundle<'a>) -> Self {
        self.reuse = Some(bundle);
        self
    }

    /// Run the computation.
    ///
    /// `values` may only be `None` for the count statistic (which never
    /// reads them; it uses their shape, when present, to lay out the
    /// output).
    pub fn compute(
        &self,
        sample: &Sample,
        values: Option<&Values>,
    ) -> Result<BinnedStatistic, Error> {
        // resolve the statistic first: an unrecognized name means no
        // partial work at all
        let statistic = match &self.statistic {
            StatisticChoice::Named(name) => Statistic::Named(NamedStatistic::from_name(name)?),
            StatisticChoice::Custom(reducer) => Statistic::Custom(*reducer),
        };

        let n_points = sample.n_points();
        if !statistic.is_count() {
            let provided = values.ok_or_else(|| Error::missing_values(statistic.label()))?;
            if provided.n_values() != n_points {
                return Err(Error::values_length(n_points, provided.n_values()));
            }
        }

        let (edges, binnumbers) = match &self.reuse {
            Some(bundle) => {
                if bundle.edges.len() != sample.n_dims() {
                    return Err(Error::dim_count(
                        "the reused edges",
                        sample.n_dims(),
                        bundle.edges.len(),
                    ));
                }
                if bundle.binnumbers.len() != n_points {
                    return Err(Error::reuse_length(n_points, bundle.binnumbers.len()));
                }
                (bundle.edges.to_vec(), bundle.binnumbers.clone())
            }
            None => {
                let edges = bins::derive_edges(sample, &self.bins, self.range)?;
                let binnumbers = assign::assign_bins(sample, &edges)?;
                (edges, binnumbers)
            }
        };

        let buffer = reduce::reduce(&statistic, values, &binnumbers)?;
        let scalar_values = values.map_or(true, Values::is_scalar);
        let statistic_grid = shape::shape_result(buffer, binnumbers.grid(), scalar_values);

        let binnumbers = if self.expand_binnumbers {
            BinNumbers::Expanded(binnumbers.expand())
        } else {
            BinNumbers::Compact(binnumbers)
        };

        Ok(BinnedStatistic {
            statistic: statistic_grid,
            edges,
            binnumbers,
        })
    }
}

impl Default for BinnedStatisticBuilder<'_> {
    fn default() -> Self {
        BinnedStatisticBuilder::new()
    }
}

/// The result triple: the statistic grid, the per-dimension edges that were
/// used, and the point-to-bin assignment.
pub struct BinnedStatistic {
    statistic: StatisticArray,
    edges: Vec<Vec<f64>>,
    binnumbers: BinNumbers,
}

impl BinnedStatistic {
    /// the aggregate grid, shaped `(n_0, ..., n_{D-1})` for scalar value
    /// input and `(Vdim, n_0, ..., n_{D-1})` for multi-component input
    pub fn statistic(&self) -> &StatisticArray {
        &self.statistic
    }

    /// the per-dimension bin edges (length `bin_count_d + 1` each)
    pub fn edges(&self) -> &[Vec<f64>] {
        &self.edges
    }

    pub fn binnumbers(&self) -> &BinNumbers {
        &self.binnumbers
    }

    /// The `(edges, binnumbers)` pair of this result, re-enterable into a
    /// later computation over the same sample.
    ///
    /// Returns `None` when the computation was run with expanded bin
    /// numbers; only the compact form can be replayed, and that constraint
    /// lives in the type rather than in a runtime check.
    pub fn reuse(&self) -> Option<ReuseBundle<'_>> {
        match &self.binnumbers {
            BinNumbers::Compact(compact) => Some(ReuseBundle {
                edges: &self.edges,
                binnumbers: compact,
            }),
            BinNumbers::Expanded(_) => None,
        }
    }
}

/// An `(edges, binnumbers)` pair borrowed from a previous [`BinnedStatistic`],
/// eligible to be replayed into a later computation that varies only the
/// values and/or the statistic.
///
/// Can only be obtained through [`BinnedStatistic::reuse`], so it always
/// holds the compact bin-number form and the bundle's internal consistency
/// holds by construction.
#[derive(Clone, Copy)]
pub struct ReuseBundle<'a> {
    edges: &'a [Vec<f64>],
    binnumbers: &'a CompactBinNumbers,
}
