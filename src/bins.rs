//! Derives the per-dimension bin edges ahead of bin assignment. A bin
//! specification is either an integer bin count (edges are evenly spaced
//! over a derived or supplied range) or an explicit edge list (used
//! verbatim, after a monotonicity check).

use crate::error::Error;
use crate::input::Sample;

/// The per-dimension bin specification.
#[derive(Clone, Copy)]
pub enum BinSpec<'a> {
    /// the same bin count applied to every dimension
    Uniform(usize),
    /// one bin count per dimension
    PerDim(&'a [usize]),
    /// one explicit, strictly increasing edge sequence per dimension
    Edges(&'a [&'a [f64]]),
}

impl Default for BinSpec<'static> {
    fn default() -> Self {
        BinSpec::Uniform(10)
    }
}

/// a [`BinSpec`] resolved down to a single dimension
enum DimSpec<'a> {
    Count(usize),
    Edges(&'a [f64]),
}

/// resolve the spec into one entry per sample dimension (this is also where
/// the spec's dimensionality gets checked)
fn per_dim_specs<'a>(spec: &BinSpec<'a>, n_dims: usize) -> Result<Vec<DimSpec<'a>>, Error> {
    match spec {
        BinSpec::Uniform(n) => Ok((0..n_dims).map(|_| DimSpec::Count(*n)).collect()),
        BinSpec::PerDim(counts) => {
            if counts.len() != n_dims {
                return Err(Error::dim_count("the bin specification", n_dims, counts.len()));
            }
            Ok(counts.iter().map(|&n| DimSpec::Count(n)).collect())
        }
        BinSpec::Edges(edge_lists) => {
            if edge_lists.len() != n_dims {
                return Err(Error::dim_count(
                    "the bin specification",
                    n_dims,
                    edge_lists.len(),
                ));
            }
            Ok(edge_lists.iter().map(|&e| DimSpec::Edges(e)).collect())
        }
    }
}

/// Derive the bin edges for every dimension.
///
/// `range` (when present) supplies one `(min, max)` pair per dimension and
/// only matters for dimensions with an integer bin count; otherwise the
/// range comes from the data itself. A degenerate range (`min == max`) is
/// widened by ±0.5 so the bins have finite width.
pub(crate) fn derive_edges(
    sample: &Sample,
    spec: &BinSpec,
    range: Option<&[(f64, f64)]>,
) -> Result<Vec<Vec<f64>>, Error> {
    let n_dims = sample.n_dims();
    let specs = per_dim_specs(spec, n_dims)?;

    if let Some(pairs) = range {
        if pairs.len() != n_dims {
            return Err(Error::dim_count("the range", n_dims, pairs.len()));
        }
    }

    // a range can't be derived from non-finite coordinates
    let any_count = specs.iter().any(|s| matches!(s, DimSpec::Count(_)));
    if any_count && !sample.all_finite() {
        return Err(Error::non_finite_sample());
    }

    let mut edges = Vec::with_capacity(n_dims);
    for (d, dim_spec) in specs.iter().enumerate() {
        match dim_spec {
            DimSpec::Count(n) => {
                if *n == 0 {
                    return Err(Error::bin_edge(d, "the bin count must be positive"));
                }
                let (smin, smax) = dim_range(sample, d, range)?;
                edges.push(linspace(smin, smax, *n + 1));
            }
            DimSpec::Edges(e) => {
                validate_explicit_edges(d, e)?;
                edges.push(e.to_vec());
            }
        }
    }
    Ok(edges)
}

/// the `(min, max)` coordinate range along dimension `d`, either supplied by
/// the caller or derived from the data
fn dim_range(
    sample: &Sample,
    d: usize,
    range: Option<&[(f64, f64)]>,
) -> Result<(f64, f64), Error> {
    let (mut smin, mut smax) = match range {
        Some(pairs) => {
            let (lo, hi) = pairs[d];
            if !lo.is_finite() || !hi.is_finite() {
                return Err(Error::bin_edge(d, "the range bounds must be finite"));
            } else if hi < lo {
                return Err(Error::bin_edge(d, "the range maximum is below the minimum"));
            }
            (lo, hi)
        }
        None => {
            if sample.n_points() == 0 {
                return Err(Error::bin_edge(d, "a range can't be derived from an empty sample"));
            }
            let coords = sample.coord(d);
            let lo = coords.iter().fold(f64::INFINITY, |acc, &x| acc.min(x));
            let hi = coords.iter().fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
            (lo, hi)
        }
    };
    // make sure the bins have finite width
    if smin == smax {
        smin -= 0.5;
        smax += 0.5;
    }
    Ok((smin, smax))
}

fn validate_explicit_edges(d: usize, edges: &[f64]) -> Result<(), Error> {
    if edges.len() < 2 {
        return Err(Error::bin_edge(d, "a minimum of two bin edges are required"));
    }
    // check if the edges are in strictly increasing order
    for i in 1..edges.len() {
        if edges[i] <= edges[i - 1] {
            return Err(Error::bin_edge(d, "the edges must be in strictly increasing order"));
        }
    }
    Ok(())
}

/// `n` evenly spaced points over `[start, stop]`, endpoints exact
fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    debug_assert!(n >= 2);
    let step = (stop - start) / ((n - 1) as f64);
    let mut out: Vec<f64> = (0..n).map(|i| start + step * (i as f64)).collect();
    out[n - 1] = stop;
    out
}
