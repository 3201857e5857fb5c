//! The statistic argument: either one of the predefined named statistics or
//! a caller-supplied reducer. The dual nature is modeled as a tagged choice
//! that gets resolved into a single reduction strategy before any grouping
//! work begins.

use crate::error::Error;
use num_complex::Complex64;

/// A value produced by a [`CustomReducer`] for one bin.
#[derive(Clone, Copy, Debug)]
pub enum StatValue {
    Real(f64),
    Complex(Complex64),
}

impl StatValue {
    pub(crate) fn as_complex(self) -> Complex64 {
        match self {
            StatValue::Real(x) => Complex64::new(x, 0.0),
            StatValue::Complex(z) => z,
        }
    }
}

/// A caller-supplied per-bin reducer.
///
/// [`CustomReducer::reduce`] is applied to the (possibly empty) sequence of
/// real values that landed in each bin. Returning `None` for the empty
/// sequence means "fill empty bins with NaN"; returning `None` for a
/// non-empty bin aborts the computation with an error. Returning a
/// [`StatValue::Complex`] value promotes the whole result buffer to complex
/// (the buffer is reallocated and the pass rerun, once).
///
/// [`CustomReducer::reduce_complex`] is consulted instead when the input
/// values themselves are complex. The default implementation declines every
/// bin, so reducers over real data don't need to think about it.
pub trait CustomReducer {
    fn reduce(&self, values: &[f64]) -> Option<StatValue>;

    fn reduce_complex(&self, _values: &[Complex64]) -> Option<Complex64> {
        None
    }
}

/// The predefined statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamedStatistic {
    Mean,
    NanMean,
    Median,
    Count,
    Sum,
    Std,
    Min,
    Max,
}

impl NamedStatistic {
    pub(crate) const CHOICES: &'static [&'static str] = &[
        "mean", "nanmean", "median", "count", "sum", "std", "min", "max",
    ];

    /// look up a statistic by name (rejected before any computation begins)
    pub(crate) fn from_name(name: &str) -> Result<NamedStatistic, Error> {
        match name {
            "mean" => Ok(NamedStatistic::Mean),
            "nanmean" => Ok(NamedStatistic::NanMean),
            "median" => Ok(NamedStatistic::Median),
            "count" => Ok(NamedStatistic::Count),
            "sum" => Ok(NamedStatistic::Sum),
            "std" => Ok(NamedStatistic::Std),
            "min" => Ok(NamedStatistic::Min),
            "max" => Ok(NamedStatistic::Max),
            _ => Err(Error::statistic_name(
                name.to_owned(),
                NamedStatistic::CHOICES,
            )),
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            NamedStatistic::Mean => "mean",
            NamedStatistic::NanMean => "nanmean",
            NamedStatistic::Median => "median",
            NamedStatistic::Count => "count",
            NamedStatistic::Sum => "sum",
            NamedStatistic::Std => "std",
            NamedStatistic::Min => "min",
            NamedStatistic::Max => "max",
        }
    }
}

/// The resolved reduction strategy.
pub enum Statistic<'a> {
    Named(NamedStatistic),
    Custom(&'a dyn CustomReducer),
}

impl Statistic<'_> {
    pub(crate) fn is_count(&self) -> bool {
        matches!(self, Statistic::Named(NamedStatistic::Count))
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Statistic::Named(named) => named.name(),
            Statistic::Custom(_) => "custom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_lookup() {
        assert_eq!(
            NamedStatistic::from_name("median").unwrap(),
            NamedStatistic::Median
        );
        for name in NamedStatistic::CHOICES {
            assert_eq!(NamedStatistic::from_name(name).unwrap().name(), *name);
        }
        assert!(NamedStatistic::from_name("variance").is_err());
        assert!(NamedStatistic::from_name("").is_err());
    }
}
