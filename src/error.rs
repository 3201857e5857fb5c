//! The crate's error type.
//!
//! The design follows the "opaque struct wrapping a private kind enum"
//! pattern: callers only ever see [`Error`], while each failure mode keeps
//! its payload in a dedicated private struct with its own `Display` impl.
//! The jiff crate has a whole discussion about error types that motivated
//! this layout.

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The underlying internal error type
#[non_exhaustive]
#[derive(Clone, Debug)]
enum ErrorKind {
    /// An error that occurs when an unknown statistic name is specified
    StatisticName(StatisticNameError),
    /// An error that occurs when a sample holds non-finite coordinates and
    /// the bin specification asks us to derive edges from a bin count
    NonFiniteSample(NonFiniteSampleError),
    /// An error that occurs when the length of the value rows disagrees with
    /// the number of sample points
    ValuesLength(ValuesLengthError),
    /// An error that occurs when a statistic needs values and none were given
    MissingValues(MissingValuesError),
    /// An error that occurs when a per-dimension argument (bins, range,
    /// reused edges) doesn't describe the same number of dimensions as the
    /// sample
    DimCount(DimCountError),
    /// An error that occurs when reused bin numbers don't cover the sample
    ReuseLength(ReuseLengthError),
    /// An error that occurs when a problematic bin edge (or bin-edge
    /// specification) is encountered along one dimension
    BinEdge(BinEdgeError),
    /// An error that occurs when an ordering statistic (median/min/max) is
    /// applied to complex values
    ComplexOrdering(ComplexOrderingError),
    /// An error that occurs when a custom reducer fails on a non-empty bin
    CustomReducer(CustomReducerError),
}

// define constructor methods for Error
impl Error {
    /// produce an error indicating that an unknown statistic name was
    /// specified
    pub(crate) fn statistic_name(actual: String, choices: &'static [&'static str]) -> Self {
        Error {
            kind: ErrorKind::StatisticName(StatisticNameError { actual, choices }),
        }
    }

    /// produce an error indicating that the sample holds non-finite
    /// coordinates (so a bin range can't be derived from it)
    pub(crate) fn non_finite_sample() -> Self {
        Error {
            kind: ErrorKind::NonFiniteSample(NonFiniteSampleError),
        }
    }

    /// produce an error indicating that the value rows have the wrong length
    pub(crate) fn values_length(expected: usize, actual: usize) -> Self {
        Error {
            kind: ErrorKind::ValuesLength(ValuesLengthError { expected, actual }),
        }
    }

    /// produce an error indicating that a statistic needs values and none
    /// were provided
    pub(crate) fn missing_values(statistic: &'static str) -> Self {
        Error {
            kind: ErrorKind::MissingValues(MissingValuesError { statistic }),
        }
    }

    /// produce an error indicating that a per-dimension argument doesn't
    /// match the sample's dimensionality
    pub(crate) fn dim_count(who: &'static str, expected: usize, actual: usize) -> Self {
        Error {
            kind: ErrorKind::DimCount(DimCountError {
                who,
                expected,
                actual,
            }),
        }
    }

    /// produce an error indicating that reused bin numbers don't cover the
    /// sample
    pub(crate) fn reuse_length(expected: usize, actual: usize) -> Self {
        Error {
            kind: ErrorKind::ReuseLength(ReuseLengthError { expected, actual }),
        }
    }

    /// produce an error indicating a problematic bin edge along dimension
    /// `dim`
    pub(crate) fn bin_edge(dim: usize, what: &'static str) -> Self {
        Error {
            kind: ErrorKind::BinEdge(BinEdgeError { dim, what }),
        }
    }

    /// produce an error indicating that an ordering statistic was applied to
    /// complex values
    pub(crate) fn complex_ordering(statistic: &'static str) -> Self {
        Error {
            kind: ErrorKind::ComplexOrdering(ComplexOrderingError { statistic }),
        }
    }

    /// produce an error indicating that a custom reducer failed on a
    /// non-empty bin
    pub(crate) fn custom_reducer(flat_bin: usize, n_values: usize) -> Self {
        Error {
            kind: ErrorKind::CustomReducer(CustomReducerError { flat_bin, n_values }),
        }
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.kind.fmt(f)
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::StatisticName(ref err) => err.fmt(f),
            ErrorKind::NonFiniteSample(ref err) => err.fmt(f),
            ErrorKind::ValuesLength(ref err) => err.fmt(f),
            ErrorKind::MissingValues(ref err) => err.fmt(f),
            ErrorKind::DimCount(ref err) => err.fmt(f),
            ErrorKind::ReuseLength(ref err) => err.fmt(f),
            ErrorKind::BinEdge(ref err) => err.fmt(f),
            ErrorKind::ComplexOrdering(ref err) => err.fmt(f),
            ErrorKind::CustomReducer(ref err) => err.fmt(f),
        }
    }
}

/// An error that occurs when an unknown statistic name is specified
#[derive(Clone, Debug)]
struct StatisticNameError {
    actual: String,
    choices: &'static [&'static str],
}

impl core::fmt::Display for StatisticNameError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "\"{}\" is not a statistic name. Choices include: {:?}",
            self.actual, self.choices
        )
    }
}

/// An error that occurs when the sample holds non-finite coordinates and the
/// bin specification includes an integer bin count (the range along such a
/// dimension can't be derived)
#[derive(Clone, Debug)]
struct NonFiniteSampleError;

impl core::fmt::Display for NonFiniteSampleError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "the sample contains non-finite coordinates, which is \
             incompatible with an integer bin-count specification"
        )
    }
}

/// An error that occurs when the length of the value rows disagrees with the
/// number of sample points
#[derive(Clone, Debug)]
struct ValuesLengthError {
    expected: usize,
    actual: usize,
}

impl core::fmt::Display for ValuesLengthError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "each row of values holds {} entries, but the sample has {} \
             points",
            self.actual, self.expected
        )
    }
}

/// An error that occurs when a statistic needs values and none were given
#[derive(Clone, Debug)]
struct MissingValuesError {
    statistic: &'static str,
}

impl core::fmt::Display for MissingValuesError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "the \"{}\" statistic requires values, but none were provided",
            self.statistic
        )
    }
}

/// An error that occurs when a per-dimension argument doesn't describe the
/// same number of dimensions as the sample
#[derive(Clone, Debug)]
struct DimCountError {
    who: &'static str,
    expected: usize,
    actual: usize,
}

impl core::fmt::Display for DimCountError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} describes {} dimensions, but the sample has {}",
            self.who, self.actual, self.expected
        )
    }
}

/// An error that occurs when reused bin numbers don't cover the sample
#[derive(Clone, Debug)]
struct ReuseLengthError {
    expected: usize,
    actual: usize,
}

impl core::fmt::Display for ReuseLengthError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "the reused bin numbers cover {} points, but the sample has {}",
            self.actual, self.expected
        )
    }
}

/// An error that occurs when a problematic bin edge (or bin-edge
/// specification) is encountered along one dimension
#[derive(Clone, Debug)]
struct BinEdgeError {
    dim: usize,
    what: &'static str,
}

impl core::fmt::Display for BinEdgeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "problem with bin edges along dimension {}: {}", self.dim, self.what)
    }
}

/// An error that occurs when an ordering statistic is applied to complex
/// values
#[derive(Clone, Debug)]
struct ComplexOrderingError {
    statistic: &'static str,
}

impl core::fmt::Display for ComplexOrderingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "the \"{}\" statistic is not defined for complex values",
            self.statistic
        )
    }
}

/// An error that occurs when a custom reducer fails on a non-empty bin
#[derive(Clone, Debug)]
struct CustomReducerError {
    flat_bin: usize,
    n_values: usize,
}

impl core::fmt::Display for CustomReducerError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "the custom reducer failed on flat bin {} (holding {} values)",
            self.flat_bin, self.n_values
        )
    }
}
