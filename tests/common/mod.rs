// the reason this is named mod.rs has to do with some complexities of how
// testing is handled
//
// we are following the advice of the rust book
// https://doc.rust-lang.org/book/ch11-03-test-organization.html#submodules-in-integration-tests

use ndarray::ArrayView2;
use binstat::Sample;

// based on numpy!
// https://numpy.org/doc/stable/reference/generated/numpy.isclose.html
//
// NaN compares equal to NaN here, since several statistics use NaN as their
// empty-bin fill
pub fn isclose(actual: f64, ref_val: f64, rtol: f64, atol: f64) -> bool {
    let actual_nan = actual.is_nan();
    let ref_nan = ref_val.is_nan();
    if actual_nan || ref_nan {
        actual_nan && ref_nan
    } else {
        (actual - ref_val).abs() <= (atol + rtol * ref_val.abs())
    }
}

/// compare a result grid against a flat row-major reference
pub fn assert_grid_close(actual: &ndarray::ArrayD<f64>, expected: &[f64], rtol: f64) {
    let flat: Vec<f64> = actual.iter().cloned().collect();
    assert_eq!(flat.len(), expected.len(), "grid size mismatch");
    for (i, (&a, &e)) in flat.iter().zip(expected.iter()).enumerate() {
        assert!(
            isclose(a, e, rtol, 0.0),
            "problem at flat index {i}: {a} vs {e}"
        );
    }
}

/// build a 1-D sample from a coordinate slice
pub fn sample_1d(coords: &[f64]) -> Sample<'_> {
    Sample::new(ArrayView2::from_shape((1, coords.len()), coords).unwrap()).unwrap()
}
