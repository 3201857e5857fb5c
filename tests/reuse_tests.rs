mod common;

use common::sample_1d;
use ndarray::{ArrayView1, ArrayView2};

use binstat::{BinNumbers, BinSpec, BinnedStatisticBuilder, Sample, Values};

use rand::distr::{Distribution, Uniform};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn compact_flat(binnumbers: &BinNumbers) -> &[usize] {
    match binnumbers {
        BinNumbers::Compact(compact) => compact.flat(),
        BinNumbers::Expanded(_) => panic!("expected compact bin numbers"),
    }
}

#[test]
fn reuse_reproduces_binnumbers_bit_for_bit() {
    let coords = [0.1, 0.9, 2.3, 4.5, 4.9, 7.2];
    let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let sample = sample_1d(&coords);
    let values = Values::real(ArrayView1::from(&data));

    let first = BinnedStatisticBuilder::new()
        .statistic("count")
        .bins(BinSpec::Uniform(4))
        .range(&[(0.0, 8.0)])
        .compute(&sample, None)
        .unwrap();

    let bundle = first.reuse().unwrap();
    let second = BinnedStatisticBuilder::new()
        .statistic("mean")
        .reuse(bundle)
        .compute(&sample, Some(&values))
        .unwrap();

    assert_eq!(first.edges(), second.edges());
    assert_eq!(
        compact_flat(first.binnumbers()),
        compact_flat(second.binnumbers())
    );

    // a fresh computation of the same statistic agrees with the replayed one
    let fresh = BinnedStatisticBuilder::new()
        .statistic("mean")
        .bins(BinSpec::Uniform(4))
        .range(&[(0.0, 8.0)])
        .compute(&sample, Some(&values))
        .unwrap();
    let replayed: Vec<u64> = second
        .statistic()
        .as_real()
        .unwrap()
        .iter()
        .map(|x| x.to_bits())
        .collect();
    let direct: Vec<u64> = fresh
        .statistic()
        .as_real()
        .unwrap()
        .iter()
        .map(|x| x.to_bits())
        .collect();
    assert_eq!(replayed, direct);
}

#[test]
fn identical_calls_are_idempotent() {
    let coords = [0.3, 1.7, 2.2, 2.9, 0.4];
    let data = [5.0, -1.0, 2.5, 0.0, 9.0];
    let sample = sample_1d(&coords);
    let values = Values::real(ArrayView1::from(&data));

    let run = || {
        BinnedStatisticBuilder::new()
            .statistic("std")
            .bins(BinSpec::Uniform(3))
            .range(&[(0.0, 3.0)])
            .compute(&sample, Some(&values))
            .unwrap()
    };
    let a = run();
    let b = run();

    let bits_a: Vec<u64> = a.statistic().as_real().unwrap().iter().map(|x| x.to_bits()).collect();
    let bits_b: Vec<u64> = b.statistic().as_real().unwrap().iter().map(|x| x.to_bits()).collect();
    assert_eq!(bits_a, bits_b);
    assert_eq!(compact_flat(a.binnumbers()), compact_flat(b.binnumbers()));
}

#[test]
fn reuse_rejects_a_mismatched_sample() {
    let coords = [0.5, 1.5, 2.5];
    let sample = sample_1d(&coords);

    let first = BinnedStatisticBuilder::new()
        .statistic("count")
        .bins(BinSpec::Uniform(3))
        .range(&[(0.0, 3.0)])
        .compute(&sample, None)
        .unwrap();
    let bundle = first.reuse().unwrap();

    // fewer points than the bundle covers
    let short_coords = [0.5, 1.5];
    let short_sample = sample_1d(&short_coords);
    let result = BinnedStatisticBuilder::new()
        .statistic("count")
        .reuse(bundle)
        .compute(&short_sample, None);
    assert!(result.is_err());
}

/// every point lands somewhere: the interior counts plus the sentinel
/// overflow always add up to N
#[test]
fn count_conservation_with_random_samples() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    // coordinates deliberately overshoot the binned range on both sides
    let coord_dist = Uniform::new(-2.0_f64, 12.0).unwrap();

    for n_points in [0_usize, 1, 7, 100, 1000] {
        let coords: Vec<f64> = (0..n_points).map(|_| coord_dist.sample(&mut rng)).collect();
        let sample = sample_1d(&coords);

        let out = BinnedStatisticBuilder::new()
            .statistic("count")
            .bins(BinSpec::Uniform(5))
            .range(&[(0.0, 10.0)])
            .compute(&sample, None)
            .unwrap();

        let interior: f64 = out.statistic().as_real().unwrap().iter().sum();
        let n_outliers = coords.iter().filter(|&&x| x < 0.0 || x > 10.0).count();
        assert_eq!(interior as usize + n_outliers, n_points);
    }
}

/// the same property in two dimensions, exercising the row-major
/// linearization over the sentinel-padded grid
#[test]
fn count_conservation_2d() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    let coord_dist = Uniform::new(-1.0_f64, 11.0).unwrap();
    let n_points = 500;

    let coords: Vec<f64> = (0..2 * n_points).map(|_| coord_dist.sample(&mut rng)).collect();
    let sample = Sample::new(ArrayView2::from_shape((2, n_points), &coords).unwrap()).unwrap();

    let out = BinnedStatisticBuilder::new()
        .statistic("count")
        .bins(BinSpec::PerDim(&[4, 6]))
        .range(&[(0.0, 10.0), (0.0, 10.0)])
        .compute(&sample, None)
        .unwrap();

    let grid = out.statistic().as_real().unwrap();
    assert_eq!(grid.shape(), &[4, 6]);
    let interior: f64 = grid.iter().sum();

    let (xs, ys) = coords.split_at(n_points);
    let n_outliers = xs
        .iter()
        .zip(ys.iter())
        .filter(|&(&x, &y)| x < 0.0 || x > 10.0 || y < 0.0 || y > 10.0)
        .count();
    assert_eq!(interior as usize + n_outliers, n_points);
}

/// replaying a bundle with different values and a different statistic only
/// changes the statistic grid
#[test]
fn reuse_varies_values_and_statistic() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(123);
    let coord_dist = Uniform::new(0.0_f64, 10.0).unwrap();
    let value_dist = Uniform::new(-5.0_f64, 5.0).unwrap();
    let n_points = 200;

    let coords: Vec<f64> = (0..n_points).map(|_| coord_dist.sample(&mut rng)).collect();
    let data_a: Vec<f64> = (0..n_points).map(|_| value_dist.sample(&mut rng)).collect();
    let data_b: Vec<f64> = data_a.iter().map(|x| -x).collect();
    let sample = sample_1d(&coords);

    let first = BinnedStatisticBuilder::new()
        .statistic("sum")
        .bins(BinSpec::Uniform(5))
        .range(&[(0.0, 10.0)])
        .compute(&sample, Some(&Values::real(ArrayView1::from(&data_a))))
        .unwrap();

    let second = BinnedStatisticBuilder::new()
        .statistic("sum")
        .reuse(first.reuse().unwrap())
        .compute(&sample, Some(&Values::real(ArrayView1::from(&data_b))))
        .unwrap();

    let sums_a = first.statistic().as_real().unwrap();
    let sums_b = second.statistic().as_real().unwrap();
    for (a, b) in sums_a.iter().zip(sums_b.iter()) {
        assert!((a + b).abs() < 1e-12, "negated values should negate sums");
    }

    // mean * count recovers sum, through the same bundle
    let means = BinnedStatisticBuilder::new()
        .statistic("mean")
        .reuse(first.reuse().unwrap())
        .compute(&sample, Some(&Values::real(ArrayView1::from(&data_a))))
        .unwrap();
    let counts = BinnedStatisticBuilder::new()
        .statistic("count")
        .reuse(first.reuse().unwrap())
        .compute(&sample, None)
        .unwrap();
    for ((m, c), s) in means
        .statistic()
        .as_real()
        .unwrap()
        .iter()
        .zip(counts.statistic().as_real().unwrap().iter())
        .zip(sums_a.iter())
    {
        if *c > 0.0 {
            assert!((m * c - s).abs() < 1e-12);
        } else {
            assert!(m.is_nan());
        }
    }
}
