use ndarray::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use snes::prelude::*;

fn run_epochs<F>(snes: &mut Snes, epochs: usize, f: F)
where
    F: Fn(ArrayView1<f64>) -> f64,
{
    for _ in 0..epochs {
        let fitness: Vec<f64> = snes.ask().outer_iter().map(&f).collect();
        snes.tell(&fitness).unwrap();
    }
}

fn neg_l1(x: ArrayView1<f64>) -> f64 {
    -x.iter().map(|v| v.abs()).sum::<f64>()
}

fn neg_sphere(x: ArrayView1<f64>) -> f64 {
    -x.dot(&x)
}

#[test]
fn test_converges_in_one_dimension() {
    for seed in [[1, 2, 3, 4], [42, 43, 44, 45]] {
        let mut snes = SnesBuilder::new()
            .solution_length(1)
            .seed(seed)
            .build()
            .unwrap();
        assert_eq!(snes.scale()[0], 0.05);

        run_epochs(&mut snes, 300, |x| -(x[0] - 5.0).powi(2));

        assert!((snes.center()[0] - 5.0).abs() < 0.1);
    }
}

#[test]
fn test_converges_on_sphere() {
    let mut snes = SnesBuilder::new()
        .solution_length(10)
        .alpha(1.0)
        .seed([7, 11, 13, 17])
        .build()
        .unwrap();

    run_epochs(&mut snes, 500, |x| {
        -x.iter().map(|v| (v - 3.0).powi(2)).sum::<f64>()
    });

    assert!(snes.center().iter().all(|c| (c - 3.0).abs() < 1e-6));
    assert!(snes.scale().iter().all(|&s| s > 0.0 && s < 1e-6));
}

#[test]
fn test_identical_seeds_reproduce_trajectory() {
    let mut entropy = ChaCha8Rng::seed_from_u64(2024);
    let seed = generate_seed(&mut entropy);
    let builder = SnesBuilder::new().solution_length(4).alpha(0.5).seed(seed);
    let mut a = builder.clone().build().unwrap();
    let mut b = builder.build().unwrap();
    for _ in 0..100 {
        run_epochs(&mut a, 1, neg_l1);
        run_epochs(&mut b, 1, neg_l1);
        assert_eq!(a.center(), b.center());
        assert_eq!(a.scale(), b.scale());
    }
    assert_eq!(a.rng(), b.rng());
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = SnesBuilder::new()
        .solution_length(3)
        .seed([1, 2, 3, 4])
        .build()
        .unwrap();
    let mut b = SnesBuilder::new()
        .solution_length(3)
        .seed([4, 3, 2, 1])
        .build()
        .unwrap();
    run_epochs(&mut a, 5, neg_sphere);
    run_epochs(&mut b, 5, neg_sphere);
    assert_ne!(a.center(), b.center());
}

#[test]
fn test_matches_target_text() {
    let target = "Hello world! Some target text.";
    let codes: Vec<f64> = target.bytes().map(f64::from).collect();
    let d = codes.len();
    let mut snes = SnesBuilder::new()
        .solution_length(d)
        .population_count(64)
        .alpha(1.0)
        .center(vec![79.0; d])
        .scale(vec![94.0; d])
        .seed([1, 2, 3, 4])
        .build()
        .unwrap();

    let result = snes
        .optimize(
            |x| {
                -x.iter()
                    .zip(&codes)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
            },
            150,
        )
        .unwrap();

    let text: String = result
        .center
        .iter()
        .map(|c| c.round().clamp(32.0, 126.0) as u8 as char)
        .collect();
    assert_eq!(text, target);
    assert_eq!(result.fn_evals, 150 * 64);
}
