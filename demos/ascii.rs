//! Learns to print a target text by evolving one character code per position.
//!
//! Run with: `cargo run --example ascii -- "Some target text." 150`
//!
//! Set `RUST_LOG=snes=debug` to see the optimizer's own logging.

use ndarray::prelude::*;
use simple_error::{bail, SimpleError};
use snes::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const MIN_CODE: f64 = 32.0;
const MAX_CODE: f64 = 126.0;
const POPULATION_COUNT: usize = 64;
const DEFAULT_TARGET: &str = "Hello world! Some target text.";
const DEFAULT_EPOCHS: usize = 150;

struct Args {
    target: String,
    epochs: usize,
}

fn parse_args() -> Result<Args, SimpleError> {
    let mut args = std::env::args().skip(1);
    let target = args.next().unwrap_or_else(|| DEFAULT_TARGET.to_string());
    if target.is_empty() {
        bail!("target text must not be empty");
    }
    if !target.bytes().all(|b| (32..=126).contains(&b)) {
        bail!("target text must be printable ASCII");
    }
    let epochs = match args.next() {
        Some(epochs) => epochs
            .parse()
            .map_err(|e| SimpleError::new(format!("invalid epoch count {:?}: {}", epochs, e)))?,
        None => DEFAULT_EPOCHS,
    };
    Ok(Args { target, epochs })
}

fn fitness(params: ArrayView1<f64>, target: &[f64]) -> f64 {
    -params
        .iter()
        .zip(target)
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
}

fn params_to_text(params: ArrayView1<f64>) -> String {
    params
        .iter()
        .map(|p| p.round().clamp(MIN_CODE, MAX_CODE) as u8 as char)
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;
    let target: Vec<f64> = args.target.bytes().map(f64::from).collect();
    let d = target.len();

    let seed = generate_seed(&mut rand::rng());
    info!(?seed, solution_length = d, "starting");

    let mut optimizer = SnesBuilder::new()
        .solution_length(d)
        .population_count(POPULATION_COUNT)
        .alpha(1.0)
        .center(vec![(MIN_CODE + MAX_CODE) / 2.0; d])
        .scale(vec![MAX_CODE - MIN_CODE; d])
        .seed(seed)
        .build()?;

    let mut fitnesses = vec![0.0; optimizer.population_count()];
    for epoch in 0..args.epochs {
        let solutions = optimizer.ask();
        for (j, fj) in fitnesses.iter_mut().enumerate() {
            let params = Snes::solution_at(solutions, j)?;
            *fj = fitness(params, &target);
        }
        optimizer.tell(&fitnesses)?;

        if epoch == args.epochs - 1 || epoch % 10 == 0 {
            println!(
                "Epoch {:03}: {}",
                epoch,
                params_to_text(optimizer.center())
            );
        }
    }

    Ok(())
}
