//! Basic example resampling a count table with each distribution.
//!
//! This example shows how to:
//! 1. Build a latent abundance matrix with block structure
//! 2. Turn it into a count table
//! 3. Resample it with every count model, with and without noise
//! 4. Save the simulation configuration as YAML

use countsim::prelude::*;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    println!("=== countsim Example ===\n");

    let table = create_example_table()?;
    println!("Input table:");
    println!("  Features: {}", table.n_features());
    println!("  Samples:  {}", table.n_samples());
    println!("  Non-zero: {}", table.nnz());
    println!();

    println!("=== Resampling ===\n");
    println!(
        "{:<24} {:>9} {:>9} {:>12} {:>12}",
        "Distribution", "Features", "Samples", "Mean depth", "Zero frac."
    );
    println!("{}", "-".repeat(70));

    let mut rng = StdRng::seed_from_u64(42);
    for model in [
        CountModel::PoissonLogNormal,
        CountModel::NegativeBinomial,
        CountModel::DirichletMultinomial,
        CountModel::Multinomial,
    ] {
        let config = SimulationConfig::new(model);
        let simulated = simulate(&table, None, &config, &mut rng)?;
        print_row(model.name(), &simulated);
    }
    println!();

    println!("=== Resampling with noise ===\n");

    let noisy_config = SimulationConfig::new(CountModel::Multinomial)
        .with_noise(NoiseConfig::default().with_normal(0.3).with_missing_at_random(0.25))
        .with_seed(7);
    let simulated = simulate_seeded(&table, None, &noisy_config)?;
    print_row("Multinomial + noise", &simulated);

    // Fixed depth for every sample
    let depths = DMatrix::from_element(table.n_samples(), 1, 5000.0);
    let simulated = simulate(&table, Some(&depths), &noisy_config, &mut rng)?;
    print_row("Multinomial @ 5000", &simulated);

    println!("\n=== Simulation Configuration (YAML) ===\n");
    println!("{}", noisy_config.to_yaml()?);

    Ok(())
}

/// Two groups of samples concentrated in overlapping feature blocks.
fn create_example_table() -> Result<CountMatrix> {
    let config = BlockConfig::new(30, 20, 2)
        .with_overlap(4)
        .with_range(0.0, 1000.0);
    let latent = blocks(&config)?;

    let feature_ids: Vec<String> = (0..latent.ncols()).map(|i| format!("otu_{}", i)).collect();
    let sample_ids: Vec<String> = (0..latent.nrows()).map(|i| format!("S{:02}", i)).collect();
    CountMatrix::from_sample_matrix(&latent, feature_ids, sample_ids)
}

fn print_row(label: &str, table: &CountMatrix) {
    let depths = table.col_sums();
    let mean_depth = depths.iter().sum::<u64>() as f64 / depths.len().max(1) as f64;
    let cells = (table.n_features() * table.n_samples()).max(1);
    let zero_fraction = 1.0 - table.nnz() as f64 / cells as f64;
    println!(
        "{:<24} {:>9} {:>9} {:>12.0} {:>12.3}",
        label,
        table.n_features(),
        table.n_samples(),
        mean_depth,
        zero_fraction
    );
}
