//! countsim - synthetic microbiome count table CLI
//!
//! Command-line interface for resampling count tables and generating latent
//! abundance matrices.

use clap::{Parser, Subcommand};
use countsim::data::CountMatrix;
use countsim::error::{Result, SimError};
use countsim::generate::{blocks, gradient, linspace, BlockConfig};
use countsim::noise::NoiseConfig;
use countsim::simulate::{simulate_seeded, CountModel, SimulationConfig};
use nalgebra::DMatrix;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Synthetic microbiome count simulation
#[derive(Parser)]
#[command(name = "countsim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resample a count table from its own proportions
    Simulate {
        /// Path to count matrix TSV (features x samples)
        #[arg(short = 'c', long)]
        counts: PathBuf,

        /// Output path for the simulated TSV
        #[arg(short, long)]
        output: PathBuf,

        /// YAML simulation configuration; overrides the flags below
        #[arg(long)]
        config: Option<PathBuf>,

        /// Distribution to sample from (pln, nb, dm, m or the full name)
        #[arg(short, long, default_value = "pln")]
        distribution: String,

        /// Over-dispersion parameter (pln and nb)
        #[arg(short, long, default_value = "1.0")]
        kappa: f64,

        /// Pseudocount for the ALR transform and the Dirichlet
        #[arg(long, default_value = "1.0")]
        pseudocount: f64,

        /// Use the same read depth for every sample instead of its library size
        #[arg(long)]
        depth: Option<f64>,

        /// Perturb proportions before resampling
        #[arg(long)]
        noise: bool,

        /// Homoscedastic noise level
        #[arg(long, default_value = "0.1")]
        percent_normal: f64,

        /// Fraction of entries given heteroscedastic noise
        #[arg(long, default_value = "0.1")]
        percent_random: f64,

        /// Intensity of the heteroscedastic noise
        #[arg(long, default_value = "1.0")]
        random_count: f64,

        /// Zero out this fraction of entries at random instead of keeping
        /// the input's zeros
        #[arg(long)]
        missing_at_random: Option<f64>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write a block-diagonal abundance matrix (samples x features)
    Blocks {
        /// Number of features
        #[arg(long)]
        n_cols: usize,

        /// Number of samples
        #[arg(long)]
        n_rows: usize,

        /// Number of blocks (must be > 1)
        #[arg(long, default_value = "2")]
        n_blocks: usize,

        /// Columns shared between neighbouring blocks
        #[arg(long, default_value = "0")]
        overlap: usize,

        /// Gaussian standard deviation
        #[arg(long, default_value = "2.0")]
        sigma: f64,

        /// Minimum output value
        #[arg(long, default_value = "0.0")]
        minval: f64,

        /// Block value multiplier
        #[arg(long, default_value = "1.0")]
        maxval: f64,

        /// Output TSV path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write species abundances along an evenly spaced gradient
    Gradient {
        /// Number of samples along the gradient
        #[arg(long)]
        n_samples: usize,

        /// Gradient start
        #[arg(long, default_value = "0.0")]
        start: f64,

        /// Gradient end
        #[arg(long, default_value = "10.0")]
        end: f64,

        /// Species optima (comma-separated)
        #[arg(long, value_delimiter = ',')]
        means: Vec<f64>,

        /// Species tolerances (comma-separated)
        #[arg(long, value_delimiter = ',')]
        std_devs: Vec<f64>,

        /// Species peak heights (comma-separated, default all 1)
        #[arg(long, value_delimiter = ',')]
        peaks: Option<Vec<f64>>,

        /// Output TSV path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate an example simulation configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "simulation.yaml")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            counts,
            output,
            config,
            distribution,
            kappa,
            pseudocount,
            depth,
            noise,
            percent_normal,
            percent_random,
            random_count,
            missing_at_random,
            seed,
        } => distribution.parse::<CountModel>().and_then(|distribution| {
            let noise_config = NoiseConfig {
                percent_normal,
                percent_random,
                random_count,
                add_missing_at_random: missing_at_random.is_some(),
                percent_missing: missing_at_random.unwrap_or(0.1),
            };
            let flags = SimulationConfig {
                distribution,
                kappa,
                pseudocount,
                impose_noise: noise,
                noise: noise_config,
                seed,
            };
            cmd_simulate(&counts, &output, config.as_deref(), flags, depth)
        }),

        Commands::Blocks {
            n_cols,
            n_rows,
            n_blocks,
            overlap,
            sigma,
            minval,
            maxval,
            output,
        } => {
            let config = BlockConfig::new(n_cols, n_rows, n_blocks)
                .with_overlap(overlap)
                .with_sigma(sigma)
                .with_range(minval, maxval);
            cmd_blocks(&config, &output)
        }

        Commands::Gradient {
            n_samples,
            start,
            end,
            means,
            std_devs,
            peaks,
            output,
        } => cmd_gradient(n_samples, start, end, &means, &std_devs, peaks.as_deref(), &output),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Resample a count table
fn cmd_simulate(
    counts_path: &Path,
    output_path: &Path,
    config_path: Option<&Path>,
    flags: SimulationConfig,
    depth: Option<f64>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => {
            eprintln!("Loading simulation configuration from {:?}...", path);
            SimulationConfig::from_file(path)?
        }
        None => flags,
    };

    eprintln!("Loading count matrix...");
    let table = CountMatrix::from_tsv(counts_path)?;
    eprintln!(
        "Loaded {} features x {} samples",
        table.n_features(),
        table.n_samples()
    );

    let depths = depth.map(|d| DMatrix::from_element(table.n_samples(), 1, d));

    eprintln!("Simulating with {}...", config.distribution);
    let simulated = simulate_seeded(&table, depths.as_ref(), &config)?;

    eprintln!("Writing simulated table to {:?}...", output_path);
    simulated.to_tsv(output_path)?;

    let summary = serde_json::json!({
        "distribution": config.distribution.alias(),
        "input": {
            "n_features": table.n_features(),
            "n_samples": table.n_samples(),
        },
        "output": {
            "n_features": simulated.n_features(),
            "n_samples": simulated.n_samples(),
            "nnz": simulated.nnz(),
        },
    });
    eprintln!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

/// Write a block-diagonal matrix
fn cmd_blocks(config: &BlockConfig, output_path: &Path) -> Result<()> {
    let mat = blocks(config)?;
    eprintln!(
        "Writing {} x {} block matrix to {:?}...",
        mat.nrows(),
        mat.ncols(),
        output_path
    );
    write_dense_tsv(&mat, output_path)
}

/// Write a gradient matrix
fn cmd_gradient(
    n_samples: usize,
    start: f64,
    end: f64,
    means: &[f64],
    std_devs: &[f64],
    peaks: Option<&[f64]>,
    output_path: &Path,
) -> Result<()> {
    if means.is_empty() {
        return Err(SimError::InvalidParameter(
            "at least one species mean is required".to_string(),
        ));
    }
    let positions = linspace(start, end, n_samples);
    let mat = gradient(&positions, means, std_devs, peaks)?;
    eprintln!(
        "Writing {} x {} gradient matrix to {:?}...",
        mat.nrows(),
        mat.ncols(),
        output_path
    );
    write_dense_tsv(&mat, output_path)
}

/// Write an example configuration
fn cmd_example(output_path: &Path) -> Result<()> {
    std::fs::write(output_path, SimulationConfig::example_yaml()?)?;
    eprintln!("Example configuration written to {:?}", output_path);
    Ok(())
}

/// Dense samples x features matrix as TSV with generated identifiers.
fn write_dense_tsv(mat: &DMatrix<f64>, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(std::fs::File::create(path)?);

    write!(writer, "sample_id")?;
    for j in 0..mat.ncols() {
        write!(writer, "\tF{}", j)?;
    }
    writeln!(writer)?;

    for (i, row) in mat.row_iter().enumerate() {
        write!(writer, "S{}", i)?;
        for v in row.iter() {
            write!(writer, "\t{}", v)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}
