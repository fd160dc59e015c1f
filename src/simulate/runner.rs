//! Table-in, table-out simulation driver.

use crate::data::CountMatrix;
use crate::error::Result;
use crate::model::{dirichlet_multinomial, negative_binomial, poisson_lognormal, SimOutput};
use crate::noise::add_noise;
use crate::simulate::config::{CountModel, SimulationConfig};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Resample a count table from its own proportions.
///
/// The table is read as samples × features. When `depths` is `None` each
/// sample keeps its own library size. With `impose_noise` set the composition
/// is perturbed by [`add_noise`] first. Samples and features whose simulated
/// total is zero are dropped from the returned table together with their
/// identifiers.
///
/// # Arguments
/// * `table` - Input counts (features × samples)
/// * `depths` - Optional read depth per sample (n_samples × 1)
/// * `config` - Distribution, dispersion and noise parameters
/// * `rng` - Random source
///
/// # Errors
/// Validation errors from the samplers are returned unchanged.
pub fn simulate<R: Rng + ?Sized>(
    table: &CountMatrix,
    depths: Option<&DMatrix<f64>>,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<CountMatrix> {
    let mut mat = table.sample_matrix();
    let library_sizes;
    let depths = match depths {
        Some(d) => d,
        None => {
            library_sizes = table.library_sizes();
            &library_sizes
        }
    };

    log::info!(
        "simulating {} samples x {} features with {} (kappa = {}, noise = {})",
        table.n_samples(),
        table.n_features(),
        config.distribution,
        config.kappa,
        config.impose_noise
    );

    if config.impose_noise {
        mat = add_noise(&mat, config.pseudocount, &config.noise, rng)?;
    }

    let output = match config.distribution {
        CountModel::PoissonLogNormal => poisson_lognormal(&mat, depths, config.kappa, rng)?,
        CountModel::NegativeBinomial => negative_binomial(&mat, depths, config.kappa, rng)?,
        CountModel::DirichletMultinomial => {
            dirichlet_multinomial(&mat, depths, true, config.pseudocount, rng)?
        }
        CountModel::Multinomial => dirichlet_multinomial(&mat, depths, false, 0.0, rng)?,
    };

    to_table(&output, table)
}

/// [`simulate`] with a generator seeded from `config.seed`, or from entropy
/// when no seed is set.
pub fn simulate_seeded(
    table: &CountMatrix,
    depths: Option<&DMatrix<f64>>,
    config: &SimulationConfig,
) -> Result<CountMatrix> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    simulate(table, depths, config, &mut rng)
}

fn to_table(output: &SimOutput, table: &CountMatrix) -> Result<CountMatrix> {
    let feature_ids = filter_ids(table.feature_ids(), &output.col_mask);
    let sample_ids = filter_ids(table.sample_ids(), &output.row_mask);

    let dropped_samples = table.n_samples() - sample_ids.len();
    let dropped_features = table.n_features() - feature_ids.len();
    if dropped_samples > 0 || dropped_features > 0 {
        log::debug!(
            "dropped {} empty samples and {} empty features",
            dropped_samples,
            dropped_features
        );
    }

    CountMatrix::from_sample_matrix(&output.counts, feature_ids, sample_ids)
}

fn filter_ids(ids: &[String], mask: &[bool]) -> Vec<String> {
    ids.iter()
        .zip(mask)
        .filter(|(_, &keep)| keep)
        .map(|(id, _)| id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::noise::NoiseConfig;
    use sprs::TriMat;

    /// 3 features × 4 samples; feature `rare` is absent everywhere.
    fn create_test_table() -> CountMatrix {
        let mut tri_mat = TriMat::new((3, 4));
        let counts = [[40, 10, 0, 25], [60, 90, 100, 75], [0, 0, 0, 0]];
        for (f, row) in counts.iter().enumerate() {
            for (s, &c) in row.iter().enumerate() {
                if c > 0 {
                    tri_mat.add_triplet(f, s, c as u64);
                }
            }
        }
        let feature_ids = vec!["common".into(), "dominant".into(), "rare".into()];
        let sample_ids = (0..4).map(|i| format!("sample_{}", i)).collect();
        CountMatrix::new(tri_mat.to_csr(), feature_ids, sample_ids).unwrap()
    }

    #[test]
    fn test_multinomial_keeps_library_sizes() {
        let table = create_test_table();
        let config = SimulationConfig::new(CountModel::Multinomial);
        let mut rng = StdRng::seed_from_u64(17);

        let sim = simulate(&table, None, &config, &mut rng).unwrap();
        assert_eq!(sim.sample_ids(), table.sample_ids());
        assert_eq!(sim.col_sums(), table.col_sums());
    }

    #[test]
    fn test_custom_depths() {
        let table = create_test_table();
        let depths = DMatrix::from_column_slice(4, 1, &[1000.0, 2000.0, 3000.0, 4000.0]);
        let config = SimulationConfig::new(CountModel::DirichletMultinomial);
        let mut rng = StdRng::seed_from_u64(18);

        let sim = simulate(&table, Some(&depths), &config, &mut rng).unwrap();
        assert_eq!(sim.col_sums(), vec![1000, 2000, 3000, 4000]);
    }

    #[test]
    fn test_ids_follow_masks() {
        let ids: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(filter_ids(&ids, &[true, false, true]), vec!["a", "c"]);
        assert!(filter_ids(&ids, &[false, false, false]).is_empty());
    }

    /// 40 features × 4 samples; each sample has counts in one or two features.
    fn create_sparse_table() -> CountMatrix {
        let mut tri_mat = TriMat::new((40, 4));
        tri_mat.add_triplet(0, 0, 50u64);
        tri_mat.add_triplet(1, 1, 50);
        tri_mat.add_triplet(2, 2, 30);
        tri_mat.add_triplet(3, 2, 20);
        tri_mat.add_triplet(0, 3, 10);
        let feature_ids = (0..40).map(|i| format!("otu_{}", i)).collect();
        let sample_ids = (0..4).map(|i| format!("sample_{}", i)).collect();
        CountMatrix::new(tri_mat.to_csr(), feature_ids, sample_ids).unwrap()
    }

    #[test]
    fn test_dropped_samples_and_features_keep_ids_aligned() {
        let table = create_sparse_table();
        // Near-zero depths empty samples 1 and 3; replaced zeros at depth 200
        // have an expected count of 0.125, so most features vanish.
        let depths = DMatrix::from_column_slice(4, 1, &[200.0, 1e-9, 200.0, 1e-9]);
        let config = SimulationConfig::new(CountModel::PoissonLogNormal).with_kappa(0.01);

        let sim = simulate(&table, Some(&depths), &config, &mut StdRng::seed_from_u64(5)).unwrap();
        let direct = poisson_lognormal(
            &table.sample_matrix(),
            &depths,
            0.01,
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap();

        assert_eq!(direct.row_mask, vec![true, false, true, false]);
        assert_eq!(sim.sample_ids(), &["sample_0", "sample_2"]);
        assert!(sim.n_features() < table.n_features());
        assert_eq!(
            sim.feature_ids(),
            filter_ids(table.feature_ids(), &direct.col_mask).as_slice()
        );
        assert!(sim.feature_ids().contains(&"otu_0".to_string()));
        assert!(sim.feature_ids().contains(&"otu_2".to_string()));

        for f in 0..sim.n_features() {
            for s in 0..sim.n_samples() {
                assert_eq!(sim.get(f, s) as f64, direct.counts[(s, f)]);
            }
        }
    }

    #[test]
    fn test_depth_errors_propagate() {
        let table = create_test_table();
        let depths = DMatrix::from_column_slice(3, 1, &[10.0, 10.0, 10.0]);
        let mut rng = StdRng::seed_from_u64(19);

        let result = simulate(&table, Some(&depths), &SimulationConfig::default(), &mut rng);
        assert!(matches!(result, Err(SimError::InvalidShape(_))));
    }

    #[test]
    fn test_noise_with_input_sparsity() {
        let table = create_test_table();
        let config = SimulationConfig::new(CountModel::Multinomial)
            .with_noise(NoiseConfig::default().with_input_sparsity());
        let mut rng = StdRng::seed_from_u64(20);

        let sim = simulate(&table, None, &config, &mut rng).unwrap();
        assert_eq!(sim.col_sums(), table.col_sums());
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let table = create_test_table();
        let config = SimulationConfig::new(CountModel::NegativeBinomial).with_seed(99);

        let a = simulate_seeded(&table, None, &config).unwrap();
        let b = simulate_seeded(&table, None, &config).unwrap();
        assert_eq!(a.feature_ids(), b.feature_ids());
        assert_eq!(a.sample_ids(), b.sample_ids());
        for f in 0..a.n_features() {
            for s in 0..a.n_samples() {
                assert_eq!(a.get(f, s), b.get(f, s));
            }
        }
    }
}
