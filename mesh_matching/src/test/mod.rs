use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{mesh, MeshResult, PageRecord, PageSet, Strategy};

mod properties;

pub(crate) const SEED: u64 = 5446535461589659585;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every strategy with its default parameters
pub(crate) fn all_strategies() -> Vec<Strategy> {
    Strategy::IDENTIFIERS
        .iter()
        .map(|identifier| identifier.parse().unwrap())
        .collect()
}

pub(crate) fn random_batch(rng: &mut SmallRng, length: usize, count: usize, density: f64) -> PageSet {
    let records = (0..count)
        .map(|_| {
            let bits: Vec<bool> = (0..length).map(|_| rng.gen_bool(density)).collect();
            PageRecord::from_bits(&bits)
        })
        .collect();
    PageSet::from_records(records).unwrap()
}

pub(crate) fn run_checked(set: PageSet, strategy: &Strategy) -> MeshResult {
    let mut rng = SmallRng::seed_from_u64(SEED);
    let result = mesh(set, strategy, &mut rng).unwrap();
    result.check().unwrap();
    result
}
