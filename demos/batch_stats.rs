use lpcnet_dataset::codec::ulaw;
use lpcnet_dataset::common::config::DatasetConfig;
use lpcnet_dataset::dataset::lpcnet_dataset::{DatasetError, LpcNetDataset, TrainingBatch};
use rand::{rngs::StdRng, SeedableRng};
use simple_logger::SimpleLogger;
use std::env;

#[macro_use]
extern crate log;

#[derive(Debug)]
pub enum MainError {
    Usage,
    Dataset(DatasetError),
}

impl From<DatasetError> for MainError {
    fn from(err: DatasetError) -> Self {
        Self::Dataset(err)
    }
}

#[derive(Default)]
struct Stats {
    num_batches: usize,
    num_samples: usize,
    signal_energy: f64,
    residual_energy: f64,
    min_period: i16,
    max_period: i16,
}

impl Stats {
    fn add(&mut self, batch: &TrainingBatch) {
        if self.num_batches == 0 {
            self.min_period = i16::MAX;
            self.max_period = i16::MIN;
        }

        self.num_batches += 1;
        self.num_samples += batch.target.len();

        for code in batch.inputs.signal.slice(ndarray::s![.., .., 0]) {
            self.signal_energy += ulaw::ulaw_to_linear(*code).powi(2);
        }

        for code in batch.target.iter() {
            self.residual_energy += ulaw::ulaw_to_linear(*code).powi(2);
        }

        for period in batch.inputs.periods.iter() {
            self.min_period = self.min_period.min(*period);
            self.max_period = self.max_period.max(*period);
        }
    }

    // how much the lpc predictor takes out of the (noisy) signal
    fn prediction_gain_db(&self) -> f64 {
        10.0 * (self.signal_energy / self.residual_energy.max(1.0)).log10()
    }
}

// usage: batch_stats <feature_file> <pcm_file> [seed]
fn main() -> Result<(), MainError> {
    SimpleLogger::new().init().unwrap();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        error!("Usage: {} <feature_file> <pcm_file> [seed]", args[0]);
        return Err(MainError::Usage);
    }

    let seed = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0);
    let config = DatasetConfig::default();
    let mut dataset = LpcNetDataset::from_files(config, &args[1], &args[2], StdRng::seed_from_u64(seed))?;
    info!("Walking one epoch of {} batches", dataset.batches_per_epoch());

    let mut stats = Stats::default();
    for batch in dataset.epoch() {
        let batch = batch?;
        stats.add(&batch);

        if stats.num_batches % 100 == 0 {
            info!("Batch {}", stats.num_batches);
        }
    }

    info!(
        "{} batches, {} samples, prediction gain {:.2} dB, pitch periods {}..={}",
        stats.num_batches,
        stats.num_samples,
        stats.prediction_gain_db(),
        stats.min_period,
        stats.max_period
    );
    Ok(())
}
