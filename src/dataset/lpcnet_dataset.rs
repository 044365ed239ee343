// Copyright 2022 David Haig
// Licensed under the Apache License, Version 2.0 (the "License");
//

use super::{
    features::{network_features, pitch_periods},
    noise,
};
use crate::{
    codec::ulaw,
    common::{
        config::{ConfigError, DatasetConfig},
        raw_stream::{self, RawStreamError},
    },
    lpc::prediction,
};
use ndarray::{concatenate, Array3, ArrayView2, Axis, ShapeError};
use rand::Rng;
use std::{path::Path, sync::Arc};

// warn when alignment throws away more than this share of either stream
const MAX_SILENT_DISCARD: f64 = 0.01;

/// Main entry point of library - Start here for building training batches

#[derive(Debug)]
pub enum DatasetError {
    Config(ConfigError),
    RawStream(RawStreamError),
    NotEnoughData(NotEnoughDataDetails),
    Shape(ShapeError),
}

#[derive(Debug)]
pub struct NotEnoughDataDetails {
    pub required_chunks: usize,
    pub available_chunks: usize,
}

impl From<ConfigError> for DatasetError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<RawStreamError> for DatasetError {
    fn from(err: RawStreamError) -> Self {
        Self::RawStream(err)
    }
}

impl From<ShapeError> for DatasetError {
    fn from(err: ShapeError) -> Self {
        Self::Shape(err)
    }
}

/// How the pcm and feature streams were cut down to a common whole number of chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamAlignment {
    pub pcm_chunks: usize,
    pub feature_chunks: usize,
    pub nb_chunks: usize,
    pub discarded_pcm_samples: usize,
    pub discarded_feature_values: usize,
}

impl StreamAlignment {
    pub fn new(config: &DatasetConfig, pcm_len: usize, features_len: usize) -> Self {
        let pcm_chunks = pcm_len / config.pcm_chunk_size();
        let feature_chunks = features_len / config.feature_chunk_len();
        let nb_chunks = pcm_chunks.min(feature_chunks);

        Self {
            pcm_chunks,
            feature_chunks,
            nb_chunks,
            discarded_pcm_samples: pcm_len - nb_chunks * config.pcm_chunk_size(),
            discarded_feature_values: features_len - nb_chunks * config.feature_chunk_len(),
        }
    }

    pub fn is_mismatched(&self) -> bool {
        self.pcm_chunks != self.feature_chunks
    }
}

/// Network inputs of one batch, in the order the model takes them
#[derive(Debug, Clone, PartialEq)]
pub struct BatchInputs {
    /// Noisy lagged signal and companded lpc prediction (batch_size, pcm_chunk_size, 2)
    pub signal: Array3<u8>,

    /// Companded excitation of the previous sample (batch_size, pcm_chunk_size, 1)
    pub excitation: Array3<u8>,

    /// Masked conditioning features (batch_size, feature_chunk_size, nb_used_features)
    pub features: Array3<f32>,

    /// Pitch period per frame in samples (batch_size, feature_chunk_size, 1)
    pub periods: Array3<i16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingBatch {
    pub inputs: BatchInputs,

    /// Companded excitation to predict (batch_size, pcm_chunk_size, 1)
    pub target: Array3<u8>,
}

/// Holds the aligned pcm and feature streams and draws training batches from them
///
/// Every call to `next_batch` picks a batch index uniformly at random (with replacement) and builds
/// `batch_size` consecutive chunks starting there. The streams are shared and immutable so several
/// datasets created with `fork` can run on different threads, each with its own rng.
pub struct LpcNetDataset<R> {
    config: DatasetConfig,
    pcm: Arc<[i16]>,
    features: Arc<[f32]>,
    alignment: StreamAlignment,
    batches_per_epoch: usize,
    rng: R,
}

impl<R: Rng> LpcNetDataset<R> {
    pub fn new(config: DatasetConfig, mut pcm: Vec<i16>, mut features: Vec<f32>, rng: R) -> Result<Self, DatasetError> {
        config.validate()?;

        let alignment = StreamAlignment::new(&config, pcm.len(), features.len());
        if alignment.is_mismatched() {
            debug!(
                "Pcm stream has {} chunks and feature stream has {} chunks, using {}",
                alignment.pcm_chunks, alignment.feature_chunks, alignment.nb_chunks
            );
        }

        if exceeds_discard_limit(alignment.discarded_pcm_samples, pcm.len()) {
            warn!(
                "Discarding {} of {} pcm samples to align with features",
                alignment.discarded_pcm_samples,
                pcm.len()
            );
        }

        if exceeds_discard_limit(alignment.discarded_feature_values, features.len()) {
            warn!(
                "Discarding {} of {} feature values to align with pcm",
                alignment.discarded_feature_values,
                features.len()
            );
        }

        // limit to a whole number of chunks
        pcm.truncate(alignment.nb_chunks * config.pcm_chunk_size());
        features.truncate(alignment.nb_chunks * config.feature_chunk_len());

        let batches_per_epoch = alignment.nb_chunks / config.batch_size;
        info!("Batches per epoch: {}", batches_per_epoch);
        if batches_per_epoch == 0 {
            return Err(DatasetError::NotEnoughData(NotEnoughDataDetails {
                required_chunks: config.batch_size,
                available_chunks: alignment.nb_chunks,
            }));
        }

        Ok(Self {
            config,
            pcm: pcm.into(),
            features: features.into(),
            alignment,
            batches_per_epoch,
            rng,
        })
    }

    /// Loads headerless little endian feature (f32) and pcm (i16) files
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        config: DatasetConfig,
        feature_file: P,
        pcm_file: Q,
        rng: R,
    ) -> Result<Self, DatasetError> {
        info!("Start loading data from files");
        let pcm = raw_stream::load_pcm(pcm_file)?;
        let features = raw_stream::load_features(feature_file)?;
        Self::new(config, pcm, features, rng)
    }

    /// A dataset over the same streams with its own rng
    pub fn fork<S: Rng>(&self, rng: S) -> LpcNetDataset<S> {
        LpcNetDataset {
            config: self.config.clone(),
            pcm: self.pcm.clone(),
            features: self.features.clone(),
            alignment: self.alignment,
            batches_per_epoch: self.batches_per_epoch,
            rng,
        }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn alignment(&self) -> StreamAlignment {
        self.alignment
    }

    /// Number of distinct batch positions, also the number of training steps in one epoch
    pub fn batches_per_epoch(&self) -> usize {
        self.batches_per_epoch
    }

    pub fn pcm(&self) -> &[i16] {
        &self.pcm
    }

    pub fn features(&self) -> &[f32] {
        &self.features
    }

    /// Draws a batch index from the dataset rng and builds that batch
    pub fn next_batch(&mut self) -> Result<TrainingBatch, DatasetError> {
        let index = self.rng.gen_range(0..self.batches_per_epoch);
        debug!("Building batch {}", index);
        build(&self.config, &self.pcm, &self.features, index, &mut self.rng)
    }

    /// Builds the batch at `index`, drawing injected noise from `rng`
    pub fn build_batch<S: Rng + ?Sized>(&self, index: usize, rng: &mut S) -> Result<TrainingBatch, DatasetError> {
        if index >= self.batches_per_epoch {
            panic!(
                "Cannot build batch index {} as the dataset only holds {} batches",
                index, self.batches_per_epoch
            );
        }

        build(&self.config, &self.pcm, &self.features, index, rng)
    }

    /// Exactly `batches_per_epoch` randomly drawn batches
    pub fn epoch(&mut self) -> impl Iterator<Item = Result<TrainingBatch, DatasetError>> + '_ {
        let num_batches = self.batches_per_epoch;
        (0..num_batches).map(move |_| self.next_batch())
    }
}

/// Never exhausted, stop pulling when done
impl<R: Rng> Iterator for LpcNetDataset<R> {
    type Item = Result<TrainingBatch, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_batch())
    }
}

fn build<S: Rng + ?Sized>(
    config: &DatasetConfig,
    pcm: &[i16],
    features: &[f32],
    index: usize,
    rng: &mut S,
) -> Result<TrainingBatch, DatasetError> {
    let batch_size = config.batch_size;
    let pcm_chunk_size = config.pcm_chunk_size();
    let num_samples = batch_size * pcm_chunk_size;
    let num_frames = batch_size * config.feature_chunk_size;
    let num_feature_values = num_frames * config.nb_features;

    let udata = &pcm[index * num_samples..(index + 1) * num_samples];
    let features = &features[index * num_feature_values..(index + 1) * num_feature_values];
    let feature_frames = ArrayView2::from_shape((num_frames, config.nb_features), features)?;

    let mut data = vec![0; num_samples];
    ulaw::encode_pcm(udata, &mut data);

    // the network is conditioned on the previous sample
    let mut in_data = lag_by_one(&data);
    let num_clipped = noise::inject_noise(&config.noise, &mut in_data, rng);
    trace!("Clipped {} noisy samples", num_clipped);

    // lpc prediction from the noisy history
    let mut pred_in = vec![0.0; num_samples];
    ulaw::decode(&in_data, &mut pred_in);
    let mut upred = vec![0.0; num_samples];
    prediction::predict(config, &pred_in, feature_frames, &mut upred);
    let mut pred = vec![0; num_samples];
    ulaw::encode(&upred, &mut pred);

    // lpc residual, lagged by one sample it is also the ideal excitation input
    let mut out_data = vec![0; num_samples];
    prediction::residual(udata, &upred, &mut out_data);
    let in_exc = lag_by_one(&out_data);

    let shape = (batch_size, pcm_chunk_size, 1);
    let in_data = Array3::from_shape_vec(shape, in_data)?;
    let pred = Array3::from_shape_vec(shape, pred)?;
    let signal = concatenate(Axis(2), &[in_data.view(), pred.view()])?;
    let excitation = Array3::from_shape_vec(shape, in_exc)?;
    let target = Array3::from_shape_vec(shape, out_data)?;

    let feature_chunks = feature_frames.into_shape((batch_size, config.feature_chunk_size, config.nb_features))?;
    let features = network_features(config, feature_chunks);
    let periods = pitch_periods(config, features.view());

    Ok(TrainingBatch {
        inputs: BatchInputs {
            signal,
            excitation,
            features,
            periods,
        },
        target,
    })
}

// shift right by one sample, repeating the first
fn lag_by_one(x: &[u8]) -> Vec<u8> {
    let len = x.len();
    x.first().copied().into_iter().chain(x[..len.saturating_sub(1)].iter().copied()).collect()
}

fn exceeds_discard_limit(discarded: usize, total: usize) -> bool {
    total > 0 && discarded as f64 / total as f64 > MAX_SILENT_DISCARD
}
