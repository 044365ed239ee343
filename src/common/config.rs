use super::constants::*;
use core::ops::Range;
use heapless::Vec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroFrameSize,
    ZeroFeatureChunkSize,
    ZeroBatchSize,
    LpcOrderExceedsFeatures { lpc_order: usize, nb_features: usize },
    LpcOrderExceedsHistory { lpc_order: usize, history: usize },
    UsedFeaturesExceedFeatures { nb_used_features: usize, nb_features: usize },
    PitchFeatureNotUsed { pitch_feature: usize, nb_used_features: usize },
    PitchFeatureMasked(usize),
    EmptyNoiseSchedule,
    TooManyNoiseSegments,
}

/// A run of the noise vector whose values are drawn uniformly from `[low, high)`
///
/// An empty range (`low >= high`) produces zeros
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseSegment {
    /// Share of the signal covered by this segment, relative to the sum of all weights
    pub weight: usize,
    pub low: i32,
    pub high: i32,
}

impl NoiseSegment {
    pub const fn new(weight: usize, low: i32, high: i32) -> Self {
        Self { weight, low, high }
    }

    pub const fn zeros(weight: usize) -> Self {
        Self { weight, low: 0, high: 0 }
    }

    pub fn is_silent(&self) -> bool {
        self.low >= self.high
    }
}

/// Noise added to the lagged companded signal, laid out as consecutive segments.
/// Every segment but the last covers `len * weight / total_weight` samples, the last takes the remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseSchedule {
    segments: Vec<NoiseSegment, MAX_NOISE_SEGMENTS>,
}

impl NoiseSchedule {
    pub fn new(segments: &[NoiseSegment]) -> Result<Self, ConfigError> {
        if segments.is_empty() || segments.iter().all(|s| s.weight == 0) {
            return Err(ConfigError::EmptyNoiseSchedule);
        }

        let segments = Vec::from_slice(segments).map_err(|_| ConfigError::TooManyNoiseSegments)?;
        Ok(Self { segments })
    }

    /// One fifth clean, one fifth in [-3,3), one fifth in [-2,2) and two fifths in [-1,1)
    pub fn lpcnet() -> Self {
        let mut segments = Vec::new();
        // capacity is well above 4 so these pushes cannot fail
        segments.push(NoiseSegment::zeros(1)).ok();
        segments.push(NoiseSegment::new(1, -3, 3)).ok();
        segments.push(NoiseSegment::new(1, -2, 2)).ok();
        segments.push(NoiseSegment::new(2, -1, 1)).ok();
        Self { segments }
    }

    /// No noise at all (the lagged signal is passed through untouched)
    pub fn none() -> Self {
        let mut segments = Vec::new();
        segments.push(NoiseSegment::zeros(1)).ok();
        Self { segments }
    }

    pub fn segments(&self) -> &[NoiseSegment] {
        &self.segments
    }

    pub fn total_weight(&self) -> usize {
        self.segments.iter().map(|s| s.weight).sum()
    }

    /// Sample ranges covered by each segment for a signal of length `len`
    pub fn segment_ranges(&self, len: usize) -> impl Iterator<Item = (Range<usize>, &NoiseSegment)> + '_ {
        let total = self.total_weight();
        let last = self.segments.len() - 1;
        let mut from = 0;
        self.segments.iter().enumerate().map(move |(index, segment)| {
            let to = if index == last {
                len
            } else {
                (from + len * segment.weight / total).min(len)
            };
            let range = from..to;
            from = to;
            (range, segment)
        })
    }
}

impl Default for NoiseSchedule {
    fn default() -> Self {
        Self::lpcnet()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    /// Number of pcm samples per feature frame (e.g. 160)
    pub frame_size: usize,

    /// Number of f32 values per frame in the feature stream (e.g. 55)
    pub nb_features: usize,

    /// Number of leading features kept in the output feature tensor (e.g. 38)
    pub nb_used_features: usize,

    /// Number of frames per training sequence (e.g. 15)
    pub feature_chunk_size: usize,

    /// Number of sequences per batch (e.g. 64)
    pub batch_size: usize,

    /// Linear prediction order, the coefficients are the last `lpc_order` features (e.g. 16)
    pub lpc_order: usize,

    /// Leading frames of each batch left with a zero prediction (e.g. 2)
    pub lpc_skip_frames: usize,

    /// Feature columns zeroed in the output (e.g. 18..36)
    pub masked_features: Range<usize>,

    /// Feature column holding the normalized pitch period (e.g. 36)
    pub pitch_feature: usize,

    pub noise: NoiseSchedule,
}

impl DatasetConfig {
    pub fn new(batch_size: usize) -> Self {
        Self {
            frame_size: FRAME_SIZE,
            nb_features: NB_FEATURES,
            nb_used_features: NB_USED_FEATURES,
            feature_chunk_size: FEATURE_CHUNK_SIZE,
            batch_size,
            lpc_order: LPC_ORDER,
            lpc_skip_frames: LPC_SKIP_FRAMES,
            masked_features: MASKED_FEATURES_START..MASKED_FEATURES_END,
            pitch_feature: PITCH_FEATURE,
            noise: NoiseSchedule::lpcnet(),
        }
    }

    pub fn with_noise(mut self, noise: NoiseSchedule) -> Self {
        self.noise = noise;
        self
    }

    /// Number of pcm samples per training sequence (e.g. 2400)
    pub const fn pcm_chunk_size(&self) -> usize {
        self.frame_size * self.feature_chunk_size
    }

    /// Number of f32 feature values per training sequence (e.g. 825)
    pub const fn feature_chunk_len(&self) -> usize {
        self.feature_chunk_size * self.nb_features
    }

    /// Index of the first lpc coefficient in a feature frame (e.g. 39)
    pub const fn lpc_offset(&self) -> usize {
        self.nb_features - self.lpc_order
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_size == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }

        if self.feature_chunk_size == 0 {
            return Err(ConfigError::ZeroFeatureChunkSize);
        }

        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }

        if self.lpc_order > self.nb_features {
            return Err(ConfigError::LpcOrderExceedsFeatures {
                lpc_order: self.lpc_order,
                nb_features: self.nb_features,
            });
        }

        // the predictor reaches back lpc_order - 1 samples from the first predicted sample
        let history = self.lpc_skip_frames * self.frame_size;
        if self.lpc_order > history + 1 {
            return Err(ConfigError::LpcOrderExceedsHistory {
                lpc_order: self.lpc_order,
                history,
            });
        }

        if self.nb_used_features > self.nb_features {
            return Err(ConfigError::UsedFeaturesExceedFeatures {
                nb_used_features: self.nb_used_features,
                nb_features: self.nb_features,
            });
        }

        if self.pitch_feature >= self.nb_used_features {
            return Err(ConfigError::PitchFeatureNotUsed {
                pitch_feature: self.pitch_feature,
                nb_used_features: self.nb_used_features,
            });
        }

        if self.masked_features.contains(&self.pitch_feature) {
            return Err(ConfigError::PitchFeatureMasked(self.pitch_feature));
        }

        Ok(())
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self::new(BATCH_SIZE)
    }
}
