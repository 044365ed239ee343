// number of pcm samples covered by one feature frame (10ms at 16khz)
pub const FRAME_SIZE: usize = 160;

// number of f32 values per frame in the feature file
pub const NB_FEATURES: usize = 55;

// number of leading features the network is conditioned on
pub const NB_USED_FEATURES: usize = 38;

// number of feature frames per training sequence
pub const FEATURE_CHUNK_SIZE: usize = 15;

pub const BATCH_SIZE: usize = 64;

// the lpc coefficients are the last LPC_ORDER values of every feature frame
pub const LPC_ORDER: usize = 16;

// leading frames of a batch without enough history for the predictor
pub const LPC_SKIP_FRAMES: usize = 2;

// feature columns hidden from the network
pub const MASKED_FEATURES_START: usize = 18;
pub const MASKED_FEATURES_END: usize = 36;

// normalized pitch period feature
pub const PITCH_FEATURE: usize = 36;

// max number of segments in a noise schedule
pub const MAX_NOISE_SEGMENTS: usize = 8;
