use crate::common::config::DatasetConfig;
use ndarray::{s, Array3, ArrayView3, Axis};

/// Conditioning features as the network sees them
///
/// Keeps the first `nb_used_features` columns of every frame and zeroes the masked columns
///
/// # Arguments
///
/// * `config` - Dataset config
/// * `features` - Raw features with shape (batch_size, feature_chunk_size, nb_features)
pub fn network_features(config: &DatasetConfig, features: ArrayView3<f32>) -> Array3<f32> {
    assert_eq!(features.len_of(Axis(2)), config.nb_features);
    let mut used = features.slice(s![.., .., ..config.nb_used_features]).to_owned();

    let mask_start = config.masked_features.start.min(config.nb_used_features);
    let mask_end = config.masked_features.end.min(config.nb_used_features);
    if mask_start < mask_end {
        used.slice_mut(s![.., .., mask_start..mask_end]).fill(0.0);
    }

    used
}

/// Maps the normalized pitch feature of every frame to a pitch period in samples
///
/// `period = floor(0.1 + 50 * pitch + 100)`, saturated into the i16 range
///
/// # Arguments
///
/// * `config` - Dataset config
/// * `features` - Features with shape (batch_size, feature_chunk_size, n) where n > pitch_feature
pub fn pitch_periods(config: &DatasetConfig, features: ArrayView3<f32>) -> Array3<i16> {
    let pitch = features.slice(s![.., .., config.pitch_feature..config.pitch_feature + 1]);
    pitch.mapv(|p| (0.1 + 50.0 * p + 100.0).floor() as i16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_and_truncates() {
        let config = DatasetConfig::new(2);
        let features = Array3::from_shape_fn((2, 15, 55), |(b, f, c)| (b * 1000 + f * 100 + c) as f32 + 1.0);

        let used = network_features(&config, features.view());

        assert_eq!(used.dim(), (2, 15, 38));
        for ((b, f, c), value) in used.indexed_iter() {
            if (18..36).contains(&c) {
                assert_eq!(*value, 0.0);
            } else {
                assert_eq!(*value, (b * 1000 + f * 100 + c) as f32 + 1.0);
            }
        }
    }

    #[test]
    fn periods_from_pitch_feature() {
        let config = DatasetConfig::new(1);
        let mut features = Array3::zeros((1, 3, 38));
        features[[0, 1, 36]] = 0.5;
        features[[0, 2, 36]] = -0.5;

        let periods = pitch_periods(&config, features.view());

        assert_eq!(periods.dim(), (1, 3, 1));
        assert_eq!(periods.into_raw_vec(), [100, 125, 75]);
    }

    #[test]
    fn periods_round_down_and_saturate() {
        let config = DatasetConfig::new(1);
        let mut features = Array3::zeros((1, 4, 38));
        features[[0, 0, 36]] = 0.397;
        features[[0, 1, 36]] = -2.01;
        features[[0, 2, 36]] = 1.0e6;
        features[[0, 3, 36]] = -1.0e6;

        let periods = pitch_periods(&config, features.view());

        assert_eq!(periods.into_raw_vec(), [119, -1, i16::MAX, i16::MIN]);
    }
}
