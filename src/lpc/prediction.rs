// Copyright 2022 David Haig
// Licensed under the Apache License, Version 2.0 (the "License");
//

use crate::{codec::ulaw, common::config::DatasetConfig};
use itertools::izip;
use ndarray::ArrayView2;

/// Runs the per-frame linear predictor over a whole batch
///
/// Every frame uses its own coefficients (the last `lpc_order` features of the frame) for all of its
/// samples: `prediction[i] = -sum(signal[i - k] * coef[k])` for `k` in `0..lpc_order`, summed in
/// ascending `k`. Each tap is computed in f64 and the running sum is stored back to f32 after every
/// tap. The first `lpc_skip_frames` frames have no history and are set to zero.
///
/// # Arguments
///
/// * `config` - Dataset config (frame size, lpc order, skipped frames)
/// * `signal` - Linear input signal (length nb_frames * frame_size)
/// * `features` - Feature frames with shape (nb_frames, nb_features)
/// * `prediction` - Predicted linear signal (same length as `signal`)
pub fn predict(config: &DatasetConfig, signal: &[f64], features: ArrayView2<f32>, prediction: &mut [f32]) {
    let frame_size = config.frame_size;
    let nb_frames = features.nrows();
    assert_eq!(features.ncols(), config.nb_features);
    assert_eq!(signal.len(), nb_frames * frame_size);
    assert_eq!(prediction.len(), signal.len());
    assert!(config.lpc_order <= config.lpc_skip_frames * frame_size + 1);

    let lpc_offset = config.lpc_offset();
    let skip = config.lpc_skip_frames.min(nb_frames);
    prediction[..skip * frame_size].fill(0.0);

    for (f, feature_frame) in features.outer_iter().enumerate().skip(skip) {
        let coef = feature_frame.slice(ndarray::s![lpc_offset..]);
        let from = f * frame_size;

        for (i, pred) in prediction[from..from + frame_size].iter_mut().enumerate() {
            let i = from + i;
            let mut acc = 0.0f32;
            for (k, c) in coef.iter().enumerate() {
                acc = (acc as f64 - signal[i - k] * *c as f64) as f32;
            }
            *pred = acc;
        }
    }
}

/// Companded excitation: the mu-law code of what the predictor failed to explain
///
/// # Arguments
///
/// * `original` - Clean pcm samples
/// * `prediction` - Output of `predict`
/// * `residual` - Output mu-law codes (same length as `original`)
pub fn residual(original: &[i16], prediction: &[f32], residual: &mut [u8]) {
    assert_eq!(original.len(), prediction.len());
    assert_eq!(original.len(), residual.len());
    for (to, x, pred) in izip!(residual.iter_mut(), original, prediction) {
        *to = ulaw::linear_to_ulaw(*x as f32 - *pred);
    }
}
