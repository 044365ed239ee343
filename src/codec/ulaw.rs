// Copyright 2022 David Haig
// Licensed under the Apache License, Version 2.0 (the "License");
//

//! Mu-law (mu = 255) companding between linear 16 bit scale samples and 8 bit codes.
//!
//! Unlike G.711 this is the continuous law with rounding to the nearest code: linear zero maps to
//! code 128, -32768 to code 0 and anything at or above +32768 saturates to code 255.
//!
//! The precision follows the input: f32 samples are compressed in f32, pcm samples in f64, and
//! codes expand to f64.

// 255 / 32768
const SCALE: f64 = 255.0 / 32768.0;

// 32768 / 255
const SCALE_INV: f64 = 32768.0 / 255.0;

// ln(256)
const LN_256: f64 = core::f64::consts::LN_2 * 8.0;

// ln(256) / 128
const LOG_STEP: f64 = LN_256 / 128.0;

pub const ULAW_ZERO: u8 = 128;

/// Compresses a linear sample to an 8 bit mu-law code, evaluating the law in f32
///
/// The result is rounded half to even and clipped to the range 0..=255 so out of range input is
/// saturated rather than rejected
pub fn linear_to_ulaw(x: f32) -> u8 {
    if x == 0.0 {
        return ULAW_ZERO;
    }

    let u = x.signum() * (128.0 * (1.0 + SCALE as f32 * x.abs()).ln() / LN_256 as f32);
    let code = (ULAW_ZERO as f32 + u.round_ties_even()).clamp(0.0, 255.0);
    code as u8
}

/// Compresses a pcm sample to an 8 bit mu-law code, evaluating the law in f64
pub fn pcm_to_ulaw(x: i16) -> u8 {
    if x == 0 {
        return ULAW_ZERO;
    }

    let x = x as f64;
    let u = x.signum() * (128.0 * (1.0 + SCALE * x.abs()).ln() / LN_256);
    let code = (ULAW_ZERO as f64 + u.round_ties_even()).clamp(0.0, 255.0);
    code as u8
}

/// Expands an 8 bit mu-law code back to a linear sample
pub fn ulaw_to_linear(code: u8) -> f64 {
    let u = code as f64 - ULAW_ZERO as f64;
    if u == 0.0 {
        return 0.0;
    }

    u.signum() * SCALE_INV * ((u.abs() / 128.0 * LN_256).exp() - 1.0)
}

/// Distance between adjacent reconstruction levels around amplitude `x`
pub fn quantization_step(x: f32) -> f32 {
    (LOG_STEP * (SCALE_INV + (x as f64).abs())) as f32
}

/// Compresses each linear sample in `linear` into `codes`
///
/// # Arguments
///
/// * `linear` - Input samples (16 bit scale)
/// * `codes` - Output mu-law codes (same length as input)
pub fn encode(linear: &[f32], codes: &mut [u8]) {
    assert_eq!(linear.len(), codes.len());
    for (to, from) in codes.iter_mut().zip(linear) {
        *to = linear_to_ulaw(*from);
    }
}

/// Same as `encode` for 16 bit pcm input
pub fn encode_pcm(pcm: &[i16], codes: &mut [u8]) {
    assert_eq!(pcm.len(), codes.len());
    for (to, from) in codes.iter_mut().zip(pcm) {
        *to = pcm_to_ulaw(*from);
    }
}

/// Expands each mu-law code in `codes` into `linear`
pub fn decode(codes: &[u8], linear: &mut [f64]) {
    assert_eq!(codes.len(), linear.len());
    for (to, from) in linear.iter_mut().zip(codes) {
        *to = ulaw_to_linear(*from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_maps_to_code_128() {
        assert_eq!(linear_to_ulaw(0.0), 128);
        assert_eq!(linear_to_ulaw(-0.0), 128);
        assert_eq!(ulaw_to_linear(128), 0.0);
    }

    #[test]
    fn saturates_at_range_ends() {
        assert_eq!(linear_to_ulaw(-32768.0), 0);
        assert_eq!(linear_to_ulaw(32768.0), 255);
        assert_eq!(linear_to_ulaw(-1.0e9), 0);
        assert_eq!(linear_to_ulaw(1.0e9), 255);
        assert_eq!(ulaw_to_linear(0) as f32, -32768.0);
        assert_eq!(pcm_to_ulaw(i16::MIN), 0);
        assert_eq!(pcm_to_ulaw(i16::MAX), 255);
    }

    #[test]
    fn small_values() {
        // 128 * ln(1 + 255/32768) / ln(256) = 0.179 rounds to 0
        assert_eq!(linear_to_ulaw(1.0), 128);
        // 128 * ln(1 + 10 * 255/32768) / ln(256) = 1.7 rounds to 2
        assert_eq!(linear_to_ulaw(10.0), 130);
        assert_eq!(linear_to_ulaw(-10.0), 126);
    }

    #[test]
    fn codes_are_monotonic() {
        let mut last = linear_to_ulaw(-32768.0);
        for x in (-32768..=32767).step_by(3) {
            let code = linear_to_ulaw(x as f32);
            assert!(code >= last);
            last = code;
        }
    }

    #[test]
    fn expansion_is_odd_symmetric() {
        for u in 1..128u8 {
            assert_eq!(ulaw_to_linear(128 + u), -ulaw_to_linear(128 - u));
        }
    }

    #[test]
    fn every_code_round_trips() {
        for code in 0..=255u8 {
            assert_eq!(linear_to_ulaw(ulaw_to_linear(code) as f32), code);
        }
    }

    #[test]
    fn round_trip_within_quantization_step() {
        for x in (-32000..=32000).step_by(7) {
            let x = x as f32;
            let decoded = ulaw_to_linear(linear_to_ulaw(x)) as f32;
            assert!(
                (decoded - x).abs() <= quantization_step(x),
                "x: {} decoded: {} step: {}",
                x,
                decoded,
                quantization_step(x)
            );
        }
    }

    #[test]
    fn slice_encode_decode() {
        let pcm = [0, 1000, -1000, 32767, -32768];
        let mut codes_pcm = [0; 5];
        let mut codes = [0; 5];
        let mut linear = [0.0; 5];

        encode_pcm(&pcm, &mut codes_pcm);
        encode(&[0.0, 1000.0, -1000.0, 32767.0, -32768.0], &mut codes);
        decode(&codes, &mut linear);

        assert_eq!(codes_pcm, codes);
        assert_eq!(codes[0], 128);
        assert_eq!(codes[1], 255 - codes[2] + 1);
        assert_eq!(codes[3], 255);
        assert_eq!(codes[4], 0);
        assert_eq!(linear[0], 0.0);
        assert_eq!(linear[4] as f32, -32768.0);
    }

    #[test]
    fn pcm_values() {
        assert_eq!(pcm_to_ulaw(0), 128);
        assert_eq!(pcm_to_ulaw(1), 128);
        assert_eq!(pcm_to_ulaw(10), 130);
        assert_eq!(pcm_to_ulaw(-10), 126);
        assert_eq!(pcm_to_ulaw(1000), 178);
        assert_eq!(pcm_to_ulaw(-1000), 78);
    }
}
