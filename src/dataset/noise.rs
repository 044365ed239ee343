use crate::common::config::NoiseSchedule;
use rand::Rng;

// The network is fed its own (imperfect) previous samples at synthesis time, not the clean ones it
// sees during training. Perturbing the lagged companded input narrows that gap.

/// Draws the noise vector for a signal of length `len`, segment by segment in schedule order
pub fn noise_vector<R: Rng + ?Sized>(schedule: &NoiseSchedule, len: usize, rng: &mut R) -> Vec<i32> {
    let mut noise = vec![0; len];
    for (range, segment) in schedule.segment_ranges(len) {
        if segment.is_silent() {
            continue;
        }

        for n in noise[range].iter_mut() {
            *n = rng.gen_range(segment.low..segment.high);
        }
    }

    noise
}

/// Adds scheduled noise to mu-law codes in place, clipping to 0..=255
///
/// Returns the number of samples that had to be clipped
pub fn inject_noise<R: Rng + ?Sized>(schedule: &NoiseSchedule, codes: &mut [u8], rng: &mut R) -> usize {
    let noise = noise_vector(schedule, codes.len(), rng);
    let mut num_clipped = 0;
    for (code, n) in codes.iter_mut().zip(&noise) {
        let noisy = *code as i32 + *n;
        if !(0..=255).contains(&noisy) {
            num_clipped += 1;
        }

        *code = noisy.clamp(0, 255) as u8;
    }

    num_clipped
}
