use byteorder::{ByteOrder, LittleEndian};
use std::{fs::File, io, io::prelude::*, path::Path};

// Headerless little endian sample streams as written by the feature extractor:
// pcm files hold i16 samples, feature files hold f32 values (row major, nb_features per frame)

#[derive(Debug)]
pub enum RawStreamError {
    Io(io::Error),
}

impl From<io::Error> for RawStreamError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

pub const PCM_SAMPLE_LEN: usize = 2;
pub const FEATURE_VALUE_LEN: usize = 4;

/// Decodes little endian i16 samples, a trailing odd byte is ignored
pub fn read_pcm(buf: &[u8]) -> Vec<i16> {
    let num_samples = buf.len() / PCM_SAMPLE_LEN;
    if buf.len() % PCM_SAMPLE_LEN != 0 {
        warn!("Ignoring {} trailing bytes of pcm stream", buf.len() % PCM_SAMPLE_LEN);
    }

    let mut samples = vec![0; num_samples];
    LittleEndian::read_i16_into(&buf[..num_samples * PCM_SAMPLE_LEN], &mut samples);
    samples
}

/// Decodes little endian f32 values, trailing bytes of an incomplete value are ignored
pub fn read_features(buf: &[u8]) -> Vec<f32> {
    let num_values = buf.len() / FEATURE_VALUE_LEN;
    if buf.len() % FEATURE_VALUE_LEN != 0 {
        warn!(
            "Ignoring {} trailing bytes of feature stream",
            buf.len() % FEATURE_VALUE_LEN
        );
    }

    let mut values = vec![0.0; num_values];
    LittleEndian::read_f32_into(&buf[..num_values * FEATURE_VALUE_LEN], &mut values);
    values
}

pub fn load_pcm<P: AsRef<Path>>(path: P) -> Result<Vec<i16>, RawStreamError> {
    let buf = read_file(path.as_ref())?;
    let samples = read_pcm(&buf);
    info!("Read {} pcm samples from {}", samples.len(), path.as_ref().display());
    Ok(samples)
}

pub fn load_features<P: AsRef<Path>>(path: P) -> Result<Vec<f32>, RawStreamError> {
    let buf = read_file(path.as_ref())?;
    let values = read_features(&buf);
    info!("Read {} feature values from {}", values.len(), path.as_ref().display());
    Ok(values)
}

fn read_file(path: &Path) -> Result<Vec<u8>, RawStreamError> {
    let mut file = File::open(path)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_read_pcm_stream() {
        let buf = [0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0x00, 0x80, 0xFF, 0x7F, 0x2A];

        let samples = read_pcm(&buf);

        assert_eq!(samples, [0, 1, -1, -32768, 32767]);
    }

    #[test]
    fn can_read_feature_stream() {
        let mut buf = [0; 13];
        LittleEndian::write_f32_into(&[1.0, -0.5, 0.3], &mut buf[..12]);

        let values = read_features(&buf);

        assert_eq!(values, [1.0, -0.5, 0.3]);
    }

    #[test]
    fn load_from_files() {
        let dir = std::env::temp_dir();
        let pcm_path = dir.join(format!("lpcnet_dataset_raw_stream_{}.s16", std::process::id()));
        let feature_path = dir.join(format!("lpcnet_dataset_raw_stream_{}.f32", std::process::id()));

        let mut pcm_buf = [0; 6];
        LittleEndian::write_i16_into(&[100, -200, 300], &mut pcm_buf);
        std::fs::write(&pcm_path, pcm_buf).unwrap();
        let mut feature_buf = [0; 8];
        LittleEndian::write_f32_into(&[0.25, 4.0], &mut feature_buf);
        std::fs::write(&feature_path, feature_buf).unwrap();

        let pcm = load_pcm(&pcm_path).unwrap();
        let features = load_features(&feature_path).unwrap();
        std::fs::remove_file(&pcm_path).unwrap();
        std::fs::remove_file(&feature_path).unwrap();

        assert_eq!(pcm, [100, -200, 300]);
        assert_eq!(features, [0.25, 4.0]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_pcm("/this/path/does/not/exist.s16");

        assert!(matches!(result, Err(RawStreamError::Io(_))));
    }
}
