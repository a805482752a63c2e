//! WAV serialization of synthesized audio.

use std::path::{Path, PathBuf};

use crate::{SynthesisResult, TtsError};

/// Write mono samples to a 32-bit float WAV file.
///
/// Any existing file at `path` is replaced. The parent directory must
/// already exist.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<PathBuf, TtsError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    log::debug!(
        "Wrote {} samples at {}Hz to {}",
        samples.len(),
        sample_rate,
        path.display()
    );
    Ok(path.to_path_buf())
}

/// Read a WAV file back into memory, down-mixing to mono.
///
/// Integer PCM is scaled to [-1, 1]; float data is returned as stored.
pub fn read_wav(path: &Path) -> Result<SynthesisResult, TtsError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(SynthesisResult {
        samples,
        sample_rate: spec.sample_rate,
    })
}
