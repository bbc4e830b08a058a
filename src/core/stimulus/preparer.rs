// src/core/stimulus/preparer.rs
//
// Stage 1: turn a source music file into a playable stimulus (markers
// embedded, fixed sample rate) plus its descriptor. Deterministic for a
// given source and parameter set so results can be cached by identity.

use std::path::Path;

use log::{debug, warn};

use super::descriptor::StimulusDescriptor;
use super::markers::{marker_group_times, mix_at, synthesize_marker};
use crate::config::StimulusParams;
use crate::core::decoder::decode_audio;
use crate::core::dsp::resample_mono;
use crate::core::onset::OnsetDetector;
use crate::error::PreparationError;

/// Output of one preparation run: the stimulus waveform and its
/// descriptor
#[derive(Debug, Clone)]
pub struct PreparedStimulus {
    pub waveform: Vec<f32>,
    pub descriptor: StimulusDescriptor,
}

/// Stimulus preparer
pub struct StimulusPreparer {
    params: StimulusParams,
}

impl Default for StimulusPreparer {
    fn default() -> Self {
        Self::new()
    }
}

impl StimulusPreparer {
    pub fn new() -> Self {
        Self {
            params: StimulusParams::default(),
        }
    }

    pub fn with_params(params: StimulusParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &StimulusParams {
        &self.params
    }

    /// Prepare a stimulus from a source music file
    ///
    /// The expected beat grid comes from a sidecar annotation file
    /// (`<stem>.txt`, one beat time per line, seconds relative to music
    /// start) when present, otherwise from percussive onset detection on
    /// the music itself.
    pub fn prepare(
        &self,
        stim_name: &str,
        source: &Path,
    ) -> Result<PreparedStimulus, PreparationError> {
        let fs = self.params.sample_rate;

        let decoded = decode_audio(source).map_err(|e| PreparationError::Decode {
            path: source.to_path_buf(),
            message: format!("{e:#}"),
        })?;
        let mono = decoded.mono();
        let music = resample_mono(&mono, decoded.sample_rate, fs)?;
        let music_secs = music.len() as f64 / fs as f64;

        debug!(
            "preparing '{}' from {} ({:.2}s of music)",
            stim_name,
            source.display(),
            music_secs
        );

        if music_secs < self.params.min_music_secs {
            return Err(PreparationError::TooShort {
                actual_secs: music_secs,
                min_secs: self.params.min_music_secs,
            });
        }

        let mut beats = match self.read_annotation(source)? {
            Some(annotated) => annotated,
            None => self.detect_beats(&music, fs),
        };
        beats.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let in_range = beats
            .iter()
            .filter(|&&t| (0.0..=music_secs).contains(&t))
            .count();
        if in_range < beats.len() {
            warn!(
                "'{}': dropping {} beat(s) outside the music span",
                stim_name,
                beats.len() - in_range
            );
            beats.retain(|&t| (0.0..=music_secs).contains(&t));
        }

        if beats.len() < self.params.min_beats {
            return Err(PreparationError::TooFewBeats {
                actual: beats.len(),
                min: self.params.min_beats,
            });
        }

        // Assemble: lead-in silence + music + tail silence, with one
        // marker group in each silent span
        let lead_in = self.params.lead_in_secs;
        let total_secs = lead_in + music_secs + self.params.tail_secs;
        let mut waveform = vec![0.0f32; (total_secs * fs as f64).round() as usize];

        let music_start_idx = (lead_in * fs as f64).round() as usize;
        for (n, &s) in music.iter().enumerate() {
            let idx = music_start_idx + n;
            if idx >= waveform.len() {
                break;
            }
            waveform[idx] = s;
        }

        let clip = synthesize_marker(&self.params.marker, fs);
        let mut markers = marker_group_times(0.0, &self.params.marker);
        markers.extend(marker_group_times(lead_in + music_secs, &self.params.marker));
        for &t in &markers {
            mix_at(&mut waveform, &clip, t, fs);
        }

        let onsets: Vec<f64> = beats.iter().map(|&t| t + lead_in).collect();

        let descriptor = StimulusDescriptor::new(
            stim_name,
            source.display().to_string(),
            fs,
            total_secs,
            lead_in,
            onsets,
            markers,
        )?;

        Ok(PreparedStimulus {
            waveform,
            descriptor,
        })
    }

    /// Write a prepared waveform as 16-bit PCM WAV at the fixed rate
    pub fn save_waveform(&self, samples: &[f32], path: &Path) -> Result<(), PreparationError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.params.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let to_write_err = |e: hound::Error| PreparationError::Write {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        };

        let mut writer = hound::WavWriter::create(path, spec).map_err(to_write_err)?;
        for &s in samples {
            let value = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(value).map_err(to_write_err)?;
        }
        writer.finalize().map_err(to_write_err)
    }

    fn read_annotation(&self, source: &Path) -> Result<Option<Vec<f64>>, PreparationError> {
        let path = source.with_extension("txt");
        if !path.exists() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(&path).map_err(|source| PreparationError::Io {
            path: path.clone(),
            source,
        })?;

        let mut beats = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let value: f64 = trimmed
                .parse()
                .map_err(|_| PreparationError::BadAnnotation {
                    path: path.clone(),
                    message: format!("line {}: not a number: {trimmed:?}", line_no + 1),
                })?;
            beats.push(value);
        }

        debug!("loaded {} annotated beat(s) from {}", beats.len(), path.display());
        Ok(Some(beats))
    }

    fn detect_beats(&self, music: &[f32], sample_rate: u32) -> Vec<f64> {
        let detector = OnsetDetector::with_params(self.params.beat_fallback.clone());
        let onsets = detector.detect(music, sample_rate);
        debug!(
            "no annotation found, detected {} beat(s) from the music",
            onsets.len()
        );
        onsets.times().to_vec()
    }
}
