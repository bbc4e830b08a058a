// src/core/stimulus/descriptor.rs
//
// Structured description of a prepared stimulus: where the music sits in
// the prepared timeline, where the beat falls, where the sync markers
// are. Persisted as a JSON key-value record next to the stimulus WAV.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PreparationError;

/// Immutable description of one prepared stimulus
///
/// Expected onset times are strictly increasing and non-negative; the
/// constructor and the JSON loader both enforce this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusDescriptor {
    stim_name: String,
    source: String,
    sample_rate: u32,
    duration_secs: f64,
    music_start_secs: f64,
    onsets_secs: Vec<f64>,
    markers_secs: Vec<f64>,
}

impl StimulusDescriptor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stim_name: impl Into<String>,
        source: impl Into<String>,
        sample_rate: u32,
        duration_secs: f64,
        music_start_secs: f64,
        onsets_secs: Vec<f64>,
        markers_secs: Vec<f64>,
    ) -> Result<Self, PreparationError> {
        let descriptor = Self {
            stim_name: stim_name.into(),
            source: source.into(),
            sample_rate,
            duration_secs,
            music_start_secs,
            onsets_secs,
            markers_secs,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn validate(&self) -> Result<(), PreparationError> {
        let mut prev = f64::NEG_INFINITY;
        for (index, &onset) in self.onsets_secs.iter().enumerate() {
            if onset < 0.0 || onset <= prev || !onset.is_finite() {
                return Err(PreparationError::UnorderedOnsets { index });
            }
            prev = onset;
        }
        Ok(())
    }

    pub fn stim_name(&self) -> &str {
        &self.stim_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total duration of the prepared stimulus, seconds
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Offset of the music within the prepared timeline, seconds
    pub fn music_start_secs(&self) -> f64 {
        self.music_start_secs
    }

    /// Expected beat times in the prepared timeline, strictly increasing
    pub fn onsets_secs(&self) -> &[f64] {
        &self.onsets_secs
    }

    /// Marker burst start times in the prepared timeline
    pub fn markers_secs(&self) -> &[f64] {
        &self.markers_secs
    }

    pub fn expected_count(&self) -> usize {
        self.onsets_secs.len()
    }

    /// Write as a JSON record
    pub fn save_json(&self, path: &Path) -> Result<(), PreparationError> {
        let file = File::create(path).map_err(|source| PreparationError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
            PreparationError::Write {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            }
        })
    }

    /// Read back a JSON record, re-validating the onset invariant
    pub fn load_json(path: &Path) -> Result<Self, PreparationError> {
        let file = File::open(path).map_err(|source| PreparationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let descriptor: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                PreparationError::BadDescriptor {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;
        descriptor.validate()?;
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> StimulusDescriptor {
        StimulusDescriptor::new(
            "music_1",
            "music/music_1.wav",
            44_100,
            20.0,
            3.5,
            vec![4.0, 4.5, 5.0, 5.5],
            vec![0.25, 0.53, 0.81],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_unordered_onsets() {
        let err = StimulusDescriptor::new(
            "bad",
            "bad.wav",
            44_100,
            10.0,
            0.0,
            vec![1.0, 1.0, 2.0],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PreparationError::UnorderedOnsets { index: 1 }
        ));
    }

    #[test]
    fn test_rejects_negative_onsets() {
        let err = StimulusDescriptor::new("bad", "bad.wav", 44_100, 10.0, 0.0, vec![-0.5], vec![])
            .unwrap_err();
        assert!(matches!(err, PreparationError::UnorderedOnsets { index: 0 }));
    }

    #[test]
    fn test_json_round_trip_preserves_onsets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("music_1.json");

        let original = descriptor();
        original.save_json(&path).unwrap();
        let loaded = StimulusDescriptor::load_json(&path).unwrap();

        assert_eq!(loaded, original);
        assert_eq!(loaded.onsets_secs(), original.onsets_secs());
    }

    #[test]
    fn test_load_rejects_tampered_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tampered.json");
        std::fs::write(
            &path,
            r#"{
                "stim_name": "x",
                "source": "x.wav",
                "sample_rate": 44100,
                "duration_secs": 10.0,
                "music_start_secs": 0.0,
                "onsets_secs": [2.0, 1.0],
                "markers_secs": []
            }"#,
        )
        .unwrap();

        assert!(matches!(
            StimulusDescriptor::load_json(&path),
            Err(PreparationError::UnorderedOnsets { .. })
        ));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert!(matches!(
            StimulusDescriptor::load_json(&path),
            Err(PreparationError::BadDescriptor { .. })
        ));
    }
}
