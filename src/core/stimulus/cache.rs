// src/core/stimulus/cache.rs
//
// Cross-trial stimulus cache. Stimuli are immutable for the lifetime of
// a deployment, so entries are never invalidated; the key includes a
// content digest of the source file so a renamed or re-rendered source
// is treated as a different stimulus.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use log::debug;

use super::preparer::{PreparedStimulus, StimulusPreparer};
use crate::error::PreparationError;

/// Cache of prepared stimuli keyed by stimulus identity
pub struct StimulusCache {
    preparer: StimulusPreparer,
    entries: Mutex<HashMap<String, Arc<PreparedStimulus>>>,
}

impl Default for StimulusCache {
    fn default() -> Self {
        Self::new(StimulusPreparer::new())
    }
}

impl StimulusCache {
    pub fn new(preparer: StimulusPreparer) -> Self {
        Self {
            preparer,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a prepared stimulus, preparing it on first request
    ///
    /// Preparation runs outside the map lock: two callers racing on the
    /// same key may both prepare (duplicate work, identical result),
    /// but neither can observe a partially-built entry.
    pub fn get_or_prepare(
        &self,
        stim_name: &str,
        source: &Path,
    ) -> Result<Arc<PreparedStimulus>, PreparationError> {
        let key = cache_key(stim_name, source)?;

        if let Some(hit) = self.entries.lock().unwrap().get(&key) {
            debug!("stimulus cache hit for '{stim_name}'");
            return Ok(Arc::clone(hit));
        }

        let prepared = Arc::new(self.preparer.prepare(stim_name, source)?);
        self.entries
            .lock()
            .unwrap()
            .entry(key)
            .or_insert_with(|| Arc::clone(&prepared));
        Ok(prepared)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Identity key: stimulus name plus md5 digest of the source bytes
fn cache_key(stim_name: &str, source: &Path) -> Result<String, PreparationError> {
    let bytes = std::fs::read(source).map_err(|e| PreparationError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;
    Ok(format!("{stim_name}:{:x}", md5::compute(&bytes)))
}
