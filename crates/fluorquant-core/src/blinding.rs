//! Blinding of sample identity.
//!
//! Every image gets an opaque working label when it enters the pipeline.
//! Prompts, progress messages and log lines use only that label; the real
//! file name is looked up again when the result table is named.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::consts::{BLIND_LABEL_PREFIX, BLIND_LABEL_SPACE};
use crate::error::{QuantError, Result};

/// Append-only map from working label to real file.
pub struct BlindingTable {
    entries: Vec<(String, PathBuf)>,
    rng: StdRng,
}

impl Default for BlindingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BlindingTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible label sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            entries: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Assign a fresh label to `path`.
    ///
    /// Labels are unique within the table and never equal to the file's name
    /// or stem.
    pub fn blind(&mut self, path: &Path) -> String {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let stem = path.file_stem().and_then(|n| n.to_str()).unwrap_or("");
        loop {
            let label = format!(
                "{BLIND_LABEL_PREFIX}{:06}",
                self.rng.gen_range(0..BLIND_LABEL_SPACE)
            );
            if label != name && label != stem && self.real_name(&label).is_none() {
                self.entries.push((label.clone(), path.to_path_buf()));
                return label;
            }
        }
    }

    pub fn real_name(&self, label: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, p)| p.as_path())
    }

    /// Result table path for a blinded image: the real file stem with
    /// `extension`, inside `output_dir`.
    pub fn output_path(&self, label: &str, output_dir: &Path, extension: &str) -> Result<PathBuf> {
        let real = self.real_name(label).ok_or_else(|| {
            QuantError::InvalidConfig(format!("unknown working label {label}"))
        })?;
        let stem = real.file_stem().ok_or_else(|| {
            QuantError::InvalidConfig(format!("input path {} has no file name", real.display()))
        })?;
        // `a.b.tif` -> `a.b.csv`: the stem keeps its inner dots.
        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(extension);
        Ok(output_dir.join(file_name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (label, real path) pairs in the order images entered the pipeline.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(l, p)| (l.as_str(), p.as_path()))
    }
}
