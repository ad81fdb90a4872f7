use anyhow::{anyhow, Result};
use burn::prelude::*;
use burn::record::{DefaultRecorder, Recorder};
use std::path::Path;

use crate::utils::file_utils::ensure_dir;

/// Write `module` to `path` (the recorder adds the `.mpk` extension),
/// replacing any previous checkpoint of the same name.
pub fn save_checkpoint<B: Backend, M: Module<B>>(module: &M, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        ensure_dir(dir)?;
    }
    module
        .clone()
        .save_file(path.to_path_buf(), &DefaultRecorder::new())
        .map_err(|e| anyhow!("Failed to save checkpoint {:?}: {:?}", path, e))
}

/// Read the record stored at `path` without touching any live module, so a
/// failed load leaves the caller's module intact.
pub fn load_checkpoint<B: Backend, M: Module<B>>(
    path: &Path,
    device: &B::Device,
) -> Result<M::Record> {
    Recorder::<B>::load(&DefaultRecorder::new(), path.to_path_buf(), device)
        .map_err(|e| anyhow!("Failed to load checkpoint {:?}: {:?}", path, e))
}
