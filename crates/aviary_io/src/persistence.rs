//! Controller weight files.
//!
//! Weights are stored as JSON. A path ending in `.gz` is gzip-compressed on
//! save and decompressed on load. Loading always checks the topology before
//! a controller is built.

use crate::error::{IoError, Result};
use crate::serialization::{from_json, to_json};
use aviary_core::controller::ControllerLogic;
use aviary_data::{Controller, ControllerWeights};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

pub fn save_weights<P: AsRef<Path>>(weights: &ControllerWeights, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = to_json(weights)?;
    let context = || format!("saving controller to {:?}", path);

    if is_gzip(path) {
        let file = File::create(path).map_err(|e| IoError::from(e).with_context(context()))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(json.as_bytes())
            .map_err(|e| IoError::from(e).with_context(context()))?;
        encoder
            .finish()
            .map_err(|e| IoError::from(e).with_context(context()))?;
    } else {
        std::fs::write(path, json).map_err(|e| IoError::from(e).with_context(context()))?;
    }
    tracing::info!(path = ?path, "Controller saved");
    Ok(())
}

/// Reads a weight snapshot without checking it against the controller topology.
pub fn load_weights<P: AsRef<Path>>(path: P) -> Result<ControllerWeights> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::not_found(path.display().to_string()));
    }
    let context = || format!("loading controller from {:?}", path);

    let json = if is_gzip(path) {
        let file = File::open(path).map_err(|e| IoError::from(e).with_context(context()))?;
        let mut decoder = GzDecoder::new(file);
        let mut json = String::new();
        decoder
            .read_to_string(&mut json)
            .map_err(|e| IoError::from(e).with_context(context()))?;
        json
    } else {
        std::fs::read_to_string(path).map_err(|e| IoError::from(e).with_context(context()))?
    };
    from_json(&json)
}

pub fn save_controller<P: AsRef<Path>>(controller: &Controller, path: P) -> Result<()> {
    save_weights(&controller.weights(), path)
}

/// Loads a controller, rejecting files whose topology does not match.
pub fn load_controller<P: AsRef<Path>>(path: P) -> Result<Controller> {
    let weights = load_weights(path)?;
    Controller::from_weights(weights).map_err(|e| IoError::validation(e.to_string()))
}
