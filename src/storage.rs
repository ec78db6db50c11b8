//! Saving and loading the winning brain.

use crate::brain::Brain;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SavedModel {
    version: u32,
    brain: Brain,
}

pub fn save(path: impl AsRef<Path>, brain: &Brain) -> Result<()> {
    let path = path.as_ref();
    let model = SavedModel {
        version: FORMAT_VERSION,
        brain: brain.clone(),
    };
    let bytes = bincode::serde::encode_to_vec(&model, bincode::config::standard())
        .context("encoding model")?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<Brain> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let (model, _): (SavedModel, usize) =
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
            .with_context(|| format!("decoding {}", path.display()))?;
    if model.version != FORMAT_VERSION {
        bail!(
            "{} has format version {}, expected {}",
            path.display(),
            model.version,
            FORMAT_VERSION
        );
    }
    if !model.brain.is_well_formed() {
        bail!(
            "{} holds a brain whose weights do not match its {} hidden units",
            path.display(),
            model.brain.hidden()
        );
    }
    Ok(model.brain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn saved_brain_loads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model");
        let brain = Brain::random(5, &mut SmallRng::seed_from_u64(21));
        save(&path, &brain).expect("save");
        assert_eq!(load(&path).expect("load"), brain);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load("no/such/model").expect_err("should fail");
        assert!(format!("{err:#}").contains("no/such/model"));
    }

    #[derive(Serialize)]
    struct RawBrain {
        hidden: usize,
        w_in: Vec<f32>,
        b_in: Vec<f32>,
        w_out: Vec<f32>,
        b_out: f32,
    }

    #[derive(Serialize)]
    struct RawModel {
        version: u32,
        brain: RawBrain,
    }

    #[test]
    fn mismatched_layers_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model");
        let model = RawModel {
            version: FORMAT_VERSION,
            brain: RawBrain {
                hidden: 6,
                w_in: vec![0.1; 4],
                b_in: Vec::new(),
                w_out: Vec::new(),
                b_out: 0.0,
            },
        };
        let bytes = bincode::serde::encode_to_vec(&model, bincode::config::standard()).expect("encode");
        fs::write(&path, bytes).expect("write");
        let err = load(&path).expect_err("should fail");
        assert!(format!("{err:#}").contains("hidden units"));
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model");
        fs::write(&path, b"\xff\xff\xff").expect("write");
        assert!(load(&path).is_err());
    }
}
