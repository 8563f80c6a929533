//! Locating model artifacts.
//!
//! A classifier needs three files: `config.json`, `tokenizer.json` and the
//! weights (`model.safetensors`, falling back to `pytorch_model.bin`). They
//! come either from the Hugging Face Hub cache, downloading on first use, or
//! from a local directory supplied by the caller.

use hf_hub::api::sync::Api as HfApi;
use hf_hub::{Repo, RepoType};
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHT_FILES: [&str; 2] = ["model.safetensors", "pytorch_model.bin"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Hub { repo: String },
    Local { dir: PathBuf },
}

impl ModelSource {
    pub fn hub(repo: &str) -> Self {
        ModelSource::Hub { repo: repo.into() }
    }

    pub fn local(dir: impl Into<PathBuf>) -> Self {
        ModelSource::Local { dir: dir.into() }
    }
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSource::Hub { repo } => write!(f, "hf:{repo}"),
            ModelSource::Local { dir } => write!(f, "{}", dir.display()),
        }
    }
}

/// Paths to the resolved artifacts of one model.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    pub fn is_safetensors(&self) -> bool {
        self.weights
            .extension()
            .is_some_and(|ext| ext == "safetensors")
    }
}

#[derive(Debug, Clone)]
pub struct ModelFilesLoader {
    source: ModelSource,
}

impl ModelFilesLoader {
    pub fn new(source: ModelSource) -> Self {
        Self { source }
    }

    pub fn load(&self) -> anyhow::Result<ModelFiles> {
        match &self.source {
            ModelSource::Hub { repo } => load_from_hub(repo),
            ModelSource::Local { dir } => load_from_dir(dir),
        }
    }
}

fn load_from_hub(repo_id: &str) -> anyhow::Result<ModelFiles> {
    let api = HfApi::new()?;
    let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));

    let config = repo.get(CONFIG_FILE)?;
    let tokenizer = repo.get(TOKENIZER_FILE)?;
    let weights = match repo.get(WEIGHT_FILES[0]) {
        Ok(path) => path,
        Err(_) => repo.get(WEIGHT_FILES[1]).map_err(|e| {
            anyhow::anyhow!(
                "model weights not found in repo {repo_id}. Expected `{}` or `{}`: {e}",
                WEIGHT_FILES[0],
                WEIGHT_FILES[1]
            )
        })?,
    };

    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
    })
}

fn load_from_dir(dir: &Path) -> anyhow::Result<ModelFiles> {
    if !dir.is_dir() {
        anyhow::bail!("model directory {} does not exist", dir.display());
    }

    let require = |name: &str| -> anyhow::Result<PathBuf> {
        let path = dir.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            anyhow::bail!("{} is missing from {}", name, dir.display())
        }
    };

    let config = require(CONFIG_FILE)?;
    let tokenizer = require(TOKENIZER_FILE)?;
    let weights = WEIGHT_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no weights in {}. Expected `{}` or `{}`",
                dir.display(),
                WEIGHT_FILES[0],
                WEIGHT_FILES[1]
            )
        })?;

    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
    })
}

pub fn load_tokenizer(files: &ModelFiles) -> anyhow::Result<Tokenizer> {
    Tokenizer::from_file(&files.tokenizer).map_err(|e| {
        anyhow::anyhow!(
            "failed to load tokenizer from {}: {e}",
            files.tokenizer.display()
        )
    })
}
