// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::schema::{ColumnMap, Field};

pub const CONFIG_ENV: &str = "H1BSTATS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "h1bstats.yaml";

/// Run configuration. Every key is optional in the YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input_dir: PathBuf,
    pub input_pattern: String,
    pub output_dir: PathBuf,
    pub delimiter: char,
    pub top_k: usize,
    pub states_file: String,
    pub occupations_file: String,
    pub columns: ColumnMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            input_pattern: "*.csv".into(),
            output_dir: PathBuf::from("output"),
            delimiter: ';',
            top_k: 10,
            states_file: "top_10_states.txt".into(),
            occupations_file: "top_10_occupations.txt".into(),
            columns: ColumnMap::default(),
        }
    }
}

impl Config {
    /// Config file from `H1BSTATS_CONFIG`, else `h1bstats.yaml` if present,
    /// else defaults; then environment overrides; then validation.
    pub fn load() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("no config file, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        info!(
            input_dir = %config.input_dir.display(),
            output_dir = %config.output_dir.display(),
            top_k = config.top_k,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // an empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse YAML configuration")
    }

    /// `H1BSTATS_INPUT_DIR`, `H1BSTATS_OUTPUT_DIR` and `H1BSTATS_TOP_K`.
    /// `lookup` is `std::env::var` outside tests.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("H1BSTATS_INPUT_DIR") {
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("H1BSTATS_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(k) = lookup("H1BSTATS_TOP_K") {
            self.top_k = k
                .trim()
                .parse()
                .with_context(|| format!("H1BSTATS_TOP_K is not a count: {:?}", k))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        if self.top_k == 0 {
            bail!("top_k must be at least 1");
        }
        for field in Field::ALL {
            if self.columns.candidates(field).is_empty() {
                return Err(anyhow!("no candidate columns configured for {}", field));
            }
        }
        if self.states_file == self.occupations_file {
            bail!("states_file and occupations_file must differ");
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        // validated ASCII
        self.delimiter as u8
    }

    pub fn states_path(&self) -> PathBuf {
        self.output_dir.join(&self.states_file)
    }

    pub fn occupations_path(&self) -> PathBuf {
        self.output_dir.join(&self.occupations_file)
    }
}
