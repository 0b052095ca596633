use log::error;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::common::{atomic_save_json, read_json, BenchError, BENCH_CONFIG_FILE, DEFAULT_CHUNK_FACTOR, DEFAULT_FIXTURE_SEED};
use crate::core::{DeltaGranularity, FixtureBounds, LARGE_SCENARIO_DOC_IDS, SMALL_SCENARIO_DOC_IDS};

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Default, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// 35 postings, values below 1000.
    #[default]
    #[serde(rename = "large")]
    Large,

    /// 15 postings, values below 100.
    #[serde(rename = "small")]
    Small,
}

impl ScenarioKind {
    pub fn doc_ids(&self) -> &'static [u64] {
        match self {
            ScenarioKind::Large => &LARGE_SCENARIO_DOC_IDS,
            ScenarioKind::Small => &SMALL_SCENARIO_DOC_IDS,
        }
    }

    pub fn bounds(&self) -> FixtureBounds {
        match self {
            ScenarioKind::Large => FixtureBounds::large(),
            ScenarioKind::Small => FixtureBounds::small(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    #[serde(rename = "base128_varint")]
    Base128Varint,

    #[serde(rename = "simple8b")]
    Simple8b,

    #[serde(rename = "base128_varint_delta_packed")]
    Base128VarintDeltaPacked,
}

impl CodecKind {
    pub fn all() -> Vec<CodecKind> {
        vec![CodecKind::Base128Varint, CodecKind::Simple8b, CodecKind::Base128VarintDeltaPacked]
    }
}

fn default_chunk_factor() -> usize {
    DEFAULT_CHUNK_FACTOR
}

fn default_seed() -> u64 {
    DEFAULT_FIXTURE_SEED
}

fn default_verify() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
pub struct BenchConfig {
    #[serde(default = "default_chunk_factor")]
    #[serde(rename = "chunk_factor")]
    pub chunk_factor: usize,

    #[serde(default = "default_seed")]
    #[serde(rename = "seed")]
    pub seed: u64,

    #[serde(default = "default_verify")]
    #[serde(rename = "verify")]
    pub verify: bool,

    #[serde(default)]
    #[serde(rename = "scenario")]
    pub scenario: ScenarioKind,

    #[serde(default = "CodecKind::all")]
    #[serde(rename = "codecs")]
    pub codecs: Vec<CodecKind>,

    #[serde(default)]
    #[serde(rename = "delta_granularity")]
    pub delta_granularity: DeltaGranularity,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            chunk_factor: DEFAULT_CHUNK_FACTOR,
            seed: DEFAULT_FIXTURE_SEED,
            verify: true,
            scenario: ScenarioKind::default(),
            codecs: CodecKind::all(),
            delta_granularity: DeltaGranularity::default(),
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.chunk_factor == 0 {
            let error_msg = "[BenchConfig] chunk_factor must be greater than 0";
            error!("{}", error_msg);
            return Err(BenchError::InvalidConfig(error_msg.to_string()));
        }
        if self.codecs.is_empty() {
            let error_msg = "[BenchConfig] at least one codec must be configured";
            error!("{}", error_msg);
            return Err(BenchError::InvalidConfig(error_msg.to_string()));
        }
        Ok(())
    }

    pub fn load(config_dir: &Path) -> Result<Self, BenchError> {
        let file_path = config_dir.join(BENCH_CONFIG_FILE);
        let config: BenchConfig = read_json(&file_path).map_err(|e| {
            error!("[BenchConfig] failed to load {:?}: {}", file_path, e);
            e
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), BenchError> {
        self.validate()?;
        let file_path = config_dir.join(BENCH_CONFIG_FILE);
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(crate::common::FileOperationError::IoError)?;
        }
        Ok(atomic_save_json(&file_path, self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{BenchConfig, CodecKind, ScenarioKind};
    use crate::common::{BenchError, BENCH_CONFIG_FILE, DEFAULT_CHUNK_FACTOR};
    use crate::core::DeltaGranularity;
    use tempfile::tempdir;

    #[test]
    fn test_parse_config() {
        let empty_config: BenchConfig = serde_json::from_str("{}").expect("");
        assert_eq!(empty_config, BenchConfig::default());
        assert_eq!(empty_config.chunk_factor, DEFAULT_CHUNK_FACTOR);
        assert!(empty_config.verify);

        let config = r#"{"chunk_factor":3,"scenario":"small","codecs":["simple8b"],"delta_granularity":"per_chunk","verify":false}"#;
        let config: BenchConfig = serde_json::from_str(config).expect("");
        assert_eq!(config.chunk_factor, 3);
        assert_eq!(config.scenario, ScenarioKind::Small);
        assert_eq!(config.codecs, vec![CodecKind::Simple8b]);
        assert_eq!(config.delta_granularity, DeltaGranularity::PerChunk);
        assert!(!config.verify);
    }

    #[test]
    fn test_unknown_codec_is_rejected() {
        assert!(serde_json::from_str::<BenchConfig>(r#"{"codecs":["lz4"]}"#).is_err());
    }

    #[test]
    fn test_load_and_save() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let config_dir = temp_dir.path().join("nested");
        let config = BenchConfig { chunk_factor: 7, seed: 99, scenario: ScenarioKind::Small, ..BenchConfig::default() };
        config.save(&config_dir).expect("Failed to save config");
        assert!(config_dir.join(BENCH_CONFIG_FILE).exists());

        let loaded = BenchConfig::load(&config_dir).expect("Failed to load config");
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_invalid_config() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        std::fs::write(temp_dir.path().join(BENCH_CONFIG_FILE), r#"{"chunk_factor":0}"#).unwrap();
        assert!(matches!(BenchConfig::load(temp_dir.path()), Err(BenchError::InvalidConfig(_))));

        let config = BenchConfig { codecs: vec![], ..BenchConfig::default() };
        assert!(matches!(config.save(temp_dir.path()), Err(BenchError::InvalidConfig(_))));

        assert!(matches!(BenchConfig::load(&temp_dir.path().join("missing")), Err(BenchError::FileOperation(_))));
    }
}
