use anyhow::Context;
use serde::{Deserialize, Serialize};
use sketchcore::prelude::StageConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// What the workflow input file contains.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Dump,
    Notation,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub input_kind: InputKind,
    /// Where to save the intermediate notation, if anywhere.
    #[serde(default)]
    pub notation_out: Option<PathBuf>,
    #[serde(flatten)]
    pub stage: StageConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        input: Option<PathBuf>,
        input_kind: InputKind,
        notation_out: Option<PathBuf>,
        stage: StageConfig,
    ) -> Self {
        Self {
            input,
            input_kind,
            notation_out,
            stage,
        }
    }

    pub fn to_stage_config(&self) -> StageConfig {
        self.stage.clone()
    }
}
