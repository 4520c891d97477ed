#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{FormSemestre, SemestreId};

/// An on-disk collection of semesters, the unit the CLI loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Every semester of the dataset.
    pub semestres: Vec<FormSemestre>,
}

impl Dataset {
    /// Loads a dataset from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read dataset {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Could not parse dataset {}", path.display()))
    }

    /// Looks up a semester by id.
    pub fn semestre(&self, id: SemestreId) -> Option<&FormSemestre> {
        self.semestres.iter().find(|s| s.id == id)
    }
}
