//! Graph Emission
//!
//! Serializes a composition into the document the external apply engine
//! consumes and writes it to a target directory.

use crate::graph::ResourceGraph;
use crate::orchestrator::Composition;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

/// Document handed to the apply engine.
#[derive(Debug, Clone, Serialize)]
pub struct GraphDocument {
    /// Document schema version.
    pub version: u32,
    /// Composition run that produced the graph.
    pub run_id: Uuid,
    /// When the graph was composed.
    pub composed_at: DateTime<Utc>,
    /// Declared resources and dependency edges.
    pub graph: ResourceGraph,
}

const DOCUMENT_VERSION: u32 = 1;

impl GraphDocument {
    /// Build the document from a composition.
    pub fn from_composition(composition: &Composition) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            run_id: composition.run_id,
            composed_at: composition.composed_at,
            graph: composition.graph.clone(),
        }
    }

    /// Render the document as JSON.
    pub fn to_json(&self) -> Result<String, SynthError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `graph.json` into the target directory.
    pub fn write_to_dir(&self, dir: &Path) -> Result<(), SynthError> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join("graph.json"), self.to_json()?)?;
        Ok(())
    }
}

/// Emission errors
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
