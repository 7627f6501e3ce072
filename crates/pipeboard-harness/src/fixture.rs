#![forbid(unsafe_code)]

//! JSON board fixtures.
//!
//! ```json
//! {
//!   "name": "demo",
//!   "field": "status",
//!   "containers": [
//!     {"id": "TODO", "items": ["a", "b", "c"]},
//!     {"id": "DOING", "value": "in_progress", "items": ["d"]}
//!   ]
//! }
//! ```
//!
//! `field` defaults to `status`; a container's `value` defaults to its id.
//! Values must be unique across containers.

use std::path::Path;

use pipeboard_core::{Board, Container, TableFieldMapping};
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::memory_store::{MemoryStore, check_mapping};

fn default_field() -> String {
    "status".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerFixture {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFixture {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_field")]
    pub field: String,
    pub containers: Vec<ContainerFixture>,
}

impl BoardFixture {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HarnessError::MissingPath {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let mut fixture = Self::from_json(&text)?;
        if fixture.name.is_empty() {
            fixture.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(fixture)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let fixture: Self = serde_json::from_str(text)?;
        let board = fixture.board();
        board.validate()?;
        check_mapping(&board, &fixture.mapping())?;
        Ok(fixture)
    }

    /// Capture a board as a fixture with identity field values.
    #[must_use]
    pub fn from_board(name: impl Into<String>, board: &Board) -> Self {
        Self {
            name: name.into(),
            field: default_field(),
            containers: board
                .containers
                .iter()
                .map(|c| ContainerFixture {
                    id: c.id.to_string(),
                    value: None,
                    items: c.items.iter().map(ToString::to_string).collect(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn board(&self) -> Board {
        Board::new(
            self.containers
                .iter()
                .map(|c| Container::new(c.id.as_str(), c.items.iter().map(String::as_str)))
                .collect(),
        )
    }

    #[must_use]
    pub fn mapping(&self) -> TableFieldMapping {
        self.containers
            .iter()
            .fold(TableFieldMapping::new(self.field.as_str()), |mapping, c| {
                let value = c.value.as_deref().unwrap_or(&c.id);
                mapping.with(c.id.as_str(), value)
            })
    }

    pub fn to_store(&self) -> Result<MemoryStore<TableFieldMapping>> {
        Ok(MemoryStore::new(self.board(), self.mapping())?)
    }
}
