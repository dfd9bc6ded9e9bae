// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only catalog of learning materials.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use gradient_core::{GradientError, Material};
use tracing::info;

/// Sample catalog compiled into the binary.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Immutable, cheaply cloneable set of materials in catalog order.
#[derive(Debug, Clone)]
pub struct Catalog {
    materials: Arc<[Material]>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids.
    pub fn new(materials: Vec<Material>) -> Result<Self, GradientError> {
        let mut seen = HashSet::with_capacity(materials.len());
        for material in &materials {
            if !seen.insert(material.id.as_str()) {
                return Err(GradientError::Config(format!(
                    "duplicate material id `{}` in catalog",
                    material.id
                )));
            }
        }
        Ok(Self {
            materials: materials.into(),
        })
    }

    /// The sample catalog shipped with the crate.
    pub fn builtin() -> Result<Self, GradientError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parses a JSON array of materials.
    pub fn from_json(json: &str) -> Result<Self, GradientError> {
        let materials: Vec<Material> = serde_json::from_str(json)
            .map_err(|e| GradientError::Config(format!("invalid catalog JSON: {e}")))?;
        Self::new(materials)
    }

    /// Loads a catalog file, or the built-in catalog when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, GradientError> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let json = std::fs::read_to_string(path).map_err(|e| {
            GradientError::Config(format!("cannot read catalog {}: {e}", path.display()))
        })?;
        let catalog = Self::from_json(&json)?;
        info!(path = %path.display(), materials = catalog.len(), "loaded material catalog");
        Ok(catalog)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
