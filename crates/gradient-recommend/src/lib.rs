// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Learning-material recommendation for the Gradient assistant.
//!
//! A query flows through the [`resolver`] (anaphoric requests are re-targeted
//! at an earlier user message), the [`keywords`] extractor, and the
//! [`scorer`], which ranks the read-only [`Catalog`].

pub mod catalog;
pub mod keywords;
pub mod resolver;
pub mod scorer;

pub use catalog::Catalog;
pub use resolver::{is_contextual_request, resolve};
pub use scorer::{ScoredCandidate, rank, score};

use gradient_core::{Material, Message};

/// Materials chosen for one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// The text that was scored, after context resolution.
    pub resolved_query: String,
    pub materials: Vec<Material>,
}

/// Catalog plus default result size, shared by the server and the CLI.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Catalog,
    default_limit: usize,
}

impl Recommender {
    pub fn new(catalog: Catalog, default_limit: usize) -> Self {
        Self {
            catalog,
            default_limit,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Scores the literal query, without context resolution.
    pub fn recommend(&self, query: &str, limit: Option<usize>) -> Vec<Material> {
        score(query, &self.catalog, limit.unwrap_or(self.default_limit))
    }

    /// Resolves `current` against the prior turns, then scores the result.
    pub fn recommend_in_context(
        &self,
        current: &str,
        history: &[Message],
        limit: Option<usize>,
    ) -> Recommendation {
        let resolved_query = resolve(current, history);
        Recommendation {
            resolved_query: resolved_query.to_string(),
            materials: self.recommend(resolved_query, limit),
        }
    }
}
