// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relevance scoring of catalog entries against a query.
//!
//! Matching is case-insensitive substring containment, so a keyword can hit
//! inside a longer word (`uang` inside `ruang`).

use gradient_core::Material;
use tracing::debug;

use crate::catalog::Catalog;
use crate::keywords::{general_keywords, subject_keywords};

/// Points per subject keyword found in `topic`.
pub const TOPIC_POINTS: u32 = 100;
/// Points per subject keyword found in `title`.
pub const TITLE_POINTS: u32 = 80;
/// Points per subject keyword found in `summary`.
pub const SUMMARY_POINTS: u32 = 60;
/// Points per fallback keyword found in `title`.
pub const FALLBACK_TITLE_POINTS: u32 = 20;
/// Points per fallback keyword found only in `summary`.
pub const FALLBACK_SUMMARY_POINTS: u32 = 10;
/// Scores must exceed this to be recommended.
pub const RELEVANCE_FLOOR: u32 = 40;

/// One catalog entry with its score for the current query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub material: &'a Material,
    pub score: u32,
}

/// Lower-cased searchable fields of a material.
struct Haystack {
    topic: String,
    title: String,
    summary: String,
}

impl Haystack {
    fn of(material: &Material) -> Self {
        Self {
            topic: material.topic.to_lowercase(),
            title: material.title.to_lowercase(),
            summary: material.summary.to_lowercase(),
        }
    }
}

/// Additive topic/title/summary score of `material` for a subject keyword set.
pub fn subject_score(material: &Material, keywords: &[String]) -> u32 {
    subject_score_in(&Haystack::of(material), keywords)
}

fn subject_score_in(fields: &Haystack, keywords: &[String]) -> u32 {
    keywords
        .iter()
        .map(|keyword| {
            let k = keyword.as_str();
            let mut points = 0;
            if fields.topic.contains(k) {
                points += TOPIC_POINTS;
            }
            if fields.title.contains(k) {
                points += TITLE_POINTS;
            }
            if fields.summary.contains(k) {
                points += SUMMARY_POINTS;
            }
            points
        })
        .sum()
}

/// Fallback score: a title hit earns the title points, otherwise a summary hit
/// earns the summary points.
fn fallback_score_in(fields: &Haystack, keywords: &[String]) -> u32 {
    keywords
        .iter()
        .map(|keyword| {
            if fields.title.contains(keyword.as_str()) {
                FALLBACK_TITLE_POINTS
            } else if fields.summary.contains(keyword.as_str()) {
                FALLBACK_SUMMARY_POINTS
            } else {
                0
            }
        })
        .sum()
}

/// Scores every catalog entry, in catalog order, without filtering.
pub fn score_all<'a>(query: &str, catalog: &'a Catalog) -> Vec<ScoredCandidate<'a>> {
    let query = query.to_lowercase();
    let subjects = subject_keywords(&query);
    let general = general_keywords(&query);
    debug!(?subjects, ?general, "extracted query keywords");

    catalog
        .iter()
        .map(|material| {
            let fields = Haystack::of(material);
            let mut score = subject_score_in(&fields, &subjects);
            if score == 0 {
                score = fallback_score_in(&fields, &general);
            }
            ScoredCandidate { material, score }
        })
        .collect()
}

/// Ranked candidates above the relevance floor, at most `limit` of them.
///
/// A blank query returns the first `limit` catalog entries unscored.
pub fn rank<'a>(query: &str, catalog: &'a Catalog, limit: usize) -> Vec<ScoredCandidate<'a>> {
    if query.trim().is_empty() {
        return catalog
            .iter()
            .take(limit)
            .map(|material| ScoredCandidate { material, score: 0 })
            .collect();
    }

    let mut ranked: Vec<ScoredCandidate<'a>> = score_all(query, catalog)
        .into_iter()
        .filter(|candidate| candidate.score > RELEVANCE_FLOOR)
        .collect();
    // Stable: equal scores keep catalog order.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(limit);

    debug!(
        query,
        ranked = ?ranked.iter().map(|c| (c.material.id.as_str(), c.score)).collect::<Vec<_>>(),
        "scored materials"
    );
    ranked
}

/// Most relevant materials for `query`, best first, at most `limit`.
pub fn score(query: &str, catalog: &Catalog, limit: usize) -> Vec<Material> {
    rank(query, catalog, limit)
        .into_iter()
        .map(|candidate| candidate.material.clone())
        .collect()
}
