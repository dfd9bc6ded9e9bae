// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subject and keyword extraction from free-text queries.
//!
//! A subject only counts as matched when the weights of its triggered
//! keywords add up to [`CONFIDENCE_THRESHOLD`], so one short keyword hiding
//! inside an unrelated word cannot pull in a whole subject.

/// Subject name followed by its trigger keywords.
pub const SUBJECTS: &[(&str, &[&str])] = &[
    (
        "kalkulus",
        &["kalkulus", "calculus", "diferensial", "integral", "turunan", "limit"],
    ),
    (
        "aljabar",
        &["aljabar", "linear", "vektor", "matriks", "matrix", "algebra"],
    ),
    (
        "ekonomi",
        &["ekonomi", "economy", "mikro", "makro", "perdagangan", "pasar", "uang"],
    ),
    (
        "statistika",
        &["statistik", "statistic", "probabilitas", "probability", "data", "sampel"],
    ),
    (
        "fisika",
        &["fisika", "physics", "mekanika", "gaya", "gerak", "energi", "momentum"],
    ),
    (
        "pemrograman",
        &["pemrograman", "programming", "python", "coding", "code", "script"],
    ),
];

/// Function words dropped by [`general_keywords`].
pub const STOP_WORDS: &[&str] = &[
    "berikan",
    "saya",
    "materi",
    "terkait",
    "tentang",
    "untuk",
    "dengan",
    "dan",
    "yang",
    "adalah",
    "pada",
    "di",
    "ke",
    "dari",
    "dalam",
    "jelaskan",
    "beri",
    "satu",
    "contoh",
    "soal",
    "konsep",
    "dasar",
    "pengenalan",
    "mempelajari",
];

/// Summed keyword weight a subject needs before its name joins the keyword set.
pub const CONFIDENCE_THRESHOLD: u32 = 2;

/// Weight of a trigger keyword, by character length.
pub fn keyword_weight(keyword: &str) -> u32 {
    match keyword.chars().count() {
        n if n > 6 => 3,
        n if n > 4 => 2,
        _ => 1,
    }
}

/// A subject together with the keywords of it found in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectMatch {
    pub subject: &'static str,
    pub keywords: Vec<&'static str>,
    pub weight: u32,
}

impl SubjectMatch {
    pub fn is_confident(&self) -> bool {
        self.weight >= CONFIDENCE_THRESHOLD
    }
}

/// Every subject with at least one keyword contained in `query`.
///
/// `query` must already be lower-cased.
pub fn match_subjects(query: &str) -> Vec<SubjectMatch> {
    SUBJECTS
        .iter()
        .filter_map(|(subject, triggers)| {
            let keywords: Vec<&'static str> = triggers
                .iter()
                .copied()
                .filter(|keyword| query.contains(keyword))
                .collect();
            if keywords.is_empty() {
                return None;
            }
            let weight = keywords.iter().map(|k| keyword_weight(k)).sum();
            Some(SubjectMatch {
                subject,
                keywords,
                weight,
            })
        })
        .collect()
}

/// Matched keyword literals plus the names of confidently matched subjects.
///
/// Order follows the subject table; duplicates are dropped.
pub fn subject_keywords(query: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |word: &str| {
        if !out.iter().any(|existing| existing == word) {
            out.push(word.to_string());
        }
    };

    for found in match_subjects(query) {
        for keyword in &found.keywords {
            push(keyword);
        }
        if found.is_confident() {
            push(found.subject);
        }
    }
    out
}

/// Whitespace tokens longer than two characters that are not stop words.
///
/// Used only when no subject keyword hits a material.
pub fn general_keywords(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() > 2 && !STOP_WORDS.contains(&word.as_str()))
        .collect()
}
