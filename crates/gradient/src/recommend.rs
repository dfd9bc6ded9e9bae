// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gradient recommend` command implementation.
//!
//! Scores the configured catalog locally; no server or API key is needed.

use std::path::Path;

use gradient_config::GradientConfig;
use gradient_core::{GradientError, Material};
use gradient_recommend::{Catalog, Recommender};

pub fn run_recommend(
    config: &GradientConfig,
    query: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<(), GradientError> {
    let materials = recommend(config, query, limit)?;
    if json {
        let rendered = serde_json::to_string_pretty(&materials)
            .map_err(|e| GradientError::Internal(format!("failed to render materials: {e}")))?;
        println!("{rendered}");
    } else {
        print!("{}", render_table(&materials));
    }
    Ok(())
}

fn recommend(
    config: &GradientConfig,
    query: &str,
    limit: Option<usize>,
) -> Result<Vec<Material>, GradientError> {
    let catalog = Catalog::load(config.recommend.catalog_file.as_deref().map(Path::new))?;
    let recommender = Recommender::new(catalog, config.recommend.default_limit);
    Ok(recommender.recommend(query, limit))
}

fn render_table(materials: &[Material]) -> String {
    if materials.is_empty() {
        return "no materials found\n".to_string();
    }
    let width = materials.iter().map(|m| m.id.len()).max().unwrap_or(0);
    materials
        .iter()
        .map(|m| {
            format!(
                "{:<width$}  {} [{} / {} / {}]\n",
                m.id, m.title, m.topic, m.level, m.kind
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_ranks_algebra_first() {
        let materials = recommend(&GradientConfig::default(), "aljabar", Some(1)).unwrap();
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].id, "1");
    }

    #[test]
    fn catalog_file_replaces_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let material = Catalog::builtin().unwrap().materials()[0].clone();
        std::fs::write(&path, serde_json::to_string(&vec![material]).unwrap()).unwrap();

        let mut config = GradientConfig::default();
        config.recommend.catalog_file = Some(path.to_string_lossy().into_owned());
        let materials = recommend(&config, "", None).unwrap();
        assert_eq!(materials.len(), 1);
    }

    #[test]
    fn table_lists_one_line_per_material() {
        let materials = recommend(&GradientConfig::default(), "aljabar", Some(2)).unwrap();
        let table = render_table(&materials);
        assert_eq!(table.lines().count(), 2);
        assert!(table.starts_with("1  "));
        assert_eq!(render_table(&[]), "no materials found\n");
    }
}
