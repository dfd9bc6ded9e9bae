// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conditional zone: recommended materials, present only when any were found.

use gradient_core::Material;

/// Lists the recommended materials and tells the model how to mention them.
pub fn materials_block(materials: &[Material]) -> Option<String> {
    if materials.is_empty() {
        return None;
    }

    let lines = materials
        .iter()
        .map(|m| format!("• {} ({}) - {}", m.title, m.level, m.summary))
        .collect::<Vec<_>>()
        .join("\n");

    Some(format!(
        "Relevant Learning Materials Available:\n{lines}\n\n\
         When discussing these materials, please reference them naturally without creating \
         numbered lists. Explain their relevance and educational value in a conversational way."
    ))
}
