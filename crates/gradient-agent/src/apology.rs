// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing replacement text for failed generations.

/// Shown for any failed text-only turn.
pub const GENERIC_APOLOGY: &str = "Sorry, I encountered an error while processing your request.";

/// Shown when an image turn is rejected as malformed or oversized.
pub const IMAGE_REJECTED_APOLOGY: &str = "Sorry, the image might be too large or in an unsupported format. Please try with a different image.";

/// Shown for any other failed image turn.
pub const IMAGE_APOLOGY: &str = "Sorry, I encountered an error while processing your request with the image. Please try again without an image or with a different image.";

/// Picks the apology for a failure `reason`.
pub fn apology_for(reason: &str, with_image: bool) -> &'static str {
    if !with_image {
        GENERIC_APOLOGY
    } else if reason.contains("400") || reason.contains("413") {
        IMAGE_REJECTED_APOLOGY
    } else {
        IMAGE_APOLOGY
    }
}
