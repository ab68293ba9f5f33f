//! Chart title derivation from a source identifier

use std::path::Path;

/// Title used when nothing usable can be derived
pub const DEFAULT_TITLE: &str = "Project Timeline";

/// Derive a display title from a file name or path
///
/// The extension is dropped, `_` and `-` become spaces, and every word is
/// capitalized with the rest lower-cased: `q3_release-plan.csv` becomes
/// `Q3 Release Plan`.
pub fn derive_title(source: &str) -> String {
    let stem = Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let spaced = stem.replace(['_', '-'], " ");
    let title = title_case(&spaced)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

/// Upper-case letters that follow a non-letter, lower-case the rest
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(ch);
            prev_letter = false;
        }
    }
    out
}
