//! Structural validation of a token tree.
//!
//! Fatal problems stop at the first occurrence. Unknown types and missing
//! recommended categories are collected as [`Warning`]s and never change
//! the outcome.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::TokenError;
use crate::model::{Layer, TokenEntry, TokenTree};
use crate::reference::{check_reference_cycles, classify, Classification};

/// Type tags accepted without a warning.
pub const KNOWN_TYPES: &[&str] = &[
    "color",
    "dimension",
    "fontFamily",
    "fontWeight",
    "fontSize",
    "lineHeight",
    "letterSpacing",
    "paragraphSpacing",
    "textCase",
    "textDecoration",
    "boxShadow",
    "typography",
    "fontFamilies",
    "fontWeights",
    "fontSizes",
    "lineHeights",
];

/// Categories the global section is expected to define.
pub const RECOMMENDED_CATEGORIES: &[&str] = &["color", "fontFamilies", "fontSize", "lineHeights"];

fn color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(#[0-9A-Fa-f]{3,8}|rgb\(|rgba\(|hsl\(|hsla\(|[a-zA-Z]+)").expect("valid regex")
    })
}

/// Non-fatal validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    UnknownType { path: String, token_type: String },
    MissingCategories { categories: Vec<String> },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownType { path, token_type } => {
                write!(f, "Unknown token type \"{token_type}\" at {path}")
            }
            Warning::MissingCategories { categories } => {
                write!(f, "Missing token categories: {}", categories.join(", "))
            }
        }
    }
}

/// Non-fatal findings of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub warnings: Vec<Warning>,
}

/// Validates the whole tree: required section, token completeness and
/// types, category presence, color syntax, then reference cycles.
pub fn validate_tree(tree: &TokenTree) -> Result<ValidationReport, TokenError> {
    let mut report = ValidationReport::default();
    validate_tree_into(tree, &mut report)?;
    Ok(report)
}

/// Same as [`validate_tree`], but pushes warnings into `report` as they are
/// found, so they survive a later fatal error.
pub fn validate_tree_into(
    tree: &TokenTree,
    report: &mut ValidationReport,
) -> Result<(), TokenError> {
    let global = tree.section(Layer::Global).ok_or_else(|| {
        TokenError::Structural("Missing \"global\" token set".to_string())
    })?;

    let mut sections = Vec::new();
    for layer in Layer::ALL {
        if let Some(group) = tree.section(layer) {
            sections.push((layer, group.tokens()));
        }
    }

    for (layer, entries) in &sections {
        for entry in entries {
            check_completeness(*layer, entry)?;
            if let Some(warning) = unknown_type_warning(*layer, entry) {
                tracing::debug!(%warning, "token validation warning");
                report.warnings.push(warning);
            }
        }
    }

    let missing: Vec<String> = RECOMMENDED_CATEGORIES
        .iter()
        .filter(|category| !global.contains_key(category))
        .map(|category| category.to_string())
        .collect();
    if !missing.is_empty() {
        let warning = Warning::MissingCategories { categories: missing };
        tracing::debug!(%warning, "token validation warning");
        report.warnings.push(warning);
    }

    for (layer, entries) in &sections {
        for entry in entries {
            check_color(*layer, entry)?;
        }
    }

    check_reference_cycles(global, Layer::Global.key())?;

    tracing::debug!(
        tokens = sections.iter().map(|(_, e)| e.len()).sum::<usize>(),
        warnings = report.warnings.len(),
        "token validation passed"
    );

    Ok(())
}

fn full_path(layer: Layer, entry: &TokenEntry<'_>) -> String {
    entry.path.prefixed(layer.key()).dotted()
}

fn check_completeness(layer: Layer, entry: &TokenEntry<'_>) -> Result<(), TokenError> {
    let path = full_path(layer, entry);
    if !entry.token.value.as_ref().is_some_and(is_truthy) {
        return Err(TokenError::Structural(format!(
            "Token at {path} missing required \"value\" property"
        )));
    }
    if !entry.token.token_type.as_ref().is_some_and(is_truthy) {
        return Err(TokenError::Structural(format!(
            "Token at {path} missing required \"type\" property"
        )));
    }
    if entry.token.type_name().is_none() {
        return Err(TokenError::Structural(format!(
            "Token at {path} has a non-string \"type\" property"
        )));
    }
    Ok(())
}

fn unknown_type_warning(layer: Layer, entry: &TokenEntry<'_>) -> Option<Warning> {
    let token_type = entry.token.type_name()?;
    if KNOWN_TYPES.contains(&token_type) {
        return None;
    }
    Some(Warning::UnknownType {
        path: full_path(layer, entry),
        token_type: token_type.to_string(),
    })
}

fn check_color(layer: Layer, entry: &TokenEntry<'_>) -> Result<(), TokenError> {
    if entry.token.type_name() != Some("color") {
        return Ok(());
    }
    let Some(value) = entry.token.value_str() else {
        return Ok(());
    };
    if matches!(classify(value), Classification::WholeReference(_)) {
        return Ok(());
    }
    if is_valid_color(value) {
        return Ok(());
    }
    Err(TokenError::Structural(format!(
        "Invalid color value \"{value}\" at {}",
        full_path(layer, entry)
    )))
}

/// Permissive prefix check for color literals.
pub fn is_valid_color(value: &str) -> bool {
    color_regex().is_match(value)
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{is_valid_color, validate_tree, validate_tree_into, ValidationReport, Warning};
    use crate::error::TokenError;
    use crate::model::TokenTree;

    fn tree(value: serde_json::Value) -> TokenTree {
        TokenTree::from_json(&value).unwrap()
    }

    fn complete_global() -> serde_json::Value {
        json!({
            "color": { "red": { "value": "#ff0000", "type": "color" } },
            "fontFamilies": { "body": { "value": "Inter", "type": "fontFamilies" } },
            "fontSize": { "sm": { "value": "12px", "type": "fontSize" } },
            "lineHeights": { "tight": { "value": "110%", "type": "lineHeights" } }
        })
    }

    #[test]
    fn complete_tree_has_no_warnings() {
        let report = validate_tree(&tree(json!({ "global": complete_global() }))).unwrap();
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn missing_global_section_fails() {
        let err = validate_tree(&tree(json!({ "semantic": {} }))).unwrap_err();
        assert_eq!(err.to_string(), "structural error: Missing \"global\" token set");
    }

    #[test]
    fn missing_categories_are_listed_in_one_warning() {
        let report = validate_tree(&tree(json!({
            "global": { "color": { "red": { "value": "red", "type": "color" } } }
        })))
        .unwrap();
        assert_eq!(
            report.warnings,
            vec![Warning::MissingCategories {
                categories: vec![
                    "fontFamilies".to_string(),
                    "fontSize".to_string(),
                    "lineHeights".to_string()
                ]
            }]
        );
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let err = validate_tree(&tree(json!({
            "global": { "size": { "zero": { "value": "", "type": "dimension" } } }
        })))
        .unwrap_err();
        assert!(err.to_string().contains("global.size.zero missing required \"value\""));
    }

    #[test]
    fn completeness_runs_before_color_checks() {
        let err = validate_tree(&tree(json!({
            "global": {
                "color": { "bad": { "value": "%%%", "type": "color" } },
                "late": { "broken": { "value": "x" } }
            }
        })))
        .unwrap_err();
        assert!(err.to_string().contains("global.late.broken missing required \"type\""));
    }

    #[test]
    fn semantic_tokens_are_checked_too() {
        let mut root = json!({ "global": complete_global() });
        root["semantic"] = json!({ "color": { "x": { "type": "color" } } });
        let err = validate_tree(&tree(root)).unwrap_err();
        assert!(err.to_string().contains("semantic.color.x"));
    }

    #[test]
    fn warnings_found_before_a_fatal_error_are_kept() {
        let mut global = complete_global();
        global["custom"] = json!({ "token": { "value": "test", "type": "unknownType" } });
        global["color"]["bad"] = json!({ "value": "12%", "type": "color" });

        let mut report = ValidationReport::default();
        let err = validate_tree_into(&tree(json!({ "global": global })), &mut report).unwrap_err();
        assert!(matches!(err, TokenError::Structural(_)));
        assert_eq!(
            report.warnings,
            vec![Warning::UnknownType {
                path: "global.custom.token".to_string(),
                token_type: "unknownType".to_string()
            }]
        );
    }

    #[test]
    fn color_reference_skips_literal_check() {
        let mut global = complete_global();
        global["color"]["alias"] = json!({ "value": "{color.red}", "type": "color" });
        validate_tree(&tree(json!({ "global": global }))).unwrap();
    }

    #[test]
    fn color_syntax() {
        assert!(is_valid_color("#fff"));
        assert!(is_valid_color("#ffaa0080"));
        assert!(is_valid_color("rgba(0, 0, 0, 0.5)"));
        assert!(is_valid_color("hsl(120, 50%, 50%)"));
        assert!(is_valid_color("transparent"));
        assert!(!is_valid_color("#ff"));
        assert!(!is_valid_color("123"));
        assert!(!is_valid_color("{color.red} 50%"));
    }
}
