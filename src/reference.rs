//! Reference extraction, value classification, and cycle detection.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::error::TokenError;
use crate::model::{Group, Lookup, Node, TokenPath};

fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("valid regex"))
}

/// Piece of a string value split around `{path}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Text(String),
    Reference(String),
}

/// How a string value relates to other tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No placeholders.
    Literal,
    /// Exactly one placeholder and nothing else.
    WholeReference(String),
    /// Placeholders interleaved with literal text.
    MixedTemplate(Vec<TemplatePart>),
}

/// Returns the dotted paths of all placeholders in `raw`, left to right.
pub fn extract_references(raw: &str) -> Vec<String> {
    reference_regex()
        .captures_iter(raw)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Splits `raw` into literal text and placeholder parts.
pub fn split_template(raw: &str) -> Vec<TemplatePart> {
    let mut parts = Vec::new();
    let mut last = 0usize;
    for cap in reference_regex().captures_iter(raw) {
        let (Some(whole), Some(inner)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        if whole.start() > last {
            parts.push(TemplatePart::Text(raw[last..whole.start()].to_string()));
        }
        parts.push(TemplatePart::Reference(inner.as_str().to_string()));
        last = whole.end();
    }
    if last < raw.len() {
        parts.push(TemplatePart::Text(raw[last..].to_string()));
    }
    parts
}

pub fn classify(raw: &str) -> Classification {
    let parts = split_template(raw);
    match parts.as_slice() {
        [] => Classification::Literal,
        [TemplatePart::Reference(path)] => Classification::WholeReference(path.clone()),
        _ if parts
            .iter()
            .all(|p| matches!(p, TemplatePart::Text(_))) =>
        {
            Classification::Literal
        }
        _ => Classification::MixedTemplate(parts),
    }
}

/// References in every string nested inside `value` (composite values included).
pub fn references_in_value(value: &JsonValue) -> Vec<String> {
    let mut out = Vec::new();
    collect_value_references(value, &mut out);
    out
}

fn collect_value_references(value: &JsonValue, out: &mut Vec<String>) {
    match value {
        JsonValue::String(s) => out.extend(extract_references(s)),
        JsonValue::Array(items) => {
            for item in items {
                collect_value_references(item, out);
            }
        }
        JsonValue::Object(map) => {
            for item in map.values() {
                collect_value_references(item, out);
            }
        }
        _ => {}
    }
}

/// Rejects self-references and reference cycles within one section.
///
/// `label` prefixes reported paths (usually the section key). Dangling
/// references are not reported.
pub fn check_reference_cycles(section: &Group, label: &str) -> Result<(), TokenError> {
    let mut ancestors = Vec::new();
    check_descent(section, &TokenPath::default(), &mut ancestors, label)?;

    let mut finished = HashSet::new();
    for entry in section.tokens() {
        let mut stack = Vec::new();
        visit_token(section, &entry.path, &mut stack, &mut finished, label)?;
    }
    Ok(())
}

fn check_descent(
    group: &Group,
    path: &TokenPath,
    ancestors: &mut Vec<TokenPath>,
    label: &str,
) -> Result<(), TokenError> {
    ancestors.push(path.clone());
    for (key, node) in group.entries() {
        let child = path.child(key);
        match node {
            Node::Group(inner) => check_descent(inner, &child, ancestors, label)?,
            Node::Token(token) => {
                let Some(value) = &token.value else {
                    continue;
                };
                for reference in references_in_value(value) {
                    let target = TokenPath::from_dotted(&reference);
                    if target == child {
                        return Err(TokenError::SelfReference {
                            path: child.prefixed(label).dotted(),
                        });
                    }
                    if !target.is_empty() && ancestors.contains(&target) {
                        return Err(TokenError::CircularReference {
                            cycle: format!(
                                "{} -> {} -> {}",
                                target.prefixed(label),
                                child.prefixed(label),
                                target.prefixed(label)
                            ),
                        });
                    }
                }
            }
        }
    }
    ancestors.pop();
    Ok(())
}

fn visit_token(
    section: &Group,
    path: &TokenPath,
    stack: &mut Vec<TokenPath>,
    finished: &mut HashSet<TokenPath>,
    label: &str,
) -> Result<(), TokenError> {
    if finished.contains(path) {
        return Ok(());
    }
    if let Some(index) = stack.iter().position(|p| p == path) {
        let mut chain: Vec<String> = stack[index..]
            .iter()
            .map(|p| p.prefixed(label).dotted())
            .collect();
        chain.push(path.prefixed(label).dotted());
        return Err(TokenError::CircularReference {
            cycle: chain.join(" -> "),
        });
    }

    let Lookup::Token(token) = section.lookup(path) else {
        return Ok(());
    };

    stack.push(path.clone());
    if let Some(value) = &token.value {
        for reference in references_in_value(value) {
            let target = TokenPath::from_dotted(&reference);
            if let Lookup::Token(_) = section.lookup(&target) {
                visit_token(section, &target, stack, finished, label)?;
            }
        }
    }
    stack.pop();
    finished.insert(path.clone());
    Ok(())
}
