//! Path-to-identifier mangling and JavaScript text helpers.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::model::TokenPath;

const RESERVED_WORDS: &[&str] = &[
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

fn boundary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s\-_]+(.)?").expect("valid regex"))
}

/// Maps a path to a camelCase identifier.
///
/// Segments are joined with spaces; every run of whitespace, `-` or `_`
/// is dropped and the character after it is uppercased. The first
/// character of the result is lowercased.
pub fn mangle_identifier(path: &TokenPath) -> String {
    mangle_joined(&path.segments().join(" "))
}

/// Same as [`mangle_identifier`] for a dotted reference string.
pub fn mangle_dotted(dotted: &str) -> String {
    mangle_joined(&dotted.split('.').collect::<Vec<_>>().join(" "))
}

fn mangle_joined(joined: &str) -> String {
    let camel = boundary_regex().replace_all(joined, |caps: &Captures<'_>| {
        caps.get(1)
            .map(|m| m.as_str().to_uppercase())
            .unwrap_or_default()
    });

    let mut chars = camel.chars();
    match chars.next() {
        Some(first) if first != '\n' => first.to_lowercase().chain(chars).collect(),
        _ => camel.to_string(),
    }
}

/// True when `text` can be used as a binding name in generated modules.
pub fn is_valid_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !(first == '_' || first == '$' || first.is_ascii_alphabetic()) {
        return false;
    }

    chars.all(|ch| ch == '_' || ch == '$' || ch.is_ascii_alphanumeric()) && !is_reserved_word(text)
}

pub fn is_reserved_word(text: &str) -> bool {
    RESERVED_WORDS.iter().any(|kw| kw == &text)
}

/// Renders an object key, quoting it when it is not a plain identifier.
pub fn property_key(raw: &str) -> String {
    if is_valid_identifier(raw) {
        raw.to_string()
    } else {
        string_literal(raw)
    }
}

/// Renders `base.a.b`, switching to bracket access for awkward segments.
pub fn property_access<'a>(base: &str, segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = base.to_string();
    for segment in segments {
        if is_valid_identifier(segment) {
            out.push('.');
            out.push_str(segment);
        } else {
            out.push('[');
            out.push_str(&string_literal(segment));
            out.push(']');
        }
    }
    out
}

/// Double-quoted string literal, JSON-encoded.
pub fn string_literal(raw: &str) -> String {
    serde_json::to_string(raw).unwrap_or_else(|_| format!("\"{}\"", raw.replace('"', "\\\"")))
}

/// Escapes literal text placed inside a template literal.
pub fn escape_template_text(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// Escapes text placed inside a `/** ... */` comment.
pub fn escape_doc_comment(raw: &str) -> String {
    raw.replace("*/", "*\\/").replace('\n', " ")
}
