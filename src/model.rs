//! In-memory token tree parsed from a JSON definition.
//!
//! Groups and tokens are told apart once, at load time, so later stages
//! match on [`Node`] instead of re-inspecting raw mappings.

use std::fmt;

use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::TokenError;

/// Top-level section of the token definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Raw values; always emitted fully resolved.
    Global,
    /// Aliases over the global layer.
    Semantic,
}

impl Layer {
    pub const ALL: [Layer; 2] = [Layer::Global, Layer::Semantic];

    /// Root key holding this layer's group.
    pub fn key(self) -> &'static str {
        match self {
            Layer::Global => "global",
            Layer::Semantic => "semantic",
        }
    }
}

/// Ordered sequence of keys from a root group to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TokenPath(Vec<String>);

impl TokenPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Splits an external `a.b.c` reference into a path.
    pub fn from_dotted(dotted: &str) -> Self {
        Self(dotted.split('.').map(str::to_string).collect())
    }

    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    /// Prepends `prefix` (usually a layer key) to this path.
    pub fn prefixed(&self, prefix: &str) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.push(prefix.to_string());
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dotted(&self) -> String {
        self.0.join(".")
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// Leaf definition. Fields stay optional so the validator can report
/// incomplete tokens by path instead of the loader rejecting them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub value: Option<JsonValue>,
    #[serde(rename = "type")]
    pub token_type: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Token {
    /// Declared type tag when it is a string.
    pub fn type_name(&self) -> Option<&str> {
        self.token_type.as_ref().and_then(JsonValue::as_str)
    }

    /// Raw value when it is a string.
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(JsonValue::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Group(Group),
    Token(Token),
}

/// Insertion-ordered container of child nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Group {
    entries: Vec<(String, Node)>,
}

/// Outcome of looking up a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Group(&'a Group),
    Token(&'a Token),
    NotFound,
}

/// A token together with its path, as produced by [`Group::tokens`].
#[derive(Debug, Clone)]
pub struct TokenEntry<'a> {
    pub path: TokenPath,
    pub token: &'a Token,
}

impl Group {
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves `path` relative to this group. The empty path is the group itself.
    pub fn lookup(&self, path: &TokenPath) -> Lookup<'_> {
        let mut current = self;
        let segments = path.segments();
        for (idx, segment) in segments.iter().enumerate() {
            match current.get(segment) {
                Some(Node::Group(group)) => current = group,
                Some(Node::Token(token)) if idx + 1 == segments.len() => {
                    return Lookup::Token(token)
                }
                _ => return Lookup::NotFound,
            }
        }
        Lookup::Group(current)
    }

    /// Resolves a path to a token, ignoring groups.
    pub fn token(&self, path: &TokenPath) -> Option<&Token> {
        match self.lookup(path) {
            Lookup::Token(token) => Some(token),
            _ => None,
        }
    }

    /// Depth-first enumeration of every token, in insertion order, with paths
    /// relative to this group.
    pub fn tokens(&self) -> Vec<TokenEntry<'_>> {
        let mut out = Vec::new();
        collect_tokens(self, &TokenPath::default(), &mut out);
        out
    }

    fn from_map(map: &JsonMap<String, JsonValue>) -> Self {
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let Some(child) = value.as_object() else {
                continue;
            };
            let node = if is_token_shape(child) {
                Node::Token(token_from_map(child))
            } else {
                Node::Group(Group::from_map(child))
            };
            entries.push((key.clone(), node));
        }
        Self { entries }
    }
}

fn collect_tokens<'a>(group: &'a Group, base: &TokenPath, out: &mut Vec<TokenEntry<'a>>) {
    for (key, node) in &group.entries {
        let path = base.child(key);
        match node {
            Node::Group(child) => collect_tokens(child, &path, out),
            Node::Token(token) => out.push(TokenEntry { path, token }),
        }
    }
}

fn is_token_shape(map: &JsonMap<String, JsonValue>) -> bool {
    map.contains_key("value") || map.get("type").is_some_and(|t| !t.is_object())
}

fn token_from_map(map: &JsonMap<String, JsonValue>) -> Token {
    Token {
        value: map.get("value").cloned(),
        token_type: map.get("type").cloned(),
        description: map
            .get("description")
            .and_then(JsonValue::as_str)
            .map(str::to_string),
    }
}

/// Parsed token definition rooted at a group with `global` / `semantic` sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenTree {
    root: Group,
}

impl TokenTree {
    /// Parses JSON text into a tree.
    pub fn parse(input: &str) -> Result<Self, TokenError> {
        let value: JsonValue = serde_json::from_str(input)
            .map_err(|e| TokenError::Parse(format!("invalid token JSON: {e}")))?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &JsonValue) -> Result<Self, TokenError> {
        let map = value.as_object().ok_or_else(|| {
            TokenError::Parse("token definition root must be a mapping/object".to_string())
        })?;
        Ok(Self {
            root: Group::from_map(map),
        })
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Group for `layer`, if the root defines it as a group.
    pub fn section(&self, layer: Layer) -> Option<&Group> {
        match self.root.get(layer.key()) {
            Some(Node::Group(group)) => Some(group),
            _ => None,
        }
    }

    pub fn resolve(&self, path: &TokenPath) -> Lookup<'_> {
        self.root.lookup(path)
    }
}
