//! Global layer: every token bound to its final literal.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use super::{Export, Expr, FlatModule, Module, ModuleBody, NameScope};
use crate::error::TokenError;
use crate::model::{Group, Layer, TokenPath, TokenTree};
use crate::reference::{classify, Classification, TemplatePart};

/// Resolves token values within one section to literals, following
/// references transitively. Results are memoized per path.
///
/// References that do not name a token are left as their `{path}` text.
pub struct LiteralResolver<'a> {
    section: &'a Group,
    label: &'static str,
    resolved: HashMap<TokenPath, JsonValue>,
    active: Vec<TokenPath>,
}

impl<'a> LiteralResolver<'a> {
    pub fn new(section: &'a Group, layer: Layer) -> Self {
        Self {
            section,
            label: layer.key(),
            resolved: HashMap::new(),
            active: Vec::new(),
        }
    }

    /// Literal value of the token at `path`, or `None` when no token (or
    /// no value) lives there.
    pub fn resolve_token(&mut self, path: &TokenPath) -> Result<Option<JsonValue>, TokenError> {
        if let Some(done) = self.resolved.get(path) {
            return Ok(Some(done.clone()));
        }
        let section = self.section;
        let Some(raw) = section.token(path).and_then(|t| t.value.as_ref()) else {
            return Ok(None);
        };

        if let Some(index) = self.active.iter().position(|p| p == path) {
            let mut chain: Vec<String> = self.active[index..]
                .iter()
                .map(|p| p.prefixed(self.label).dotted())
                .collect();
            chain.push(path.prefixed(self.label).dotted());
            return Err(TokenError::CircularReference {
                cycle: chain.join(" -> "),
            });
        }

        self.active.push(path.clone());
        let value = self.resolve_value(raw);
        self.active.pop();
        let value = value?;

        self.resolved.insert(path.clone(), value.clone());
        Ok(Some(value))
    }

    /// Resolves every string nested inside `value`.
    pub fn resolve_value(&mut self, value: &JsonValue) -> Result<JsonValue, TokenError> {
        match value {
            JsonValue::String(raw) => self.resolve_string(raw),
            JsonValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.resolve_value(item)?);
                }
                Ok(JsonValue::Array(out))
            }
            JsonValue::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, item) in map {
                    out.insert(key.clone(), self.resolve_value(item)?);
                }
                Ok(JsonValue::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_string(&mut self, raw: &str) -> Result<JsonValue, TokenError> {
        match classify(raw) {
            Classification::Literal => Ok(JsonValue::String(raw.to_string())),
            Classification::WholeReference(reference) => {
                let target = TokenPath::from_dotted(&reference);
                Ok(self
                    .resolve_token(&target)?
                    .unwrap_or_else(|| JsonValue::String(raw.to_string())))
            }
            Classification::MixedTemplate(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => out.push_str(&text),
                        TemplatePart::Reference(reference) => {
                            let target = TokenPath::from_dotted(&reference);
                            match self.resolve_token(&target)? {
                                Some(JsonValue::String(s)) => out.push_str(&s),
                                Some(other) => out.push_str(&other.to_string()),
                                None => {
                                    out.push('{');
                                    out.push_str(&reference);
                                    out.push('}');
                                }
                            }
                        }
                    }
                }
                Ok(JsonValue::String(out))
            }
        }
    }
}

pub(crate) fn emit_global_literal(tree: &TokenTree) -> Result<Module, TokenError> {
    let section = tree
        .section(Layer::Global)
        .ok_or_else(|| TokenError::Structural("Missing \"global\" token set".to_string()))?;

    let mut resolver = LiteralResolver::new(section, Layer::Global);
    let mut names = NameScope::new(Layer::Global);
    for layer in Layer::ALL {
        names.reserve(layer.key(), "the index module's layer export");
    }
    let mut exports = Vec::new();

    for entry in section.tokens() {
        let name = names.claim(&entry.path)?;
        let value = resolver
            .resolve_token(&entry.path)?
            .unwrap_or(JsonValue::Null);
        exports.push(Export {
            name,
            path: entry.path,
            description: entry.token.description.clone(),
            expr: Expr::Literal(value),
        });
    }

    tracing::debug!(exports = exports.len(), "emitted global literal module");

    Ok(Module {
        name: Layer::Global.key().to_string(),
        body: ModuleBody::Flat(FlatModule {
            import: None,
            exports,
        }),
    })
}
