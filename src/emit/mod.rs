//! Code emission strategies and JavaScript module rendering.
//!
//! Every strategy turns the validated tree into a [`Module`]: a structured
//! description of bindings and value expressions. Rendering to text and
//! declaration derivation both read that structure.

mod global;
mod nested;
mod semantic;

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::error::TokenError;
use crate::model::{Layer, TokenPath, TokenTree};
use crate::naming::{
    escape_doc_comment, escape_template_text, is_valid_identifier, mangle_identifier, property_key,
};
use crate::reference::TemplatePart;

pub use global::LiteralResolver;
pub use nested::NESTED_CATEGORIES;

/// Output strategy applied to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One export per global token, bound to its fully resolved literal.
    GlobalLiteral,
    /// One export per semantic token, aliasing the global module.
    SemanticAlias,
    /// Whole tree as one nested structure with category re-exports.
    NestedPreserving,
}

impl Strategy {
    pub fn emit(self, tree: &TokenTree) -> Result<Module, TokenError> {
        match self {
            Strategy::GlobalLiteral => global::emit_global_literal(tree),
            Strategy::SemanticAlias => semantic::emit_semantic_alias(tree),
            Strategy::NestedPreserving => nested::emit_nested(tree),
        }
    }
}

/// Set of generated modules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// `global.js` + `semantic.js` + `index.js`.
    #[default]
    Flat,
    /// `tokens.js` + `index.js`.
    Nested,
}

impl Layout {
    pub fn strategies(self) -> &'static [Strategy] {
        match self {
            Layout::Flat => &[Strategy::GlobalLiteral, Strategy::SemanticAlias],
            Layout::Nested => &[Strategy::NestedPreserving],
        }
    }
}

/// How a declaration file should type an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    /// `typeof <expr>`.
    TypeOf(String),
    /// A concrete type expression.
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePiece {
    Text(String),
    Expr(String),
}

/// Value expression bound by an export or a nested member.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(JsonValue),
    Alias { target: String, declared: DeclaredType },
    Template(Vec<TemplatePiece>),
    Object(Vec<(String, Expr)>),
    Array(Vec<Expr>),
}

impl Expr {
    /// True when evaluating the expression reads other bindings.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Expr::Literal(_) => false,
            Expr::Alias { .. } | Expr::Template(_) => true,
            Expr::Object(fields) => fields.iter().any(|(_, e)| e.is_dynamic()),
            Expr::Array(items) => items.iter().any(Expr::is_dynamic),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub name: String,
    pub path: TokenPath,
    pub description: Option<String>,
    pub expr: Expr,
}

/// `import <binding> from '<from>';`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleImport {
    pub binding: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatModule {
    pub import: Option<ModuleImport>,
    pub exports: Vec<Export>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Group {
        key: String,
        members: Vec<Member>,
    },
    Value {
        key: String,
        description: Option<String>,
        expr: Expr,
    },
}

/// `export const <name> = <access>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryExport {
    pub name: String,
    pub access: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NestedModule {
    pub binding: String,
    pub members: Vec<Member>,
    pub categories: Vec<CategoryExport>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleBody {
    Flat(FlatModule),
    Nested(NestedModule),
}

/// One generated module, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// File stem (`global` renders to `global.js`).
    pub name: String,
    pub body: ModuleBody,
}

impl Module {
    pub fn file_name(&self) -> String {
        format!("{}.js", self.name)
    }

    pub fn declaration_file_name(&self) -> String {
        format!("{}.d.ts", self.name)
    }
}

/// Exported names claimed within one module.
pub(crate) struct NameScope {
    layer: Layer,
    claimed: HashMap<String, String>,
}

impl NameScope {
    pub(crate) fn new(layer: Layer) -> Self {
        Self {
            layer,
            claimed: HashMap::new(),
        }
    }

    /// Marks `name` as taken by something other than a token.
    pub(crate) fn reserve(&mut self, name: &str, owner: &str) {
        self.claimed.insert(name.to_string(), owner.to_string());
    }

    pub(crate) fn claim(&mut self, path: &TokenPath) -> Result<String, TokenError> {
        let name = mangle_identifier(path);
        let full = path.prefixed(self.layer.key()).dotted();
        if !is_valid_identifier(&name) {
            return Err(TokenError::InvalidIdentifier {
                identifier: name,
                path: full,
            });
        }
        if let Some(first) = self.claimed.get(&name) {
            return Err(TokenError::IdentifierCollision {
                identifier: name,
                first: first.clone(),
                second: full,
            });
        }
        self.claimed.insert(name.clone(), full);
        Ok(name)
    }
}

/// Maps a token value to an expression, rendering each string with `render`.
pub(crate) fn value_expr<F>(value: &JsonValue, render: &mut F) -> Result<Expr, TokenError>
where
    F: FnMut(&str) -> Result<Expr, TokenError>,
{
    match value {
        JsonValue::String(s) => render(s),
        JsonValue::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(value_expr(item, render)?);
            }
            Ok(Expr::Array(out))
        }
        JsonValue::Object(map) => {
            let mut fields = Vec::with_capacity(map.len());
            for (key, item) in map {
                fields.push((key.clone(), value_expr(item, render)?));
            }
            Ok(Expr::Object(fields))
        }
        other => Ok(Expr::Literal(other.clone())),
    }
}

pub(crate) fn template_expr(parts: &[TemplatePart], mut access: impl FnMut(&str) -> String) -> Expr {
    Expr::Template(
        parts
            .iter()
            .map(|part| match part {
                TemplatePart::Text(text) => TemplatePiece::Text(text.clone()),
                TemplatePart::Reference(path) => TemplatePiece::Expr(access(path)),
            })
            .collect(),
    )
}

/// First lines of every generated file.
pub fn generated_header(digest: &str) -> String {
    format!(
        "// Generated by design-tokens. Do not edit manually.\n// Source digest: {digest}\n"
    )
}

/// Renders a module as ES module source.
pub fn render_module(module: &Module, digest: &str) -> String {
    match &module.body {
        ModuleBody::Flat(flat) => render_flat(flat, digest),
        ModuleBody::Nested(nested) => render_nested(nested, digest),
    }
}

fn render_flat(module: &FlatModule, digest: &str) -> String {
    let mut blocks = vec![generated_header(digest)];

    if let Some(import) = &module.import {
        blocks.push(format!(
            "import {} from '{}';\n",
            import.binding, import.from
        ));
    }

    if !module.exports.is_empty() {
        let mut out = String::new();
        for export in &module.exports {
            if let Some(description) = &export.description {
                out.push_str(&format!("/** {} */\n", escape_doc_comment(description)));
            }
            out.push_str(&format!(
                "export const {} = {};\n",
                export.name,
                render_expr(&export.expr)
            ));
        }
        blocks.push(out);
    }

    blocks.push(render_default_object(
        module.exports.iter().map(|e| e.name.as_str()),
    ));
    blocks.join("\n")
}

fn render_default_object<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let names: Vec<&str> = names.collect();
    if names.is_empty() {
        return "export default {};\n".to_string();
    }
    let mut out = String::from("export default {\n");
    for name in names {
        out.push_str(&format!("  {name},\n"));
    }
    out.push_str("};\n");
    out
}

fn render_nested(module: &NestedModule, digest: &str) -> String {
    let mut blocks = vec![generated_header(digest)];

    let mut structure = format!("const {} = {{\n", module.binding);
    render_members(&module.members, 1, &mut structure);
    structure.push_str("};\n");
    blocks.push(structure);

    if !module.categories.is_empty() {
        let mut out = String::new();
        for category in &module.categories {
            out.push_str(&format!(
                "export const {} = {};\n",
                category.name, category.access
            ));
        }
        blocks.push(out);
    }

    blocks.push(format!("export default {};\n", module.binding));
    blocks.join("\n")
}

fn render_members(members: &[Member], depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    for member in members {
        match member {
            Member::Group { key, members } if members.is_empty() => {
                out.push_str(&format!("{pad}{}: {{}},\n", property_key(key)));
            }
            Member::Group { key, members } => {
                out.push_str(&format!("{pad}{}: {{\n", property_key(key)));
                render_members(members, depth + 1, out);
                out.push_str(&format!("{pad}}},\n"));
            }
            Member::Value {
                key,
                description,
                expr,
            } => {
                if let Some(description) = description {
                    out.push_str(&format!("{pad}/** {} */\n", escape_doc_comment(description)));
                }
                if expr.is_dynamic() {
                    out.push_str(&format!("{pad}get {}() {{\n", property_key(key)));
                    out.push_str(&format!("{pad}  return {};\n", render_expr(expr)));
                    out.push_str(&format!("{pad}}},\n"));
                } else {
                    out.push_str(&format!(
                        "{pad}{}: {},\n",
                        property_key(key),
                        render_expr(expr)
                    ));
                }
            }
        }
    }
}

/// Renders a single value expression.
pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(value) => {
            serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
        }
        Expr::Alias { target, .. } => target.clone(),
        Expr::Template(pieces) => {
            let mut out = String::from("`");
            for piece in pieces {
                match piece {
                    TemplatePiece::Text(text) => out.push_str(&escape_template_text(text)),
                    TemplatePiece::Expr(expr) => {
                        out.push_str("${");
                        out.push_str(expr);
                        out.push('}');
                    }
                }
            }
            out.push('`');
            out
        }
        Expr::Object(fields) if fields.is_empty() => "{}".to_string(),
        Expr::Object(fields) => {
            let rendered: Vec<String> = fields
                .iter()
                .map(|(key, value)| format!("{}: {}", property_key(key), render_expr(value)))
                .collect();
            format!("{{ {} }}", rendered.join(", "))
        }
        Expr::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render_expr).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}

/// Renders the aggregator module for `layout`.
pub fn render_index(layout: Layout, digest: &str) -> String {
    let body = match layout {
        Layout::Flat => concat!(
            "export { default as global } from './global.js';\n",
            "export { default as semantic } from './semantic.js';\n",
            "\n",
            "export * from './global.js';\n",
            "\n",
            "import global from './global.js';\n",
            "import semantic from './semantic.js';\n",
            "\n",
            "export default {\n",
            "  global,\n",
            "  semantic,\n",
            "};\n",
        ),
        Layout::Nested => concat!(
            "import tokens from './tokens.js';\n",
            "\n",
            "export * from './tokens.js';\n",
            "\n",
            "export const global = tokens.global;\n",
            "export const semantic = tokens.semantic;\n",
            "\n",
            "export default tokens;\n",
        ),
    };
    format!("{}\n{body}", generated_header(digest))
}
