//! Semantic layer: aliases into the global module's namespace.

use super::{
    template_expr, value_expr, DeclaredType, Export, Expr, FlatModule, Module, ModuleBody,
    ModuleImport, NameScope,
};
use crate::error::TokenError;
use crate::model::Layer;
use crate::model::TokenTree;
use crate::naming::{is_valid_identifier, mangle_dotted, property_access};
use crate::reference::{classify, Classification};

/// Binding the semantic module imports the global module under.
pub const GLOBAL_NAMESPACE: &str = "global";

pub(crate) fn emit_semantic_alias(tree: &TokenTree) -> Result<Module, TokenError> {
    let mut names = NameScope::new(Layer::Semantic);
    names.reserve(GLOBAL_NAMESPACE, "the global module import");

    let mut exports = Vec::new();
    if let Some(section) = tree.section(Layer::Semantic) {
        for entry in section.tokens() {
            let name = names.claim(&entry.path)?;
            let expr = match &entry.token.value {
                Some(value) => value_expr(value, &mut |raw| Ok(alias_expr(raw)))?,
                None => Expr::Literal(serde_json::Value::Null),
            };
            exports.push(Export {
                name,
                path: entry.path,
                description: entry.token.description.clone(),
                expr,
            });
        }
    }

    tracing::debug!(exports = exports.len(), "emitted semantic alias module");

    Ok(Module {
        name: Layer::Semantic.key().to_string(),
        body: ModuleBody::Flat(FlatModule {
            import: Some(ModuleImport {
                binding: GLOBAL_NAMESPACE.to_string(),
                from: format!("./{}.js", Layer::Global.key()),
            }),
            exports,
        }),
    })
}

fn global_access(reference: &str) -> String {
    property_access(GLOBAL_NAMESPACE, [mangle_dotted(reference).as_str()])
}

fn alias_expr(raw: &str) -> Expr {
    match classify(raw) {
        Classification::Literal => Expr::Literal(serde_json::Value::String(raw.to_string())),
        Classification::WholeReference(reference) => {
            let target = global_access(&reference);
            let declared = if is_valid_identifier(&mangle_dotted(&reference)) {
                DeclaredType::TypeOf(target.clone())
            } else {
                DeclaredType::Named("unknown".to_string())
            };
            Expr::Alias { target, declared }
        }
        Classification::MixedTemplate(parts) => template_expr(&parts, global_access),
    }
}
