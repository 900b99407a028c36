//! Structure-preserving layout: the whole tree as one nested object.

use super::{
    template_expr, value_expr, CategoryExport, DeclaredType, Expr, Member, Module, ModuleBody,
    NestedModule,
};
use crate::declarations::ts_type_of_value;
use crate::emit::LiteralResolver;
use crate::error::TokenError;
use crate::model::{Group, Layer, Node, TokenPath, TokenTree};
use crate::naming::{mangle_identifier, property_access};
use crate::reference::{classify, Classification};

/// Global categories re-exported from the structure's top level.
pub const NESTED_CATEGORIES: &[&str] = &[
    "color",
    "boxShadow",
    "fontFamilies",
    "lineHeights",
    "fontWeights",
    "fontSize",
    "letterSpacing",
    "paragraphSpacing",
    "typography",
    "textCase",
    "textDecoration",
    "paragraphIndent",
];

const BINDING: &str = "tokens";

pub(crate) fn emit_nested(tree: &TokenTree) -> Result<Module, TokenError> {
    let global = tree
        .section(Layer::Global)
        .ok_or_else(|| TokenError::Structural("Missing \"global\" token set".to_string()))?;
    let mut resolver = LiteralResolver::new(global, Layer::Global);

    let mut members = Vec::new();
    for layer in Layer::ALL {
        let inner = match tree.section(layer) {
            Some(section) => group_members(section, &mut resolver)?,
            None => Vec::new(),
        };
        members.push(Member::Group {
            key: layer.key().to_string(),
            members: inner,
        });
    }

    let categories = NESTED_CATEGORIES
        .iter()
        .filter(|category| global.contains_key(category))
        .map(|category| CategoryExport {
            name: mangle_identifier(&TokenPath::new(vec![category.to_string()])),
            access: property_access(BINDING, [Layer::Global.key(), *category]),
        })
        .collect();

    tracing::debug!("emitted nested token structure");

    Ok(Module {
        name: BINDING.to_string(),
        body: ModuleBody::Nested(NestedModule {
            binding: BINDING.to_string(),
            members,
            categories,
        }),
    })
}

fn group_members(
    group: &Group,
    resolver: &mut LiteralResolver<'_>,
) -> Result<Vec<Member>, TokenError> {
    let mut out = Vec::new();
    for (key, node) in group.entries() {
        let member = match node {
            Node::Group(inner) => Member::Group {
                key: key.to_string(),
                members: group_members(inner, resolver)?,
            },
            Node::Token(token) => {
                let expr = match &token.value {
                    Some(value) => value_expr(value, &mut |raw| structure_expr(raw, resolver))?,
                    None => Expr::Literal(serde_json::Value::Null),
                };
                Member::Value {
                    key: key.to_string(),
                    description: token.description.clone(),
                    expr,
                }
            }
        };
        out.push(member);
    }
    Ok(out)
}

fn structure_access(reference: &str) -> String {
    property_access(
        BINDING,
        std::iter::once(Layer::Global.key()).chain(reference.split('.')),
    )
}

fn structure_expr(raw: &str, resolver: &mut LiteralResolver<'_>) -> Result<Expr, TokenError> {
    Ok(match classify(raw) {
        Classification::Literal => Expr::Literal(serde_json::Value::String(raw.to_string())),
        Classification::WholeReference(reference) => {
            let declared = match resolver.resolve_token(&TokenPath::from_dotted(&reference))? {
                Some(value) => ts_type_of_value(&value),
                None => "unknown".to_string(),
            };
            Expr::Alias {
                target: structure_access(&reference),
                declared: DeclaredType::Named(declared),
            }
        }
        Classification::MixedTemplate(parts) => template_expr(&parts, structure_access),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::emit_nested;
    use crate::emit::{render_module, DeclaredType, Expr, Member, ModuleBody};
    use crate::model::TokenTree;

    fn tree() -> TokenTree {
        TokenTree::from_json(&json!({
            "global": {
                "color": {
                    "red": { "value": "#ff0000", "type": "color" },
                    "danger": { "value": "{color.red}", "type": "color" }
                },
                "size": { "base": { "value": "2px", "type": "dimension" } },
                "fontSize": { "sm": { "value": "12px", "type": "fontSize" } }
            },
            "semantic": {
                "border": { "thin": { "value": "{size.base} solid", "type": "dimension" } }
            }
        }))
        .unwrap()
    }

    #[test]
    fn mirrors_tree_shape_with_path_aliases() {
        let module = emit_nested(&tree()).unwrap();
        let ModuleBody::Nested(nested) = module.body else {
            panic!("expected nested module");
        };
        let Member::Group { key, members } = &nested.members[0] else {
            panic!("expected global group");
        };
        assert_eq!(key, "global");
        let Member::Group { members: colors, .. } = &members[0] else {
            panic!("expected color group");
        };
        assert_eq!(
            colors[1],
            Member::Value {
                key: "danger".to_string(),
                description: None,
                expr: Expr::Alias {
                    target: "tokens.global.color.red".to_string(),
                    declared: DeclaredType::Named("string".to_string()),
                },
            }
        );
        let names: Vec<&str> = nested.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["color", "fontSize"]);
    }

    #[test]
    fn renders_getters_for_references() {
        let module = emit_nested(&tree()).unwrap();
        let js = render_module(&module, "sha256:test");
        assert!(js.contains("const tokens = {\n  global: {\n    color: {\n      red: \"#ff0000\",\n"));
        assert!(js.contains("      get danger() {\n        return tokens.global.color.red;\n      },\n"));
        assert!(js.contains("get thin() {\n        return `${tokens.global.size.base} solid`;"));
        assert!(js.contains("export const color = tokens.global.color;\n"));
        assert!(js.contains("export const fontSize = tokens.global.fontSize;\n"));
        assert!(js.ends_with("export default tokens;\n"));
        assert!(!js.contains("import "));
    }
}
