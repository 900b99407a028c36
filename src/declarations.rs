//! TypeScript declaration files for generated modules.
//!
//! Types come from the emitted [`Module`] structure, not from its rendered
//! text: literals map to their value type, aliases to `typeof` the aliased
//! binding, and templates to `string`.

use serde_json::Value as JsonValue;

use crate::emit::{
    generated_header, DeclaredType, Expr, FlatModule, Layout, Member, Module, ModuleBody,
    NestedModule,
};
use crate::naming::property_key;

/// Derives the `.d.ts` text paralleling `module`.
pub fn derive_declarations(module: &Module, digest: &str) -> String {
    match &module.body {
        ModuleBody::Flat(flat) => flat_declarations(flat, digest),
        ModuleBody::Nested(nested) => nested_declarations(nested, digest),
    }
}

fn flat_declarations(module: &FlatModule, digest: &str) -> String {
    let mut blocks = vec![generated_header(digest)];

    if let Some(import) = &module.import {
        blocks.push(format!(
            "import type * as {} from '{}';\n",
            import.binding, import.from
        ));
    }

    if !module.exports.is_empty() {
        let mut out = String::new();
        for export in &module.exports {
            out.push_str(&format!(
                "export declare const {}: {};\n",
                export.name,
                expr_type(&export.expr)
            ));
        }
        blocks.push(out);
    }

    let mut default = String::from("declare const _default: {");
    if module.exports.is_empty() {
        default.push_str("};\n");
    } else {
        default.push('\n');
        for export in &module.exports {
            default.push_str(&format!("  {}: typeof {};\n", export.name, export.name));
        }
        default.push_str("};\n");
    }
    default.push_str("export default _default;\n");
    blocks.push(default);

    blocks.join("\n")
}

fn nested_declarations(module: &NestedModule, digest: &str) -> String {
    let mut blocks = vec![generated_header(digest)];

    let mut structure = format!("declare const {}: {{\n", module.binding);
    member_types(&module.members, 1, &mut structure);
    structure.push_str("};\n");
    blocks.push(structure);

    if !module.categories.is_empty() {
        let mut out = String::new();
        for category in &module.categories {
            out.push_str(&format!(
                "export declare const {}: typeof {};\n",
                category.name, category.access
            ));
        }
        blocks.push(out);
    }

    blocks.push(format!("export default {};\n", module.binding));
    blocks.join("\n")
}

fn member_types(members: &[Member], depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    for member in members {
        match member {
            Member::Group { key, members } if members.is_empty() => {
                out.push_str(&format!("{pad}{}: {{}};\n", property_key(key)));
            }
            Member::Group { key, members } => {
                out.push_str(&format!("{pad}{}: {{\n", property_key(key)));
                member_types(members, depth + 1, out);
                out.push_str(&format!("{pad}}};\n"));
            }
            Member::Value { key, expr, .. } => {
                out.push_str(&format!("{pad}{}: {};\n", property_key(key), expr_type(expr)));
            }
        }
    }
}

/// Type annotation for an emitted value expression.
pub fn expr_type(expr: &Expr) -> String {
    match expr {
        Expr::Literal(value) => ts_type_of_value(value),
        Expr::Alias { declared, .. } => match declared {
            DeclaredType::TypeOf(name) => format!("typeof {name}"),
            DeclaredType::Named(ty) => ty.clone(),
        },
        Expr::Template(_) => "string".to_string(),
        Expr::Object(fields) => object_type(fields.iter().map(|(k, e)| (k.as_str(), expr_type(e)))),
        Expr::Array(items) => array_type(items.iter().map(expr_type)),
    }
}

/// Type annotation for a resolved literal value.
pub fn ts_type_of_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(_) => "boolean".to_string(),
        JsonValue::Number(_) => "number".to_string(),
        JsonValue::String(_) => "string".to_string(),
        JsonValue::Array(items) => array_type(items.iter().map(ts_type_of_value)),
        JsonValue::Object(map) => {
            object_type(map.iter().map(|(k, v)| (k.as_str(), ts_type_of_value(v))))
        }
    }
}

fn object_type<'a>(fields: impl Iterator<Item = (&'a str, String)>) -> String {
    let rendered: Vec<String> = fields
        .map(|(key, ty)| format!("{}: {ty}", property_key(key)))
        .collect();
    if rendered.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {}; }}", rendered.join("; "))
    }
}

fn array_type(items: impl Iterator<Item = String>) -> String {
    let mut distinct: Vec<String> = Vec::new();
    for ty in items {
        if !distinct.contains(&ty) {
            distinct.push(ty);
        }
    }
    match distinct.len() {
        0 => "unknown[]".to_string(),
        _ => format!("Array<{}>", distinct.join(" | ")),
    }
}

/// Declarations for the aggregator module.
pub fn index_declarations(layout: Layout, digest: &str) -> String {
    let body = match layout {
        Layout::Flat => concat!(
            "export * from './global.js';\n",
            "export { default as global } from './global.js';\n",
            "export { default as semantic } from './semantic.js';\n",
            "\n",
            "import global from './global.js';\n",
            "import semantic from './semantic.js';\n",
            "\n",
            "declare const _default: {\n",
            "  global: typeof global;\n",
            "  semantic: typeof semantic;\n",
            "};\n",
            "\n",
            "export default _default;\n",
        ),
        Layout::Nested => concat!(
            "export * from './tokens.js';\n",
            "\n",
            "import tokens from './tokens.js';\n",
            "\n",
            "export declare const global: typeof tokens.global;\n",
            "export declare const semantic: typeof tokens.semantic;\n",
            "\n",
            "export default tokens;\n",
        ),
    };
    format!("{}\n{body}", generated_header(digest))
}
