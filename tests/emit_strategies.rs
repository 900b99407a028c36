use design_tokens::declarations::derive_declarations;
use design_tokens::emit::{render_module, Strategy};
use design_tokens::TokenTree;

const DIGEST: &str = "sha256:fixture";

fn tree(input: &str) -> TokenTree {
    TokenTree::parse(input).unwrap()
}

fn render(strategy: Strategy, tree: &TokenTree) -> String {
    render_module(&strategy.emit(tree).unwrap(), DIGEST)
}

const LAYERED: &str = r##"{
  "global": {
    "color": {
      "red": { "value": "#ff0000", "type": "color", "description": "Brand red" },
      "white": { "value": "#ffffff", "type": "color" }
    },
    "size": {
      "base": { "value": "2px", "type": "dimension" }
    }
  },
  "semantic": {
    "color": {
      "danger": { "value": "{color.red}", "type": "color" },
      "surface": { "value": "{color.white}", "type": "color" }
    },
    "spacing": {
      "gap": { "value": "{size.base} solid", "type": "dimension" }
    },
    "radius": {
      "none": { "value": "0px", "type": "dimension" }
    }
  }
}"##;

#[test]
fn global_literal_module_layout() {
    let js = render(Strategy::GlobalLiteral, &tree(LAYERED));
    let expected = concat!(
        "// Generated by design-tokens. Do not edit manually.\n",
        "// Source digest: sha256:fixture\n",
        "\n",
        "/** Brand red */\n",
        "export const colorRed = \"#ff0000\";\n",
        "export const colorWhite = \"#ffffff\";\n",
        "export const sizeBase = \"2px\";\n",
        "\n",
        "export default {\n",
        "  colorRed,\n",
        "  colorWhite,\n",
        "  sizeBase,\n",
        "};\n",
    );
    assert_eq!(js, expected);
}

#[test]
fn semantic_alias_module_layout() {
    let js = render(Strategy::SemanticAlias, &tree(LAYERED));
    let expected = concat!(
        "// Generated by design-tokens. Do not edit manually.\n",
        "// Source digest: sha256:fixture\n",
        "\n",
        "import global from './global.js';\n",
        "\n",
        "export const colorDanger = global.colorRed;\n",
        "export const colorSurface = global.colorWhite;\n",
        "export const spacingGap = `${global.sizeBase} solid`;\n",
        "export const radiusNone = \"0px\";\n",
        "\n",
        "export default {\n",
        "  colorDanger,\n",
        "  colorSurface,\n",
        "  spacingGap,\n",
        "  radiusNone,\n",
        "};\n",
    );
    assert_eq!(js, expected);
}

#[test]
fn global_layer_never_imports() {
    let input = r##"{
  "global": {
    "size": {
      "base": { "value": "2px", "type": "dimension" },
      "border": { "value": "{size.base} solid", "type": "dimension" }
    }
  }
}"##;
    let js = render(Strategy::GlobalLiteral, &tree(input));
    assert!(js.contains("export const sizeBorder = \"2px solid\";\n"));
    assert!(!js.contains("import "));
    assert!(!js.contains('`'));
}

#[test]
fn mixed_template_with_several_references() {
    let input = r##"{
  "global": {
    "shadow": {
      "x": { "value": "1px", "type": "dimension" },
      "color": { "value": "#000", "type": "color" }
    }
  },
  "semantic": {
    "elevation": {
      "low": { "value": "{shadow.x} {shadow.x} 4px {shadow.color}", "type": "boxShadow" }
    }
  }
}"##;
    let js = render(Strategy::SemanticAlias, &tree(input));
    assert!(js.contains(
        "export const elevationLow = `${global.shadowX} ${global.shadowX} 4px ${global.shadowColor}`;\n"
    ));

    let global = render(Strategy::GlobalLiteral, &tree(input));
    assert!(global.contains("export const shadowX = \"1px\";\n"));
}

#[test]
fn semantic_composite_values_alias_per_field() {
    let input = r##"{
  "global": {
    "fontFamilies": { "inter": { "value": "Inter", "type": "fontFamilies" } }
  },
  "semantic": {
    "typography": {
      "body": {
        "value": { "fontFamily": "{fontFamilies.inter}", "fontSize": "14px" },
        "type": "typography"
      }
    }
  }
}"##;
    let tree = tree(input);
    let js = render(Strategy::SemanticAlias, &tree);
    assert!(js.contains(
        "export const typographyBody = { fontFamily: global.fontFamiliesInter, fontSize: \"14px\" };\n"
    ));

    let dts = derive_declarations(&Strategy::SemanticAlias.emit(&tree).unwrap(), DIGEST);
    assert!(dts.contains(
        "export declare const typographyBody: { fontFamily: typeof global.fontFamiliesInter; fontSize: string; };\n"
    ));
}

#[test]
fn global_declarations_use_value_types() {
    let input = r##"{
  "global": {
    "color": { "red": { "value": "#ff0000", "type": "color" } },
    "fontWeights": { "bold": { "value": 700, "type": "fontWeights" } }
  }
}"##;
    let dts = derive_declarations(&Strategy::GlobalLiteral.emit(&tree(input)).unwrap(), DIGEST);
    let expected = concat!(
        "// Generated by design-tokens. Do not edit manually.\n",
        "// Source digest: sha256:fixture\n",
        "\n",
        "export declare const colorRed: string;\n",
        "export declare const fontWeightsBold: number;\n",
        "\n",
        "declare const _default: {\n",
        "  colorRed: typeof colorRed;\n",
        "  fontWeightsBold: typeof fontWeightsBold;\n",
        "};\n",
        "export default _default;\n",
    );
    assert_eq!(dts, expected);
}

#[test]
fn strategies_preserve_enumeration_order() {
    let input = r##"{
  "global": {
    "zeta": { "value": "1px", "type": "dimension" },
    "alpha": { "value": "2px", "type": "dimension" },
    "mid": { "inner": { "value": "3px", "type": "dimension" } },
    "beta": { "value": "4px", "type": "dimension" }
  }
}"##;
    let js = render(Strategy::GlobalLiteral, &tree(input));
    let positions: Vec<usize> = ["zeta", "alpha", "midInner", "beta"]
        .iter()
        .map(|name| js.find(&format!("export const {name} =")).unwrap())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);

    let nested = render(Strategy::NestedPreserving, &tree(input));
    let positions: Vec<usize> = ["zeta:", "alpha:", "mid:", "beta:"]
        .iter()
        .map(|key| nested.find(key).unwrap())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
}

#[test]
fn nested_semantic_references_point_into_global() {
    let js = render(Strategy::NestedPreserving, &tree(LAYERED));
    assert!(js.contains(
        "  semantic: {\n    color: {\n      get danger() {\n        return tokens.global.color.red;\n      },\n"
    ));
    assert!(js.contains("        return `${tokens.global.size.base} solid`;\n"));
    assert!(js.contains("      none: \"0px\",\n"));
    assert!(js.contains("export const color = tokens.global.color;\n"));
    assert!(!js.contains("export const size ="));
}

#[test]
fn nested_quotes_awkward_keys() {
    let input = r##"{
  "global": {
    "font-size": { "2xl": { "value": "32px", "type": "fontSize" } }
  },
  "semantic": {
    "heading": { "value": "{font-size.2xl}", "type": "fontSize" }
  }
}"##;
    let js = render(Strategy::NestedPreserving, &tree(input));
    assert!(js.contains("    \"font-size\": {\n      \"2xl\": \"32px\",\n"));
    assert!(js.contains("return tokens.global[\"font-size\"][\"2xl\"];"));
}
