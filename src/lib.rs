pub mod declarations;
pub mod emit;
pub mod error;
pub mod model;
pub mod naming;
pub mod output;
pub mod reference;
pub mod validate;

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use declarations::{derive_declarations, index_declarations};
pub use emit::{Layout, Strategy};
use emit::{render_index, render_module};
pub use error::TokenError;
pub use model::{Layer, TokenPath, TokenTree};
pub use output::{write_artifacts, Artifact};
pub use validate::{ValidationReport, Warning};
use validate::validate_tree_into;

/// Options controlling which artifacts a build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub layout: Layout,
    /// Emit `.d.ts` files next to each module.
    pub declarations: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Flat,
            declarations: true,
        }
    }
}

/// Artifacts of one build plus the validation warnings seen on the way.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub artifacts: Vec<Artifact>,
    pub warnings: Vec<Warning>,
}

impl BuildOutput {
    pub fn artifact(&self, file_name: &str) -> Option<&str> {
        self.artifacts
            .iter()
            .find(|a| a.file_name == file_name)
            .map(|a| a.contents.as_str())
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.file_name.as_str()).collect()
    }
}

pub fn parse_tokens(input: &str) -> Result<TokenTree, TokenError> {
    TokenTree::parse(input)
}

/// Parses and validates a token definition.
pub fn validate_tokens(input: &str) -> Result<ValidationReport, TokenError> {
    let mut report = ValidationReport::default();
    validate_tokens_into(input, &mut report)?;
    Ok(report)
}

/// Validates `input`, pushing warnings into `report` as they are found.
///
/// Warnings seen before a fatal error are still in `report` when this
/// returns `Err`.
pub fn validate_tokens_into(input: &str, report: &mut ValidationReport) -> Result<(), TokenError> {
    let tree = parse_tokens(input)?;
    validate_tree_into(&tree, report)
}

pub fn validate_tokens_from_path(path: impl AsRef<Path>) -> Result<ValidationReport, TokenError> {
    let input = read_input(path)?;
    validate_tokens(&input)
}

/// Runs the whole pipeline in memory: parse, validate, emit every module
/// of the chosen layout, and derive declarations.
pub fn build_tokens(input: &str, options: &BuildOptions) -> Result<BuildOutput, TokenError> {
    let mut report = ValidationReport::default();
    let artifacts = build_tokens_into(input, options, &mut report)?;
    Ok(BuildOutput {
        artifacts,
        warnings: report.warnings,
    })
}

/// Same as [`build_tokens`], with validation warnings pushed into `report`
/// so they are available when a later stage fails.
pub fn build_tokens_into(
    input: &str,
    options: &BuildOptions,
    report: &mut ValidationReport,
) -> Result<Vec<Artifact>, TokenError> {
    let tree = parse_tokens(input)?;
    validate_tree_into(&tree, report)?;
    let digest = source_digest(input);

    let mut artifacts = Vec::new();
    for strategy in options.layout.strategies() {
        let module = strategy.emit(&tree)?;
        artifacts.push(Artifact {
            file_name: module.file_name(),
            contents: render_module(&module, &digest),
        });
        if options.declarations {
            artifacts.push(Artifact {
                file_name: module.declaration_file_name(),
                contents: derive_declarations(&module, &digest),
            });
        }
    }

    artifacts.push(Artifact {
        file_name: "index.js".to_string(),
        contents: render_index(options.layout, &digest),
    });
    if options.declarations {
        artifacts.push(Artifact {
            file_name: "index.d.ts".to_string(),
            contents: index_declarations(options.layout, &digest),
        });
    }

    tracing::debug!(artifacts = artifacts.len(), layout = ?options.layout, "built token modules");

    Ok(artifacts)
}

/// Reads `input_path`, builds, and writes every artifact into `out_dir`.
///
/// When any stage fails, `out_dir` is left as it was before the call.
pub fn build_tokens_from_path(
    input_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    options: &BuildOptions,
) -> Result<BuildOutput, TokenError> {
    let input = read_input(input_path)?;
    let output = build_tokens(&input, options)?;
    write_artifacts(out_dir.as_ref(), &output.artifacts)?;
    Ok(output)
}

/// `sha256:<hex>` digest of the source text, stamped into every artifact.
pub fn source_digest(input: &str) -> String {
    let hash = Sha256::digest(input.as_bytes());
    format!("sha256:{}", hex::encode(hash))
}

/// Reads a token definition file, naming the path in the error.
pub fn read_input(path: impl AsRef<Path>) -> Result<String, TokenError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| {
        TokenError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read '{}': {e}", path.display()),
        ))
    })
}
