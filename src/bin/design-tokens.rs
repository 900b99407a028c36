use std::{env, path::PathBuf, process::ExitCode};

use design_tokens::{
    build_tokens_into, read_input, validate_tokens_into, write_artifacts, BuildOptions, Layout,
    ValidationReport,
};
use tracing::Level;

const DEFAULT_INPUT: &str = "tokens.json";
const DEFAULT_OUT_DIR: &str = "dist";

#[derive(Debug)]
struct ValidateOptions {
    input: PathBuf,
    json: bool,
    verbose: bool,
}

#[derive(Debug)]
struct BuildCliOptions {
    input: PathBuf,
    out_dir: PathBuf,
    build: BuildOptions,
    verbose: bool,
}

#[derive(Debug)]
enum Command {
    Validate(ValidateOptions),
    Build(BuildCliOptions),
}

fn main() -> ExitCode {
    let command = match parse_command(&env::args().collect::<Vec<_>>()) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Validate(options) => {
            init_tracing(options.verbose);
            run_validate(&options)
        }
        Command::Build(options) => {
            init_tracing(options.verbose);
            run_build(&options)
        }
    }
}

fn run_validate(options: &ValidateOptions) -> Result<(), String> {
    let input =
        read_input(&options.input).map_err(|e| format!("❌ Token validation failed: {e}"))?;

    let mut report = ValidationReport::default();
    let result = validate_tokens_into(&input, &mut report);

    if options.json && result.is_ok() {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("failed to serialize report: {e}"))?;
        println!("{rendered}");
        return Ok(());
    }

    print_warnings(&report);
    result.map_err(|e| format!("❌ Token validation failed: {e}"))?;
    println!("✅ Token validation passed");
    Ok(())
}

fn run_build(options: &BuildCliOptions) -> Result<(), String> {
    let input = read_input(&options.input).map_err(|e| format!("❌ Token build failed: {e}"))?;

    let mut report = ValidationReport::default();
    let result = build_tokens_into(&input, &options.build, &mut report);
    print_warnings(&report);

    let artifacts = result.map_err(|e| format!("❌ Token build failed: {e}"))?;
    write_artifacts(&options.out_dir, &artifacts)
        .map_err(|e| format!("❌ Token build failed: {e}"))?;

    let names: Vec<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
    println!(
        "✅ Built {} in {}",
        names.join(", "),
        options.out_dir.display()
    );
    Ok(())
}

fn print_warnings(report: &ValidationReport) {
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("not enough arguments".to_string());
    }

    let rest = &args[2..];
    match args[1].as_str() {
        "validate" => parse_validate_options(rest).map(Command::Validate),
        "build" => parse_build_options(rest).map(Command::Build),
        other => Err(format!("unknown command '{other}'")),
    }
}

/// Splits an optional leading positional input path from the flags.
fn split_input(args: &[String]) -> (PathBuf, &[String]) {
    match args.first() {
        Some(first) if !first.starts_with("--") => (PathBuf::from(first), &args[1..]),
        _ => (PathBuf::from(DEFAULT_INPUT), args),
    }
}

fn parse_validate_options(args: &[String]) -> Result<ValidateOptions, String> {
    let (input, args) = split_input(args);
    let mut json = false;
    let mut verbose = false;
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--json" => {
                json = true;
                i += 1;
            }
            "--verbose" => {
                verbose = true;
                i += 1;
            }
            other => return Err(format!("unknown option '{other}'")),
        }
    }

    Ok(ValidateOptions {
        input,
        json,
        verbose,
    })
}

fn parse_build_options(args: &[String]) -> Result<BuildCliOptions, String> {
    let (input, args) = split_input(args);
    let mut out_dir = PathBuf::from(DEFAULT_OUT_DIR);
    let mut build = BuildOptions::default();
    let mut verbose = false;
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--out" => {
                if i + 1 >= args.len() {
                    return Err("missing value for --out".to_string());
                }
                out_dir = PathBuf::from(&args[i + 1]);
                i += 2;
            }
            "--layout" => {
                if i + 1 >= args.len() {
                    return Err("missing value for --layout (expected flat or nested)".to_string());
                }
                build.layout = match args[i + 1].as_str() {
                    "flat" => Layout::Flat,
                    "nested" => Layout::Nested,
                    other => {
                        return Err(format!(
                            "invalid --layout value '{other}' (expected flat or nested)"
                        ))
                    }
                };
                i += 2;
            }
            "--no-dts" => {
                build.declarations = false;
                i += 1;
            }
            "--verbose" => {
                verbose = true;
                i += 1;
            }
            other => return Err(format!("unknown option '{other}'")),
        }
    }

    Ok(BuildCliOptions {
        input,
        out_dir,
        build,
        verbose,
    })
}

fn print_usage() {
    eprintln!("usage:");
    eprintln!("  design-tokens validate [<tokens.json>] [--json] [--verbose]");
    eprintln!(
        "  design-tokens build [<tokens.json>] [--out <dir>] [--layout flat|nested] [--no-dts] [--verbose]"
    );
    eprintln!();
    eprintln!("defaults: input '{DEFAULT_INPUT}', output directory '{DEFAULT_OUT_DIR}'");
    eprintln!();
    eprintln!("build options:");
    eprintln!("  --layout flat          global.js, semantic.js and index.js (default)");
    eprintln!("  --layout nested        one tokens.js structure plus index.js");
    eprintln!("  --no-dts               skip TypeScript declaration files");
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{parse_build_options, parse_command, parse_validate_options, Command};
    use design_tokens::Layout;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn validate_defaults_to_tokens_json() {
        let options = parse_validate_options(&args(&[])).unwrap();
        assert_eq!(options.input, Path::new("tokens.json"));
        assert!(!options.json);
        assert!(!options.verbose);
    }

    #[test]
    fn validate_accepts_path_and_flags() {
        let options = parse_validate_options(&args(&["my.json", "--json", "--verbose"])).unwrap();
        assert_eq!(options.input, Path::new("my.json"));
        assert!(options.json);
        assert!(options.verbose);
    }

    #[test]
    fn build_defaults() {
        let options = parse_build_options(&args(&[])).unwrap();
        assert_eq!(options.input, Path::new("tokens.json"));
        assert_eq!(options.out_dir, Path::new("dist"));
        assert_eq!(options.build.layout, Layout::Flat);
        assert!(options.build.declarations);
    }

    #[test]
    fn build_nested_layout_and_out_dir() {
        let options = parse_build_options(&args(&[
            "t.json", "--out", "/tmp/out", "--layout", "nested", "--no-dts",
        ]))
        .unwrap();
        assert_eq!(options.input, Path::new("t.json"));
        assert_eq!(options.out_dir, Path::new("/tmp/out"));
        assert_eq!(options.build.layout, Layout::Nested);
        assert!(!options.build.declarations);
    }

    #[test]
    fn build_rejects_unknown_layout() {
        let err = parse_build_options(&args(&["--layout", "tree"])).unwrap_err();
        assert!(err.contains("expected flat or nested"));
    }

    #[test]
    fn build_requires_out_value() {
        let err = parse_build_options(&args(&["--out"])).unwrap_err();
        assert!(err.contains("missing value for --out"));
    }

    #[test]
    fn unknown_command_fails() {
        let err = parse_command(&args(&["design-tokens", "publish"])).unwrap_err();
        assert!(err.contains("unknown command 'publish'"));
    }

    #[test]
    fn parses_validate_command() {
        let command = parse_command(&args(&["design-tokens", "validate", "x.json"])).unwrap();
        assert!(matches!(command, Command::Validate(ref o) if o.input == Path::new("x.json")));
    }
}
