//! Thin front-end: reads AST fixtures and a class-path, drives the binder
//! and lowering pipeline, and writes the output jar.
//!
//! The real lexer and parser are out of scope for this repository (see the
//! crate root docs on `headc_core`); this binary substitutes pre-parsed
//! JSON fixtures for that boundary so the rest of the pipeline is still
//! runnable end to end.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use headc_ast::CompilationUnit;
use headc_binder::bind;
use headc_classfile::write_class_file;
use headc_core::{Diagnostic, DiagnosticSink, Interner};

const MIN_MAJOR_VERSION: u16 = 45;
const MAX_MAJOR_VERSION: u16 = 68;

#[derive(Parser)]
#[command(name = "headc", version, about = "Header-only Java-bytecode compiler")]
struct Cli {
    /// JSON AST-fixture files, one compilation unit each
    #[arg(long = "sources", required = true, num_args = 1..)]
    sources: Vec<PathBuf>,

    /// Project classpath entries (directories or jars), consulted in order
    #[arg(long = "classpath", num_args = 0..)]
    classpath: Vec<PathBuf>,

    /// Platform classpath entries, consulted after `--classpath`
    #[arg(long = "boot-classpath", num_args = 0..)]
    boot_classpath: Vec<PathBuf>,

    /// Output jar path
    #[arg(long = "output")]
    output: PathBuf,

    /// Emitted class-file major version (default: headc_classfile's own default)
    #[arg(long = "release")]
    release: Option<u16>,
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let major_version = match cli.release {
        Some(v) if (MIN_MAJOR_VERSION..=MAX_MAJOR_VERSION).contains(&v) => v,
        Some(v) => anyhow::bail!(
            "--release {v} is out of range ({MIN_MAJOR_VERSION}..={MAX_MAJOR_VERSION})"
        ),
        None => headc_classfile::DEFAULT_MAJOR_VERSION,
    };

    let compilation_units = cli
        .sources
        .iter()
        .map(|path| load_compilation_unit(path))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(units = compilation_units.len(), "loaded compilation units");

    let mut classpath = headc_classpath::ClassPath::new(&cli.classpath, &cli.boot_classpath)
        .context("failed to open classpath")?;

    let mut interner = Interner::new();
    let mut diagnostics = DiagnosticSink::new();
    let program = bind(&mut interner, &mut diagnostics, &mut classpath, compilation_units);

    if !diagnostics.is_empty() {
        for diagnostic in diagnostics.iter() {
            eprintln!("{}", render_diagnostic(diagnostic));
        }
        return Ok(1);
    }

    let class_defs = headc_lower::lower_program_with_version(&program, &mut interner, major_version);

    let mut entries = class_defs
        .iter()
        .map(|def| -> Result<(String, Vec<u8>)> {
            let bytes = write_class_file(def).with_context(|| format!("failed to encode {}", def.this_class))?;
            Ok((format!("{}.class", def.this_class), bytes))
        })
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    headc_archive::write_archive(&cli.output, &entries)
        .with_context(|| format!("failed to write output archive {}", cli.output.display()))?;

    tracing::info!(classes = entries.len(), output = %cli.output.display(), "wrote output archive");
    Ok(0)
}

fn load_compilation_unit(path: &std::path::Path) -> Result<CompilationUnit> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse AST fixture {}", path.display()))
}

fn render_diagnostic(diagnostic: &Diagnostic) -> String {
    match &diagnostic.location {
        Some(location) => format!("{location}: {}", diagnostic.kind),
        None => format!("<unknown>: {}", diagnostic.kind),
    }
}
