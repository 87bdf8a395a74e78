//! Minimal CLI: type table → (comparators | dictionary constructors | table dump)
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::codegen::{self, Mode};
use crate::lower::{self, CompareOptions};
use crate::table::TypeTable;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate boilerplate C for the generic collections library
#[derive(Parser, Debug)]
#[command(name = "collgen", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit a three-way `<tag>_compare` for every numeric type tag
    Compare(CompareOut),
    /// emit a `<key>_to_<value>_dictionary_create` for every ordered pair of type tags
    Dict(DictOut),
    /// print the active type table as JSON (the format `--types` accepts)
    Table(TableOut),
}

#[derive(Args, Debug, Clone)]
struct TableSettings {
    /// JSON type table to use instead of the built-in one
    #[arg(long)]
    types: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CompareOut {
    #[command(flatten)]
    table_settings: TableSettings,

    #[command(flatten)]
    output_settings: OutputSettings,

    /// emit prototypes instead of definitions
    #[arg(long)]
    header: bool,

    /// return early when either pointer is NULL
    #[arg(long)]
    null_guard: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct DictOut {
    #[command(flatten)]
    table_settings: TableSettings,

    #[command(flatten)]
    output_settings: OutputSettings,

    /// emit prototypes instead of definitions
    #[arg(long)]
    header: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct TableOut {
    #[command(flatten)]
    table_settings: TableSettings,

    #[command(flatten)]
    output_settings: OutputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TableSettings {
    fn load(&self) -> Result<TypeTable> {
        TypeTable::load_or_builtin(self.types.as_deref()).with_context(|| match &self.types {
            Some(path) => format!("loading type table from {}", path.display()),
            None => "loading built-in type table".to_string(),
        })
    }
}

impl OutputSettings {
    fn write(&self, src: &str) -> Result<()> {
        match self.out.as_ref() {
            Some(out) => write_file(out, src),
            None => {
                print!("{src}");
                Ok(())
            }
        }
    }
}

fn mode(header: bool) -> Mode {
    if header { Mode::Prototypes } else { Mode::Definitions }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        if self.is_no_op() {
            eprintln!("{self:#?}");
            return Ok(());
        }
        let src = self.render()?;
        self.output_settings().write(&src)
    }

    /// Everything `run` does except the final write.
    pub fn render(&self) -> Result<String> {
        match &self.cmd {
            Command::Compare(target) => {
                let table = target.table_settings.load()?;
                let opts = CompareOptions { null_guard: target.null_guard };
                let fns = lower::lower_comparators(&table, opts);
                tracing::debug!(functions = fns.len(), header = target.header, "emitting comparators");
                Ok(codegen::render(&fns, mode(target.header)))
            }
            Command::Dict(target) => {
                let table = target.table_settings.load()?;
                let fns = lower::lower_dictionary_ctors(&table);
                tracing::debug!(functions = fns.len(), header = target.header, "emitting dictionary constructors");
                Ok(codegen::render(&fns, mode(target.header)))
            }
            Command::Table(target) => {
                let table = target.table_settings.load()?;
                let mut src = table.to_json_pretty()?;
                src.push('\n');
                Ok(src)
            }
        }
    }

    fn is_no_op(&self) -> bool {
        match &self.cmd {
            Command::Compare(target) => target.no_op,
            Command::Dict(target) => target.no_op,
            Command::Table(_) => false,
        }
    }

    fn output_settings(&self) -> &OutputSettings {
        match &self.cmd {
            Command::Compare(target) => &target.output_settings,
            Command::Dict(target) => &target.output_settings,
            Command::Table(target) => &target.output_settings,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_file(out: &Path, src: &str) -> Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    std::fs::write(out, src).with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(path = %out.display(), bytes = src.len(), "wrote generated source");
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
