//! CLI tool to check draft markup and render it as HTML or JSON.

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use draftex::{Document, Options};

/// Expand LaTeX-flavored draft markup.
#[derive(Debug, Parser)]
#[command(name = "draftex", version, about, max_term_width(100))]
struct Cli {
    #[command(subcommand)]
    command: Mode,

    /// Fail on the first structural error instead of annotating it.
    #[arg(long, global = true)]
    strict: bool,

    /// Drop `%` comments from the output.
    #[arg(long, global = true)]
    no_comments: bool,

    /// Deepest nesting of environments, groups and math spans.
    #[arg(long, global = true, default_value_t = 256)]
    max_depth: usize,

    /// Print macro definitions and invocations to stderr.
    #[arg(long, global = true)]
    trace_macros: bool,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Render each file as an HTML fragment.
    Html(Inputs),
    /// Dump each file's output tree as JSON.
    Json(Inputs),
    /// Report structural errors without rendering.
    Check(Inputs),
}

#[derive(Debug, Clone, clap::Args)]
struct Inputs {
    /// Files to read; `-` reads stdin.
    #[arg(required = true)]
    files: Vec<String>,
}

impl Cli {
    fn options(&self) -> Options {
        Options::default()
            .strict(self.strict)
            .keep_comments(!self.no_comments)
            .max_depth(self.max_depth)
            .trace_macros(self.trace_macros)
    }
}

fn read_source(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        fs::read_to_string(path)
    }
}

fn report(path: &str, document: &Document) {
    for line in &document.trace {
        eprintln!("{path}: {line}");
    }
    for error in &document.diagnostics {
        eprintln!("{path}: {error}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.options();
    let (Mode::Html(inputs) | Mode::Json(inputs) | Mode::Check(inputs)) = &cli.command;

    let mut had_error = false;

    for path in &inputs.files {
        let content = match read_source(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        let document = match draftex::parse_with(&content, &options) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };
        report(path, &document);

        match &cli.command {
            Mode::Html(_) => print!("{}", draftex::to_html(&document)),
            Mode::Json(_) => match serde_json::to_string_pretty(&document) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("{path}: {e}");
                    had_error = true;
                }
            },
            Mode::Check(_) => {
                let errors = document.diagnostics.len();
                let labels = document.labels.len();
                eprintln!("{path}: ok ({errors} structural error(s), {labels} label(s))");
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
