//! Walrus CLI
//!
//! Command-line interface for the walrus language.

use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use walrus_core::diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics, DiagnosticsOutput};
use walrus_core::{Config, Interpreter};

/// Stack for the thread `walrus run` evaluates on. Room for the deepest
/// accepted `max_call_depth`.
const RUN_STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "walrus")]
#[command(author, version, about = "A small statically typed scripting language", long_about = None)]
struct Cli {
    /// Verbose mode - log interpreter phases to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Human,
    Fancy,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a walrus script
    Run {
        /// Path to the .wal file
        file: String,

        /// Output format for diagnostics
        #[arg(short, long, value_enum, default_value = "human")]
        format: Format,

        /// Configuration file (defaults to walrus.toml next to the script)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Check a script for lexical and syntax errors without running it
    Check {
        /// Path to the .wal file
        file: String,

        /// Output format for diagnostics
        #[arg(short, long, value_enum, default_value = "human")]
        format: Format,
    },

    /// Parse a file and print the AST as JSON (for debugging)
    Parse {
        /// Path to the .wal file
        file: String,
    },

    /// Print the token stream of a file (for debugging)
    Tokens {
        /// Path to the .wal file
        file: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { file, format, config } => {
            tracing::debug!(command = "run", file = %file, "dispatching");
            run_on_large_stack(file, format, config)
        }
        Commands::Check { file, format } => {
            tracing::debug!(command = "check", file = %file, "dispatching");
            cmd_check(&file, format)
        }
        Commands::Parse { file } => {
            tracing::debug!(command = "parse", file = %file, "dispatching");
            cmd_parse(&file)
        }
        Commands::Tokens { file } => {
            tracing::debug!(command = "tokens", file = %file, "dispatching");
            cmd_tokens(&file)
        }
    }
}

fn run_on_large_stack(file: String, format: Format, config: Option<String>) -> ExitCode {
    let spawned = thread::Builder::new()
        .name("walrus-run".into())
        .stack_size(RUN_STACK_SIZE)
        .spawn(move || cmd_run(&file, format, config.as_deref()));

    match spawned {
        Ok(handle) => handle.join().unwrap_or(ExitCode::FAILURE),
        Err(e) => {
            eprintln!("{} Failed to start interpreter thread: {}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn read_source(file: &str) -> Result<String, ExitCode> {
    fs::read_to_string(file).map_err(|e| {
        eprintln!("{} Failed to read file '{}': {}", "error:".red().bold(), file, e);
        ExitCode::from(2)
    })
}

fn load_config(file: &str, explicit: Option<&str>) -> Result<Config, ExitCode> {
    let result = match explicit {
        Some(path) => {
            tracing::debug!(path = %path, "using explicit configuration");
            Config::load(Path::new(path))
        }
        None => {
            let dir = Path::new(file)
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            tracing::debug!(dir = %dir.display(), "looking for walrus.toml");
            Config::load_from_dir(dir)
        }
    };
    result.map_err(|e| {
        eprintln!("{} {}", "error:".red().bold(), e);
        ExitCode::from(2)
    })
}

fn cmd_run(file: &str, format: Format, config: Option<&str>) -> ExitCode {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let config = match load_config(file, config) {
        Ok(config) => config,
        Err(code) => return code,
    };

    tracing::debug!(
        max_call_depth = config.interpreter.max_call_depth,
        disabled = ?config.builtins.disabled,
        "starting interpreter"
    );
    let mut interpreter = Interpreter::with_config(&config);

    if format == Format::Fancy {
        return run_fancy(&mut interpreter, &source, file);
    }

    let (_, diagnostics) = interpreter.run_source(&source, file);
    tracing::debug!(errors = diagnostics.errors().count(), "run finished");
    match format {
        Format::Json => print_json(&diagnostics),
        _ => {
            for diag in diagnostics.iter() {
                eprint!("{}", render_diagnostic(diag));
            }
            if diagnostics.has_errors() {
                eprintln!(
                    "{}: could not run `{}` due to {}",
                    "error".red().bold(),
                    file,
                    count_summary(&diagnostics)
                );
            }
        }
    }

    exit_code(&diagnostics)
}

/// Run with `miette` rendering, stopping at the first error.
fn run_fancy(interpreter: &mut Interpreter, source: &str, file: &str) -> ExitCode {
    let (program, diagnostics) = interpreter.validate(source, file);
    for diag in diagnostics.warnings() {
        eprint!("{}", render_diagnostic(diag));
    }

    let result = match program {
        Some(program) => interpreter.run(&program).map_err(walrus_core::Error::from),
        None => walrus_core::tokenize(source)
            .map_err(walrus_core::Error::from)
            .and_then(|tokenized| {
                walrus_core::Parser::new(tokenized.tokens, file)
                    .parse()
                    .map_err(walrus_core::Error::from)
            })
            .map(|_| walrus_core::Value::Null),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            let report = miette::Report::new(e)
                .with_source_code(miette::NamedSource::new(file, source.to_string()));
            eprintln!("{:?}", report);
            ExitCode::from(1)
        }
    }
}

fn cmd_check(file: &str, format: Format) -> ExitCode {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let mut interpreter = Interpreter::new();
    let (program, diagnostics) = interpreter.validate(&source, file);

    match format {
        Format::Json => print_json(&diagnostics),
        _ => {
            for diag in diagnostics.iter() {
                print!("{}", render_diagnostic(diag));
            }

            if diagnostics.has_errors() {
                eprintln!(
                    "{}: could not validate `{}` due to {}",
                    "error".red().bold(),
                    file,
                    count_summary(&diagnostics)
                );
            } else if program.is_some() {
                let warning_count = diagnostics.warnings().count();
                if warning_count > 0 {
                    println!(
                        "{} `{}` validated with {} warning{}",
                        "Finished".green().bold(),
                        file,
                        warning_count,
                        if warning_count == 1 { "" } else { "s" }
                    );
                } else {
                    println!("{} `{}` validated successfully", "Finished".green().bold(), file);
                }
            }
        }
    }

    exit_code(&diagnostics)
}

fn cmd_parse(file: &str) -> ExitCode {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let mut interpreter = Interpreter::new();
    let (program, diagnostics) = interpreter.validate(&source, file);

    for diag in diagnostics.iter() {
        eprint!("{}", render_diagnostic(diag));
    }

    match program {
        Some(program) => match program.to_json() {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{} Failed to serialize AST: {}", "error:".red().bold(), e);
                ExitCode::from(2)
            }
        },
        None => ExitCode::from(1),
    }
}

fn cmd_tokens(file: &str) -> ExitCode {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match walrus_core::tokenize(&source) {
        Ok(tokenized) => {
            for token in &tokenized.tokens {
                println!(
                    "{:>4}:{:<4} {}",
                    token.span.start.line, token.span.start.column, token
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let lines: Vec<String> = source.lines().map(str::to_string).collect();
            let diag = walrus_core::Error::from(e).to_diagnostic(file, &lines);
            eprint!("{}", render_diagnostic(&diag));
            ExitCode::from(1)
        }
    }
}

fn print_json(diagnostics: &Diagnostics) {
    let output = DiagnosticsOutput::from_diagnostics(diagnostics);
    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn exit_code(diagnostics: &Diagnostics) -> ExitCode {
    if diagnostics.has_errors() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// "1 previous error" or "2 previous errors; 1 warning emitted".
fn count_summary(diagnostics: &Diagnostics) -> String {
    let error_count = diagnostics.errors().count();
    let warning_count = diagnostics.warnings().count();
    format!(
        "{} previous error{}{}",
        error_count,
        if error_count == 1 { "" } else { "s" },
        if warning_count > 0 {
            format!("; {} warning{} emitted", warning_count, if warning_count == 1 { "" } else { "s" })
        } else {
            String::new()
        }
    )
}

/// Human-readable rendering of one diagnostic, with the source line and an
/// underline below the offending range.
fn render_diagnostic(diag: &Diagnostic) -> String {
    let severity_str = match diag.severity {
        DiagnosticSeverity::Error => "error".red().bold(),
        DiagnosticSeverity::Warning => "warning".yellow().bold(),
    };

    let mut out = format!(
        "{}{}{} {}\n",
        severity_str,
        format!("[{}]", diag.code).dimmed(),
        ":".bold(),
        diag.message
    );
    out.push_str(&format!(
        "  {} {}:{}:{}\n",
        "-->".blue().bold(),
        diag.file,
        diag.span.start.line,
        diag.span.start.column
    ));

    if let Some(ref context) = diag.context {
        let start = diag.span.start.column.max(1);
        let width = if diag.span.end.line == diag.span.start.line {
            diag.span.end.column.saturating_sub(start).max(1)
        } else {
            context.chars().count().saturating_sub(start - 1).max(1)
        };
        let underline = format!("^{}", "~".repeat(width - 1));
        let underline = match diag.severity {
            DiagnosticSeverity::Error => underline.red().bold(),
            DiagnosticSeverity::Warning => underline.yellow().bold(),
        };

        out.push_str(&format!("   {}\n", "|".blue().bold()));
        out.push_str(&format!(
            "{:>3} {} {}\n",
            diag.span.start.line.to_string().blue().bold(),
            "|".blue().bold(),
            context
        ));
        out.push_str(&format!(
            "   {} {}{}\n",
            "|".blue().bold(),
            " ".repeat(start - 1),
            underline
        ));
    }

    for hint in &diag.hints {
        out.push_str(&format!("   {} {}: {}\n", "=".blue().bold(), "help".bold(), hint));
    }

    out.push('\n');
    out
}
