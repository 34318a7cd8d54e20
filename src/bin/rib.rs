//! Command-line interface for rib
//!
//! Usage:
//!   rib tokens `<path>` [--format simple|json]   - Print the classified token stream
//!   rib check `<path>`                           - Report the first lexical error, if any
//!   rib format `<path>`                          - Re-indent a RIB file to stdout
//!   rib demo [--output `<dir>`]                  - Write the sphere scene through the configured preset

use clap::{Parser, Subcommand, ValueEnum};
use rib::rib::context::Context;
use rib::rib::error::RibError;
use rib::rib::formatting::format_rib_with;
use rib::rib::lexing::{filter_from_config, lex_with, Token};
use rib::rib::pipeline::Statistics;
use rib::rib::presets;
use rib::rib::values::Value;
use rib_config::{Loader, RibConfig};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// Emit, inspect and re-format RenderMan Interface Bytestream files
#[derive(Parser)]
#[command(name = "rib")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file layered over the built-in defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the classified token stream of a RIB file
    Tokens {
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "simple")]
        format: TokenFormat,
    },

    /// Lex a RIB file and report the first error
    Check { path: PathBuf },

    /// Re-indent a RIB file to stdout
    Format { path: PathBuf },

    /// Write the sphere scene through the configured preset
    Demo {
        /// Directory the archive is written to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TokenFormat {
    /// One token per line
    Simple,
    /// One JSON object per line
    Json,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error installing logger: {}", e);
    }

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Tokens { path, format } => handle_tokens_command(&config, &path, format),
        Commands::Check { path } => handle_check_command(&config, &path),
        Commands::Format { path } => handle_format_command(&config, &path),
        Commands::Demo { output } => handle_demo_command(config, output),
    }
}

fn load_config(path: Option<&Path>) -> RibConfig {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    loader.build().unwrap_or_else(|e| {
        eprintln!("Error loading configuration: {}", e);
        process::exit(1);
    })
}

fn read_source(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        process::exit(1);
    })
}

fn lex_file(config: &RibConfig, path: &Path) -> Result<Vec<Token>, RibError> {
    let source = read_source(path);
    let filter = filter_from_config(&config.lexer);
    let tokens = lex_with(&source, filter.as_ref(), config.limits.into()).collect();
    tokens
}

/// Handle the tokens command
fn handle_tokens_command(config: &RibConfig, path: &Path, format: TokenFormat) {
    let tokens = lex_file(config, path).unwrap_or_else(|e| {
        eprintln!("{}: {}", path.display(), e);
        process::exit(1);
    });
    for token in &tokens {
        match format {
            TokenFormat::Simple => println!("{}", token),
            TokenFormat::Json => match serde_json::to_string(token) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing token: {}", e);
                    process::exit(1);
                }
            },
        }
    }
}

/// Handle the check command
fn handle_check_command(config: &RibConfig, path: &Path) {
    match lex_file(config, path) {
        Ok(tokens) => {
            let commands = tokens.iter().filter(|t| t.command().is_some()).count();
            println!("{}: ok ({} tokens, {} requests)", path.display(), tokens.len(), commands);
        }
        Err(e) => {
            eprintln!("{}: {} ({})", path.display(), e, e.kind());
            process::exit(1);
        }
    }
}

/// Handle the format command
fn handle_format_command(config: &RibConfig, path: &Path) {
    let source = read_source(path);
    match format_rib_with(&source, &config.pipeline.indent_string) {
        Ok(formatted) => print!("{}", formatted),
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Handle the demo command
fn handle_demo_command(mut config: RibConfig, output: Option<PathBuf>) {
    if let Some(directory) = output {
        config.output.directory = directory;
    }
    let result = presets::context(&config).and_then(|mut ctx| {
        write_sphere_scene(&mut ctx)?;
        let snapshot = ctx.pipeline().stage::<Statistics>().map(Statistics::snapshot);
        ctx.close()?;
        Ok(snapshot)
    });
    match result {
        Ok(Some(snapshot)) => match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing statistics: {}", e),
        },
        Ok(None) => debug!("Preset has no statistics stage"),
        Err(e) => {
            eprintln!("Error writing scene: {}", e);
            process::exit(1);
        }
    }
}

fn write_sphere_scene(ctx: &mut Context) -> Result<(), RibError> {
    ctx.begin("sphere.rib")?;
    ctx.version(3.04)?;
    ctx.display("sphere.tif", "file", "rgb", vec![])?;
    ctx.format(320, 240, 1.0)?;
    ctx.translate(0.0, 0.0, 6.0)?;
    ctx.world_begin()?;
    ctx.projection("perspective", vec![Value::token("fov"), Value::Float(30.0)])?;
    ctx.color(&[1.0, 0.0, 0.0])?;
    ctx.sphere(1.0, -1.0, 1.0, 360.0, vec![])?;
    ctx.world_end()?;
    ctx.end()
}
