use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use brine_idl::{compile_to_json, outline_to_json};
use brine_idl_compiler::{
    error::IdlError,
    tokenizer::{tokenize_schema, TokenMask},
    BuildConfig,
};

mod logger;

use logger::TerminalLogger;

#[derive(Parser)]
#[command(name = "bidl")]
#[command(about = "Lex, parse and package Brine IDL files", long_about = None)]
struct Cli {
    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Also report debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every token of each input as one JSON object per line
    Lex {
        /// Input files; `-` or none reads stdin
        files: Vec<PathBuf>,
    },

    /// Merge the inputs in order and print the namespace tree as JSON
    Parse {
        /// Input files; `-` or none reads stdin
        files: Vec<PathBuf>,
    },

    /// Merge the inputs, build packages and print their outline as JSON
    Packages {
        /// Input files; `-` or none reads stdin
        files: Vec<PathBuf>,

        #[command(flatten)]
        build: BuildArgs,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// JSON file with build settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Namespace option that overrides a package name
    #[arg(long)]
    name_option: Option<String>,

    /// Namespace option that sets a package import path
    #[arg(long)]
    import_option: Option<String>,

    /// Name of the root package
    #[arg(long)]
    default_name: Option<String>,

    /// Import path used when no namespace sets one
    #[arg(long)]
    default_import_path: Option<String>,

    /// Prefix of mangled package identifiers
    #[arg(long)]
    mangle_prefix: Option<String>,
}

impl BuildArgs {
    fn load(&self) -> Result<BuildConfig, IdlError> {
        let mut config = match &self.config {
            Some(path) => BuildConfig::from_json(&fs::read_to_string(path)?)?,
            None => BuildConfig::default(),
        };
        let overrides = [
            (&self.name_option, &mut config.name_option),
            (&self.import_option, &mut config.import_option),
            (&self.default_name, &mut config.default_name),
            (&self.default_import_path, &mut config.default_import_path),
            (&self.mangle_prefix, &mut config.mangle_prefix),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                *field = value.clone();
            }
        }
        Ok(config)
    }
}

/// Reads every input as `(origin, text)`; an empty list or `-` means stdin.
fn read_inputs(files: &[PathBuf]) -> Result<Vec<(String, String)>, IdlError> {
    if files.is_empty() {
        return Ok(vec![read_stdin()?]);
    }
    files
        .iter()
        .map(|path| {
            if path.as_os_str() == "-" {
                read_stdin()
            } else {
                Ok((path.display().to_string(), fs::read_to_string(path)?))
            }
        })
        .collect()
}

fn read_stdin() -> Result<(String, String), IdlError> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(("<stdin>".to_owned(), text))
}

fn main() -> Result<(), IdlError> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => LevelFilter::Error,
        (_, true) => LevelFilter::Debug,
        _ => LevelFilter::Warn,
    };
    if TerminalLogger::setup(level).is_err() {
        eprintln!("logger already installed");
    }

    match &cli.command {
        Commands::Lex { files } => {
            for (origin, text) in read_inputs(files)? {
                let tokens = tokenize_schema(&text, TokenMask::NONE).map_err(|e| e.in_source(&origin))?;
                for token in &tokens {
                    println!("{}", serde_json::to_string(token)?);
                }
            }
            Ok(())
        }

        Commands::Parse { files } => {
            let json = compile_to_json(read_inputs(files)?)?;
            println!("{}", json);
            Ok(())
        }

        Commands::Packages { files, build } => {
            let config = build.load()?;
            let json = outline_to_json(read_inputs(files)?, &config)?;
            println!("{}", json);
            Ok(())
        }
    }
}
