use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use stubgen_compiler::{compile_artifact_to_rust, compile_idl, compile_json, Artifact, IdlError, Options};

#[derive(Parser)]
#[command(name = "stubc")]
#[command(about = "Generate IPC message frames, a server dispatcher and a client from an interface file", long_about = None)]
struct Cli {
    /// Output file; written only if compilation succeeds
    #[arg(short, long)]
    output: PathBuf,

    /// What to write to the output file
    #[arg(long, value_enum, default_value_t = Emit::Rust)]
    emit: Emit,

    /// Bytes per machine word on the target
    #[arg(long, default_value_t = 8, value_parser = parse_word_size)]
    word_size: usize,

    /// Input `.idl` file, or a `.json` structured interface
    input: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Rust source for the stubs
    Rust,
    /// The resolved artifact description as JSON
    Json,
}

fn parse_word_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(size @ (4 | 8)) => Ok(size),
        _ => Err(format!("word size must be 4 or 8, got {}", s)),
    }
}

fn compile(input: &Path, options: &Options) -> Result<Artifact, IdlError> {
    let text = fs::read_to_string(input)?;
    let is_json = input.extension().map_or(false, |ext| ext == "json");
    let (_interface, artifact) = if is_json {
        compile_json(&text, options)?
    } else {
        compile_idl(&text, options)?
    };
    Ok(artifact)
}

/// Writes through a temporary file in the destination directory so the
/// output path only ever holds a complete file.
fn write_output(path: &Path, contents: &str) -> Result<(), IdlError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.persist(path).map_err(|e| IdlError::Io(e.error))?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), IdlError> {
    let options = Options { word_size: cli.word_size };
    debug!("compiling {} with {:?}", cli.input.display(), options);

    let artifact = compile(&cli.input, &options)?;
    let contents = match cli.emit {
        Emit::Rust => compile_artifact_to_rust(&artifact),
        Emit::Json => serde_json::to_string_pretty(&artifact)?,
    };

    write_output(&cli.output, &contents)?;
    info!("{} → {}", cli.input.display(), cli.output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("stubc: error: {}: {}", cli.input.display(), err);
            ExitCode::FAILURE
        }
    }
}
