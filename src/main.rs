//! mailpilot CLI: run the reply pipeline over a saved model response.
//!
//! Usage: `mailpilot <response-file|-> [--attach <file>]... [--out <dir>]`
//!
//! Reads the raw model reply text (stdin with `-`), loads the given source
//! attachments, renders all embedded directives with the default encoders,
//! writes the resulting artifacts into the output directory and prints the
//! sanitized message to stdout.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mailpilot::encoders::DefaultEncoders;
use mailpilot::types::SourceAttachment;

const USAGE: &str = "Usage: mailpilot <response-file|-> [--attach <file>]... [--out <dir>]";

struct Args {
    input: String,
    attachments: Vec<PathBuf>,
    out_dir: PathBuf,
}

fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut input = None;
    let mut attachments = Vec::new();
    let mut out_dir = PathBuf::from(".");

    let mut iter = argv.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--attach" => {
                let value = iter.next().ok_or("--attach requires a file path")?;
                attachments.push(PathBuf::from(value));
            }
            "--out" => {
                let value = iter.next().ok_or("--out requires a directory path")?;
                out_dir = PathBuf::from(value);
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option: {}", other));
            }
            other => {
                if input.replace(other.to_string()).is_some() {
                    return Err("only one response file may be given".to_string());
                }
            }
        }
    }

    Ok(Args {
        input: input.ok_or("missing response file")?,
        attachments,
        out_dir,
    })
}

fn read_response(input: &str) -> Result<String, String> {
    if input == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|e| format!("failed to read stdin: {}", e))?;
        Ok(raw)
    } else {
        std::fs::read_to_string(input)
            .map_err(|e| format!("failed to read '{}': {}", input, e))
    }
}

fn load_attachments(paths: &[PathBuf]) -> Result<Vec<SourceAttachment>, String> {
    paths
        .iter()
        .map(|path| {
            let data = std::fs::read(path)
                .map_err(|e| format!("failed to read attachment '{}': {}", path.display(), e))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("attachment")
                .to_string();
            Ok(SourceAttachment::new(name, data))
        })
        .collect()
}

fn write_artifacts(
    artifacts: &[mailpilot::Artifact],
    out_dir: &Path,
) -> Result<(), String> {
    if artifacts.is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(out_dir)
        .map_err(|e| format!("failed to create '{}': {}", out_dir.display(), e))?;
    for artifact in artifacts {
        let path = out_dir.join(&artifact.filename);
        std::fs::write(&path, &artifact.data)
            .map_err(|e| format!("failed to write '{}': {}", path.display(), e))?;
        log::info!("wrote {} ({} bytes)", path.display(), artifact.data.len());
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), String> {
    let raw = read_response(&args.input)?;
    let attachments = load_attachments(&args.attachments)?;

    let encoders = DefaultEncoders::new();
    let reply = mailpilot::process_model_output(&raw, &attachments, &encoders);

    write_artifacts(&reply.artifacts, &args.out_dir)?;

    println!("{}", reply.text);

    match reply.confidence {
        Some(score) => eprintln!(
            "{} artifact(s), confidence {}%",
            reply.artifacts.len(),
            score
        ),
        None => eprintln!("{} artifact(s)", reply.artifacts.len()),
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
