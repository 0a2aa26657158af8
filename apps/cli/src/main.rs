// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: build an assembly section model and export it
//!
//! Prints the layer stack as JSON and optionally writes the built solids as
//! Wavefront OBJ.
//!
//! Usage:
//!   section <model.json> [options]

mod obj;

use std::env;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use section_engine::{Model, Options, SectionEngine, Viewport};

struct Args {
    model_path: PathBuf,
    options_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    debug: bool,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let args = match parse_args(&args[1..]) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {err}");
            print_usage();
            std::process::exit(1);
        }
    };

    let default_filter = if args.debug {
        "info,section_engine=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&args) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args {
        model_path: PathBuf::from(&args[0]),
        options_path: None,
        output_path: None,
        debug: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--options" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--options needs a file");
                };
                parsed.options_path = Some(PathBuf::from(path));
            }
            "--output" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--output needs a file");
                };
                parsed.output_path = Some(PathBuf::from(path));
            }
            "--debug" => parsed.debug = true,
            other => bail!("unknown option: {other}"),
        }
        i += 1;
    }

    Ok(parsed)
}

fn run(args: &Args) -> Result<()> {
    let model_text = fs::read_to_string(&args.model_path)
        .with_context(|| format!("cannot read model {}", args.model_path.display()))?;
    let model = Model::from_json(&model_text)
        .with_context(|| format!("cannot parse model {}", args.model_path.display()))?;

    let mut options = match &args.options_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot read options {}", path.display()))?;
            Options::from_json(&text).with_context(|| format!("cannot parse options {}", path.display()))?
        }
        None => Options::default(),
    };
    if args.debug {
        options.debug = true;
    }

    let mut engine = SectionEngine::new(Viewport::new(800.0, 600.0), model, options)?;
    engine.build().context("cannot build section")?;

    let layout = engine.layout()?;
    println!("{}", serde_json::to_string_pretty(&layout)?);

    if let Some(path) = &args.output_path {
        let file = fs::File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let objects = obj::write_scene_obj(engine.scene(), &mut writer)?;
        writer.flush()?;
        tracing::info!(objects, path = %path.display(), "wrote OBJ");
    }

    Ok(())
}

fn print_usage() {
    eprintln!("Usage: section <model.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --options <file>   Engine options as JSON (camelCase keys)");
    eprintln!("  --output <file>    Write the built solids as Wavefront OBJ");
    eprintln!("  --debug            Log layout details");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_parse_all_options() {
        let args = parse_args(&strings(&["wall.json", "--options", "o.json", "--output", "wall.obj", "--debug"])).unwrap();
        assert_eq!(args.model_path, PathBuf::from("wall.json"));
        assert_eq!(args.options_path, Some(PathBuf::from("o.json")));
        assert_eq!(args.output_path, Some(PathBuf::from("wall.obj")));
        assert!(args.debug);
    }

    #[test]
    fn test_missing_option_value() {
        assert!(parse_args(&strings(&["wall.json", "--output"])).is_err());
        assert!(parse_args(&strings(&["wall.json", "--verbose"])).is_err());
    }
}
