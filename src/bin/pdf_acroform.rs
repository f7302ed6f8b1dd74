//! Command-line front end for reading and filling PDF forms.
//!
//! Usage:
//!   pdf_acroform list <in.pdf> [--json]
//!   pdf_acroform fill <in.pdf> <out.pdf> [--set NAME=VALUE]... [--values values.json]
//!                     [--map map.json --record record.json]
//!   pdf_acroform fdf <in.pdf> <out.fdf>
//!
//! Logging is controlled with `RUST_LOG` (default `warn`).

use indexmap::IndexMap;
use pdf_acroform::{AcroFormReader, AcroFormWriter, FdfWriter, FieldMap, PdfDocument};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "\
usage:
  pdf_acroform list <in.pdf> [--json]
  pdf_acroform fill <in.pdf> <out.pdf> [--set NAME=VALUE]... [--values values.json] [--map map.json --record record.json]
  pdf_acroform fdf <in.pdf> <out.fdf>";

#[derive(Debug, PartialEq)]
enum Command {
    List {
        input: PathBuf,
        json: bool,
    },
    Fill {
        input: PathBuf,
        output: PathBuf,
        sets: Vec<(String, String)>,
        values: Option<PathBuf>,
        map: Option<(PathBuf, PathBuf)>,
    },
    Fdf {
        input: PathBuf,
        output: PathBuf,
    },
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some(command) = args.first() else {
        return Err("missing command".to_string());
    };
    let mut positional = Vec::new();
    let mut json = false;
    let mut sets = Vec::new();
    let mut values = None;
    let mut map = None;
    let mut record = None;

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--json" => json = true,
            "--set" | "--values" | "--map" | "--record" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    return Err(format!("{} needs a value", arg));
                };
                match arg {
                    "--set" => {
                        let Some((name, v)) = value.split_once('=') else {
                            return Err(format!("--set expects NAME=VALUE, got '{}'", value));
                        };
                        sets.push((name.to_string(), v.to_string()));
                    },
                    "--values" => values = Some(PathBuf::from(value)),
                    "--map" => map = Some(PathBuf::from(value)),
                    _ => record = Some(PathBuf::from(value)),
                }
            },
            _ if arg.starts_with("--") => return Err(format!("unknown option '{}'", arg)),
            _ => positional.push(PathBuf::from(arg)),
        }
        i += 1;
    }

    let expected = match command.as_str() {
        "list" => 1,
        "fill" | "fdf" => 2,
        other => return Err(format!("unknown command '{}'", other)),
    };
    if positional.len() != expected {
        return Err(format!("'{}' takes {} path argument(s)", command, expected));
    }
    let mut paths = positional.into_iter();
    let input = paths.next().unwrap_or_default();
    let output = paths.next().unwrap_or_default();

    match command.as_str() {
        "list" => Ok(Command::List { input, json }),
        "fdf" => Ok(Command::Fdf { input, output }),
        _ => {
            let map = match (map, record) {
                (Some(m), Some(r)) => Some((m, r)),
                (None, None) => None,
                _ => return Err("--map and --record must be given together".to_string()),
            };
            Ok(Command::Fill {
                input,
                output,
                sets,
                values,
                map,
            })
        },
    }
}

fn run(command: Command) -> pdf_acroform::Result<()> {
    match command {
        Command::List { input, json } => {
            let data = fs::read(&input)?;
            let doc = PdfDocument::parse(&data)?;
            let fields = AcroFormReader::new(&doc).read_fields()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&fields)?);
            } else {
                for field in &fields {
                    println!(
                        "{}\t{}\t{}\t{}\t{}",
                        field.name,
                        field.kind,
                        field.object_number,
                        field.value.as_deref().unwrap_or(""),
                        field.on_value.as_deref().unwrap_or("")
                    );
                }
            }
        },
        Command::Fill {
            input,
            output,
            sets,
            values,
            map,
        } => {
            let mut all: IndexMap<String, String> = IndexMap::new();
            if let Some(path) = values {
                let from_file: IndexMap<String, String> =
                    serde_json::from_reader(BufReader::new(File::open(path)?))?;
                all.extend(from_file);
            }
            if let Some((map_path, record_path)) = map {
                let field_map = FieldMap::from_reader(BufReader::new(File::open(map_path)?))?;
                let record: serde_json::Value =
                    serde_json::from_reader(BufReader::new(File::open(record_path)?))?;
                all.extend(field_map.values_for(&record)?);
            }
            all.extend(sets);

            let data = fs::read(&input)?;
            let filled = AcroFormWriter::new().fill_fields(&data, &all)?;
            fs::write(&output, filled)?;
        },
        Command::Fdf { input, output } => {
            let data = fs::read(&input)?;
            let doc = PdfDocument::parse(&data)?;
            let fields = AcroFormReader::new(&doc).read_fields()?;
            FdfWriter::from_fields(&fields).write_to_file(&output)?;
        },
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("Error: {}\n{}", msg, USAGE);
            return ExitCode::from(2);
        },
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_fill() {
        let cmd = parse_args(&args(&[
            "fill", "in.pdf", "out.pdf", "--set", "Name=Doe, John", "--set", "a=b=c", "--values", "v.json",
        ]))
        .unwrap();
        assert_eq!(
            cmd,
            Command::Fill {
                input: "in.pdf".into(),
                output: "out.pdf".into(),
                sets: vec![
                    ("Name".to_string(), "Doe, John".to_string()),
                    ("a".to_string(), "b=c".to_string())
                ],
                values: Some("v.json".into()),
                map: None,
            }
        );
    }

    #[test]
    fn test_parse_list_and_fdf() {
        assert_eq!(
            parse_args(&args(&["list", "f.pdf", "--json"])).unwrap(),
            Command::List {
                input: "f.pdf".into(),
                json: true
            }
        );
        assert!(matches!(parse_args(&args(&["fdf", "a.pdf", "b.fdf"])), Ok(Command::Fdf { .. })));
    }

    #[test]
    fn test_usage_errors() {
        assert!(parse_args(&[]).is_err());
        assert!(parse_args(&args(&["frobnicate", "x"])).is_err());
        assert!(parse_args(&args(&["list"])).is_err());
        assert!(parse_args(&args(&["fill", "a", "b", "--set", "novalue"])).is_err());
        assert!(parse_args(&args(&["fill", "a", "b", "--map", "m.json"])).is_err());
        assert!(parse_args(&args(&["list", "a", "--bogus"])).is_err());
    }
}
