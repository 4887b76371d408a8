//! Command-line interface for unlatex
//! This binary parses and formats LaTeX files.
//!
//! Usage:
//!   latexformat format `<path>` [--print-width `<n>`] [--write]  - Format a file (or stdin)
//!   latexformat parse `<path>` [--format `<format>`]             - Dump the AST

use clap::{Arg, ArgAction, Command};
use std::io::Read;

use unlatex::latex::ast;
use unlatex::FormatOptions;

fn main() {
    let matches = Command::new("latexformat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A fault-tolerant LaTeX parser and formatter")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("format")
                .about("Format a LaTeX file and print the result")
                .arg(
                    Arg::new("path")
                        .help("Path to the file to format; reads stdin when omitted")
                        .index(1),
                )
                .arg(
                    Arg::new("print-width")
                        .long("print-width")
                        .help("Line width the formatter wraps on")
                        .default_value("80"),
                )
                .arg(
                    Arg::new("tab-width")
                        .long("tab-width")
                        .help("Spaces per indentation level")
                        .default_value("2"),
                )
                .arg(
                    Arg::new("use-tabs")
                        .long("use-tabs")
                        .help("Indent with tabs instead of spaces")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("document-only")
                        .long("document-only")
                        .help("Leave everything before \\begin{document} untouched")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("write")
                        .long("write")
                        .short('w')
                        .help("Rewrite the file in place instead of printing")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a LaTeX file and dump the AST")
                .arg(
                    Arg::new("path")
                        .help("Path to the file to parse; reads stdin when omitted")
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format ('json' or 'yaml')")
                        .default_value("json"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("format", format_matches)) => {
            let path = format_matches.get_one::<String>("path");
            let options = FormatOptions {
                print_width: parse_number(format_matches.get_one::<String>("print-width")),
                tab_width: parse_number(format_matches.get_one::<String>("tab-width")),
                use_tabs: format_matches.get_flag("use-tabs"),
                document_only: format_matches.get_flag("document-only"),
            };
            let write = format_matches.get_flag("write");
            handle_format_command(path, &options, write);
        }
        Some(("parse", parse_matches)) => {
            let path = parse_matches.get_one::<String>("path");
            let format = parse_matches.get_one::<String>("format").unwrap();
            handle_parse_command(path, format);
        }
        _ => unreachable!(),
    }
}

fn parse_number(value: Option<&String>) -> usize {
    let value = value.unwrap();
    value.parse().unwrap_or_else(|_| {
        eprintln!("Error: '{}' is not a number", value);
        std::process::exit(2);
    })
}

/// Read the input file, or stdin when no path was given.
fn read_input(path: Option<&String>) -> String {
    match path {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading {}: {}", path, e);
            std::process::exit(1);
        }),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .unwrap_or_else(|e| {
                    eprintln!("Error reading stdin: {}", e);
                    std::process::exit(1);
                });
            source
        }
    }
}

/// Handle the format command
fn handle_format_command(path: Option<&String>, options: &FormatOptions, write: bool) {
    let source = read_input(path);
    let formatted = unlatex::format_with_opts(&source, options).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    match (write, path) {
        (true, Some(path)) => {
            if let Err(e) = std::fs::write(path, formatted) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
        }
        (true, None) => {
            eprintln!("Error: --write requires a file path");
            std::process::exit(2);
        }
        (false, _) => print!("{}", formatted),
    }
}

/// Handle the parse command
fn handle_parse_command(path: Option<&String>, format: &str) {
    let source = read_input(path);
    let root = unlatex::parse(&source);

    let output = match format {
        "json" => ast::to_json(&root).map_err(|e| e.to_string()),
        "yaml" => ast::to_yaml(&root).map_err(|e| e.to_string()),
        other => {
            eprintln!("Error: unknown format '{}' (expected 'json' or 'yaml')", other);
            std::process::exit(2);
        }
    }
    .unwrap_or_else(|e| {
        eprintln!("Serialization error: {}", e);
        std::process::exit(1);
    });

    println!("{}", output);
}
