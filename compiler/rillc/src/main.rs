//! Rill CLI
//!
//! Runs scripts, checks them, snapshots their results and hosts an
//! interactive shell.

use rillc::commands::{check_file, load_snapshot, run_file, run_repl, snapshot_file};
use rillc::{init_tracing, parse_options};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    let (options, positional) = match parse_options(&args[2..]) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };
    init_tracing(options.trace, options.debug);

    match command.as_str() {
        "run" => {
            let path = require_path(&positional, "rill run <file.rill> [options]");
            run_file(path, &options);
        }
        "check" => {
            let path = require_path(&positional, "rill check <file.rill>");
            check_file(path, &options);
        }
        "snapshot" => {
            let path = require_path(&positional, "rill snapshot <file.rill> [-o <path>]");
            snapshot_file(path, &options);
        }
        "load" => {
            let path = require_path(&positional, "rill load <snapshot>");
            load_snapshot(path);
        }
        "repl" => {
            run_repl(&options);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Rill {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            // If it looks like a script, run it
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("rill"))
            {
                run_file(command, &options);
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn require_path<'a>(positional: &'a [String], usage: &str) -> &'a str {
    match positional.first() {
        Some(path) => path.as_str(),
        None => {
            eprintln!("error: missing file path");
            eprintln!("Usage: {usage}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Rill scripting runtime");
    println!();
    println!("Usage: rill <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file.rill>        Run a script");
    println!("  check <file.rill>      Parse and build a script without running it");
    println!("  snapshot <file.rill>   Run a script and serialize its result");
    println!("  load <snapshot>        Print the value stored in a snapshot");
    println!("  repl                   Start an interactive shell");
    println!("  help                   Show this help message");
    println!("  version                Show version information");
    println!();
    println!("Options:");
    println!("  --debug                Log every dispatched call");
    println!("  --trace                Show logs as an indented call tree");
    println!("  --max-depth=<n>        Deepest allowed function call nesting");
    println!("  -o <path>              Where snapshot writes its bytes");
    println!();
    println!("Logging is filtered by RILL_LOG (or RUST_LOG), e.g. RILL_LOG=rill_eval=debug");
}
