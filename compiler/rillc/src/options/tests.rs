use pretty_assertions::assert_eq;

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn parse_ok(list: &[&str]) -> (CliOptions, Vec<String>) {
    parse_options(&args(list)).unwrap_or_else(|e| panic!("options should parse: {e}"))
}

#[test]
fn test_positional_only() {
    let (options, positional) = parse_ok(&["script.rill"]);
    assert_eq!(options, CliOptions::default());
    assert_eq!(positional, args(&["script.rill"]));
}

#[test]
fn test_flags_anywhere() {
    let (options, positional) = parse_ok(&["--debug", "a.rill", "--trace", "--max-depth=40"]);
    assert!(options.debug);
    assert!(options.trace);
    assert_eq!(options.max_depth, Some(40));
    assert_eq!(positional, args(&["a.rill"]));
}

#[test]
fn test_output_takes_next_argument() {
    let (options, positional) = parse_ok(&["a.rill", "-o", "out.bin"]);
    assert_eq!(options.output.as_deref(), Some("out.bin"));
    assert_eq!(positional, args(&["a.rill"]));
}

#[test]
fn test_lone_dash_is_positional() {
    let (_, positional) = parse_ok(&["-"]);
    assert_eq!(positional, args(&["-"]));
}

#[test]
fn test_errors() {
    assert_eq!(
        parse_options(&args(&["--max-depth=lots"])),
        Err("invalid value for --max-depth: 'lots'".to_string())
    );
    assert_eq!(
        parse_options(&args(&["a.rill", "-o"])),
        Err("-o requires a path".to_string())
    );
    assert_eq!(
        parse_options(&args(&["--fast"])),
        Err("unknown option '--fast'".to_string())
    );
}
