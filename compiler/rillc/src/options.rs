//! Flags shared by every command.

/// Settings taken from the command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    /// Render logs as an indented call tree.
    pub trace: bool,
    /// Log every dispatched call.
    pub debug: bool,
    /// Override the runtime's call depth limit.
    pub max_depth: Option<usize>,
    /// Where `snapshot` writes its bytes.
    pub output: Option<String>,
}

/// Split `args` into recognised flags and positional arguments.
///
/// Flags may appear anywhere after the command. `-o` takes the next
/// argument as its value.
pub fn parse_options(args: &[String]) -> Result<(CliOptions, Vec<String>), String> {
    let mut options = CliOptions::default();
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--trace" {
            options.trace = true;
        } else if arg == "--debug" {
            options.debug = true;
        } else if let Some(depth) = arg.strip_prefix("--max-depth=") {
            let depth = depth
                .parse::<usize>()
                .map_err(|_| format!("invalid value for --max-depth: '{depth}'"))?;
            options.max_depth = Some(depth);
        } else if arg == "-o" {
            let Some(path) = iter.next() else {
                return Err("-o requires a path".to_string());
            };
            options.output = Some(path.clone());
        } else if arg.starts_with('-') && arg.len() > 1 {
            return Err(format!("unknown option '{arg}'"));
        } else {
            positional.push(arg.clone());
        }
    }
    Ok((options, positional))
}

#[cfg(test)]
mod tests;
