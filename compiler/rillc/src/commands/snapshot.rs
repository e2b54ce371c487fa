//! The `snapshot` and `load` commands.
//!
//! `snapshot` runs a script and serializes its result; `load` reads such a
//! file back and prints the value it holds.

use rill_codec::{decode, encode, CodecError, Snapshot};
use rill_eval::Value;

use super::{exit_with, read_file};
use crate::{build_runtime, CliOptions};

/// Run a script and encode its result, writing the bytes to `-o` when
/// given.
pub fn snapshot_file(path: &str, options: &CliOptions) {
    let source = read_file(path);
    let runtime = build_runtime(options);
    let value = match runtime.run_script(path, &source) {
        Ok(value) => value,
        Err(error) => exit_with(&error),
    };
    let encoded = encode(&value).and_then(|snapshot| {
        let bytes = snapshot.to_bytes()?;
        Ok((snapshot, bytes))
    });
    let (snapshot, bytes) = match encoded {
        Ok(encoded) => encoded,
        Err(e) => fail(&format!("cannot snapshot result of '{path}': {e}")),
    };

    println!("{path}: {}", summarize(&value, &snapshot, bytes.len()));
    if let Some(output) = &options.output {
        if let Err(e) = std::fs::write(output, &bytes) {
            fail(&format!("cannot write '{output}': {e}"));
        }
    }
}

/// Print the value stored in a snapshot file.
pub fn load_snapshot(path: &str) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => fail(&format!("cannot read '{path}': {e}")),
    };
    match read_snapshot(&bytes) {
        Ok(value) => println!("{value}"),
        Err(e) => fail(&format!("'{path}' is not a valid snapshot: {e}")),
    }
}

pub(crate) fn read_snapshot(bytes: &[u8]) -> Result<Value, CodecError> {
    decode(&Snapshot::from_bytes(bytes)?)
}

/// One-line description of an encoded value.
pub(crate) fn summarize(value: &Value, snapshot: &Snapshot, bytes: usize) -> String {
    format!(
        "{} snapshot, {} events, {} leaves, {bytes} bytes",
        value.type_name(),
        snapshot.events.len(),
        snapshot.leaves.len(),
    )
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}
