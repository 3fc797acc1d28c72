use crate::cli::*;

use std::fs;
use std::path::Path;

use serde::Serialize;
use text_diff::print_diff;

pub fn to_pretty_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value).context(FormattingJsonSnafu {})
}

/// Writes the result to `out`, or to the standard output when `out` is
/// absent, empty or `stdout`.
pub fn write_output(out: Option<&str>, contents: &str) -> CliResult<()> {
    match out {
        None | Some("") | Some("stdout") => {
            println!("{}", contents);
            Ok(())
        }
        Some(path) => {
            info!("write_output: writing {} bytes to {}", contents.len(), path);
            fs::write(path, contents).context(WritingOutputSnafu { path })
        }
    }
}

pub fn read_json(path: &Path) -> CliResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Compares a pretty-printed result with a reference file, after formatting
/// the reference the same way. Differences are printed as a line diff.
pub fn check_reference(reference_p: &Path, pretty_js: &str) -> CliResult<()> {
    let reference = read_json(reference_p)?;
    debug!("reference: {:?}", reference);
    let pretty_reference = to_pretty_json(&reference)?;
    if pretty_reference != pretty_js {
        warn!("Found differences with the reference string");
        print_diff(pretty_reference.as_str(), pretty_js, "\n");
        return ReferenceMismatchSnafu { path: reference_p }.fail();
    }
    Ok(())
}
