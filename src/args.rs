//! Run-argument contract for the analyzer invocation.

use crate::error::PipelineError;

/// Flag that must appear in the run arguments; without it severities are not
/// comparable across engines and the results cannot be aggregated
pub const NORMALIZE_SEVERITY_FLAG: &str = "--normalize-severity";

/// Accepted spellings of the output-file flag
const OUTFILE_FLAGS: [&str; 2] = ["-o", "--outfile"];

pub fn validate(run_args: &str) -> Result<(), PipelineError> {
    if run_args.to_lowercase().contains(NORMALIZE_SEVERITY_FLAG) {
        Ok(())
    } else {
        Err(PipelineError::MissingNormalizeSeverity)
    }
}

/// Return the value following the first `-o`/`--outfile` token, or an empty string
pub fn extract_outfile(run_args: &str) -> String {
    let tokens: Vec<&str> = run_args.split_whitespace().collect();
    tokens
        .iter()
        .position(|t| OUTFILE_FLAGS.contains(t))
        .and_then(|i| tokens.get(i + 1))
        .map(|v| v.to_string())
        .unwrap_or_default()
}
