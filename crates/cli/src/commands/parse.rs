use std::path::Path;
use std::process;

use shep_core::ParseOutput;

use crate::config;
use crate::{report_error, OutputFormat};

/// Print the parse outcome as JSON. The AST has no text rendering, so the
/// output format only affects how read failures are reported.
pub(crate) fn cmd_parse(file: &Path, output: Option<OutputFormat>, quiet: bool) {
    let output = output.unwrap_or(OutputFormat::Text);
    let src = match config::read_source(file) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    let name = file.display().to_string();
    let parsed = ParseOutput::from(shep_core::parse(&src, Some(&name)));
    let success = parsed.success;
    if !quiet {
        match serde_json::to_string_pretty(&parsed) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                report_error(&format!("serialization error: {}", e), output, quiet);
                process::exit(1);
            }
        }
    }
    if !success {
        process::exit(1);
    }
}
