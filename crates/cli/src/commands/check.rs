use std::path::Path;
use std::process;

use shep_core::{ParseError, Severity, VerificationResult};

use crate::config::{self, ProjectConfig};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_check(file: &Path, strict: bool, output: Option<OutputFormat>, quiet: bool) {
    // Step 1: project config (flags win)
    let project = match config::load_for(file) {
        Ok(c) => c,
        Err(e) => {
            report_error(&e.to_string(), output.unwrap_or(OutputFormat::Text), quiet);
            process::exit(1);
        }
    };
    let output = output.or(project.output).unwrap_or(OutputFormat::Text);
    let strict = strict || project.strict;

    // Step 2: read and check the source
    let src = match config::read_source(file) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };
    let name = file.display().to_string();
    let result = match shep_core::check(&src, Some(&name)) {
        Ok(r) => apply_ignores(r, &project),
        Err(errors) => {
            report_parse_errors(&errors, output, quiet);
            process::exit(1);
        }
    };

    // Step 3: format output
    if !quiet {
        match output {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&result)
                    .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
                println!("{}", json);
            }
            OutputFormat::Text => print_text(&name, &result),
        }
    }

    if !passes(&result, strict) {
        process::exit(1);
    }
}

fn passes(result: &VerificationResult, strict: bool) -> bool {
    result.error_count == 0 && !(strict && result.warning_count > 0)
}

/// Drop ignored codes. Errors are always kept.
fn apply_ignores(result: VerificationResult, project: &ProjectConfig) -> VerificationResult {
    if project.ignore.is_empty() {
        return result;
    }
    let before = result.issues.len();
    let issues: Vec<_> = result
        .issues
        .into_iter()
        .filter(|i| i.severity == Severity::Error || !project.ignore.contains(&i.code))
        .collect();
    tracing::debug!(hidden = before - issues.len(), "applied ignore list");
    VerificationResult::from_issues(issues, result.summary)
}

fn report_parse_errors(errors: &[ParseError], output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let values: Vec<_> = errors.iter().map(ParseError::to_json_value).collect();
            let json = serde_json::json!({ "success": false, "errors": values });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
            );
        }
        OutputFormat::Text => {
            for e in errors {
                eprintln!("parse error: {}", e);
            }
        }
    }
}

fn print_text(name: &str, result: &VerificationResult) {
    for issue in &result.issues {
        println!("{}", issue);
        if let Some(suggestion) = &issue.suggestion {
            println!("  suggestion: {}", suggestion);
        }
    }
    if !result.issues.is_empty() {
        println!();
    }

    let s = &result.summary;
    println!(
        "{}: {} ({} errors, {} warnings, {} notes)",
        name,
        if result.success { "ok" } else { "failed" },
        result.error_count,
        result.warning_count,
        result.info_count()
    );
    println!(
        "  {} entities, {} screens, {} flows, {} rules, {} integrations, {} events",
        s.entities, s.screens, s.flows, s.rules, s.integrations, s.events
    );
    println!(
        "  {} relationships checked, {} wiring checks",
        s.relationships_checked, s.wiring_checks
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "app \"T\"\nentity ticket\n  title: text, required\n  title: text\n";

    #[test]
    fn ignore_list_never_hides_errors() {
        let result = shep_core::check(SRC, None).unwrap();
        assert_eq!(result.error_count, 1);
        let project = ProjectConfig {
            ignore: vec![
                shep_core::codes::DUPLICATE_FIELD.to_owned(),
                shep_core::codes::LINT_ENTITY_NAME.to_owned(),
            ],
            ..ProjectConfig::default()
        };
        let filtered = apply_ignores(result, &project);
        assert_eq!(filtered.error_count, 1);
        assert_eq!(filtered.with_code(shep_core::codes::LINT_ENTITY_NAME).count(), 0);
    }

    #[test]
    fn strict_fails_on_warnings() {
        let src = "app \"T\"\nentity Ticket\n";
        let result = shep_core::check(src, None).unwrap();
        assert!(result.warning_count > 0);
        assert!(passes(&result, false));
        assert!(!passes(&result, true));
    }
}
