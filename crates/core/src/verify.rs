//! Eight-pass verifier: parsed `Spec` -> `VerificationResult`.
//!
//! This is a thin orchestrator that calls each pass module in order. Every
//! pass runs; there is no early exit.

use crate::ast::Spec;
use crate::error::ParseError;
use crate::issue::{Issue, Summary, VerificationResult};
use crate::parser::{self, DEFAULT_FILENAME};
use crate::pass1_symbols;
use crate::pass2_types;
use crate::pass3_structure;
use crate::pass4_consistency;
use crate::pass5_constraints;
use crate::pass6_boundary;
use crate::pass7_wiring;
use crate::pass8_lint;
use std::panic::{self, AssertUnwindSafe};

/// Verify a parsed spec and collect every issue from every pass.
pub fn verify(spec: &Spec) -> VerificationResult {
    let mut issues: Vec<Issue> = Vec::new();

    // Pass 1: symbol tables and duplicate names
    let symbols = pass1_symbols::build_symbols(spec, &mut issues);

    // Pass 2: type environment
    let env = pass2_types::build_type_env(spec);

    // Pass 3: per-construct structure
    pass3_structure::check_structure(spec, &symbols, &mut issues);

    // Pass 4: cross-construct type consistency
    pass4_consistency::check_consistency(spec, &env, &mut issues);

    // Pass 5: constraint extraction and conflict detection
    pass5_constraints::check_constraints(spec, &env, &mut issues);

    // Pass 6: type-boundary notes
    pass6_boundary::check_boundaries(spec, &mut issues);

    // Pass 7: wiring
    let wiring = pass7_wiring::check_wiring(spec, &mut issues);

    // Pass 8: lint
    pass8_lint::lint(spec, &mut issues);

    let summary = Summary {
        entities: spec.entities.len(),
        screens: spec.screens.len(),
        flows: spec.flows.len(),
        rules: spec.rules.len(),
        integrations: spec.integrations.len(),
        events: spec.events.len(),
        relationships_checked: wiring.relationships_checked,
        wiring_checks: wiring.wiring_checks,
    };
    let result = VerificationResult::from_issues(issues, summary);
    tracing::debug!(
        app = %spec.app_name,
        errors = result.error_count,
        warnings = result.warning_count,
        infos = result.info_count(),
        "verification finished"
    );
    result
}

/// Parse and verify in one call. Parse failures are returned as errors; a
/// panic during verification is reported as an internal parse error.
pub fn check(src: &str, filename: Option<&str>) -> Result<VerificationResult, Vec<ParseError>> {
    let spec = parser::parse(src, filename)?;
    panic::catch_unwind(AssertUnwindSafe(|| verify(&spec))).map_err(|_| {
        tracing::error!("verifier panicked");
        vec![ParseError::internal(filename.unwrap_or(DEFAULT_FILENAME))]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::codes;

    #[test]
    fn summary_counts_declarations() {
        let src = "app \"T\"\n\
entity Ticket\n  title: text, required\n  owner: User (relationship)\n\
entity User\n  name: text, required\n\
screen Tickets\n  kind: list\n  entity: Ticket\n\
flow SubmitTicket\n  1. Fill the form\n\
rule \"Closed tickets are locked\"\n  if Ticket.status is closed → deny Ticket edit\n\
integration Claude\n  endpoint: https://api.anthropic.com/v1/messages\n\
event TicketOpened\n  fields: [ticketId]\n";
        let result = check(src, Some("t.shep")).unwrap();
        let s = &result.summary;
        assert_eq!(
            (s.entities, s.screens, s.flows, s.rules, s.integrations, s.events),
            (2, 1, 1, 1, 1, 1)
        );
        assert_eq!(s.relationships_checked, 1);
        assert!(result.success, "{:#?}", result.issues);
    }

    #[test]
    fn all_passes_run_despite_errors() {
        let src = "app \"T\"\n\
entity user\n  name: text\n  name: text\n\
screen Signup\n  kind: wizard\n  entity: user\n";
        let result = check(src, None).unwrap();
        assert!(!result.success);
        assert_eq!(result.with_code(codes::DUPLICATE_FIELD).count(), 1);
        assert_eq!(result.with_code(codes::SCREEN_WIZARD_NO_STEPS).count(), 1);
        // lint still ran
        assert_eq!(result.with_code(codes::LINT_ENTITY_NAME).count(), 1);
        assert_eq!(result.error_count, 2);
    }

    #[test]
    fn parse_errors_pass_through() {
        let errors = check("entity User\n", Some("bad.shep")).unwrap_err();
        assert_eq!(errors[0].file, "bad.shep");
    }
}
