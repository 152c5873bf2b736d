//! Verification issues and the aggregated verification result.
//!
//! Every pass appends `Issue`s to a shared list. Codes are stable strings
//! scoped by phase so that external tooling can map a code to a quick-fix.

use crate::ast::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for a verification issue. Only `Error` blocks success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Issue {
    pub fn new(
        severity: Severity,
        code: &str,
        message: impl Into<String>,
        location: Option<&Location>,
    ) -> Self {
        Issue {
            severity,
            code: code.to_owned(),
            message: message.into(),
            location: location.cloned(),
            suggestion: None,
        }
    }

    pub fn error(code: &str, message: impl Into<String>, location: &Location) -> Self {
        Issue::new(Severity::Error, code, message, Some(location))
    }

    pub fn warning(code: &str, message: impl Into<String>, location: &Location) -> Self {
        Issue::new(Severity::Warning, code, message, Some(location))
    }

    pub fn info(code: &str, message: impl Into<String>, location: &Location) -> Self {
        Issue::new(Severity::Info, code, message, Some(location))
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity, self.code)?;
        if let Some(loc) = &self.location {
            write!(f, " {}", loc)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Counts of what a verification run covered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub entities: usize,
    pub screens: usize,
    pub flows: usize,
    pub rules: usize,
    pub integrations: usize,
    pub events: usize,
    pub relationships_checked: usize,
    pub wiring_checks: usize,
}

/// Output of [`crate::verify()`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// True when no issue has `Error` severity.
    pub success: bool,
    pub issues: Vec<Issue>,
    pub error_count: usize,
    pub warning_count: usize,
    pub summary: Summary,
}

impl VerificationResult {
    pub fn from_issues(issues: Vec<Issue>, summary: Summary) -> Self {
        let error_count = count(&issues, Severity::Error);
        let warning_count = count(&issues, Severity::Warning);
        VerificationResult {
            success: error_count == 0,
            issues,
            error_count,
            warning_count,
            summary,
        }
    }

    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |i| i.code == code)
    }

    pub fn info_count(&self) -> usize {
        count(&self.issues, Severity::Info)
    }
}

fn count(issues: &[Issue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}

/// Stable issue codes, grouped by the pass that emits them.
pub mod codes {
    // Symbol tables
    pub const DUPLICATE_ENTITY: &str = "sym.duplicate-entity";
    pub const DUPLICATE_FIELD: &str = "sym.duplicate-field";
    pub const DUPLICATE_SCREEN: &str = "sym.duplicate-screen";
    pub const DUPLICATE_FLOW: &str = "sym.duplicate-flow";

    // Structure: entities and fields
    pub const ENTITY_NO_FIELDS: &str = "entity.no-fields";
    pub const FIELD_INVALID_TYPE: &str = "field.invalid-type";
    pub const FIELD_EMPTY_ENUM: &str = "field.empty-enum";
    pub const FIELD_MIN_EXCEEDS_MAX: &str = "field.min-exceeds-max";
    pub const FIELD_AI_MISSING_PROMPT: &str = "field.ai-missing-prompt";
    pub const FIELD_EMPTY_COMPUTED: &str = "field.empty-computed";
    pub const FIELD_UNKNOWN_ENTITY: &str = "field.unknown-entity";

    // Structure: screens
    pub const SCREEN_INVALID_KIND: &str = "screen.invalid-kind";
    pub const SCREEN_UNKNOWN_ENTITY: &str = "screen.unknown-entity";
    pub const SCREEN_UNKNOWN_FIELD: &str = "screen.unknown-field";
    pub const SCREEN_WIZARD_NO_STEPS: &str = "screen.wizard-no-steps";
    pub const SCREEN_DASHBOARD_NO_WIDGETS: &str = "screen.dashboard-no-widgets";
    pub const SCREEN_INVALID_WIDGET_KIND: &str = "screen.invalid-widget-kind";

    // Structure: flows
    pub const FLOW_NO_STEPS: &str = "flow.no-steps";
    pub const FLOW_NON_SEQUENTIAL: &str = "flow.non-sequential-steps";
    pub const FLOW_AI_STEP_EMPTY: &str = "flow.ai-step-empty";
    pub const FLOW_AI_WITHOUT_INTEGRATION: &str = "flow.ai-without-integration";

    // Structure: rules
    pub const RULE_MISSING_DESCRIPTION: &str = "rule.missing-description";
    pub const RULE_EMPTY: &str = "rule.empty";
    pub const RULE_AI_INCOMPLETE: &str = "rule.ai-incomplete";
    pub const RULE_AI_WITHOUT_INTEGRATION: &str = "rule.ai-without-integration";

    // Structure: integrations and events
    pub const INTEGRATION_DUPLICATE: &str = "integration.duplicate";
    pub const INTEGRATION_INVALID_ENDPOINT: &str = "integration.invalid-endpoint";
    pub const EVENT_DUPLICATE: &str = "event.duplicate";
    pub const EVENT_NO_FIELDS: &str = "event.no-fields";

    // Cross-construct type consistency
    pub const TYPE_LIST_ON_FORM: &str = "type.list-on-form";
    pub const TYPE_AI_FIELD_ON_FORM: &str = "type.ai-field-on-form";
    pub const TYPE_UNKNOWN_RULE_ENTITY: &str = "type.unknown-rule-entity";
    pub const TYPE_UNKNOWN_RULE_FIELD: &str = "type.unknown-rule-field";

    // Constraints
    pub const CONSTRAINT_CONFLICTING_CONDITIONS: &str = "constraint.conflicting-conditions";
    pub const CONSTRAINT_CONTRADICTORY_ACTIONS: &str = "constraint.contradictory-actions";
    pub const CONSTRAINT_FIELD_OVERLOADED: &str = "constraint.field-overloaded";

    // Type boundaries
    pub const BOUNDARY_MONEY: &str = "boundary.money";
    pub const BOUNDARY_TEMPORAL: &str = "boundary.temporal";
    pub const BOUNDARY_AI_DERIVED: &str = "boundary.ai-derived";
    pub const BOUNDARY_LARGE_ENUM: &str = "boundary.large-enum";

    // Wiring
    pub const WIRING_UNREFERENCED_ENTITY: &str = "wiring.unreferenced-entity";
    pub const WIRING_FORM_MISSING_REQUIRED: &str = "wiring.form-missing-required";
    pub const WIRING_CIRCULAR_RELATIONSHIP: &str = "wiring.circular-relationship";

    // Lint
    pub const LINT_ENTITY_NAME: &str = "lint.entity-name";
    pub const LINT_SCREEN_NAME: &str = "lint.screen-name";
    pub const LINT_FIELD_NAME: &str = "lint.field-name";
    pub const LINT_FLOW_NAME: &str = "lint.flow-name";
    pub const LINT_UNUSED_ENTITY: &str = "lint.unused-entity";
    pub const LINT_NO_REQUIRED_FIELDS: &str = "lint.no-required-fields";
    pub const LINT_UNBOUND_SCREEN: &str = "lint.unbound-screen";
    pub const LINT_RULE_WITHOUT_ACTION: &str = "lint.rule-without-action";
    pub const LINT_EMPTY_FLOW: &str = "lint.empty-flow";
    pub const LINT_SENSITIVE_FIELD_TYPE: &str = "lint.sensitive-field-type";
    pub const LINT_LONG_FLOW: &str = "lint.long-flow";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location {
            file: "t.shep".into(),
            line: 3,
        }
    }

    #[test]
    fn success_ignores_warnings_and_info() {
        let issues = vec![
            Issue::warning(codes::FLOW_NO_STEPS, "w", &loc()),
            Issue::info(codes::LINT_EMPTY_FLOW, "i", &loc()),
        ];
        let r = VerificationResult::from_issues(issues, Summary::default());
        assert!(r.success);
        assert_eq!(r.error_count, 0);
        assert_eq!(r.warning_count, 1);
        assert_eq!(r.info_count(), 1);
    }

    #[test]
    fn any_error_fails() {
        let issues = vec![Issue::error(codes::RULE_EMPTY, "e", &loc())];
        let r = VerificationResult::from_issues(issues, Summary::default());
        assert!(!r.success);
        assert_eq!(r.error_count, 1);
    }

    #[test]
    fn display_and_serialization() {
        let issue = Issue::error(codes::FIELD_EMPTY_ENUM, "enum field 'x' has no values", &loc())
            .with_suggestion("add at least one value");
        assert_eq!(
            issue.to_string(),
            "error[field.empty-enum] t.shep:3: enum field 'x' has no values"
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["suggestion"], "add at least one value");

        let bare = Issue::new(Severity::Info, "x", "m", None);
        let json = serde_json::to_value(&bare).unwrap();
        assert!(json.get("location").is_none());
        assert!(json.get("suggestion").is_none());
    }
}
