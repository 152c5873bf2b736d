//! Integration and event validation.

use crate::ast::*;
use crate::issue::{codes, Issue};
use std::collections::HashMap;

pub(super) fn check_integrations(integrations: &[Integration], issues: &mut Vec<Issue>) {
    let mut seen: HashMap<&str, &Location> = HashMap::new();
    for integration in integrations {
        if let Some(first) = seen.get(integration.name.as_str()) {
            issues.push(Issue::error(
                codes::INTEGRATION_DUPLICATE,
                format!(
                    "duplicate integration '{}': first declared at line {}",
                    integration.name, first.line
                ),
                &integration.location,
            ));
        } else {
            seen.insert(&integration.name, &integration.location);
        }

        if let Some(endpoint) = &integration.endpoint {
            if !is_well_formed_endpoint(endpoint) {
                issues.push(
                    Issue::error(
                        codes::INTEGRATION_INVALID_ENDPOINT,
                        format!(
                            "integration '{}' has malformed endpoint '{}'",
                            integration.name, endpoint
                        ),
                        &integration.location,
                    )
                    .with_suggestion("use an absolute URL such as https://api.example.com/v1"),
                );
            }
        }
    }
}

/// Absolute http(s) URL with a host.
fn is_well_formed_endpoint(endpoint: &str) -> bool {
    match url::Url::parse(endpoint) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some(),
        Err(_) => false,
    }
}

pub(super) fn check_events(events: &[Event], issues: &mut Vec<Issue>) {
    let mut seen: HashMap<&str, &Location> = HashMap::new();
    for event in events {
        if let Some(first) = seen.get(event.name.as_str()) {
            issues.push(Issue::error(
                codes::EVENT_DUPLICATE,
                format!(
                    "duplicate event '{}': first declared at line {}",
                    event.name, first.line
                ),
                &event.location,
            ));
        } else {
            seen.insert(&event.name, &event.location);
        }

        if event.fields.is_empty() {
            issues.push(
                Issue::warning(
                    codes::EVENT_NO_FIELDS,
                    format!("event '{}' has no fields", event.name),
                    &event.location,
                )
                .with_suggestion("add 'fields: [...]' listing the tracked properties"),
            );
        }
    }
}
