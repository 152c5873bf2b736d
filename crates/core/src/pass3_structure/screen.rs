//! Screen validation: kind, bound entity, referenced fields, wizard steps
//! and dashboard widgets.

use crate::ast::*;
use crate::issue::{codes, Issue};
use crate::pass1_symbols::SymbolTable;

pub(super) fn check_screen(screen: &Screen, symbols: &SymbolTable, issues: &mut Vec<Issue>) {
    let loc = &screen.location;

    if let ScreenKind::Unrecognized { raw } = &screen.kind {
        issues.push(
            Issue::error(
                codes::SCREEN_INVALID_KIND,
                format!("screen '{}' has invalid kind '{}'", screen.name, raw),
                loc,
            )
            .with_suggestion(format!("use one of: {}", SCREEN_KINDS.join(", "))),
        );
    }

    if let Some(entity) = &screen.entity {
        if symbols.has_entity(entity) {
            check_screen_fields(screen, entity, symbols, issues);
        } else {
            issues.push(Issue::error(
                codes::SCREEN_UNKNOWN_ENTITY,
                format!(
                    "screen '{}' is bound to unknown entity '{}'",
                    screen.name, entity
                ),
                loc,
            ));
        }
    }

    match &screen.kind {
        ScreenKind::Wizard if screen.steps.is_empty() => {
            issues.push(
                Issue::error(
                    codes::SCREEN_WIZARD_NO_STEPS,
                    format!("wizard screen '{}' has no steps", screen.name),
                    loc,
                )
                .with_suggestion("add a 'steps:' block with at least one \"Step\" → [fields] line"),
            );
        }
        ScreenKind::Dashboard if screen.widgets.is_empty() => {
            issues.push(
                Issue::warning(
                    codes::SCREEN_DASHBOARD_NO_WIDGETS,
                    format!("dashboard screen '{}' has no widgets", screen.name),
                    loc,
                )
                .with_suggestion("add a 'widgets:' block with \"Label\" (kind) lines"),
            );
        }
        _ => {}
    }

    for widget in &screen.widgets {
        if let WidgetKind::Unrecognized { raw } = &widget.kind {
            issues.push(
                Issue::error(
                    codes::SCREEN_INVALID_WIDGET_KIND,
                    format!(
                        "widget '{}' on screen '{}' has invalid kind '{}'",
                        widget.label, screen.name, raw
                    ),
                    &widget.location,
                )
                .with_suggestion(format!("use one of: {}", WIDGET_KINDS.join(", "))),
            );
        }
    }
}

fn check_screen_fields(
    screen: &Screen,
    entity: &str,
    symbols: &SymbolTable,
    issues: &mut Vec<Issue>,
) {
    let listed = screen
        .fields
        .iter()
        .chain(&screen.filters)
        .map(|f| (f, &screen.location));
    let stepped = screen
        .steps
        .iter()
        .flat_map(|s| s.fields.iter().map(move |f| (f, &s.location)));
    for (field, location) in listed.chain(stepped) {
        if !symbols.has_field(entity, field) {
            issues.push(Issue::error(
                codes::SCREEN_UNKNOWN_FIELD,
                format!(
                    "screen '{}' references field '{}' which does not exist on entity '{}'",
                    screen.name, field, entity
                ),
                location,
            ));
        }
    }
}
