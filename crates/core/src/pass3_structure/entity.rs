//! Entity and field validation.

use crate::ast::*;
use crate::issue::{codes, Issue};
use crate::pass1_symbols::SymbolTable;

pub(super) fn check_entity(entity: &Entity, symbols: &SymbolTable, issues: &mut Vec<Issue>) {
    if entity.fields.is_empty() {
        issues.push(Issue::warning(
            codes::ENTITY_NO_FIELDS,
            format!("entity '{}' declares no fields", entity.name),
            &entity.location,
        ));
    }
    for field in &entity.fields {
        check_field(&entity.name, field, symbols, issues);
    }
}

fn check_field(entity: &str, field: &Field, symbols: &SymbolTable, issues: &mut Vec<Issue>) {
    let loc = &field.location;
    match &field.field_type {
        FieldType::Unrecognized { raw } => {
            issues.push(
                Issue::error(
                    codes::FIELD_INVALID_TYPE,
                    format!(
                        "field '{}.{}' has invalid type '{}'",
                        entity, field.name, raw
                    ),
                    loc,
                )
                .with_suggestion(format!(
                    "use one of: {}, enum(...), ai(\"...\"), computed(...), <Entity> (relationship), list of <Entity>",
                    SCALAR_TYPES.join(", ")
                )),
            );
        }
        FieldType::Enum { values } if values.is_empty() => {
            issues.push(
                Issue::error(
                    codes::FIELD_EMPTY_ENUM,
                    format!("enum field '{}.{}' has no values", entity, field.name),
                    loc,
                )
                .with_suggestion("list at least one value, e.g. enum(open, closed)"),
            );
        }
        FieldType::Ai { prompt } if prompt.trim().is_empty() => {
            issues.push(
                Issue::error(
                    codes::FIELD_AI_MISSING_PROMPT,
                    format!("AI field '{}.{}' has no prompt", entity, field.name),
                    loc,
                )
                .with_suggestion("write the prompt inside the call, e.g. ai(\"Summarize this\")"),
            );
        }
        FieldType::Computed { expression } if expression.trim().is_empty() => {
            issues.push(Issue::error(
                codes::FIELD_EMPTY_COMPUTED,
                format!(
                    "computed field '{}.{}' has no expression",
                    entity, field.name
                ),
                loc,
            ));
        }
        FieldType::Relationship { entity: target } | FieldType::List { entity: target }
            if !symbols.has_entity(target) =>
        {
            issues.push(Issue::error(
                codes::FIELD_UNKNOWN_ENTITY,
                format!(
                    "field '{}.{}' references unknown entity '{}'",
                    entity, field.name, target
                ),
                loc,
            ));
        }
        FieldType::Text
        | FieldType::Number
        | FieldType::Money
        | FieldType::Email
        | FieldType::Date
        | FieldType::DateTime
        | FieldType::Boolean
        | FieldType::File
        | FieldType::Image
        | FieldType::Uuid
        | FieldType::Url
        | FieldType::Phone
        | FieldType::Json
        | FieldType::Enum { .. }
        | FieldType::Ai { .. }
        | FieldType::Computed { .. }
        | FieldType::Relationship { .. }
        | FieldType::List { .. } => {}
    }

    if let (Some(min), Some(max)) = (field.modifiers.min, field.modifiers.max) {
        if min > max {
            issues.push(
                Issue::error(
                    codes::FIELD_MIN_EXCEEDS_MAX,
                    format!(
                        "field '{}.{}' has min={} greater than max={}",
                        entity, field.name, min, max
                    ),
                    loc,
                )
                .with_suggestion(format!("swap the bounds: min={}, max={}", max, min)),
            );
        }
    }
}
