//! Pass 6: Type-boundary notes -- fields whose representation differs
//! across generated targets (database, server, browser).

use crate::ast::*;
use crate::issue::{codes, Issue};

/// Enumerations with more values than this are flagged.
pub const LARGE_ENUM_THRESHOLD: usize = 20;

pub fn check_boundaries(spec: &Spec, issues: &mut Vec<Issue>) {
    let before = issues.len();
    for entity in &spec.entities {
        for field in &entity.fields {
            if let Some(issue) = boundary_note(&entity.name, field) {
                issues.push(issue);
            }
        }
    }
    tracing::debug!(notes = issues.len() - before, "type boundaries noted");
}

fn boundary_note(entity: &str, field: &Field) -> Option<Issue> {
    let qualified = format!("{}.{}", entity, field.name);
    let loc = &field.location;
    let issue = match &field.field_type {
        FieldType::Money => Issue::info(
            codes::BOUNDARY_MONEY,
            format!(
                "'{}' is money: store it as a fixed-point decimal, not a float",
                qualified
            ),
            loc,
        ),
        FieldType::Date | FieldType::DateTime => Issue::info(
            codes::BOUNDARY_TEMPORAL,
            format!(
                "'{}' is a {}: serialize as ISO 8601 and be explicit about time zones",
                qualified,
                field.field_type.keyword()
            ),
            loc,
        ),
        FieldType::Ai { .. } => Issue::info(
            codes::BOUNDARY_AI_DERIVED,
            format!(
                "'{}' is AI-derived: it may be empty and can change between evaluations",
                qualified
            ),
            loc,
        ),
        FieldType::Enum { values } if values.len() > LARGE_ENUM_THRESHOLD => Issue::info(
            codes::BOUNDARY_LARGE_ENUM,
            format!(
                "'{}' is an enum with {} values; a lookup entity may be easier to maintain",
                qualified,
                values.len()
            ),
            loc,
        ),
        _ => return None,
    };
    Some(issue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn notes_per_boundary_type() {
        let many: Vec<String> = (0..21).map(|n| format!("v{n}")).collect();
        let src = format!(
            "app \"T\"\nentity Invoice\n  total: money\n  due: date\n  sent: datetime\n  \
summary: ai(\"Summarize\")\n  region: enum({})\n  tier: enum(a, b)\n  note: text\n",
            many.join(", ")
        );
        let spec = parse(&src, None).unwrap();
        let mut issues = Vec::new();
        check_boundaries(&spec, &mut issues);
        let found: Vec<_> = issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(
            found,
            vec![
                codes::BOUNDARY_MONEY,
                codes::BOUNDARY_TEMPORAL,
                codes::BOUNDARY_TEMPORAL,
                codes::BOUNDARY_AI_DERIVED,
                codes::BOUNDARY_LARGE_ENUM,
            ]
        );
        assert!(issues[4].message.contains("21 values"));
    }
}
