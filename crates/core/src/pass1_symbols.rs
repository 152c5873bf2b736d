//! Pass 1: Symbol tables -- name sets for every declaration kind and
//! per-entity field sets, reporting duplicates at their second occurrence.

use crate::ast::*;
use crate::issue::{codes, Issue};
use std::collections::{BTreeSet, HashMap};

/// Lookup tables over a spec, built fresh on every verification.
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// Entity name -> location of its first declaration.
    pub entities: HashMap<String, Location>,
    pub screens: HashMap<String, Location>,
    pub flows: HashMap<String, Location>,
    pub integrations: HashMap<String, Location>,
    /// Entity name -> declared field names (first declaration wins).
    pub entity_fields: HashMap<String, BTreeSet<String>>,
}

impl SymbolTable {
    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn has_field(&self, entity: &str, field: &str) -> bool {
        self.entity_fields
            .get(entity)
            .is_some_and(|fields| fields.contains(field))
    }
}

pub fn build_symbols(spec: &Spec, issues: &mut Vec<Issue>) -> SymbolTable {
    let mut table = SymbolTable::default();

    for entity in &spec.entities {
        let seen = duplicate_fields(entity, issues);
        if let Some(first) = table.entities.get(&entity.name) {
            issues.push(
                Issue::error(
                    codes::DUPLICATE_ENTITY,
                    format!(
                        "duplicate entity '{}': first declared at line {}",
                        entity.name, first.line
                    ),
                    &entity.location,
                )
                .with_suggestion(format!("rename or merge the second '{}' entity", entity.name)),
            );
            // The first declaration owns the field set.
            continue;
        }
        table
            .entities
            .insert(entity.name.clone(), entity.location.clone());
        table.entity_fields.insert(
            entity.name.clone(),
            seen.keys().map(|name| (*name).to_owned()).collect(),
        );
    }

    for screen in &spec.screens {
        register(
            &mut table.screens,
            &screen.name,
            &screen.location,
            "screen",
            codes::DUPLICATE_SCREEN,
            issues,
        );
    }
    for flow in &spec.flows {
        register(
            &mut table.flows,
            &flow.name,
            &flow.location,
            "flow",
            codes::DUPLICATE_FLOW,
            issues,
        );
    }
    // Duplicate integrations are reported by the structural pass.
    for integration in &spec.integrations {
        table
            .integrations
            .entry(integration.name.clone())
            .or_insert_with(|| integration.location.clone());
    }

    tracing::debug!(
        entities = table.entities.len(),
        screens = table.screens.len(),
        flows = table.flows.len(),
        "symbol tables built"
    );
    table
}

/// Report repeated field names within one entity declaration and return
/// the distinct names.
fn duplicate_fields<'a>(
    entity: &'a Entity,
    issues: &mut Vec<Issue>,
) -> HashMap<&'a str, &'a Location> {
    let mut seen: HashMap<&str, &Location> = HashMap::new();
    for field in &entity.fields {
        if let Some(first) = seen.get(field.name.as_str()) {
            issues.push(
                Issue::error(
                    codes::DUPLICATE_FIELD,
                    format!(
                        "duplicate field '{}' in entity '{}': first declared at line {}",
                        field.name, entity.name, first.line
                    ),
                    &field.location,
                )
                .with_suggestion(format!("rename or remove the second '{}' field", field.name)),
            );
            continue;
        }
        seen.insert(&field.name, &field.location);
    }
    seen
}

fn register(
    names: &mut HashMap<String, Location>,
    name: &str,
    location: &Location,
    kind: &str,
    code: &str,
    issues: &mut Vec<Issue>,
) {
    if let Some(first) = names.get(name) {
        issues.push(Issue::error(
            code,
            format!(
                "duplicate {} '{}': first declared at line {}",
                kind, name, first.line
            ),
            location,
        ));
        return;
    }
    names.insert(name.to_owned(), location.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn duplicate_field_reported_once_at_second_occurrence() {
        let src = "app \"T\"\nentity User\n  name: text\n  name: text\n";
        let spec = parse(src, None).unwrap();
        let mut issues = Vec::new();
        let table = build_symbols(&spec, &mut issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, codes::DUPLICATE_FIELD);
        assert_eq!(issues[0].location.as_ref().unwrap().line, 4);
        assert!(table.has_field("User", "name"));
    }

    #[test]
    fn duplicate_entity_and_screen() {
        let src = "app \"T\"\nentity User\n  name: text\nentity User\n  email: email\nscreen S\n  kind: list\nscreen S\n  kind: list\n";
        let spec = parse(src, None).unwrap();
        let mut issues = Vec::new();
        let table = build_symbols(&spec, &mut issues);
        let codes_found: Vec<&str> = issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes_found, vec![codes::DUPLICATE_ENTITY, codes::DUPLICATE_SCREEN]);
        // first declaration wins
        assert!(table.has_field("User", "name"));
        assert!(!table.has_field("User", "email"));
    }

    #[test]
    fn duplicate_fields_in_a_repeated_entity_are_reported() {
        let src = "app \"T\"\nentity User\n  name: text\nentity User\n  email: email\n  email: email\n";
        let spec = parse(src, None).unwrap();
        let mut issues = Vec::new();
        let table = build_symbols(&spec, &mut issues);
        let codes_found: Vec<&str> = issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes_found, vec![codes::DUPLICATE_FIELD, codes::DUPLICATE_ENTITY]);
        assert_eq!(issues[0].location.as_ref().unwrap().line, 6);
        assert!(!table.has_field("User", "email"));
    }
}
