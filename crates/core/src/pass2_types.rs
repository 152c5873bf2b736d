//! Pass 2: Type environment construction -- map every entity field to an
//! internal type tag. Used only by verification; never stored on the AST.

use crate::ast::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Primitive { name: String, nullable: bool },
    Enum { values: Vec<String>, nullable: bool },
    EntityRef { target: String, nullable: bool },
    ListRef { target: String, nullable: bool },
    /// AI-derived values are always nullable: the model may not answer.
    AiDerived { prompt: String, nullable: bool },
    Unknown,
}

impl TypeTag {
    pub fn is_list(&self) -> bool {
        matches!(self, TypeTag::ListRef { .. })
    }

    pub fn is_ai_derived(&self) -> bool {
        matches!(self, TypeTag::AiDerived { .. })
    }
}

/// Entity name -> field name -> type tag. Later duplicate fields do not
/// overwrite the first declaration.
#[derive(Debug, Default)]
pub struct TypeEnvironment {
    entities: BTreeMap<String, BTreeMap<String, TypeTag>>,
}

impl TypeEnvironment {
    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn field_type(&self, entity: &str, field: &str) -> Option<&TypeTag> {
        self.entities.get(entity)?.get(field)
    }

    pub fn fields_of(&self, entity: &str) -> Option<&BTreeMap<String, TypeTag>> {
        self.entities.get(entity)
    }

    pub fn entity_names(&self) -> BTreeSet<&str> {
        self.entities.keys().map(String::as_str).collect()
    }
}

pub fn build_type_env(spec: &Spec) -> TypeEnvironment {
    let mut env = TypeEnvironment::default();
    for entity in &spec.entities {
        if env.entities.contains_key(&entity.name) {
            continue;
        }
        let mut fields = BTreeMap::new();
        for field in &entity.fields {
            fields
                .entry(field.name.clone())
                .or_insert_with(|| type_tag(field));
        }
        env.entities.insert(entity.name.clone(), fields);
    }
    tracing::debug!(entities = env.entities.len(), "type environment built");
    env
}

fn type_tag(field: &Field) -> TypeTag {
    let nullable = !field.modifiers.required;
    match &field.field_type {
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
        | FieldType::Json => TypeTag::Primitive {
            name: field.field_type.keyword().to_owned(),
            nullable,
        },
        FieldType::Computed { .. } => TypeTag::Primitive {
            name: "computed".to_owned(),
            nullable: true,
        },
        FieldType::Enum { values } => TypeTag::Enum {
            values: values.clone(),
            nullable,
        },
        FieldType::Relationship { entity } => TypeTag::EntityRef {
            target: entity.clone(),
            nullable,
        },
        FieldType::List { entity } => TypeTag::ListRef {
            target: entity.clone(),
            nullable,
        },
        FieldType::Ai { prompt } => TypeTag::AiDerived {
            prompt: prompt.clone(),
            nullable: true,
        },
        FieldType::Unrecognized { .. } => TypeTag::Unknown,
    }
}
