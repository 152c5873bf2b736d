//! Shared AST types for the Shep front end.
//!
//! These types are produced by the parser and consumed read-only by every
//! verifier pass and by downstream generators. A `Spec` is never mutated
//! after parsing.

use serde::{Deserialize, Serialize};
use std::fmt;

// ──────────────────────────────────────────────
// Location
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

// ──────────────────────────────────────────────
// Root
// ──────────────────────────────────────────────

/// The parsed representation of one source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    pub app_name: String,
    pub entities: Vec<Entity>,
    pub screens: Vec<Screen>,
    pub flows: Vec<Flow>,
    pub rules: Vec<Rule>,
    pub integrations: Vec<Integration>,
    pub events: Vec<Event>,
}

impl Spec {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

// ──────────────────────────────────────────────
// Entities and fields
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub fields: Vec<Field>,
    pub location: Location,
}

impl Entity {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub modifiers: FieldModifiers,
    pub location: Location,
}

/// Field type tag. Closed: every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Money,
    Email,
    Date,
    DateTime,
    Boolean,
    File,
    Image,
    Uuid,
    Url,
    Phone,
    Json,
    Enum { values: Vec<String> },
    Relationship { entity: String },
    List { entity: String },
    Ai { prompt: String },
    Computed { expression: String },
    /// Type text the parser could not classify; reported by the verifier.
    Unrecognized { raw: String },
}

/// Scalar keywords accepted in the type position of a field line.
pub const SCALAR_TYPES: &[&str] = &[
    "text", "number", "money", "email", "date", "datetime", "boolean", "file", "image", "uuid",
    "url", "phone", "json",
];

impl FieldType {
    pub fn scalar(keyword: &str) -> Option<FieldType> {
        let t = match keyword {
            "text" => FieldType::Text,
            "number" => FieldType::Number,
            "money" => FieldType::Money,
            "email" => FieldType::Email,
            "date" => FieldType::Date,
            "datetime" => FieldType::DateTime,
            "boolean" => FieldType::Boolean,
            "file" => FieldType::File,
            "image" => FieldType::Image,
            "uuid" => FieldType::Uuid,
            "url" => FieldType::Url,
            "phone" => FieldType::Phone,
            "json" => FieldType::Json,
            _ => return None,
        };
        Some(t)
    }

    /// The keyword this type is written with in source.
    pub fn keyword(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Money => "money",
            FieldType::Email => "email",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Boolean => "boolean",
            FieldType::File => "file",
            FieldType::Image => "image",
            FieldType::Uuid => "uuid",
            FieldType::Url => "url",
            FieldType::Phone => "phone",
            FieldType::Json => "json",
            FieldType::Enum { .. } => "enum",
            FieldType::Relationship { .. } => "relationship",
            FieldType::List { .. } => "list",
            FieldType::Ai { .. } => "ai",
            FieldType::Computed { .. } => "computed",
            FieldType::Unrecognized { raw } => raw,
        }
    }

    /// Target entity of a relationship or list field.
    pub fn target_entity(&self) -> Option<&str> {
        match self {
            FieldType::Relationship { entity } | FieldType::List { entity } => Some(entity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldModifiers {
    pub required: bool,
    pub unique: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub pattern: Option<String>,
    pub default_value: Option<String>,
}

// ──────────────────────────────────────────────
// Screens
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub name: String,
    pub kind: ScreenKind,
    pub entity: Option<String>,
    pub fields: Vec<String>,
    pub filters: Vec<String>,
    pub actions: Vec<String>,
    /// Scalar `action:` property.
    pub primary_action: Option<String>,
    pub steps: Vec<WizardStep>,
    pub widgets: Vec<DashboardWidget>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScreenKind {
    Form,
    List,
    Detail,
    Dashboard,
    Wizard,
    Api,
    Unrecognized { raw: String },
}

pub const SCREEN_KINDS: &[&str] = &["form", "list", "detail", "dashboard", "wizard", "api"];

impl ScreenKind {
    pub fn from_keyword(s: &str) -> ScreenKind {
        match s {
            "form" => ScreenKind::Form,
            "list" => ScreenKind::List,
            "detail" => ScreenKind::Detail,
            "dashboard" => ScreenKind::Dashboard,
            "wizard" => ScreenKind::Wizard,
            "api" => ScreenKind::Api,
            other => ScreenKind::Unrecognized {
                raw: other.to_owned(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardStep {
    pub name: String,
    pub fields: Vec<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardWidget {
    pub label: String,
    pub kind: WidgetKind,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetKind {
    Stat,
    Chart,
    Table,
    List,
    Count,
    Metric,
    Unrecognized { raw: String },
}

pub const WIDGET_KINDS: &[&str] = &["stat", "chart", "table", "list", "count", "metric"];

impl WidgetKind {
    pub fn from_keyword(s: &str) -> WidgetKind {
        match s {
            "stat" => WidgetKind::Stat,
            "chart" => WidgetKind::Chart,
            "table" => WidgetKind::Table,
            "list" => WidgetKind::List,
            "count" => WidgetKind::Count,
            "metric" => WidgetKind::Metric,
            other => WidgetKind::Unrecognized {
                raw: other.to_owned(),
            },
        }
    }
}

// ──────────────────────────────────────────────
// Flows
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub name: String,
    pub steps: Vec<FlowStep>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStep {
    /// The literal step number, not its position.
    pub order: u32,
    pub description: String,
    pub ai: bool,
    /// For AI steps: the description with the `ai:` prefix removed.
    pub action: Option<String>,
    pub location: Location,
}

// ──────────────────────────────────────────────
// Rules
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub description: String,
    pub condition: Option<RuleCondition>,
    pub action: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Opaque condition text, matched heuristically by the verifier.
    Plain { text: String },
    Ai(AiCall),
}

impl RuleCondition {
    pub fn ai_call(&self) -> Option<&AiCall> {
        match self {
            RuleCondition::Ai(call) => Some(call),
            RuleCondition::Plain { .. } => None,
        }
    }
}

/// A condition resolved by an external model. Recorded, never evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiCall {
    pub input: String,
    pub prompt: String,
    pub expected_output: String,
}

// ──────────────────────────────────────────────
// Integrations and events
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub name: String,
    pub endpoint: Option<String>,
    pub purpose: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub fields: Vec<String>,
    pub location: Location,
}
