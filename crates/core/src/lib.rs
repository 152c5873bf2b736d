//! shep-core: parser and verifier for `.shep` application specs.
//!
//! A spec declares entities, screens, flows, rules (optionally evaluated by
//! an AI service), integrations and analytics events. This crate turns the
//! source text into a typed AST and runs an eight-pass verifier over it.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`parse()`] -- source text to [`Spec`], or every [`ParseError`] found
//! - [`verify()`] -- run all verification passes over a [`Spec`]
//! - [`check()`] -- parse then verify
//! - [`VerificationResult`], [`Issue`], [`Severity`], [`Summary`] and the
//!   stable issue [`codes`]
//!
//! Individual pass entry functions are also public for tools that only
//! need part of the pipeline.

pub mod ast;
pub mod error;
pub mod heuristics;
pub mod issue;
pub mod lexer;
pub mod parser;
pub mod pass1_symbols;
pub mod pass2_types;
pub mod pass3_structure;
pub mod pass4_consistency;
pub mod pass5_constraints;
pub mod pass6_boundary;
pub mod pass7_wiring;
pub mod pass8_lint;
pub mod verify;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{
    AiCall, DashboardWidget, Entity, Event, Field, FieldModifiers, FieldType, Flow, FlowStep,
    Integration, Location, Rule, RuleCondition, Screen, ScreenKind, Spec, WidgetKind, WizardStep,
};
pub use error::ParseError;
pub use issue::{codes, Issue, Severity, Summary, VerificationResult};
pub use parser::ParseOutput;
pub use pass2_types::{TypeEnvironment, TypeTag};
pub use pass5_constraints::{Constraint, ConstraintKind};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use parser::parse;
pub use pass1_symbols::build_symbols;
pub use pass2_types::build_type_env;
pub use pass5_constraints::extract_constraints;
pub use verify::{check, verify};
