//! Directive engine
//!
//! Typed transform/verify rules applied to request parameters and response
//! fields.
//!
//! # Overview
//!
//! - `RuleSet` / `DirectiveDef` - rules as configured (single object or list)
//! - `verify` / `compile` - checks every rule before any data flows
//! - `CompiledRuleSet::apply` - transforms in order, then verifications
//! - `DirectiveTable` - compiled rules keyed by parameter or field name
//!
//! Supported transforms: `datetime`, `sprintf`, `regex`.
//! Supported verifications: `regex`.

mod engine;
mod sprintf;
mod types;

pub use engine::{apply, compile, compile_pattern, compile_table, parse_datetime, verify};
pub use sprintf::SprintfFormat;
pub use types::{
    CompiledRuleSet, DirectiveDef, DirectiveKind, DirectiveTable, RuleSet, Transform,
    Verification,
};
