//! Attribute mini-language parser for the torus effect engine.
//!
//! Effects are declared in a single `data-tor` attribute as a list of
//! clauses:
//!
//! ```text
//! data-tor="hover:opacity(10% lg::50%) scroll:push.up(50px) mouse:@tilt(20)"
//! ```
//!
//! This crate turns that text into structured [`Attribute`] values. The
//! pipeline is normalization (whitespace canonicalization, shorthand
//! macros, cluster expansion) followed by a segment-at-a-time clause
//! parser backed by the static [`registry`] of predefined properties.
//!
//! # Example
//!
//! ```rust
//! use torus_attr::{AttributeParser, Axis};
//!
//! let parser = AttributeParser::default();
//! let clauses = parser.parse("hover:opacity(10% lg::50%) scroll:push.up(50px)");
//! assert_eq!(clauses.len(), 2);
//!
//! assert_eq!(clauses[0].property.css_alias.as_deref(), Some("--tor-opacity"));
//! assert!(!clauses[0].is_continuous());
//!
//! let scroll = clauses[1].trigger.as_ref().unwrap();
//! assert_eq!(scroll.axis, Axis::Y);
//! assert!(clauses[1].is_continuous());
//! ```
//!
//! # Design
//!
//! Parsing never fails: a clause that does not match the grammar or
//! names an unknown property comes back flagged `no_css_process` so the
//! surrounding clauses still apply. Percentage-typed properties
//! normalize `%` values to unitless fractions at parse time, so
//! downstream interpolation never needs the registry to blend numbers.

pub mod model;
pub mod normalize;
pub mod parser;
pub mod registry;

pub use model::{
    Attribute, Axis, Bound, OptionValue, PropertyRef, Scalar, Trigger, TriggerScope, ValueData,
    ValueSet,
};
pub use normalize::{normalize, MASK};
pub use parser::AttributeParser;
pub use registry::PropertyDefinition;
