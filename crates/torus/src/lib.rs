//! Declarative CSS effect compiler and interpolation runtime.
//!
//! Elements declare their effects in a single `data-tor` attribute;
//! this crate turns those declarations into working styles along two
//! paths:
//!
//! - **Static clauses** (`hover:opacity(50%)`) compile once into
//!   shared, deduplicated stylesheet rules scoped by the exact clause
//!   text, wrapped in per-breakpoint media queries.
//! - **Continuous clauses** (`scroll:push.up(50px)`, `mouse:@tilt(20)`)
//!   register with the [`Runtime`], which converts pointer and scroll
//!   signals into a progress percent each frame and writes interpolated
//!   values through a host [`StyleSink`].
//!
//! # Example
//!
//! ```rust
//! use torus::{AttributeParser, Breakpoints, CompilationContext};
//!
//! let breakpoints = Breakpoints::default();
//! let parser = AttributeParser::new(breakpoints.names());
//! let mut context = CompilationContext::new(breakpoints);
//!
//! for clause in parser.parse("hover:opacity(10% lg::50%) inview:fade.in(1)") {
//!     context.compile(&clause);
//! }
//! assert!(context.css_text().contains("@media (min-width: 992px)"));
//! ```
//!
//! Parsing lives in the `torus-attr` crate and is re-exported here.

pub mod breakpoint;
pub mod compiler;
pub mod error;
pub mod geometry;
pub mod resolver;
pub mod runtime;
pub mod signal;

pub use breakpoint::{Breakpoint, Breakpoints};
pub use compiler::{CompilationContext, CompiledRule};
pub use error::{ConfigError, Result};
pub use geometry::{ElementBounds, GeometryProvider, Point, Rect, Viewport};
pub use resolver::{resolve_at, resolve_at_extrapolated, Resolved, ResolvedValue};
pub use runtime::{ElementId, InterpolationState, Runtime, StyleSink};
pub use signal::{SignalFrame, SignalKind, SignalTracker, TickPolicy};

pub use torus_attr::{self, Attribute, AttributeParser, Axis, Trigger, TriggerScope};
