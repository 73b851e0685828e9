//! Continuous interpolation runtime.
//!
//! Clauses with a pointer or scroll trigger never become static rules;
//! they are registered here per element and re-evaluated on each tick
//! while their signal is armed. A tick computes the percent for every
//! attribute's method and axis, resolves values through the breakpoint
//! ladder, folds attributes sharing a derived property into one
//! expression, and writes only what changed through the host's
//! [`StyleSink`].
//!
//! # Design
//!
//! The runtime holds an explicit registry mapping [`ElementId`] to
//! [`InterpolationState`]; nothing is attached to host objects.
//! Geometry and input are read-only collaborators: a tick either has
//! what it needs or skips the attribute until the next tick, so
//! elements never snap to a default before they are measured. Breakpoint
//! recomputation happens only in [`Runtime::refresh`], never mid-tick.

use std::collections::{BTreeMap, BTreeSet};

use torus_attr::{registry, Attribute, Axis};

use crate::breakpoint::Breakpoints;
use crate::compiler::format_number;
use crate::geometry::{ElementBounds, GeometryProvider};
use crate::resolver::{self, ResolvedValue};
use crate::signal::{ArmedSignals, SignalFrame, SignalKind, SignalTracker, TickPolicy};

/// Opaque host-assigned element identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u64);

/// Receives style property writes from the runtime.
pub trait StyleSink {
    fn set_property(&mut self, element: ElementId, name: &str, value: &str, important: bool);
    fn remove_property(&mut self, element: ElementId, name: &str);
}

/// Interpolation method, from the `method` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Middle,
    Continuous,
    SelfCentered,
    SelfContinuous,
    Parallax,
    Start,
    Regular,
}

impl Method {
    fn of(attribute: &Attribute, kind: SignalKind) -> Method {
        match attribute.options.get("method").and_then(|v| v.as_str()) {
            Some("continuous") => Method::Continuous,
            Some("self") => Method::SelfCentered,
            Some("self-continuous") => Method::SelfContinuous,
            Some("parallax") => Method::Parallax,
            Some("start") => Method::Start,
            Some("regular") => Method::Regular,
            Some("middle") => Method::Middle,
            _ => match kind {
                SignalKind::Pointer => Method::Middle,
                SignalKind::Scroll => Method::Regular,
            },
        }
    }

    /// Whether resolved values stay inside the declared bounds or are
    /// allowed to extrapolate with out-of-range percents.
    fn clamps(self) -> bool {
        matches!(
            self,
            Method::Middle | Method::SelfCentered | Method::Start | Method::Regular
        )
    }

    fn needs_bounds(self, kind: SignalKind) -> bool {
        kind == SignalKind::Scroll
            || matches!(self, Method::SelfCentered | Method::SelfContinuous)
    }
}

/// Per-element runtime state: the element's continuous clauses and the
/// custom properties currently written for them.
#[derive(Debug, Clone, Default)]
pub struct InterpolationState {
    attributes: Vec<Attribute>,
    live: BTreeMap<String, String>,
}

impl InterpolationState {
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

/// The continuous-effects engine.
#[derive(Debug)]
pub struct Runtime {
    breakpoints: Breakpoints,
    current_rank: usize,
    elements: BTreeMap<ElementId, InterpolationState>,
    tracker: SignalTracker,
}

impl Runtime {
    pub fn new(breakpoints: Breakpoints, policy: TickPolicy) -> Self {
        Runtime {
            breakpoints,
            current_rank: 0,
            elements: BTreeMap::new(),
            tracker: SignalTracker::new(policy),
        }
    }

    /// Registers an element's clauses, keeping only the continuous
    /// ones. Re-registering replaces the previous set.
    pub fn register(&mut self, element: ElementId, attributes: Vec<Attribute>) {
        let continuous: Vec<Attribute> = attributes
            .into_iter()
            .filter(|attr| attr.is_continuous() && !attr.no_css_process)
            .collect();
        if continuous.is_empty() {
            self.elements.remove(&element);
            return;
        }
        self.elements.insert(
            element,
            InterpolationState {
                attributes: continuous,
                live: BTreeMap::new(),
            },
        );
    }

    /// Drops an element. Its written properties are removed through
    /// the sink so no stale custom properties linger.
    pub fn unregister(&mut self, element: ElementId, sink: &mut impl StyleSink) {
        if let Some(state) = self.elements.remove(&element) {
            for name in state.live.keys() {
                sink.remove_property(element, name);
            }
        }
    }

    pub fn state(&self, element: ElementId) -> Option<&InterpolationState> {
        self.elements.get(&element)
    }

    /// Recomputes the active breakpoint. Called from a resize-settled
    /// signal, never from inside a tick.
    pub fn refresh(&mut self, viewport_width: f64) {
        self.current_rank = self
            .breakpoints
            .current(viewport_width)
            .map_or(0, |bp| bp.rank);
    }

    pub fn current_rank(&self) -> usize {
        self.current_rank
    }

    /// Records an input event so the next ticks run.
    pub fn note(&mut self, kind: SignalKind) {
        self.tracker.note(kind);
    }

    /// Whether a tick is currently worth scheduling.
    pub fn armed(&self) -> bool {
        self.tracker.any_armed()
    }

    /// Runs one frame over every registered element. Returns `true`
    /// while another tick should be scheduled.
    pub fn tick(
        &mut self,
        frame: &SignalFrame,
        geometry: &impl GeometryProvider,
        sink: &mut impl StyleSink,
    ) -> bool {
        let armed = self.tracker.advance();
        if !armed.any() {
            return self.tracker.any_armed();
        }
        let rank = self.current_rank;
        let breakpoints = self.breakpoints.clone();
        for (&element, state) in self.elements.iter_mut() {
            apply_element(element, state, &breakpoints, rank, armed, frame, geometry, sink);
        }
        self.tracker.any_armed()
    }
}

/// One attribute's computed share of a derived property.
struct Contribution {
    value: String,
    wrapped_function: Option<String>,
    important: bool,
    resolution_rank: usize,
}

fn apply_element(
    element: ElementId,
    state: &mut InterpolationState,
    breakpoints: &Breakpoints,
    rank: usize,
    armed: ArmedSignals,
    frame: &SignalFrame,
    geometry: &impl GeometryProvider,
    sink: &mut impl StyleSink,
) {
    let mut produced: BTreeMap<String, Vec<Contribution>> = BTreeMap::new();
    let mut retained: BTreeSet<String> = BTreeSet::new();

    for attribute in &state.attributes {
        let Some(kind) = signal_kind(attribute) else {
            continue;
        };
        let name = derived_name(attribute);
        let resolution_rank = breakpoints.rank_of(&attribute.resolution).unwrap_or(0);
        if resolution_rank > rank {
            continue;
        }
        // Unarmed signal: keep the last written value.
        if !armed.includes(kind) {
            retained.insert(name);
            continue;
        }
        let method = Method::of(attribute, kind);
        let bounds = if method.needs_bounds(kind) {
            match geometry.bounds(element) {
                Some(bounds) => Some(bounds),
                None => {
                    // Not measured yet: keep whatever is on screen.
                    retained.insert(name);
                    continue;
                }
            }
        } else {
            None
        };
        let Some(percent) = percent_for(attribute, kind, method, frame, bounds.as_ref()) else {
            retained.insert(name);
            continue;
        };
        let Some(value) = render_attribute(attribute, breakpoints, rank, method, percent) else {
            retained.insert(name);
            continue;
        };
        produced.entry(name).or_default().push(Contribution {
            value,
            wrapped_function: attribute.property.wrapper.as_ref().map(|_| attribute.property.name.clone()),
            important: attribute.priority,
            resolution_rank,
        });
    }

    // Write the folded values, then drop live properties no longer
    // produced (breakpoint crossings change the derived set).
    let mut next_live = BTreeMap::new();
    for (name, mut contributions) in produced {
        let best_rank = contributions
            .iter()
            .map(|c| c.resolution_rank)
            .max()
            .unwrap_or(0);
        contributions.retain(|c| c.resolution_rank == best_rank);
        let important = contributions.iter().any(|c| c.important);
        let value = fold_contributions(&contributions);
        if state.live.get(&name) != Some(&value) {
            sink.set_property(element, &name, &value, important);
        }
        next_live.insert(name, value);
    }
    for (name, value) in &state.live {
        if !next_live.contains_key(name) {
            if retained.contains(name) {
                next_live.insert(name.clone(), value.clone());
            } else {
                sink.remove_property(element, name);
            }
        }
    }
    state.live = next_live;
}

/// The style property an attribute's value lands in.
fn derived_name(attribute: &Attribute) -> String {
    if let Some(wrapper) = &attribute.property.wrapper {
        wrapper.clone()
    } else if let Some(alias) = &attribute.property.css_alias {
        alias.clone()
    } else {
        attribute.property.name.clone()
    }
}

fn signal_kind(attribute: &Attribute) -> Option<SignalKind> {
    let trigger = attribute.trigger.as_ref()?;
    match trigger.name.as_str() {
        "mouse" | "mouseX" | "mouseY" | "sensor" | "sensorX" | "sensorY" => {
            Some(SignalKind::Pointer)
        }
        "scroll" => Some(SignalKind::Scroll),
        _ => None,
    }
}

/// Folds the contributions to one derived property into a single CSS
/// value: wrapped functions concatenate (with a perspective term for
/// rotations), scalars sum inside `calc()`.
fn fold_contributions(contributions: &[Contribution]) -> String {
    let wrapped: Vec<String> = contributions
        .iter()
        .filter_map(|c| {
            c.wrapped_function
                .as_ref()
                .map(|function| format!("{function}({})", c.value))
        })
        .collect();
    if !wrapped.is_empty() {
        let rotation = contributions
            .iter()
            .any(|c| c.wrapped_function.as_deref().is_some_and(|f| f.starts_with("rotate")));
        let joined = wrapped.join(" ");
        return if rotation {
            format!("perspective(1000px) {joined}")
        } else {
            joined
        };
    }
    if contributions.len() == 1 {
        contributions[0].value.clone()
    } else {
        let terms: Vec<&str> = contributions.iter().map(|c| c.value.as_str()).collect();
        format!("calc({})", terms.join(" + "))
    }
}

/// Resolves and renders all slots of one attribute at `percent`.
fn render_attribute(
    attribute: &Attribute,
    breakpoints: &Breakpoints,
    rank: usize,
    method: Method,
    percent: f64,
) -> Option<String> {
    let slots = resolver::slot_count(attribute);
    if slots == 0 {
        return None;
    }
    let reversal = registry::lookup(&attribute.property.name)
        .map_or(1.0, |def| def.reversal);
    let mut rendered = Vec::with_capacity(slots);
    for slot in 0..slots {
        let resolved = if method.clamps() {
            resolver::resolve_at(attribute, breakpoints, rank, percent, slot)?
        } else {
            resolver::resolve_at_extrapolated(attribute, breakpoints, rank, percent, slot)?
        };
        let text = match resolved.value {
            ResolvedValue::Number(number) => {
                let number = resolver::round3(number * reversal);
                match &resolved.unit {
                    Some(unit) => format!("{}{unit}", format_number(number)),
                    None => format_number(number),
                }
            }
            ResolvedValue::Text(text) => text,
            ResolvedValue::Bool(flag) => flag.to_string(),
        };
        rendered.push(text);
    }
    let joined = rendered.join(attribute.join_symbol);
    Some(match &attribute.multi_function {
        Some(function) => format!("{function}({joined})"),
        None => joined,
    })
}

// ==== Percent formulas ====

fn percent_for(
    attribute: &Attribute,
    kind: SignalKind,
    method: Method,
    frame: &SignalFrame,
    bounds: Option<&ElementBounds>,
) -> Option<f64> {
    let axis = attribute.trigger.as_ref().map_or(Axis::All, |t| t.axis);
    let raw = match kind {
        SignalKind::Pointer => {
            let pointer = frame.pointer?;
            pointer_percent(method, axis, pointer.x, pointer.y, frame, bounds)?
        }
        SignalKind::Scroll => scroll_percent(attribute, method, frame, bounds?)?,
    };
    Some(resolver::round3(raw))
}

fn pointer_percent(
    method: Method,
    axis: Axis,
    px: f64,
    py: f64,
    frame: &SignalFrame,
    bounds: Option<&ElementBounds>,
) -> Option<f64> {
    let w = frame.viewport.width;
    let h = frame.viewport.height;
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    match method {
        Method::Middle => match axis {
            Axis::X => Some(1.0 - ((w / 2.0 - px) / (w / 2.0)).abs()),
            Axis::Y => Some(1.0 - ((h / 2.0 - py) / (h / 2.0)).abs()),
            Axis::All => {
                let dx = w / 2.0 - px;
                let dy = h / 2.0 - py;
                let corner = ((w / 2.0) * (w / 2.0) + (h / 2.0) * (h / 2.0)).sqrt();
                Some(1.0 - (dx * dx + dy * dy).sqrt() / corner)
            }
        },
        Method::Continuous => match axis {
            Axis::X => Some(1.0 - (w / 2.0 - px) / (w / 2.0)),
            Axis::Y => Some(1.0 - (h / 2.0 - py) / (h / 2.0)),
            Axis::All => None,
        },
        Method::SelfCentered => {
            let b = bounds?;
            match axis {
                Axis::X => Some((1.0 - (px - b.center_x).abs() / b.max_x_side).clamp(0.0, 1.0)),
                Axis::Y => Some((1.0 - (py - b.center_y).abs() / b.max_y_side).clamp(0.0, 1.0)),
                Axis::All => {
                    let dx = px - b.center_x;
                    let dy = py - b.center_y;
                    Some(1.0 - (dx * dx + dy * dy).sqrt() / b.max_diagonal)
                }
            }
        }
        Method::SelfContinuous => {
            let b = bounds?;
            match axis {
                Axis::X => Some(1.0 + (px - b.center_x) / b.max_x_side),
                Axis::Y => Some(1.0 + (py - b.center_y) / b.max_y_side),
                Axis::All => None,
            }
        }
        Method::Parallax => match axis {
            Axis::X => Some((px - w / 2.0) / (w / 2.0)),
            Axis::Y => Some((py - h / 2.0) / (h / 2.0)),
            Axis::All => None,
        },
        Method::Start => match axis {
            Axis::X => Some(px / w),
            Axis::Y => Some(py / h),
            Axis::All => Some((px / w + py / h) / 2.0),
        },
        Method::Regular => None,
    }
}

/// Scroll progress through the configured start/end window, derived
/// from the element's document offset.
fn scroll_percent(
    attribute: &Attribute,
    method: Method,
    frame: &SignalFrame,
    bounds: &ElementBounds,
) -> Option<f64> {
    let vh = frame.viewport.height;
    if vh <= 0.0 {
        return None;
    }
    let start_option = attribute.options.get("start");
    let end_option = attribute.options.get("end");

    let mut opt_start = start_option.and_then(|v| v.as_f64()).unwrap_or(0.0);
    let mut opt_end = end_option.and_then(|v| v.as_f64()).unwrap_or(100.0);
    let mut shift_start = 0.0;
    let mut shift_end = 0.0;
    if end_option.and_then(|v| v.as_str()) == Some("middle") {
        shift_end = bounds.height / 2.0;
        opt_end = 50.0;
    }
    if start_option.and_then(|v| v.as_str()) == Some("shifted") {
        opt_start = 0.0;
        shift_start = bounds.height / 2.0;
        shift_end = 0.0;
    }

    let window_start = vh / 100.0 * opt_start + shift_start;
    let span = vh / 100.0 * (opt_end - opt_start) + shift_end;
    if span == 0.0 {
        return None;
    }
    let progress = (vh + frame.scroll.y - bounds.offset_top - window_start) / span;
    Some(if method == Method::Regular {
        progress.clamp(0.0, 1.0)
    } else {
        progress
    })
}
