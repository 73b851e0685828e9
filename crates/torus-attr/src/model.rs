//! Parsed representation of a single effect clause.
//!
//! One `data-tor` attribute holds a space-separated list of clauses, and
//! each clause parses into one [`Attribute`]. The structure mirrors the
//! clause grammar: an optional trigger, an optional breakpoint
//! resolution, a property reference, value bounds per breakpoint, and a
//! bag of options.

use std::collections::BTreeMap;

/// Interpolation axis derived from the trigger name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    /// Radial or combined measure (plain `mouse` triggers).
    All,
}

/// Where a trigger is observed relative to the styled element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerScope {
    /// The trigger fires on a `data-tor-parent` ancestor (`hover(p):`).
    Parent,
    /// The trigger fires on an explicit selector (`hover(#hero):`).
    Selector(String),
}

/// The condition under which a clause applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Trigger name as written (`hover`, `mouseX`, `scroll`).
    pub name: String,
    /// CSS pseudo-class or marker class for state triggers
    /// (`:hover`, `.inview`). `None` for continuous triggers.
    pub selector: Option<String>,
    pub scope: Option<TriggerScope>,
    pub axis: Axis,
}

impl Trigger {
    /// Continuous triggers interpolate every frame instead of compiling
    /// to a static rule.
    pub fn is_continuous(&self) -> bool {
        matches!(
            self.name.as_str(),
            "mouse" | "mouseX" | "mouseY" | "scroll" | "sensor" | "sensorX" | "sensorY"
        )
    }

    /// Class-action triggers (`class.scroll`, ...) toggle classes and
    /// carry no CSS of their own.
    pub fn is_class_action(&self) -> bool {
        self.name.starts_with("class.")
    }
}

/// The property a clause writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    /// Name as written in the clause (`push.up`, or `padding` when
    /// custom).
    pub name: String,
    /// Resolved CSS alias for predefined names.
    pub css_alias: Option<String>,
    /// Wrapping CSS function from `wrapper=name` syntax:
    /// `transform=translateY` assigns `translateY(...)` to `transform`.
    pub wrapper: Option<String>,
}

/// A parsed scalar: number or text, with numeric flavor preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(n) => Some(*n),
            Scalar::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Scalar::Text(_))
    }
}

/// A value with its optional unit (`50px` is `Int(50)` + `"px"`).
#[derive(Debug, Clone, PartialEq)]
pub struct ValueData {
    pub value: Scalar,
    pub unit: Option<String>,
}

impl ValueData {
    pub fn text(value: impl Into<String>) -> Self {
        ValueData {
            value: Scalar::Text(value.into()),
            unit: None,
        }
    }
}

/// One bound of an interpolation range: a single value, or a
/// comma-separated list for multi-value properties.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Single(ValueData),
    List(Vec<ValueData>),
}

impl Bound {
    /// The value at `slot`, treating a single value as slot 0.
    pub fn slot(&self, slot: usize) -> Option<&ValueData> {
        match self {
            Bound::Single(data) => (slot == 0).then_some(data),
            Bound::List(list) => list.get(slot),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Bound::Single(_) => 1,
            Bound::List(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Start and end bounds declared for one breakpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet {
    pub start: Option<Bound>,
    pub end: Option<Bound>,
}

impl ValueSet {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// An option value from the `{key:value,...}` block.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl OptionValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            OptionValue::Text(text) => text.parse().ok(),
            OptionValue::Bool(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A fully parsed clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// The exact clause text after normalization. Doubles as the
    /// `data-tor~="..."` selector token.
    pub original: String,
    /// `!` prefix, or a property that forces importance.
    pub priority: bool,
    /// `None` for idle clauses that apply unconditionally.
    pub trigger: Option<Trigger>,
    pub property: PropertyRef,
    /// Breakpoint name the whole clause is scoped to; `"all"` when
    /// unscoped.
    pub resolution: String,
    /// Value bounds keyed by breakpoint name. Always contains an
    /// `"all"` entry once a value group was present, even if empty.
    pub values: BTreeMap<String, ValueSet>,
    pub options: BTreeMap<String, OptionValue>,
    /// Property was escaped with `@`: emitted verbatim instead of being
    /// resolved through the registry.
    pub custom: bool,
    /// The clause did not match the grammar or names an unknown
    /// property. It is kept for inspection but produces no CSS.
    pub no_css_process: bool,
    /// Separator used when a value list renders into one declaration.
    pub join_symbol: &'static str,
    /// Bounds carry `...` multi-value lists.
    pub multi: bool,
    /// Inner function wrapping each multi-value list (`blur` in
    /// `@filter(blur(5px);blur(0px)...)`).
    pub multi_function: Option<String>,
}

impl Attribute {
    /// Whether this clause feeds the frame-by-frame interpolator
    /// rather than the static compiler.
    pub fn is_continuous(&self) -> bool {
        self.trigger.as_ref().is_some_and(Trigger::is_continuous)
    }
}
