//! Clause parser.
//!
//! After [`normalize`](crate::normalize::normalize) the attribute is a
//! space-separated list of clauses of the form
//!
//! ```text
//! [!][trigger[(scope)]:][<breakpoint>::][@][wrapper=]property[(start;end[,{options}])]
//! ```
//!
//! Each segment is scanned at most once, left to right, falling back to
//! its default when absent. A clause that fails the grammar or names an
//! unknown property is not an error: it parses into an [`Attribute`]
//! flagged `no_css_process`, keeping one bad clause from discarding its
//! neighbors.

use std::collections::BTreeMap;

use crate::model::{
    Attribute, Axis, Bound, OptionValue, PropertyRef, Scalar, Trigger, TriggerScope, ValueData,
    ValueSet,
};
use crate::normalize::{normalize, MASK};
use crate::registry::{self, PropertyDefinition, UNITS};

/// Static trigger names and their CSS selector form.
const TRIGGER_SELECTORS: &[(&str, &str)] = &[
    ("hover", ":hover"),
    ("focus", ":focus"),
    ("focus-within", ":focus-within"),
    ("active", ".active"),
    ("show", ".show"),
    ("inview", ".inview"),
];

/// Triggers driven by a signal stream rather than element state.
const CONTINUOUS_TRIGGERS: &[&str] = &[
    "mouse", "mouseX", "mouseY", "scroll", "sensor", "sensorX", "sensorY",
];

/// Parses `data-tor` attribute text into clauses.
///
/// The parser needs the configured breakpoint names to recognize
/// `lg::`-style resolution markers; everything else is static.
#[derive(Debug, Clone)]
pub struct AttributeParser {
    breakpoints: Vec<String>,
}

impl Default for AttributeParser {
    fn default() -> Self {
        AttributeParser::new(["all", "sm", "md", "lg", "xl", "xxl"])
    }
}

impl AttributeParser {
    pub fn new<I, S>(breakpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeParser {
            breakpoints: breakpoints.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a whole attribute into its clauses, in source order.
    pub fn parse(&self, attribute: &str) -> Vec<Attribute> {
        let normalized = normalize(attribute);
        if normalized.is_empty() {
            return Vec::new();
        }
        normalized
            .split(' ')
            .map(|clause| self.parse_clause(clause))
            .collect()
    }

    fn parse_clause(&self, clause: &str) -> Attribute {
        let mut rest = clause;
        let mut no_css_process = false;

        let priority_marked = if let Some(stripped) = rest.strip_prefix('!') {
            rest = stripped;
            true
        } else {
            false
        };

        let trigger = match trigger_colon(rest) {
            Some(at) => {
                let spec = &rest[..at];
                rest = &rest[at + 1..];
                match build_trigger(spec) {
                    Some(trigger) => Some(trigger),
                    None => {
                        log::debug!("unknown trigger in clause {clause:?}");
                        no_css_process = true;
                        Some(fallback_trigger(spec))
                    }
                }
            }
            None => None,
        };

        let resolution = self.scan_resolution(&mut rest);

        let (mut prop_text, values_text) = match rest.find('(') {
            Some(at) => (&rest[..at], &rest[at..]),
            None => (rest, ""),
        };

        let custom = if let Some(stripped) = prop_text.strip_prefix('@') {
            prop_text = stripped;
            true
        } else {
            false
        };

        let (wrapper, name) = match prop_text.split_once('=') {
            Some((wrapper, name)) => (Some(wrapper.to_string()), name),
            None => (None, prop_text),
        };

        let class_action = trigger.as_ref().is_some_and(Trigger::is_class_action);
        let definition = if custom { None } else { registry::lookup(name) };
        if name.is_empty() || (!custom && !class_action && definition.is_none()) {
            log::debug!("unknown property in clause {clause:?}");
            no_css_process = true;
        }
        let css_alias = definition.map(|def| def.css_alias.clone());

        // Color-bearing properties always win the cascade. Exact names
        // only: bg-opacity, shadow-offset.* and friends stay normal.
        let priority = priority_marked || ["bg", "border", "color", "shadow"].contains(&name);

        let join_symbol = if css_alias.as_deref() == Some("background-color") {
            ","
        } else {
            " "
        };

        let mut options = BTreeMap::new();
        if let Some(trigger) = &trigger {
            insert_trigger_defaults(trigger, name, &mut options);
        }

        let mut values = BTreeMap::new();
        let mut multi = false;
        let mut multi_function = None;
        if !values_text.is_empty() {
            match unwrap_parens(values_text) {
                Some(inner) => {
                    let (value_text, option_text) = extract_options(inner);
                    if let Some(option_text) = option_text {
                        self.parse_options(option_text, &mut options);
                    }
                    multi = value_text.contains("...");
                    if multi {
                        multi_function = inner_function(value_text);
                    }
                    self.parse_values(
                        value_text,
                        definition,
                        multi,
                        multi_function.as_deref(),
                        &mut values,
                    );
                    values.entry("all".to_string()).or_default();
                }
                None => {
                    log::warn!("unbalanced value group in clause {clause:?}");
                    no_css_process = true;
                }
            }
        }

        Attribute {
            original: clause.to_string(),
            priority,
            trigger,
            property: PropertyRef {
                name: name.to_string(),
                css_alias,
                wrapper,
            },
            resolution,
            values,
            options,
            custom,
            no_css_process,
            join_symbol,
            multi,
            multi_function,
        }
    }

    /// Consumes a leading `name::` marker when `name` is a configured
    /// breakpoint. An optional `<` or `=` prefix is accepted and
    /// dropped; scoping semantics live with the resolver.
    fn scan_resolution(&self, rest: &mut &str) -> String {
        let body = rest
            .strip_prefix('<')
            .or_else(|| rest.strip_prefix('='))
            .unwrap_or(rest);
        if let Some(at) = body.find("::") {
            let name = &body[..at];
            if !name.contains('(') && self.breakpoints.iter().any(|bp| bp == name) {
                *rest = &body[at + 2..];
                return name.to_string();
            }
        }
        "all".to_string()
    }

    /// Splits the value text on `;` into start and end, distributes
    /// breakpoint-scoped sub-values, and records the bounds.
    fn parse_values(
        &self,
        text: &str,
        definition: Option<&PropertyDefinition>,
        multi: bool,
        multi_function: Option<&str>,
        values: &mut BTreeMap<String, ValueSet>,
    ) {
        if text.is_empty() {
            return;
        }
        let sides: Vec<&str> = text.splitn(2, ';').collect();
        let (start, end) = match sides.as_slice() {
            [end] => (None, *end),
            [start, end] => (Some(*start), *end),
            _ => return,
        };
        if let Some(start) = start {
            self.record_side(start, false, definition, multi, multi_function, values);
        }
        self.record_side(end, true, definition, multi, multi_function, values);
    }

    fn record_side(
        &self,
        side: &str,
        is_end: bool,
        definition: Option<&PropertyDefinition>,
        multi: bool,
        multi_function: Option<&str>,
        values: &mut BTreeMap<String, ValueSet>,
    ) {
        // Masked spaces separate breakpoint-scoped sub-values, but only
        // when a `::` marker is present; multi-value lists keep their
        // masked spaces intact.
        let tokens: Vec<&str> = if side.contains("::") {
            side.split(MASK).collect()
        } else {
            vec![side]
        };
        for token in tokens {
            if token.is_empty() {
                continue;
            }
            let (breakpoint, body) = self.split_resolution(token);
            let bound = parse_bound(body, definition, multi, multi_function);
            let entry = values.entry(breakpoint.to_string()).or_default();
            if is_end {
                entry.end = Some(bound);
            } else {
                entry.start = Some(bound);
            }
        }
    }

    fn split_resolution<'a>(&self, token: &'a str) -> (&'a str, &'a str) {
        if let Some((name, body)) = token.split_once("::") {
            if self.breakpoints.iter().any(|bp| bp == name) {
                return (name, body);
            }
        }
        ("all", token)
    }

    fn parse_options(&self, text: &str, options: &mut BTreeMap<String, OptionValue>) {
        for pair in text.split(',') {
            let Some((key, raw)) = pair.split_once(':') else {
                continue;
            };
            options.insert(key.to_string(), option_value(key, raw));
        }
    }
}

/// Index of the `:` ending the trigger segment: first single colon at
/// parenthesis depth zero.
fn trigger_colon(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut depth = 0u32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => {
                let double = bytes.get(i + 1) == Some(&b':') || (i > 0 && bytes[i - 1] == b':');
                if !double {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn build_trigger(spec: &str) -> Option<Trigger> {
    let (name, argument) = match spec.split_once('(') {
        Some((name, rest)) => (name, rest.strip_suffix(')')),
        None => (spec, None),
    };

    let known = TRIGGER_SELECTORS.iter().any(|&(n, _)| n == name)
        || CONTINUOUS_TRIGGERS.contains(&name)
        || name.starts_with("class.")
        || name == "timeout";
    if !known {
        return None;
    }

    let scope = argument.and_then(|arg| match arg {
        "" => None,
        "p" => Some(TriggerScope::Parent),
        selector => Some(TriggerScope::Selector(
            selector.replace(MASK, " ").replace('|', ","),
        )),
    });

    let selector = TRIGGER_SELECTORS
        .iter()
        .find(|&&(n, _)| n == name)
        .map(|&(_, sel)| sel.to_string());

    let axis = match name {
        "mouseX" | "sensorX" => Axis::X,
        "mouseY" | "sensorY" | "scroll" => Axis::Y,
        _ => Axis::All,
    };

    Some(Trigger {
        name: name.to_string(),
        selector,
        scope,
        axis,
    })
}

fn fallback_trigger(spec: &str) -> Trigger {
    let name = spec.split('(').next().unwrap_or(spec);
    Trigger {
        name: name.to_string(),
        selector: None,
        scope: None,
        axis: Axis::All,
    }
}

fn insert_trigger_defaults(trigger: &Trigger, property: &str, options: &mut BTreeMap<String, OptionValue>) {
    if trigger.is_class_action() || property.starts_with("class") {
        return;
    }
    if trigger.name.starts_with("mouse") || trigger.name.starts_with("sensor") {
        options.insert("method".to_string(), OptionValue::Text("middle".to_string()));
    } else if trigger.name == "scroll" {
        options.insert("start".to_string(), OptionValue::Number(0.0));
        options.insert("end".to_string(), OptionValue::Text("middle".to_string()));
        options.insert("method".to_string(), OptionValue::Text("regular".to_string()));
    }
}

/// Strips the outer parentheses when they span the whole segment.
fn unwrap_parens(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

/// Pulls the first `{...}` option block out of the value text.
fn extract_options(inner: &str) -> (&str, Option<&str>) {
    let start = if inner.starts_with('{') {
        Some(0)
    } else {
        inner.find(",{").map(|at| at + 1)
    };
    let Some(start) = start else {
        return (inner, None);
    };
    let Some(end) = inner[start..].find('}').map(|at| start + at) else {
        return (inner, None);
    };
    let values = if start == 0 {
        &inner[end + 1..]
    } else {
        // The `,` before `{` belongs to the option block.
        &inner[..start - 1]
    };
    (values, Some(&inner[start + 1..end]))
}

/// The function name wrapping each multi-value list, if any.
fn inner_function(value_text: &str) -> Option<String> {
    let at = value_text.find('(')?;
    let prefix = &value_text[..at];
    let ident = !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    ident.then(|| prefix.to_string())
}

fn parse_bound(text: &str, definition: Option<&PropertyDefinition>, multi: bool, multi_function: Option<&str>) -> Bound {
    if multi {
        let mut body = text.replace("...", "");
        if let Some(function) = multi_function {
            body = body
                .replacen(&format!("{function}("), "", 1)
                .replacen(')', "", 1);
        }
        let list = body
            .split(',')
            .filter(|piece| !piece.is_empty())
            .map(|piece| value_data(piece, definition))
            .collect();
        Bound::List(list)
    } else {
        Bound::Single(value_data(text, definition))
    }
}

/// Parses one raw value into number + unit, resolving `--x` custom
/// property references and percentage normalization.
fn value_data(text: &str, definition: Option<&PropertyDefinition>) -> ValueData {
    if let Some(var) = text.strip_prefix("--") {
        return ValueData::text(format!("var(--{var})"));
    }
    if let Some((number, unit)) = split_unit(text) {
        if definition.is_some_and(|def| def.percentage) && unit == "%" {
            return ValueData {
                value: Scalar::Float(number / 100.0),
                unit: None,
            };
        }
        return ValueData {
            value: number_scalar(text.strip_suffix(unit).unwrap_or(text), number),
            unit: Some(unit.to_string()),
        };
    }
    if let Ok(int) = text.parse::<i64>() {
        return ValueData {
            value: Scalar::Int(int),
            unit: None,
        };
    }
    if let Ok(float) = text.parse::<f64>() {
        return ValueData {
            value: Scalar::Float(float),
            unit: None,
        };
    }
    ValueData::text(text.replace(MASK, " "))
}

/// Longest unit suffix leaving a parseable number.
fn split_unit(text: &str) -> Option<(f64, &'static str)> {
    let mut candidates: Vec<&'static str> = UNITS.to_vec();
    candidates.sort_by_key(|unit| std::cmp::Reverse(unit.len()));
    for unit in candidates {
        if let Some(number_text) = text.strip_suffix(unit) {
            if !number_text.is_empty() {
                if let Ok(number) = number_text.parse::<f64>() {
                    return Some((number, unit));
                }
            }
        }
    }
    None
}

fn number_scalar(text: &str, parsed: f64) -> Scalar {
    match text.parse::<i64>() {
        Ok(int) => Scalar::Int(int),
        Err(_) => Scalar::Float(parsed),
    }
}

fn option_value(key: &str, raw: &str) -> OptionValue {
    if key == "target" {
        return OptionValue::Text(raw.replace(MASK, " ").replace('|', ","));
    }
    match raw {
        "true" => return OptionValue::Bool(true),
        "false" => return OptionValue::Bool(false),
        _ => {}
    }
    if let Some(var) = raw.strip_prefix("--") {
        return OptionValue::Text(format!("var(--{var})"));
    }
    if registry::is_keyword(raw) {
        return OptionValue::Text(format!("var(--tor-{raw})"));
    }
    if let Ok(number) = raw.parse::<f64>() {
        return OptionValue::Number(number);
    }
    OptionValue::Text(raw.to_string())
}
