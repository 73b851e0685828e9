//! Static registry of predefined effect properties.
//!
//! Every property name the attribute language accepts (`fade.in`,
//! `push.up`, `opacity`, ...) is expanded at startup into a
//! [`PropertyDefinition`] describing how it renders to CSS: the alias it
//! writes to, whether its numeric values are percentages, whether its
//! trigger selector is negated, and so on.
//!
//! The expansion tables use a trailing-`*` wildcard that matches every
//! dotted variant sharing a stem, so `fade*` covers `fade.in`, `fade.out`,
//! `fade.to` and `fade.from` without listing each one.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// How a predefined property renders to CSS.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// The property name as written in an attribute (`push.up`).
    pub name: &'static str,
    /// CSS property or custom property the value is assigned to
    /// (`--tor-translateY`, `background-color`).
    pub css_alias: String,
    /// Group used when expanding predefined keywords into variables
    /// (`push-pull` for both `push.*` and `pull.*`).
    pub alias_group: Option<&'static str>,
    /// Numeric values are multiplied by this factor. `-1.0` for
    /// directions that move against the CSS axis (`push.up`).
    pub reversal: f64,
    /// Percent-suffixed values are divided by 100 and lose their unit.
    pub percentage: bool,
    /// The active rule matches while the trigger selector does *not*
    /// apply, so the selector is wrapped in `:not(...)`.
    pub negated_trigger: bool,
    /// A fixed value emitted instead of the parsed end value.
    pub fixed_active_value: Option<&'static str>,
    /// Extra declarations appended to every rule for this property.
    pub extra_declarations: Option<&'static str>,
}

/// All accepted property names. Dotted variants are separate entries.
const PROPERTY_NAMES: &[&str] = &[
    "bg",
    "bg-opacity",
    "bg-lighten",
    "bg-darken",
    "bg-brightness",
    "block",
    "border",
    "border-opacity",
    "blur",
    "blur.to",
    "blur.from",
    "clip",
    "push.up",
    "push.down",
    "push.left",
    "push.right",
    "pull.up",
    "pull.down",
    "pull.left",
    "pull.right",
    "fade.in",
    "fade.out",
    "fade.to",
    "fade.from",
    "opacity",
    "reveal",
    "reveal.hide",
    "rotate.to",
    "rotate.from",
    "rotateX.to",
    "rotateX.from",
    "rotateY.to",
    "rotateY.from",
    "scale.to",
    "scale.from",
    "scaleX.to",
    "scaleX.from",
    "scaleY.to",
    "scaleY.from",
    "shadow",
    "svg-shadow",
    "shadow-offset.down",
    "shadow-offset.up",
    "shadow-offset.left",
    "shadow-offset.right",
    "shadow-intensity",
    "shadow-color",
    "skew.to",
    "skew.from",
    "skewX.to",
    "skewX.from",
    "skewY.to",
    "skewY.from",
    "text",
    "text-opacity",
    "delay",
    "duration",
    "top",
    "bottom",
    "up",
    "down",
    "left",
    "right",
    "shift.up",
    "shift.right",
    "shift.down",
    "shift.left",
    "originX",
    "originY",
    "originZ",
    "wait",
    "place.top",
    "place.right",
    "place.bottom",
    "place.left",
];

/// Names whose CSS alias is not the default `--tor-<stem>`.
const ALIAS_OVERRIDES: &[(&str, &str)] = &[
    ("bg", "background-color"),
    ("bg-lighten", "--tor-bg-lightness"),
    ("bg-darken", "--tor-bg-lightness"),
    ("bg-brightness", "--tor-bg-lightness"),
    ("border", "border-color"),
    ("push.up", "--tor-translateY"),
    ("push.down", "--tor-translateY"),
    ("push.left", "--tor-translateX"),
    ("push.right", "--tor-translateX"),
    ("pull.up", "--tor-translateY"),
    ("pull.down", "--tor-translateY"),
    ("pull.left", "--tor-translateX"),
    ("pull.right", "--tor-translateX"),
    ("fade*", "--tor-opacity"),
    ("shadow", "box-shadow"),
    ("svg-shadow", "filter"),
    ("shadow-offset.down", "--tor-shadow-offsetY"),
    ("shadow-offset.up", "--tor-shadow-offsetY"),
    ("shadow-offset.left", "--tor-shadow-offsetX"),
    ("shadow-offset.right", "--tor-shadow-offsetX"),
    ("text", "color"),
    ("shift.up", "--tor-shiftY"),
    ("shift.down", "--tor-shiftY"),
    ("shift.left", "--tor-shiftX"),
    ("shift.right", "--tor-shiftX"),
    ("place.top", "--tor-top"),
    ("place.right", "--tor-right"),
    ("place.bottom", "--tor-bottom"),
    ("place.left", "--tor-left"),
];

/// Keyword-variable groups shared by related names.
const ALIAS_GROUPS: &[(&str, &str)] = &[
    ("blur*", "blur"),
    ("push*", "push-pull"),
    ("pull*", "push-pull"),
    ("shadow-offset*", "shadow-offset"),
];

/// Directions whose values flip sign when rendered.
const REVERSED: &[&str] = &[
    "push.up",
    "push.left",
    "pull.down",
    "pull.right",
    "shadow-offset.up",
    "shadow-offset.left",
    "shift.up",
    "shift.left",
];

/// Properties active while the trigger does not match.
const NEGATED_TRIGGER: &[&str] = &[
    "blur.from",
    "block",
    "pull*",
    "clip",
    "fade.in",
    "reveal",
    "rotate.from",
    "rotateX.from",
    "rotateY.from",
    "scale.from",
    "scaleX.from",
    "scaleY.from",
    "skew.from",
    "skewX.from",
    "skewY.from",
];

/// Properties whose `%` values normalize to unitless fractions.
const PERCENTAGE: &[&str] = &[
    "bg-opacity",
    "bg-brightness",
    "fade.to",
    "fade.from",
    "opacity",
    "scale*",
    "scaleX*",
    "scaleY*",
    "text-opacity",
];

/// Fixed values that replace the parsed end value in the active rule.
const FIXED_ACTIVE_VALUES: &[(&str, &str)] = &[
    ("block", "var(--tor-block-idle)"),
    ("fade.in", "0"),
    ("fade.out", "0"),
    ("clip", "var(--tor-clip-idle)"),
    ("reveal", "var(--tor-reveal-idle)"),
    ("reveal.hide", "var(--tor-reveal-idle)"),
];

/// Declarations appended alongside the main one.
const EXTRA_DECLARATIONS: &[(&str, &str)] = &[
    (
        "block",
        "--tor-block-scale: var(--tor-block-scale-idle); \
         --tor-clip-delay: calc(var(--tor-duration-all) + var(--tor-delay-all, 0ms)); \
         --tor-block-delay: var(--tor-delay-all, 0ms); \
         --tor-block: var(--tor-block-idle);",
    ),
    (
        "reveal",
        "--tor-translateX: var(--tor-translateX-idle); --tor-translateY: var(--tor-translateY-idle);",
    ),
    (
        "reveal.hide",
        "--tor-translateX: var(--tor-translateX-idle); --tor-translateY: var(--tor-translateY-idle);",
    ),
];

/// Keywords that expand to `var(--tor-...)` references instead of being
/// parsed as literal values.
const PREDEFINED_KEYWORDS: &[&str] = &[
    "blue", "indigo", "purple", "pink", "red", "orange", "yellow", "green", "teal", "cyan",
    "white", "gray", "gray-dark", "navy", "maroon", "brown", "magenta", "lime", "black",
    "primary", "secondary", "success", "info", "warning", "danger", "light", "dark", "no", "xs",
    "sm", "md", "lg", "xl", "full", "half", "risen", "pop", "fastest", "faster", "fast", "slow",
    "slower", "slowest",
];

/// Units recognized when splitting a value into number and unit.
pub const UNITS: &[&str] = &[
    "px", "deg", "%", "cm", "mm", "in", "pt", "pc", "em", "ex", "ch", "rem", "vw", "vh", "vmin",
    "vmax", "ms", "s",
];

static REGISTRY: Lazy<HashMap<&'static str, PropertyDefinition>> = Lazy::new(|| {
    PROPERTY_NAMES
        .iter()
        .map(|&name| (name, build_definition(name)))
        .collect()
});

fn build_definition(name: &'static str) -> PropertyDefinition {
    let css_alias = table_lookup(ALIAS_OVERRIDES, name)
        .map(str::to_string)
        .unwrap_or_else(|| format!("--tor-{}", stem(name)));
    PropertyDefinition {
        name,
        css_alias,
        alias_group: table_lookup(ALIAS_GROUPS, name),
        reversal: if set_contains(REVERSED, name) { -1.0 } else { 1.0 },
        percentage: set_contains(PERCENTAGE, name),
        negated_trigger: set_contains(NEGATED_TRIGGER, name),
        fixed_active_value: table_lookup(FIXED_ACTIVE_VALUES, name),
        extra_declarations: table_lookup(EXTRA_DECLARATIONS, name),
    }
}

fn table_lookup(table: &[(&'static str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| key_matches(key, name))
        .map(|&(_, value)| value)
}

fn set_contains(set: &[&str], name: &str) -> bool {
    set.iter().any(|key| key_matches(key, name))
}

/// A `foo*` key matches every dotted name whose stem is `foo`.
/// A plain key matches only itself.
fn key_matches(key: &str, name: &str) -> bool {
    match key.strip_suffix('*') {
        Some(prefix) => name.contains('.') && stem(name) == prefix,
        None => key == name,
    }
}

/// The part of a name before the first dot (`push` for `push.up`).
pub fn stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Looks up the definition for a predefined property name.
pub fn lookup(name: &str) -> Option<&'static PropertyDefinition> {
    REGISTRY.get(name)
}

/// Whether `value` is a predefined keyword (`red`, `md`, `fastest`, ...).
pub fn is_keyword(value: &str) -> bool {
    PREDEFINED_KEYWORDS.contains(&value)
}

/// The `var(--tor-...)` reference a keyword expands to for a property.
/// Grouped names share a variable family, so `push.up(md)` and
/// `pull.down(md)` both read `--tor-push-pull-md`.
pub fn keyword_variable(definition: Option<&PropertyDefinition>, property: &str, keyword: &str) -> String {
    let family = definition
        .and_then(|def| def.alias_group)
        .unwrap_or(property);
    format!("var(--tor-{family}-{keyword})")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==== Lookup and aliasing ====

    #[test]
    fn test_lookup_known_property() {
        let def = lookup("opacity").unwrap();
        assert_eq!(def.name, "opacity");
        assert_eq!(def.css_alias, "--tor-opacity");
        assert!(def.percentage);
        assert!(!def.negated_trigger);
    }

    #[test]
    fn test_lookup_unknown_property() {
        assert!(lookup("levitate").is_none());
        assert!(lookup("fade").is_none());
    }

    #[test]
    fn test_alias_override_direct() {
        assert_eq!(lookup("bg").unwrap().css_alias, "background-color");
        assert_eq!(lookup("text").unwrap().css_alias, "color");
        assert_eq!(lookup("shadow").unwrap().css_alias, "box-shadow");
    }

    #[test]
    fn test_alias_override_wildcard() {
        assert_eq!(lookup("fade.in").unwrap().css_alias, "--tor-opacity");
        assert_eq!(lookup("fade.to").unwrap().css_alias, "--tor-opacity");
    }

    #[test]
    fn test_alias_axis_split() {
        assert_eq!(lookup("push.up").unwrap().css_alias, "--tor-translateY");
        assert_eq!(lookup("push.left").unwrap().css_alias, "--tor-translateX");
        assert_eq!(lookup("shift.down").unwrap().css_alias, "--tor-shiftY");
    }

    #[test]
    fn test_default_alias_uses_stem() {
        assert_eq!(lookup("rotate.to").unwrap().css_alias, "--tor-rotate");
        assert_eq!(lookup("skewX.from").unwrap().css_alias, "--tor-skewX");
        assert_eq!(lookup("duration").unwrap().css_alias, "--tor-duration");
    }

    // ==== Flags ====

    #[test]
    fn test_reversal_directions() {
        assert_eq!(lookup("push.up").unwrap().reversal, -1.0);
        assert_eq!(lookup("push.down").unwrap().reversal, 1.0);
        assert_eq!(lookup("pull.right").unwrap().reversal, -1.0);
        assert_eq!(lookup("shift.left").unwrap().reversal, -1.0);
        assert_eq!(lookup("shadow-offset.up").unwrap().reversal, -1.0);
    }

    #[test]
    fn test_negated_trigger_families() {
        assert!(lookup("fade.in").unwrap().negated_trigger);
        assert!(!lookup("fade.out").unwrap().negated_trigger);
        assert!(lookup("pull.up").unwrap().negated_trigger);
        assert!(!lookup("push.up").unwrap().negated_trigger);
        assert!(lookup("scale.from").unwrap().negated_trigger);
        assert!(!lookup("scale.to").unwrap().negated_trigger);
    }

    #[test]
    fn test_percentage_properties() {
        assert!(lookup("opacity").unwrap().percentage);
        assert!(lookup("scale.to").unwrap().percentage);
        assert!(lookup("scaleY.from").unwrap().percentage);
        assert!(lookup("bg-opacity").unwrap().percentage);
        assert!(!lookup("push.up").unwrap().percentage);
        assert!(!lookup("rotate.to").unwrap().percentage);
    }

    #[test]
    fn test_fixed_active_values() {
        assert_eq!(lookup("fade.in").unwrap().fixed_active_value, Some("0"));
        assert_eq!(
            lookup("clip").unwrap().fixed_active_value,
            Some("var(--tor-clip-idle)")
        );
        assert_eq!(lookup("opacity").unwrap().fixed_active_value, None);
    }

    #[test]
    fn test_extra_declarations() {
        assert!(lookup("block").unwrap().extra_declarations.is_some());
        assert!(lookup("reveal").unwrap().extra_declarations.is_some());
        assert!(lookup("fade.in").unwrap().extra_declarations.is_none());
    }

    // ==== Keywords ====

    #[test]
    fn test_keyword_membership() {
        assert!(is_keyword("red"));
        assert!(is_keyword("md"));
        assert!(is_keyword("fastest"));
        assert!(!is_keyword("middle"));
        assert!(!is_keyword("50px"));
    }

    #[test]
    fn test_keyword_variable_grouped() {
        let push = lookup("push.up");
        assert_eq!(keyword_variable(push, "push.up", "md"), "var(--tor-push-pull-md)");
        let pull = lookup("pull.down");
        assert_eq!(keyword_variable(pull, "pull.down", "md"), "var(--tor-push-pull-md)");
    }

    #[test]
    fn test_keyword_variable_ungrouped() {
        let shadow = lookup("shadow");
        assert_eq!(keyword_variable(shadow, "shadow", "risen"), "var(--tor-shadow-risen)");
        assert_eq!(keyword_variable(None, "bg", "red"), "var(--tor-bg-red)");
    }

    #[test]
    fn test_stem() {
        assert_eq!(stem("push.up"), "push");
        assert_eq!(stem("opacity"), "opacity");
        assert_eq!(stem("shadow-offset.left"), "shadow-offset");
    }
}
