//! Static CSS rule compilation.
//!
//! Static clauses (hover, focus, inview, ...) compile once into shared
//! stylesheet rules instead of being re-evaluated per element. The
//! selector matches the *exact clause text* as one whitespace-separated
//! token of the marker attribute, so every element declaring the same
//! literal clause is covered by one rule. A per-breakpoint dedup set
//! keeps identical rules from being inserted twice.
//!
//! # Design
//!
//! All shared compile-side state (stylesheet text, dedup sets,
//! breakpoint ladder) lives in one [`CompilationContext`], created at
//! startup and alive for the process's duration. Rules are built as
//! structured [`CompiledRule`] values and serialized in one place.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use torus_attr::{registry, Attribute, OptionValue, Trigger, TriggerScope};

use crate::breakpoint::Breakpoints;
use crate::resolver::{self, Resolved, ResolvedValue};

/// One generated rule, before media wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    /// Breakpoint the rule is scoped to (`all` for the base).
    pub breakpoint: String,
    pub selector: String,
    /// Declaration block body, without braces.
    pub declarations: String,
}

impl CompiledRule {
    /// The serialized `selector { declarations }` text.
    pub fn text(&self) -> String {
        format!("{} {{ {} }}", self.selector, self.declarations)
    }
}

/// Compile-side shared state: breakpoints, the append-only stylesheet,
/// and one grow-only dedup set per breakpoint.
#[derive(Debug)]
pub struct CompilationContext {
    breakpoints: Breakpoints,
    stylesheet: Vec<String>,
    seen: BTreeMap<String, HashSet<String>>,
}

impl CompilationContext {
    pub fn new(breakpoints: Breakpoints) -> Self {
        CompilationContext {
            breakpoints,
            stylesheet: Vec::new(),
            seen: BTreeMap::new(),
        }
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// Compiles one static clause into stylesheet rules.
    ///
    /// Returns the rules newly inserted by this call; rules already
    /// present in their breakpoint's dedup set are skipped, so the
    /// second element declaring a clause compiles to nothing.
    /// Continuous clauses and non-processable clauses yield no rules.
    pub fn compile(&mut self, attribute: &Attribute) -> Vec<CompiledRule> {
        if attribute.no_css_process
            || attribute.is_continuous()
            || attribute
                .trigger
                .as_ref()
                .is_some_and(Trigger::is_class_action)
        {
            return Vec::new();
        }
        let rules = if attribute.custom {
            self.build_custom_rules(attribute)
        } else {
            self.build_rules(attribute)
        };
        rules
            .into_iter()
            .filter(|rule| self.insert(rule))
            .collect()
    }

    /// The full generated stylesheet, rules in insertion order, each
    /// wrapped in its breakpoint's media query.
    pub fn css_text(&self) -> String {
        self.stylesheet.join("\n")
    }

    pub fn rule_count(&self) -> usize {
        self.stylesheet.len()
    }

    /// Number of distinct rules recorded for a breakpoint.
    pub fn dedup_len(&self, breakpoint: &str) -> usize {
        self.seen.get(breakpoint).map_or(0, HashSet::len)
    }

    fn insert(&mut self, rule: &CompiledRule) -> bool {
        let text = rule.text();
        let fresh = self
            .seen
            .entry(rule.breakpoint.clone())
            .or_default()
            .insert(text.clone());
        if fresh {
            match self.breakpoints.media_prelude(&rule.breakpoint) {
                Some(prelude) => self.stylesheet.push(format!("{prelude} {{ {text} }}")),
                None => self.stylesheet.push(text),
            }
        }
        fresh
    }

    // ==== Predefined properties ====

    fn build_rules(&self, attribute: &Attribute) -> Vec<CompiledRule> {
        let definition = registry::lookup(&attribute.property.name);
        let Some(alias) = attribute.property.css_alias.as_deref() else {
            return Vec::new();
        };
        let mut rules = Vec::new();

        let selector = self.active_selector(attribute);
        let negated = selector.contains(":not(");
        let base_rank = self
            .breakpoints
            .rank_of(&attribute.resolution)
            .unwrap_or(0);

        let mut declarations = String::new();
        let value = self.end_value(attribute, base_rank);
        let important = if attribute.priority { " !important" } else { "" };
        let _ = write!(declarations, "{alias}: {value}{important};");
        if let Some(extra) = definition.and_then(|def| def.extra_declarations) {
            let _ = write!(declarations, " {extra}");
        }
        // Inline options don't belong on a :not() variant; they would
        // vanish the moment the trigger matches.
        if !negated {
            if let Some(options) = self.option_declarations(attribute) {
                let _ = write!(declarations, " {options}");
            }
        }
        rules.push(CompiledRule {
            breakpoint: attribute.resolution.clone(),
            selector,
            declarations,
        });

        // Options ride on an unscoped selector too, visible to every
        // pseudo-class variant of the marker.
        if let Some(options) = self.option_declarations(attribute) {
            rules.push(CompiledRule {
                breakpoint: attribute.resolution.clone(),
                selector: self.marker_selector(attribute),
                declarations: options,
            });
        }

        // Responsive value overrides get their own per-breakpoint rule.
        for (name, set) in &attribute.values {
            if name == "all" || set.end.is_none() {
                continue;
            }
            let Some(rank) = self.breakpoints.rank_of(name) else {
                continue;
            };
            rules.push(CompiledRule {
                breakpoint: name.clone(),
                selector: self.active_selector(attribute),
                declarations: format!("{alias}: {}{important};", self.end_value(attribute, rank)),
            });
        }
        rules
    }

    /// The rendered end-state value for the main declaration.
    fn end_value(&self, attribute: &Attribute, rank: usize) -> String {
        let definition = registry::lookup(&attribute.property.name);
        if let Some(fixed) = definition.and_then(|def| def.fixed_active_value) {
            return fixed.to_string();
        }
        match self.join_slots(attribute, rank, 1.0) {
            Some(value) => value,
            None => {
                log::warn!(
                    "no end value in clause {:?}; defaulting to 0",
                    attribute.original
                );
                "0".to_string()
            }
        }
    }

    /// Resolves every slot at `percent` and joins them with the
    /// attribute's join symbol.
    fn join_slots(&self, attribute: &Attribute, rank: usize, percent: f64) -> Option<String> {
        let slots = resolver::slot_count(attribute);
        if slots == 0 {
            return None;
        }
        let definition = registry::lookup(&attribute.property.name);
        let mut rendered = Vec::with_capacity(slots);
        for slot in 0..slots {
            let resolved =
                resolver::resolve_at(attribute, &self.breakpoints, rank, percent, slot)?;
            rendered.push(render_value(&resolved, definition, &attribute.property.name));
        }
        let joined = rendered.join(attribute.join_symbol);
        Some(match &attribute.multi_function {
            Some(function) => format!("{function}({joined})"),
            None => joined,
        })
    }

    fn option_declarations(&self, attribute: &Attribute) -> Option<String> {
        let mut parts = Vec::new();
        for (key, value) in &attribute.options {
            if key == "target" {
                continue;
            }
            parts.push(format!(
                "--tor-{}-{}: {};",
                attribute.property.name,
                key,
                render_option(value)
            ));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    // ==== Custom escape ====

    /// Custom-escape clauses compile the author's property directly:
    /// the start state on the bare marker selector, the end state on
    /// the triggered one.
    fn build_custom_rules(&self, attribute: &Attribute) -> Vec<CompiledRule> {
        let mut rules = Vec::new();
        for (percent, triggered) in [(0.0, false), (1.0, true)] {
            for (name, set) in &attribute.values {
                let bound = if triggered { &set.end } else { &set.start };
                if bound.is_none() {
                    continue;
                }
                let Some(rank) = self.breakpoints.rank_of(name) else {
                    continue;
                };
                let Some(value) = self.join_slots(attribute, rank, percent) else {
                    continue;
                };
                let selector = if triggered {
                    self.active_selector(attribute)
                } else {
                    self.marker_selector(attribute)
                };
                let important = if attribute.priority { " !important" } else { "" };
                let declarations = match &attribute.property.wrapper {
                    Some(wrapper) => format!(
                        "{wrapper}: {}({value}){important};",
                        attribute.property.name
                    ),
                    None => format!("{}: {value}{important};", attribute.property.name),
                };
                let breakpoint = if name == "all" {
                    attribute.resolution.clone()
                } else {
                    name.clone()
                };
                rules.push(CompiledRule {
                    breakpoint,
                    selector,
                    declarations,
                });
            }
        }
        if let Some(options) = self.option_declarations(attribute) {
            rules.push(CompiledRule {
                breakpoint: attribute.resolution.clone(),
                selector: self.marker_selector(attribute),
                declarations: options,
            });
        }
        rules
    }

    // ==== Selectors ====

    /// `[data-tor~="<clause>"]` with the clause text CSS-escaped.
    fn marker_selector(&self, attribute: &Attribute) -> String {
        let mut escaped = String::new();
        let _ = cssparser::serialize_string(&attribute.original, &mut escaped);
        format!("[data-tor~={escaped}]")
    }

    /// The selector for the clause's active state: marker plus trigger
    /// pseudo-class, negated for from-state properties, hoisted onto
    /// the scope element when the trigger is observed elsewhere.
    fn active_selector(&self, attribute: &Attribute) -> String {
        let marker = self.marker_selector(attribute);
        let Some(trigger) = &attribute.trigger else {
            return marker;
        };
        let alias = trigger.selector.clone().unwrap_or_default();
        let negated = registry::lookup(&attribute.property.name)
            .is_some_and(|def| def.negated_trigger);
        let state = if negated && !alias.is_empty() {
            format!(":not({alias})")
        } else {
            alias
        };
        match &trigger.scope {
            Some(TriggerScope::Parent) => {
                format!("[data-tor-parent~=\"{}\"]{state} {marker}", trigger.name)
            }
            Some(TriggerScope::Selector(scope)) => format!("{scope}{state} {marker}"),
            None => format!("{marker}{state}"),
        }
    }
}

/// Renders one resolved slot value for CSS output.
fn render_value(
    resolved: &Resolved,
    definition: Option<&'static registry::PropertyDefinition>,
    property: &str,
) -> String {
    match &resolved.value {
        ResolvedValue::Number(number) => match &resolved.unit {
            Some(unit) => format!("{}{unit}", format_number(*number)),
            None => format_number(*number),
        },
        ResolvedValue::Text(text) if registry::is_keyword(text) => {
            let variable = registry::keyword_variable(definition, property, text);
            if definition.is_some_and(|def| def.reversal < 0.0) {
                format!("calc({variable} * -1)")
            } else {
                variable
            }
        }
        ResolvedValue::Text(text) => text.clone(),
        ResolvedValue::Bool(flag) => flag.to_string(),
    }
}

fn render_option(value: &OptionValue) -> String {
    match value {
        OptionValue::Bool(flag) => flag.to_string(),
        OptionValue::Number(number) => format_number(*number),
        OptionValue::Text(text) => text.clone(),
    }
}

/// Formats a number the way CSS expects: no trailing `.0`, no
/// exponent for the magnitudes this engine produces.
pub(crate) fn format_number(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use torus_attr::AttributeParser;

    fn attribute(text: &str) -> Attribute {
        AttributeParser::default()
            .parse(text)
            .into_iter()
            .next()
            .unwrap()
    }

    fn context() -> CompilationContext {
        CompilationContext::new(Breakpoints::default())
    }

    // ==== Selectors and declarations ====

    #[test]
    fn test_basic_hover_rule() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("hover:opacity(50%)"));
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, "[data-tor~=\"hover:opacity(50%)\"]:hover");
        assert_eq!(rules[0].declarations, "--tor-opacity: 0.5;");
        assert_eq!(rules[0].breakpoint, "all");
    }

    #[test]
    fn test_negated_trigger_selector() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("inview:fade.in(1)"));
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].selector,
            "[data-tor~=\"inview:fade.in(1)\"]:not(.inview)"
        );
        // fade.in has a fixed active value.
        assert_eq!(rules[0].declarations, "--tor-opacity: 0;");
    }

    #[test]
    fn test_priority_marks_important() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("!hover:opacity(50%)"));
        assert!(rules[0].declarations.ends_with("0.5 !important;"));
    }

    #[test]
    fn test_forced_priority_for_background() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("hover:bg(red)"));
        assert_eq!(
            rules[0].declarations,
            "background-color: var(--tor-bg-red) !important;"
        );
    }

    #[test]
    fn test_keyword_with_reversal_wraps_calc() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("hover:push.up(md)"));
        assert_eq!(
            rules[0].declarations,
            "--tor-translateY: calc(var(--tor-push-pull-md) * -1);"
        );
    }

    #[test]
    fn test_extra_declarations_appended() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("inview:reveal(1)"));
        assert!(rules[0]
            .declarations
            .contains("--tor-translateX: var(--tor-translateX-idle);"));
    }

    #[test]
    fn test_parent_scope_selector() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("hover(p):opacity(50%)"));
        assert_eq!(
            rules[0].selector,
            "[data-tor-parent~=\"hover\"]:hover [data-tor~=\"hover(p):opacity(50%)\"]"
        );
    }

    #[test]
    fn test_explicit_scope_selector() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("active(#hero):opacity(50%)"));
        assert_eq!(
            rules[0].selector,
            "#hero.active [data-tor~=\"active(#hero):opacity(50%)\"]"
        );
    }

    #[test]
    fn test_idle_clause_has_no_pseudo() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("opacity(50%)"));
        assert_eq!(rules[0].selector, "[data-tor~=\"opacity(50%)\"]");
    }

    // ==== Options ====

    #[test]
    fn test_options_emitted_as_custom_properties() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("hover:fade.out(1,{duration:fast})"));
        assert_eq!(rules.len(), 2);
        // Inline on the active rule and standalone on the bare marker.
        assert!(rules[0]
            .declarations
            .contains("--tor-fade.out-duration: var(--tor-fast);"));
        assert_eq!(
            rules[1].selector,
            "[data-tor~=\"hover:fade.out(1,{duration:fast})\"]"
        );
        assert_eq!(
            rules[1].declarations,
            "--tor-fade.out-duration: var(--tor-fast);"
        );
    }

    #[test]
    fn test_negated_rule_skips_inline_options() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("inview:fade.in(1,{duration:fast})"));
        // fade.in is negated: options only on the standalone rule.
        assert!(rules[0].selector.contains(":not("));
        assert!(!rules[0].declarations.contains("duration"));
    }

    // ==== Breakpoints ====

    #[test]
    fn test_responsive_override_rule() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("hover:opacity(10% lg::50%)"));
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].breakpoint, "all");
        assert_eq!(rules[0].declarations, "--tor-opacity: 0.1;");
        assert_eq!(rules[1].breakpoint, "lg");
        assert_eq!(rules[1].declarations, "--tor-opacity: 0.5;");
        assert!(ctx.css_text().contains("@media (min-width: 992px)"));
    }

    #[test]
    fn test_resolution_scope_moves_base_rule() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("hover:md::opacity(50%)"));
        assert_eq!(rules[0].breakpoint, "md");
        assert!(ctx.css_text().starts_with("@media (min-width: 768px)"));
    }

    // ==== Deduplication ====

    #[test]
    fn test_identical_clause_compiles_once() {
        let mut ctx = context();
        let attr = attribute("hover:opacity(50%)");
        assert_eq!(ctx.compile(&attr).len(), 1);
        // Second element, same literal clause.
        assert_eq!(ctx.compile(&attr).len(), 0);
        assert_eq!(ctx.dedup_len("all"), 1);
        assert_eq!(ctx.rule_count(), 1);
    }

    #[test]
    fn test_dedup_is_per_breakpoint() {
        let mut ctx = context();
        ctx.compile(&attribute("hover:opacity(50%)"));
        ctx.compile(&attribute("hover:md::opacity(50%)"));
        assert_eq!(ctx.dedup_len("all"), 1);
        assert_eq!(ctx.dedup_len("md"), 1);
    }

    // ==== Custom escape ====

    #[test]
    fn test_custom_escape_start_and_end() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("hover:@padding(0px;16px)"));
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].selector, "[data-tor~=\"hover:@padding(0px;16px)\"]");
        assert_eq!(rules[0].declarations, "padding: 0px;");
        assert_eq!(
            rules[1].selector,
            "[data-tor~=\"hover:@padding(0px;16px)\"]:hover"
        );
        assert_eq!(rules[1].declarations, "padding: 16px;");
    }

    #[test]
    fn test_custom_wrapper_function() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("hover:@transform=translateY(0px;-8px)"));
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].declarations, "transform: translateY(0px);");
        assert_eq!(rules[1].declarations, "transform: translateY(-8px);");
    }

    // ==== Skipped clauses ====

    #[test]
    fn test_continuous_clause_not_compiled() {
        let mut ctx = context();
        assert!(ctx.compile(&attribute("scroll:push.up(50px)")).is_empty());
        assert!(ctx
            .compile(&attribute("mouseX:@transform=translateX(50px;0px)"))
            .is_empty());
    }

    #[test]
    fn test_malformed_clause_not_compiled() {
        let mut ctx = context();
        assert!(ctx.compile(&attribute("hover:(50px)")).is_empty());
        assert!(ctx.compile(&attribute("hover:levitate(50px)")).is_empty());
        assert_eq!(ctx.rule_count(), 0);
    }

    #[test]
    fn test_class_action_not_compiled() {
        let mut ctx = context();
        assert!(ctx
            .compile(&attribute("class.scroll:add(visible,{target:.card})"))
            .is_empty());
    }

    // ==== Escaping ====

    #[test]
    fn test_marker_text_escaped() {
        let mut ctx = context();
        let rules = ctx.compile(&attribute("hover:opacity(10% lg::50%)"));
        // The masked space character survives into the selector string.
        assert!(rules[0].selector.contains("hover:opacity(10%░lg::50%)"));
    }
}
