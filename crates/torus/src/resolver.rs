//! Value resolution across breakpoints and interpolation progress.
//!
//! An attribute carries value bounds per breakpoint. Resolution walks
//! the ladder from the base up to the current rank, letting each
//! declared rung overwrite the start, end, and unit, then blends the
//! surviving bounds by the interpolation progress.
//!
//! Non-numeric bounds cannot blend, so they resolve discretely: the end
//! value once progress reaches 1, the start value before that.

use torus_attr::{Attribute, Bound, Scalar, ValueData};

use crate::breakpoint::Breakpoints;

/// Outcome of resolving one value slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl ResolvedValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ResolvedValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// A resolved slot: the blended value plus the bounds it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: ResolvedValue,
    pub unit: Option<String>,
}

/// Resolves slot `slot` of `attribute` at interpolation progress
/// `percent`, honoring every breakpoint up to `rank`. Progress is
/// clamped to `[0, 1]`; continuous callers that rely on extrapolation
/// use [`resolve_at_extrapolated`].
///
/// Returns `None` when the attribute declares no usable bounds.
pub fn resolve_at(
    attribute: &Attribute,
    breakpoints: &Breakpoints,
    rank: usize,
    percent: f64,
    slot: usize,
) -> Option<Resolved> {
    resolve(attribute, breakpoints, rank, percent.clamp(0.0, 1.0), slot)
}

/// Like [`resolve_at`] but lets progress outside `[0, 1]` extrapolate
/// past the bounds. Parallax-style methods produce such progress on
/// purpose.
pub fn resolve_at_extrapolated(
    attribute: &Attribute,
    breakpoints: &Breakpoints,
    rank: usize,
    percent: f64,
    slot: usize,
) -> Option<Resolved> {
    resolve(attribute, breakpoints, rank, percent, slot)
}

/// Number of value slots the attribute resolves per tick.
pub fn slot_count(attribute: &Attribute) -> usize {
    attribute
        .values
        .values()
        .flat_map(|set| [set.start.as_ref(), set.end.as_ref()])
        .flatten()
        .map(Bound::len)
        .max()
        .unwrap_or(0)
}

fn resolve(
    attribute: &Attribute,
    breakpoints: &Breakpoints,
    rank: usize,
    percent: f64,
    slot: usize,
) -> Option<Resolved> {
    let mut start: Option<&ValueData> = None;
    let mut end: Option<&ValueData> = None;

    for walk in 0..=rank.min(breakpoints.len().saturating_sub(1)) {
        let name = breakpoints.at_rank(walk)?.name.as_str();
        let Some(set) = attribute.values.get(name) else {
            continue;
        };
        if let Some(found) = set.start.as_ref().and_then(|bound| bound.slot(slot)) {
            start = Some(found);
        }
        if let Some(found) = set.end.as_ref().and_then(|bound| bound.slot(slot)) {
            end = Some(found);
        }
    }

    let end = end?;
    let unit = end
        .unit
        .clone()
        .or_else(|| start.and_then(|data| data.unit.clone()));

    match (&end.value, start.map(|data| &data.value)) {
        // Both bounds numeric (a missing start counts as 0): blend.
        (end_value, start_value) if end_value.is_numeric() && start_value.map_or(true, Scalar::is_numeric) => {
            let start_number = start_value.and_then(Scalar::as_f64).unwrap_or(0.0);
            let end_number = end_value.as_f64().unwrap_or(0.0);
            let blended = blend(start_number, end_number, percent);
            Some(Resolved {
                value: ResolvedValue::Number(blended),
                unit,
            })
        }
        // A textual bound makes the choice discrete.
        (end_value, start_value) => {
            let chosen = if percent >= 1.0 {
                end_value
            } else {
                start_value.unwrap_or(end_value)
            };
            Some(Resolved {
                value: discrete_value(chosen),
                unit,
            })
        }
    }
}

/// Linear blend rounded to three decimals.
pub fn blend(start: f64, end: f64, percent: f64) -> f64 {
    round3(start + (end - start) * percent)
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn discrete_value(scalar: &Scalar) -> ResolvedValue {
    match scalar {
        Scalar::Int(n) => ResolvedValue::Number(*n as f64),
        Scalar::Float(n) => ResolvedValue::Number(*n),
        Scalar::Text(text) => match text.as_str() {
            "true" => ResolvedValue::Bool(true),
            "false" => ResolvedValue::Bool(false),
            _ => ResolvedValue::Text(text.clone()),
        },
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

    fn bps() -> Breakpoints {
        Breakpoints::default()
    }

    // ==== Blending ====

    #[test]
    fn test_blend_endpoints() {
        let attr = attribute("scroll:push.up(50px;10px)");
        let at0 = resolve_at(&attr, &bps(), 0, 0.0, 0).unwrap();
        assert_eq!(at0.value, ResolvedValue::Number(50.0));
        assert_eq!(at0.unit.as_deref(), Some("px"));
        let at1 = resolve_at(&attr, &bps(), 0, 1.0, 0).unwrap();
        assert_eq!(at1.value, ResolvedValue::Number(10.0));
    }

    #[test]
    fn test_blend_midpoint_and_rounding() {
        let attr = attribute("scroll:push.up(0px;50px)");
        let mid = resolve_at(&attr, &bps(), 0, 0.5, 0).unwrap();
        assert_eq!(mid.value, ResolvedValue::Number(25.0));

        let third = resolve_at(&attr, &bps(), 0, 1.0 / 3.0, 0).unwrap();
        assert_eq!(third.value, ResolvedValue::Number(16.667));
    }

    #[test]
    fn test_missing_start_defaults_to_zero() {
        let attr = attribute("scroll:push.up(50px)");
        let mid = resolve_at(&attr, &bps(), 0, 0.5, 0).unwrap();
        assert_eq!(mid.value, ResolvedValue::Number(25.0));
    }

    #[test]
    fn test_percent_clamped() {
        let attr = attribute("scroll:push.up(0px;50px)");
        let over = resolve_at(&attr, &bps(), 0, 1.8, 0).unwrap();
        assert_eq!(over.value, ResolvedValue::Number(50.0));
        let under = resolve_at(&attr, &bps(), 0, -0.5, 0).unwrap();
        assert_eq!(under.value, ResolvedValue::Number(0.0));
    }

    #[test]
    fn test_extrapolated_not_clamped() {
        let attr = attribute("scroll:push.up(0px;50px)");
        let over = resolve_at_extrapolated(&attr, &bps(), 0, 1.8, 0).unwrap();
        assert_eq!(over.value, ResolvedValue::Number(90.0));
    }

    #[test]
    fn test_monotonic_over_progress() {
        let attr = attribute("scroll:push.up(10px;90px)");
        let mut last = f64::MIN;
        for step in 0..=20 {
            let percent = step as f64 / 20.0;
            let value = resolve_at(&attr, &bps(), 0, percent, 0)
                .unwrap()
                .value
                .as_f64()
                .unwrap();
            assert!(value >= last);
            last = value;
        }
    }

    // ==== Breakpoint walking ====

    #[test]
    fn test_breakpoint_overrides_walk_up() {
        let attr = attribute("hover:opacity(10% lg::50%)");
        let lg = bps().rank_of("lg").unwrap();
        let xl = bps().rank_of("xl").unwrap();
        let md = bps().rank_of("md").unwrap();

        let at_md = resolve_at(&attr, &bps(), md, 1.0, 0).unwrap();
        assert_eq!(at_md.value, ResolvedValue::Number(0.1));
        let at_lg = resolve_at(&attr, &bps(), lg, 1.0, 0).unwrap();
        assert_eq!(at_lg.value, ResolvedValue::Number(0.5));
        // lg keeps applying above lg.
        let at_xl = resolve_at(&attr, &bps(), xl, 1.0, 0).unwrap();
        assert_eq!(at_xl.value, ResolvedValue::Number(0.5));
    }

    #[test]
    fn test_partial_override_keeps_unit() {
        let attr = attribute("scroll:push.up(40px;10px lg::80)");
        let lg = bps().rank_of("lg").unwrap();
        let resolved = resolve_at(&attr, &bps(), lg, 1.0, 0).unwrap();
        assert_eq!(resolved.value, ResolvedValue::Number(80.0));
        // No unit on the lg override: the walked-up unit survives.
        assert_eq!(resolved.unit.as_deref(), Some("px"));
    }

    #[test]
    fn test_no_values_resolves_none() {
        let attr = attribute("inview:fade.in");
        assert!(resolve_at(&attr, &bps(), 0, 1.0, 0).is_none());
    }

    #[test]
    fn test_breakpoint_only_values_below_their_rank() {
        let attr = attribute("hover:opacity(lg::50%)");
        let sm = bps().rank_of("sm").unwrap();
        assert!(resolve_at(&attr, &bps(), sm, 1.0, 0).is_none());
    }

    // ==== Discrete values ====

    #[test]
    fn test_discrete_text_flips_at_one() {
        let attr = attribute("scroll:@visibility(hidden;visible)");
        let early = resolve_at(&attr, &bps(), 0, 0.2, 0).unwrap();
        assert_eq!(early.value, ResolvedValue::Text("hidden".to_string()));
        let late = resolve_at(&attr, &bps(), 0, 0.999, 0).unwrap();
        assert_eq!(late.value, ResolvedValue::Text("hidden".to_string()));
        let done = resolve_at(&attr, &bps(), 0, 1.0, 0).unwrap();
        assert_eq!(done.value, ResolvedValue::Text("visible".to_string()));
    }

    #[test]
    fn test_discrete_bool() {
        let attr = attribute("scroll:@contain(false;true)");
        let late = resolve_at(&attr, &bps(), 0, 1.0, 0).unwrap();
        assert_eq!(late.value, ResolvedValue::Bool(true));
    }

    #[test]
    fn test_keyword_end_without_start() {
        let attr = attribute("hover:bg(red)");
        let resolved = resolve_at(&attr, &bps(), 0, 0.0, 0).unwrap();
        // No start bound: the textual end is all there is.
        assert_eq!(resolved.value, ResolvedValue::Text("red".to_string()));
    }

    // ==== Slots ====

    #[test]
    fn test_multi_value_slots() {
        let attr = attribute("hover:@margin(0px,10px;20px,50px...)");
        assert_eq!(slot_count(&attr), 2);
        let first = resolve_at(&attr, &bps(), 0, 0.5, 0).unwrap();
        assert_eq!(first.value, ResolvedValue::Number(10.0));
        let second = resolve_at(&attr, &bps(), 0, 0.5, 1).unwrap();
        assert_eq!(second.value, ResolvedValue::Number(30.0));
    }

    #[test]
    fn test_out_of_range_slot_is_none() {
        let attr = attribute("scroll:push.up(50px)");
        assert!(resolve_at(&attr, &bps(), 0, 0.5, 3).is_none());
    }

    // ==== Property-based ====

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn blend_stays_within_bounds(
                start in -500.0f64..500.0,
                end in -500.0f64..500.0,
                percent in 0.0f64..=1.0
            ) {
                let value = blend(start, end, percent);
                let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
                // Rounding may nudge past a bound by at most half a step.
                prop_assert!(value >= lo - 0.0005 && value <= hi + 0.0005);
            }

            #[test]
            fn resolve_matches_blend(percent in 0.0f64..=1.0) {
                let attr = attribute("scroll:push.up(10px;90px)");
                let resolved = resolve_at(&attr, &bps(), 0, percent, 0).unwrap();
                prop_assert_eq!(resolved.value, ResolvedValue::Number(blend(10.0, 90.0, percent)));
            }
        }
    }
}
