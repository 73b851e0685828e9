//! Attribute text normalization.
//!
//! Raw attribute text is freeform: authors add spaces around separators,
//! spread values across lines, and use shorthand macros. Normalization
//! rewrites the text into a canonical form where clauses are exactly the
//! space-separated tokens of the string:
//!
//! 1. collapse all whitespace runs to single spaces,
//! 2. remove spaces hugging separators (`:`, `;`, `,`, parens, ...),
//! 3. expand `@parallax`/`@tilt` shorthands into their transform form,
//! 4. mask spaces inside parentheses with `░` so value groups survive
//!    the clause split (and attribute-token selector matching),
//! 5. expand `trigger:[a b]` clusters into separate clauses.
//!
//! Normalization is idempotent: running it on its own output changes
//! nothing.

/// Placeholder for a significant space inside a value group.
pub const MASK: char = '░';

/// Normalizes raw attribute text into canonical clause tokens.
pub fn normalize(attribute: &str) -> String {
    let collapsed = collapse_whitespace(attribute);
    if collapsed.is_empty() {
        return collapsed;
    }
    let stripped = strip_separator_spaces(&collapsed);
    let expanded = expand_shorthands(&stripped);
    let masked = mask_value_spaces(&expanded);
    expand_clusters(
        &masked
            .replace("@T=", "@transform=")
            .replace("@F=", "@filter="),
    )
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Separators that swallow a space written after them.
const EATS_FOLLOWING: &[char] = &['[', '{', '(', ';', ':', ',', '+', '~'];
/// Separators that swallow a space written before them.
const EATS_PRECEDING: &[char] = &[']', '}', '{', '(', ')', ';', ':', ',', '+', '~'];

/// Drops spaces adjacent to separators. A space after `)` survives
/// because it separates clauses.
fn strip_separator_spaces(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars.get(i + 1).copied();
            let after_sep = prev.is_some_and(|p| {
                EATS_FOLLOWING.contains(&p) || (p == '>' && out.ends_with("=>"))
            });
            let before_sep = next.is_some_and(|n| {
                EATS_PRECEDING.contains(&n) || (n == '=' && chars.get(i + 2) == Some(&'>'))
            });
            if after_sep || before_sep {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Masks spaces inside parentheses so a clause stays one token.
fn mask_value_spaces(text: &str) -> String {
    let mut depth = 0u32;
    text.chars()
        .map(|c| match c {
            '(' => {
                depth += 1;
                c
            }
            ')' => {
                depth = depth.saturating_sub(1);
                c
            }
            ' ' if depth > 0 => MASK,
            _ => c,
        })
        .collect()
}

/// One shorthand macro: the transform it expands to and the axis each
/// trigger maps onto.
struct Shorthand {
    marker: &'static str,
    transform: &'static str,
    unit: &'static str,
    method: &'static str,
    /// `(trigger, axis, negate_value)`
    events: &'static [(&'static str, &'static str, bool)],
}

const PARALLAX: Shorthand = Shorthand {
    marker: "@parallax(",
    transform: "translate",
    unit: "px",
    method: "continuous",
    events: &[("mouseX", "X", true), ("mouseY", "Y", true), ("scroll", "Y", true)],
};

const TILT: Shorthand = Shorthand {
    marker: "@tilt(",
    transform: "rotate",
    unit: "deg",
    method: "self-continuous",
    events: &[("mouseX", "Y", true), ("mouseY", "X", false)],
};

fn expand_shorthands(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for token in text.split(' ') {
        match expand_shorthand_token(token) {
            Some(expanded) => out.extend(expanded),
            None => out.push(token.to_string()),
        }
    }
    out.join(" ")
}

fn expand_shorthand_token(token: &str) -> Option<Vec<String>> {
    let shorthand = if token.contains(PARALLAX.marker) {
        &PARALLAX
    } else if token.contains(TILT.marker) {
        &TILT
    } else {
        return None;
    };
    let marker_at = token.find(shorthand.marker)?;
    let colon = token[..marker_at].rfind(':')?;
    let trigger_spec = &token[..colon];
    let base = trigger_spec.split('(').next().unwrap_or(trigger_spec);
    let close = token[marker_at..].find(')')? + marker_at;
    let value = &token[marker_at + shorthand.marker.len()..close];
    let tail = &token[close + 1..];

    if let Some(&(_, axis, negate)) = shorthand.events.iter().find(|&&(e, _, _)| e == base) {
        let rendered = render_shorthand(shorthand, axis, value, negate);
        return Some(vec![format!("{}{}{}", &token[..marker_at], rendered, tail)]);
    }
    if base == "mouse" {
        let rest = &token[base.len()..marker_at];
        return Some(
            shorthand
                .events
                .iter()
                .map(|&(event, axis, negate)| {
                    let rendered = render_shorthand(shorthand, axis, value, negate);
                    format!("{event}{rest}{rendered}{tail}")
                })
                .collect(),
        );
    }
    None
}

fn render_shorthand(shorthand: &Shorthand, axis: &str, value: &str, negate: bool) -> String {
    let value = if negate { negated(value) } else { value.to_string() };
    format!(
        "@T={name}{axis}({value}{unit};0{unit},{{method:{method}}})",
        name = shorthand.transform,
        unit = shorthand.unit,
        method = shorthand.method,
    )
}

fn negated(value: &str) -> String {
    match value.parse::<f64>() {
        Ok(number) => {
            let flipped = -number;
            if flipped == flipped.trunc() {
                format!("{}", flipped as i64)
            } else {
                format!("{flipped}")
            }
        }
        Err(_) => format!("-{value}"),
    }
}

/// Expands `trigger:[a b,{opts}]` clusters. Each bracketed item becomes
/// its own clause under the shared trigger, with the trailing option
/// block merged into every item.
fn expand_clusters(text: &str) -> String {
    let mut current = text.to_string();
    while let Some(expanded) = expand_first_cluster(&current) {
        current = expanded;
    }
    current
}

fn expand_first_cluster(text: &str) -> Option<String> {
    let mut depth = 0u32;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '[' if depth == 0 => {
                let head_start = text[..i].rfind(' ').map_or(0, |p| p + 1);
                let head = &text[head_start..i];
                if !head.ends_with(':') {
                    continue;
                }
                let close = i + text[i..].find(']')?;
                let inner = &text[i + 1..close];
                let (priority, trigger) = match head.strip_prefix('!') {
                    Some(rest) => (true, &rest[..rest.len() - 1]),
                    None => (false, &head[..head.len() - 1]),
                };
                let expanded = render_cluster(trigger, priority, inner);
                return Some(format!(
                    "{}{}{}",
                    &text[..head_start],
                    expanded,
                    &text[close + 1..]
                ));
            }
            _ => {}
        }
    }
    None
}

fn render_cluster(trigger: &str, priority: bool, inner: &str) -> String {
    let (items, options) = match split_cluster_options(inner) {
        Some((items, options)) => (items, Some(options)),
        None => (inner, None),
    };
    items
        .split(' ')
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (bang, content) = match item.strip_prefix('!') {
                Some(rest) => ("!", rest),
                None => (if priority { "!" } else { "" }, item),
            };
            let content = match options {
                Some(options) => merge_options(content, options),
                None => content.to_string(),
            };
            format!("{bang}{trigger}:{content}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a trailing `,{...}` option block off the cluster body.
fn split_cluster_options(inner: &str) -> Option<(&str, &str)> {
    let at = inner.rfind(",{")?;
    let block = &inner[at + 2..];
    let body = block.strip_suffix('}')?;
    Some((&inner[..at], body))
}

/// Injects shared options into one cluster item, merging with any
/// options the item already carries.
fn merge_options(content: &str, options: &str) -> String {
    if let Some(at) = content.find("})") {
        format!("{},{}{}", &content[..at], options, &content[at..])
    } else if let Some(at) = content.find(')') {
        format!("{},{{{}}}{}", &content[..at], options, &content[at..])
    } else {
        format!("{content}({{{options}}})")
    }
}
