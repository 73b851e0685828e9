//! Responsive breakpoint configuration.
//!
//! Breakpoints form a strict ladder ordered by min-width threshold.
//! Rank 0 is the zero-width base (`all`); higher ranks take over as the
//! viewport widens. Value resolution walks the ladder from the base up
//! to the current rank, so a value declared at `md` keeps applying at
//! `lg` and `xl` until something overrides it.
//!
//! Definitions load from a compact text form
//! (`"xxl:1400px, xl:1200px, lg:992px, md:768px, sm:576px, all:0px"`,
//! any order) or from a YAML mapping of name to threshold.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// One rung of the breakpoint ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub name: String,
    /// Min-width threshold in `unit`.
    pub value: f64,
    pub unit: String,
    /// Position in the ladder; 0 is the base.
    pub rank: usize,
}

/// An ordered set of breakpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoints {
    ordered: Vec<Breakpoint>,
}

impl Default for Breakpoints {
    /// The standard six-step ladder.
    fn default() -> Self {
        Breakpoints::parse("xxl:1400px, xl:1200px, lg:992px, md:768px, sm:576px, all:0px")
            .unwrap_or_else(|_| Breakpoints { ordered: Vec::new() })
    }
}

impl Breakpoints {
    /// Parses the compact `name:threshold` comma list. Entries may come
    /// in any order; ranks are assigned by ascending threshold.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for piece in text.split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let (name, threshold) = piece
                .split_once(':')
                .ok_or_else(|| ConfigError::MalformedBreakpoint(piece.to_string()))?;
            entries.push((name.trim().to_string(), threshold.trim().to_string()));
        }
        Breakpoints::from_entries(entries)
    }

    /// Loads breakpoints from a YAML mapping:
    ///
    /// ```yaml
    /// all: 0px
    /// narrow: 600px
    /// wide: 1200px
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let map: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(yaml)?;
        let entries = map
            .into_iter()
            .map(|(name, value)| {
                let threshold = match value {
                    serde_yaml::Value::Number(n) => format!("{n}px"),
                    serde_yaml::Value::String(s) => s,
                    other => {
                        return Err(ConfigError::InvalidThreshold {
                            name: name.clone(),
                            value: format!("{other:?}"),
                        })
                    }
                };
                Ok((name, threshold))
            })
            .collect::<Result<Vec<_>>>()?;
        Breakpoints::from_entries(entries)
    }

    fn from_entries(entries: Vec<(String, String)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyBreakpoints);
        }
        let mut parsed = Vec::with_capacity(entries.len());
        for (name, threshold) in entries {
            if parsed.iter().any(|(n, _, _): &(String, f64, String)| *n == name) {
                return Err(ConfigError::DuplicateBreakpoint(name));
            }
            let (value, unit) = split_threshold(&threshold).ok_or_else(|| {
                ConfigError::InvalidThreshold {
                    name: name.clone(),
                    value: threshold.clone(),
                }
            })?;
            parsed.push((name, value, unit));
        }
        parsed.sort_by(|a, b| a.1.total_cmp(&b.1));
        if parsed[0].1 != 0.0 {
            return Err(ConfigError::MissingBase);
        }
        let ordered = parsed
            .into_iter()
            .enumerate()
            .map(|(rank, (name, value, unit))| Breakpoint {
                name,
                value,
                unit,
                rank,
            })
            .collect();
        Ok(Breakpoints { ordered })
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Breakpoint> {
        self.ordered.iter().find(|bp| bp.name == name)
    }

    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.get(name).map(|bp| bp.rank)
    }

    pub fn at_rank(&self, rank: usize) -> Option<&Breakpoint> {
        self.ordered.get(rank)
    }

    /// Base entry (rank 0, threshold 0).
    pub fn base(&self) -> Option<&Breakpoint> {
        self.ordered.first()
    }

    /// Names in rank order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(|bp| bp.name.as_str())
    }

    /// The breakpoint active at a viewport width: the highest rung
    /// whose threshold the width meets.
    pub fn current(&self, viewport_width: f64) -> Option<&Breakpoint> {
        self.ordered
            .iter()
            .rev()
            .find(|bp| viewport_width >= bp.value)
    }

    /// The `@media` prelude for a breakpoint, or `None` for the base
    /// (base rules need no wrapping).
    pub fn media_prelude(&self, name: &str) -> Option<String> {
        let bp = self.get(name)?;
        if bp.rank == 0 {
            return None;
        }
        Some(format!("@media (min-width: {}{})", format_threshold(bp.value), bp.unit))
    }
}

fn split_threshold(text: &str) -> Option<(f64, String)> {
    let split_at = text
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split_at);
    let value: f64 = number.trim().parse().ok()?;
    if value < 0.0 {
        return None;
    }
    let unit = if unit.is_empty() { "px" } else { unit };
    Some((value, unit.to_string()))
}

fn format_threshold(value: f64) -> String {
    if value == value.trunc() {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
