// src/capture/filter.rs

use regex::Regex;

use crate::errors::{Result, RunError};

/// Ordered list of exclusion patterns applied to decoded output lines.
///
/// Each pattern is matched from the start of the line (a match must begin at
/// position 0 but does not need to span the whole line). The first pattern
/// that matches vetoes the line.
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl LineFilter {
    /// Compile the given patterns, in order.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let compiled = patterns
            .iter()
            .enumerate()
            .map(|(index, pat)| {
                Regex::new(&format!("^(?:{pat})")).map_err(|e| {
                    RunError::invalid(format!("filter at position {index} is not a valid regex: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns: patterns.to_vec(),
            compiled,
        })
    }

    /// A filter that keeps every line.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Return the line if no pattern vetoes it.
    pub fn keep<'a>(&self, line: &'a str) -> Option<&'a str> {
        if self.compiled.iter().any(|re| re.is_match(line)) {
            None
        } else {
            Some(line)
        }
    }
}
