//! Print-style templates for extracting values from log lines.
//!
//! A template is the format string a processing step logged with, e.g.
//! `"Final number of cells: {}, final number of genes: {}."`. Every `{}` slot
//! captures the shortest non-empty run of characters that lets the literal
//! text around it match. Templates are searched for anywhere in a line.

pub mod qc;

use anyhow::{Context, Result};
use regex::Regex;

/// Placeholder marking a captured field.
pub const SLOT: &str = "{}";

/// A compiled `{}` template.
#[derive(Clone, Debug)]
pub struct Template {
    source: String,
    regex: Regex,
    slots: usize,
}

impl Template {
    /// Compile a template. Literal text is matched exactly, case included.
    pub fn compile(source: &str) -> Result<Self> {
        let pieces: Vec<String> = source.split(SLOT).map(regex::escape).collect();
        let slots = pieces.len() - 1;
        let pattern = format!("(?s){}", pieces.join("(.+?)"));
        let regex = Regex::new(&pattern)
            .with_context(|| format!("compile template {source:?}"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
            slots,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of `{}` slots.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// All captured fields of the first match in `line`, or `None`.
    pub fn search(&self, line: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(line)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    /// Field `index` of the first match in `line`.
    ///
    /// `None` when the template does not match or has no such slot.
    pub fn extract(&self, line: &str, index: usize) -> Option<String> {
        let caps = self.regex.captures(line)?;
        caps.get(index + 1).map(|m| m.as_str().to_string())
    }
}

/// One-shot form of [`Template::extract`].
pub fn extract(line: &str, template: &str, index: usize) -> Result<Option<String>> {
    Ok(Template::compile(template)?.extract(line, index))
}
