//! Failure message assembly.
//!
//! A message is the constraint sentence followed by aligned `label: value`
//! context lines. Equality failures embed an actual/diff/expected triple
//! when the renderings are long enough to benefit from one; equal middle
//! lines of multi-line diffs are elided as `[...]`.

use crate::config::Config;
use crate::diff::diff;
use crate::foundation::failure::ContextEntries;
use crate::render::value::{Value, ValueKind};

/// Renderings shorter than this on both sides are shown as plain
/// actual/expected lines; a diff row would not add anything.
pub(crate) const MINIMUM_LENGTH_FOR_DIFF: usize = 10;

/// Quotes a subject name for use inside a message.
pub(crate) fn quote_name(name: &str) -> String {
    format!("\"{name}\"")
}

enum Section {
    Entry { label: String, value: String },
    Raw(String),
}

/// Builds one failure's message text and context entries.
pub(crate) struct MessageBuilder {
    message: String,
    sections: Vec<Section>,
}

impl MessageBuilder {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sections: Vec::new(),
        }
    }

    /// Appends a pre-rendered context entry.
    pub(crate) fn with_entry(
        mut self,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.sections.push(Section::Entry {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    /// Appends a context entry, rendering the value through the
    /// configuration's mappers.
    pub(crate) fn with_value(self, config: &Config, label: impl Into<String>, value: &Value) -> Self {
        let rendered = config.mappers().render(value);
        self.with_entry(label, rendered)
    }

    /// Appends the actual/expected comparison for an equality failure:
    /// plain lines for short, boolean or identically rendered values, a
    /// diff triple otherwise.
    pub(crate) fn with_comparison(
        mut self,
        config: &Config,
        actual: &Value,
        expected: &Value,
    ) -> Self {
        let rendered_actual = config.mappers().render(actual);
        let rendered_expected = config.mappers().render(expected);

        if rendered_actual == rendered_expected {
            // Unequal values with identical renderings: disambiguate by type
            // so the reader can see why they differ.
            return self
                .with_entry("actual", rendered_actual)
                .with_entry("expected", rendered_expected)
                .with_entry("actual.type", type_label(actual))
                .with_entry("expected.type", type_label(expected));
        }

        let either_bool = actual.kind() == ValueKind::Bool || expected.kind() == ValueKind::Bool;
        let single_line = !rendered_actual.contains('\n') && !rendered_expected.contains('\n');
        let both_short = rendered_actual.chars().count() < MINIMUM_LENGTH_FOR_DIFF
            && rendered_expected.chars().count() < MINIMUM_LENGTH_FOR_DIFF;
        if !config.allow_diff() || either_bool || (single_line && both_short) {
            return self
                .with_entry("actual", rendered_actual)
                .with_entry("expected", rendered_expected);
        }

        let lines = diff(&rendered_actual, &rendered_expected).lines();
        if lines.len() == 1 {
            self = self.with_entry("actual", lines.actual[0].clone());
            if !lines.equal[0] {
                self = self.with_entry("diff", lines.diff[0].clone());
            }
            return self.with_entry("expected", lines.expected[0].clone());
        }

        let mut skipped_equal_lines = false;
        let mut first_section = true;
        for i in 0..lines.len() {
            let is_edge = i == 0 || i == lines.len() - 1;
            if lines.equal[i] && !is_edge {
                // Skip identical lines, unless they are the first or last.
                skipped_equal_lines = true;
                continue;
            }
            if skipped_equal_lines {
                skipped_equal_lines = false;
                self.sections.push(Section::Raw("[...]".to_owned()));
            }
            if !first_section {
                self.sections.push(Section::Raw(String::new()));
            }
            first_section = false;

            self = self.with_entry(format!("actual@{i}"), lines.actual[i].clone());
            if !lines.equal[i] {
                self = self.with_entry("diff", lines.diff[i].clone());
            }
            self = self.with_entry(format!("expected@{i}"), lines.expected[i].clone());
        }
        self
    }

    /// Finishes the message: appends extra (validator and global) context
    /// entries — skipping labels already present — and lays everything out
    /// with labels padded to a common column.
    pub(crate) fn assemble(
        mut self,
        extra: impl IntoIterator<Item = (String, String)>,
    ) -> (String, ContextEntries) {
        for (label, value) in extra {
            let taken = self.sections.iter().any(
                |section| matches!(section, Section::Entry { label: l, .. } if *l == label),
            );
            if !taken {
                self.sections.push(Section::Entry { label, value });
            }
        }

        let width = self
            .sections
            .iter()
            .filter_map(|section| match section {
                Section::Entry { label, .. } => Some(label.chars().count()),
                Section::Raw(_) => None,
            })
            .max()
            .unwrap_or(0);

        let mut text = self.message;
        let mut entries = ContextEntries::new();
        for section in self.sections {
            text.push('\n');
            match section {
                Section::Entry { label, value } => {
                    text.push_str(&format!("{label:<width$}: {value}"));
                    entries.push((label, value));
                }
                Section::Raw(line) => text.push_str(&line),
            }
        }
        (text, entries)
    }
}

fn type_label(value: &Value) -> String {
    match value.type_tag() {
        Some(tag) => tag.name().to_owned(),
        None => value.kind().description().to_owned(),
    }
}
