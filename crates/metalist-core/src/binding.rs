//! Per-row rewriting of binding expressions.
//!
//! Template fields refer to the row they are rendered in through a small
//! vocabulary: `currentItem`, `currentIndex`, `currentView` and, inside nested
//! lists, `level_N.*`. They also refer to sibling widgets by template name.
//! The rewriter turns those references into expressions that are valid for one
//! concrete row. Only identifiers inside `{{ … }}` segments are touched, and
//! only when they start an access chain (not after a `.`) and sit outside
//! string literals.
//!
//! Rewriting is a pure function of the field text and the [`RowScope`].

use std::ops::Range;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::level::{parse_level_key, LevelData};
use crate::row::RowContext;
use crate::template::FieldValue;

fn access_chain() -> &'static Regex {
    static CHAIN: OnceLock<Regex> = OnceLock::new();
    CHAIN.get_or_init(|| {
        Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*)*")
            .expect("access chain pattern is valid")
    })
}

/// How `currentItem` is expressed for a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurrentItem<'a> {
    /// Inlined record, used by the directly editable row.
    Literal(&'a Value),
    /// Lookup into the list's data so the row tracks widget state changes.
    Indexed { list_name: &'a str, data_index: usize },
}

impl CurrentItem<'_> {
    /// Expression standing in for `currentItem`.
    pub fn expression(&self) -> String {
        match self {
            CurrentItem::Literal(value) => format!("({value})"),
            CurrentItem::Indexed {
                list_name,
                data_index,
            } => format!("{list_name}.listData[{data_index}]"),
        }
    }

    /// Field form of `currentItem` attached to generated widgets.
    pub fn to_field(&self) -> FieldValue {
        match self {
            CurrentItem::Literal(value) => FieldValue::Literal((*value).clone()),
            CurrentItem::Indexed { .. } => FieldValue::Binding(format!("{{{{{}}}}}", self.expression())),
        }
    }
}

/// Everything the rewriter knows about one row.
#[derive(Debug, Clone, Copy)]
pub struct RowScope<'a> {
    pub row: &'a RowContext,
    pub current_item: CurrentItem<'a>,
    /// Template widget name to the name the widget has in this row.
    pub names: &'a IndexMap<String, String>,
    /// Object literal of the row's exposed properties.
    pub view: &'a str,
    pub levels: Option<&'a LevelData>,
}

#[derive(Debug, Clone, Copy)]
pub struct BindingRewriter<'a> {
    scope: RowScope<'a>,
}

impl<'a> BindingRewriter<'a> {
    pub fn new(scope: RowScope<'a>) -> Self {
        Self { scope }
    }

    pub fn rewrite_field(&self, field: &FieldValue) -> FieldValue {
        match field {
            FieldValue::Binding(text) => FieldValue::Binding(self.rewrite(text)),
            FieldValue::Literal(value) => FieldValue::Literal(value.clone()),
        }
    }

    /// Rewrites every `{{ … }}` segment of `text`; text outside segments is
    /// copied as is.
    pub fn rewrite(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find("{{") {
            let body = open + 2;
            let Some(len) = segment_len(&rest[body..]) else {
                break;
            };
            out.push_str(&rest[..body]);
            out.push_str(&self.rewrite_expression(&rest[body..body + len]));
            out.push_str("}}");
            rest = &rest[body + len + 2..];
        }
        out.push_str(rest);
        out
    }

    fn rewrite_expression(&self, expr: &str) -> String {
        let literals = string_literals(expr);
        let mut out = String::with_capacity(expr.len());
        let mut last = 0;

        for found in access_chain().find_iter(expr) {
            let start = found.start();
            if literals.iter().any(|range| range.contains(&start)) {
                continue;
            }
            if expr[..start].ends_with('.') {
                continue;
            }
            let chain: Vec<&str> = found.as_str().split('.').collect();
            if let Some(replacement) = self.resolve(&chain) {
                out.push_str(&expr[last..start]);
                out.push_str(&replacement);
                last = found.end();
            }
        }

        out.push_str(&expr[last..]);
        out
    }

    fn resolve(&self, chain: &[&str]) -> Option<String> {
        let (head, rest) = chain.split_first()?;
        match *head {
            "currentItem" => Some(join(&self.scope.current_item.expression(), rest)),
            "currentIndex" => Some(join(&self.scope.row.row_index.to_string(), rest)),
            "currentView" => Some(self.resolve_view(rest)),
            level if parse_level_key(level).is_some() => self.resolve_level(level, rest),
            name => self
                .scope
                .names
                .get(name)
                .filter(|meta| meta.as_str() != name)
                .map(|meta| join(meta, rest)),
        }
    }

    fn resolve_view(&self, rest: &[&str]) -> String {
        if let Some((name, tail)) = rest.split_first() {
            if let Some(meta) = self.scope.names.get(*name) {
                return join(meta, tail);
            }
        }
        join(&format!("({})", self.scope.view), rest)
    }

    fn resolve_level(&self, key: &str, rest: &[&str]) -> Option<String> {
        let Some(entry) = self.scope.levels.and_then(|levels| levels.get(key)) else {
            log::trace!("no context for {key}; leaving reference as is");
            return None;
        };
        let (field, tail) = rest.split_first()?;
        match *field {
            "currentItem" => Some(join(strip_mustache(&entry.current_item), tail)),
            "currentIndex" => Some(join(&entry.current_index.to_string(), tail)),
            "currentView" => match tail.split_first() {
                Some((name, tail)) => entry.meta_name(name).map(|meta| join(meta, tail)),
                None => Some(format!("({})", entry.view_literal())),
            },
            _ => None,
        }
    }
}

fn join(base: &str, rest: &[&str]) -> String {
    let mut out = String::from(base);
    for segment in rest {
        out.push('.');
        out.push_str(segment);
    }
    out
}

/// `{{ expr }}` to `expr`.
pub fn strip_mustache(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("{{")
        .and_then(|inner| inner.strip_suffix("}}"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Length of a segment body up to its closing `}}`, stepping over balanced
/// braces of object literals and over quoted strings.
fn segment_len(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    for (i, byte) in bytes.iter().enumerate() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == open {
                quote = None;
            }
            continue;
        }
        match byte {
            b'"' | b'\'' | b'`' => quote = Some(*byte),
            b'{' => depth += 1,
            b'}' if depth > 0 => depth -= 1,
            b'}' if bytes.get(i + 1) == Some(&b'}') => return Some(i),
            _ => {}
        }
    }
    None
}

/// Byte ranges covered by quoted strings.
fn string_literals(expr: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut open: Option<(usize, char)> = None;
    let mut escaped = false;

    for (i, ch) in expr.char_indices() {
        match open {
            Some((start, quote)) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    ranges.push(start..i + 1);
                    open = None;
                }
            }
            None if matches!(ch, '"' | '\'' | '`') => open = Some((i, ch)),
            None => {}
        }
    }
    if let Some((start, _)) = open {
        ranges.push(start..expr.len());
    }
    ranges
}

#[cfg(test)]
#[path = "tests/binding_tests.rs"]
mod tests;
