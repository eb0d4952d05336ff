//! Spec file preamble: tags and macro definitions before the first section.

use std::collections::HashMap;
use std::path::Path;

use super::SpecfileError;

/// Nesting bound for macro expansion. Deeper chains are treated as recursive.
const MAX_EXPANSION_DEPTH: usize = 64;

/// Section markers that end the preamble.
const SECTIONS: &[&str] = &[
    "package",
    "description",
    "prep",
    "conf",
    "generate_buildrequires",
    "build",
    "install",
    "check",
    "clean",
    "files",
    "changelog",
    "pre",
    "post",
    "preun",
    "postun",
    "pretrans",
    "posttrans",
    "preuntrans",
    "postuntrans",
    "verifyscript",
    "triggerprein",
    "triggerin",
    "triggerun",
    "triggerpostun",
    "filetriggerin",
    "filetriggerun",
    "filetriggerpostun",
    "transfiletriggerin",
    "transfiletriggerun",
    "transfiletriggerpostun",
    "sourcelist",
    "patchlist",
];

/// Tags that also define the lowercase macro of the same name.
const MACRO_TAGS: &[&str] = &["name", "version", "release", "epoch"];

/// Tags and macros collected from a spec file preamble.
///
/// Conditionals (`%if` ... `%endif`) are not evaluated: every branch
/// contributes its definitions, later ones winning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preamble {
    /// Lowercased tag name and raw value, in file order.
    tags: Vec<(String, String)>,
    macros: HashMap<String, String>,
}

impl Preamble {
    pub fn from_path(path: &Path) -> Result<Self, SpecfileError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SpecfileError::NotFound(path.display().to_string())
            } else {
                SpecfileError::Read {
                    path: path.display().to_string(),
                    source: e,
                }
            }
        })?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut preamble = Self::default();

        for line in logical_lines(content) {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(directive) = line.strip_prefix('%') {
                let (keyword, rest) = split_word(directive);
                if SECTIONS.contains(&keyword) {
                    break;
                }
                if keyword == "global" || keyword == "define" {
                    preamble.define(rest);
                }
                continue;
            }

            if let Some((tag, value)) = parse_tag(line) {
                preamble.add_tag(tag, value);
            }
        }

        preamble
    }

    /// Raw value of the first `tag` (case-insensitive).
    pub fn tag(&self, tag: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(tag))
            .map(|(_, value)| value.as_str())
    }

    /// Value of `tag` with macros expanded.
    pub fn expanded_tag(&self, tag: &str) -> Result<Option<String>, SpecfileError> {
        self.tag(tag).map(|value| self.expand(value)).transpose()
    }

    /// Raw body of a macro.
    pub fn macro_body(&self, name: &str) -> Option<&str> {
        self.macros.get(name).map(String::as_str)
    }

    /// Expands macro references in `value`.
    ///
    /// Supports `%name`, `%{name}`, `%{?name}`, `%{?name:text}`,
    /// `%{!?name:text}` and `%%`. References to undefined macros are kept
    /// as written.
    pub fn expand(&self, value: &str) -> Result<String, SpecfileError> {
        self.expand_at(value, 0)
    }

    fn define(&mut self, definition: &str) {
        let (name, body) = split_word(definition);
        // Parametric macros: `%define name(opts) body`
        let name = name.split('(').next().unwrap_or(name);
        if !name.is_empty() {
            self.macros.insert(name.to_string(), body.trim().to_string());
        }
    }

    fn add_tag(&mut self, tag: &str, value: &str) {
        let tag = tag.to_ascii_lowercase();
        if MACRO_TAGS.contains(&tag.as_str()) {
            self.macros.insert(tag.clone(), value.to_string());
        }
        self.tags.push((tag, value.to_string()));
    }

    fn expand_at(&self, value: &str, depth: usize) -> Result<String, SpecfileError> {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(tail) = after.strip_prefix('%') {
                out.push('%');
                rest = tail;
            } else if let Some(braced) = after.strip_prefix('{') {
                let Some(end) = matching_brace(braced) else {
                    // Unterminated reference, keep the remainder as is.
                    out.push_str(&rest[pos..]);
                    rest = "";
                    break;
                };
                out.push_str(&self.expand_braced(&braced[..end], depth)?);
                rest = &braced[end + 1..];
            } else {
                let len = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                let name = &after[..len];
                match self.macros.get(name) {
                    Some(body) if !name.is_empty() => {
                        out.push_str(&self.expand_macro(name, body, depth)?)
                    }
                    _ => {
                        out.push('%');
                        out.push_str(name);
                    }
                }
                rest = &after[len..];
            }
        }

        out.push_str(rest);
        Ok(out)
    }

    fn expand_braced(&self, inner: &str, depth: usize) -> Result<String, SpecfileError> {
        if let Some(condition) = inner.strip_prefix("!?") {
            let (name, text) = split_conditional(condition);
            return match (self.macros.contains_key(name), text) {
                (false, Some(text)) => self.expand_at(text, depth + 1),
                _ => Ok(String::new()),
            };
        }

        if let Some(condition) = inner.strip_prefix('?') {
            let (name, text) = split_conditional(condition);
            return match (self.macros.get(name), text) {
                (Some(_), Some(text)) => self.expand_at(text, depth + 1),
                (Some(body), None) => self.expand_macro(name, body, depth),
                (None, _) => Ok(String::new()),
            };
        }

        match self.macros.get(inner) {
            Some(body) => self.expand_macro(inner, body, depth),
            None => Ok(format!("%{{{inner}}}")),
        }
    }

    fn expand_macro(&self, name: &str, body: &str, depth: usize) -> Result<String, SpecfileError> {
        if depth >= MAX_EXPANSION_DEPTH {
            return Err(SpecfileError::MacroRecursion {
                name: name.to_string(),
            });
        }
        self.expand_at(body, depth + 1)
    }
}

/// Joins backslash-continued lines.
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        match line.strip_suffix('\\') {
            Some(head) => {
                current.push_str(head);
                current.push('\n');
            }
            None => {
                current.push_str(line);
                lines.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

/// `Tag: value` lines. Tag names may carry a qualifier, as in `Requires(post)`.
fn parse_tag(line: &str) -> Option<(&str, &str)> {
    let (tag, value) = line.split_once(':')?;
    let tag = tag.trim();
    let valid = tag.starts_with(|c: char| c.is_ascii_alphabetic())
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '(' | ')' | '_' | ','));
    valid.then(|| (tag, value.trim()))
}

fn split_conditional(condition: &str) -> (&str, Option<&str>) {
    match condition.split_once(':') {
        Some((name, text)) => (name, Some(text)),
        None => (condition, None),
    }
}

/// Byte offset of the `}` closing an already opened brace.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}
