//! Route pattern compilation.
//!
//! # Responsibilities
//! - Parse a path template into literal and variable tokens
//! - Resolve typed variables against the closed type registry
//! - Synthesize bounded fragments for untyped variables
//! - Produce one anchored pattern with named captures per route
//!
//! # Design Decisions
//! - Compilation is a pure function: same template, same output
//! - Malformed placeholders (bad characters, unterminated braces) fall
//!   back to literal text; invalid names and unknown types are errors
//! - The pattern engine is a finite automaton, so no backtracking
//!   controls are emitted; fragment narrowing carries the semantics

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::routing::error::PatternError;

/// Characters treated as separators when they directly precede a variable.
/// A single separator is folded into the variable token instead of the
/// literal text, which keeps adjacent variables unambiguous and lets the
/// static prefix ignore a bare leading separator.
pub const SEPARATORS: &str = "/,;.:-_~+*=@|";

/// Maximum supported length of a variable name, in bytes. Capture-group
/// names longer than this are rejected by common pattern engines.
pub const VARIABLE_MAXIMUM_LENGTH: usize = 32;

/// Flags applied to every compiled pattern. Dotall keeps the `all` type
/// spanning the whole remainder of a path.
pub(crate) const PATTERN_FLAGS: &str = "s";

/// Closed, process-wide registry of variable type tags.
static VAR_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("slug", r"[a-z0-9\-]+"),
        ("hex", "[a-f0-9]+"),
        ("alpha", "[a-z0-9]+"),
        ("letters", "[a-z]+"),
        ("num", "[0-9]+"),
        ("any", "[^/]+"),
        ("all", ".*"),
    ])
});

/// Result of compiling one route template. Computed once per route and
/// cached for the route's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    static_prefix: String,
    regex_body: String,
    flags: String,
    variables: Vec<String>,
}

impl CompiledPattern {
    /// Longest literal text guaranteed to precede any match.
    pub fn static_prefix(&self) -> &str {
        &self.static_prefix
    }

    /// Unanchored pattern body with one named capture per variable.
    pub fn regex_body(&self) -> &str {
        &self.regex_body
    }

    /// Trailing flag set the pattern must be evaluated under.
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Variable names in capture-group order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }

    /// The standalone anchored pattern for this route.
    pub fn full_pattern(&self) -> String {
        format!("{}^{}$", flag_group(&self.flags), self.regex_body)
    }
}

/// Render a flag set as an inline group, empty when no flags apply.
pub(crate) fn flag_group(flags: &str) -> String {
    if flags.is_empty() {
        String::new()
    } else {
        format!("(?{flags})")
    }
}

enum Token {
    Text(String),
    Variable {
        /// Separator folded off the preceding literal, if any.
        prefix: Option<char>,
        regex: String,
        name: String,
    },
}

/// Compile a path template into its pattern parts.
pub fn compile(template: &str) -> Result<CompiledPattern, PatternError> {
    let tokens = tokenize(template)?;
    let variables: Vec<String> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Variable { name, .. } => Some(name.clone()),
            Token::Text(_) => None,
        })
        .collect();

    let mut body = String::new();
    for token in &tokens {
        match token {
            Token::Text(text) => body.push_str(&regex::escape(text)),
            Token::Variable { prefix, regex, name } => {
                if let Some(c) = prefix {
                    body.push_str(&regex::escape(&c.to_string()));
                }
                body.push_str(&format!("(?P<{name}>{regex})"));
            }
        }
    }

    Ok(CompiledPattern {
        static_prefix: static_prefix(&tokens),
        regex_body: body,
        flags: PATTERN_FLAGS.to_string(),
        variables,
    })
}

/// Split the template into literal and variable tokens.
fn tokenize(template: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    let bytes = template.as_bytes();
    let mut pos = 0; // start of the pending literal span
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        let Some((name, type_tag, end)) = parse_placeholder(&template[i..]) else {
            // Not a well-formed placeholder, stays literal.
            i += 1;
            continue;
        };

        if let Some(tag) = type_tag {
            if !VAR_TYPES.contains_key(tag) {
                return Err(PatternError::UnknownType {
                    name: name.to_string(),
                    type_tag: tag.to_string(),
                    pattern: template.to_string(),
                });
            }
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(PatternError::LeadingDigit {
                name: name.to_string(),
                pattern: template.to_string(),
            });
        }
        if seen.contains(&name) {
            return Err(PatternError::DuplicateVariable {
                name: name.to_string(),
                pattern: template.to_string(),
            });
        }
        if name.len() > VARIABLE_MAXIMUM_LENGTH {
            return Err(PatternError::NameTooLong {
                name: name.to_string(),
                max: VARIABLE_MAXIMUM_LENGTH,
                pattern: template.to_string(),
            });
        }
        seen.push(name);

        let preceding = &template[pos..i];
        let separator = preceding
            .chars()
            .next_back()
            .filter(|c| SEPARATORS.contains(*c));

        match separator {
            Some(c) => {
                // The separator itself travels with the variable token.
                if preceding.len() > c.len_utf8() {
                    tokens.push(Token::Text(
                        preceding[..preceding.len() - c.len_utf8()].to_string(),
                    ));
                }
            }
            None => {
                if !preceding.is_empty() {
                    tokens.push(Token::Text(preceding.to_string()));
                }
            }
        }

        let following = &template[i + end..];
        let regex = match type_tag {
            Some(tag) => VAR_TYPES[tag].to_string(),
            None => default_fragment(following),
        };

        tokens.push(Token::Variable {
            prefix: separator,
            regex,
            name: name.to_string(),
        });

        pos = i + end;
        i = pos;
    }

    if pos < template.len() {
        tokens.push(Token::Text(template[pos..].to_string()));
    }

    Ok(tokens)
}

/// Parse `{name}` or `{name:type}` at the start of `rest`. Returns the
/// name, optional type tag, and the byte length of the whole placeholder.
fn parse_placeholder(rest: &str) -> Option<(&str, Option<&str>, usize)> {
    debug_assert!(rest.starts_with('{'));
    let end = rest.find('}')?;
    let inner = &rest[1..end];
    let (name, type_tag) = match inner.split_once(':') {
        Some((name, tag)) => (name, Some(tag)),
        None => (inner, None),
    };
    if name.is_empty() || !name.chars().all(is_name_char) {
        return None;
    }
    Some((name, type_tag, end + 1))
}

fn is_name_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric() || (c as u32) >= 0x80
}

/// Default fragment for an untyped variable: everything up to the path
/// separator, and up to the next concrete separator in the pattern when
/// that differs from `/`. The narrowing keeps a variable from consuming
/// text that belongs to the literal that follows it.
fn default_fragment(following: &str) -> String {
    match find_next_separator(following) {
        Some(c) if c != '/' => format!("[^/{}]+", regex::escape(&c.to_string())),
        _ => "[^/]+".to_string(),
    }
}

/// First static character after the variable that acts as a separator,
/// ignoring any intervening placeholders.
fn find_next_separator(pattern: &str) -> Option<char> {
    let mut rest = pattern;
    let mut stripped = String::new();
    while let Some(open) = rest.find('{') {
        stripped.push_str(&rest[..open]);
        match parse_placeholder(&rest[open..]) {
            Some((_, _, len)) => rest = &rest[open + len..],
            None => {
                stripped.push('{');
                rest = &rest[open + 1..];
            }
        }
    }
    stripped.push_str(rest);

    stripped.chars().next().filter(|c| SEPARATORS.contains(*c))
}

/// Literal text before the first variable token, with a bare separator
/// normalized to empty.
fn static_prefix(tokens: &[Token]) -> String {
    match tokens.first() {
        None => String::new(),
        Some(Token::Variable { prefix, .. }) => match prefix {
            Some('/') | None => String::new(),
            Some(c) => c.to_string(),
        },
        Some(Token::Text(text)) => {
            let mut prefix = text.clone();
            if let Some(Token::Variable { prefix: Some(c), .. }) = tokens.get(1) {
                if *c != '/' {
                    prefix.push(*c);
                }
            }
            prefix
        }
    }
}
