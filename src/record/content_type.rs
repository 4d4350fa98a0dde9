//! Content-type validation
//!
//! Accepts `type/subtype` optionally followed by `;attribute=value`
//! parameters (RFC 2616 §14.17, with RFC 2045 token rules):
//!
//! ```text
//! media-type = token "/" token *( OWS ";" OWS attribute "=" value ) [";"]
//! value      = token | quoted-string
//! ```
//!
//! Whitespace around the parts is tolerated, a single trailing `;` is
//! ignored, and an attribute may appear only once (case-insensitive).

use crate::error::{NabiaError, Result};

/// Characters that may never appear inside a token
const TSPECIALS: &str = "()<>@,;:\\\"/[]?=";

/// A parsed media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    main_type: String,
    subtype: String,
    params: Vec<(String, String)>,
}

impl MediaType {
    /// Top-level type, lower-cased (`text` in `text/plain`)
    pub fn main_type(&self) -> &str {
        &self.main_type
    }

    /// Subtype, lower-cased (`plain` in `text/plain`)
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// `type/subtype` without parameters
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main_type, self.subtype)
    }

    /// Parameters in declaration order; names are lower-cased
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Look up a parameter value by (case-insensitive) name
    pub fn param(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Check that a content-type is well formed
pub fn validate(content_type: &str) -> Result<()> {
    parse(content_type).map(|_| ())
}

/// Parse a content-type into its media type and parameters
pub fn parse(content_type: &str) -> Result<MediaType> {
    if content_type.is_empty() {
        return Err(invalid("content-type cannot be empty".to_string()));
    }

    let (essence, mut rest) = match content_type.find(';') {
        Some(idx) => (&content_type[..idx], &content_type[idx..]),
        None => (content_type, ""),
    };

    let essence = essence.trim();
    let (main_type, subtype) = essence
        .split_once('/')
        .ok_or_else(|| invalid(format!("{:?} must contain a '/'", content_type)))?;

    if !is_token(main_type) || !is_token(subtype) {
        return Err(invalid(format!("{:?} is not a valid media type", essence)));
    }

    let mut params: Vec<(String, String)> = Vec::new();

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let after_semicolon = rest
            .strip_prefix(';')
            .ok_or_else(|| invalid(format!("unexpected content after media type: {:?}", rest)))?
            .trim_start();

        // Trailing semicolon
        if after_semicolon.is_empty() {
            break;
        }

        let (attribute, after_attribute) = consume_token(after_semicolon);
        if attribute.is_empty() {
            return Err(invalid(format!("missing parameter name in {:?}", content_type)));
        }

        let after_equals = after_attribute
            .trim_start()
            .strip_prefix('=')
            .ok_or_else(|| invalid(format!("parameter {:?} has no value", attribute)))?
            .trim_start();

        let (value, remaining) = consume_value(after_equals)
            .ok_or_else(|| invalid(format!("parameter {:?} has an invalid value", attribute)))?;

        let attribute = attribute.to_ascii_lowercase();
        if params.iter().any(|(k, _)| *k == attribute) {
            return Err(invalid(format!("duplicate parameter {:?}", attribute)));
        }

        params.push((attribute, value));
        rest = remaining;
    }

    Ok(MediaType {
        main_type: main_type.to_ascii_lowercase(),
        subtype: subtype.to_ascii_lowercase(),
        params,
    })
}

fn invalid(message: String) -> NabiaError {
    NabiaError::InvalidContentType(message)
}

fn is_token_char(c: char) -> bool {
    c.is_ascii() && !c.is_ascii_control() && c != ' ' && !TSPECIALS.contains(c)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

/// Split the leading token off `s`
fn consume_token(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|&(_, c)| !is_token_char(c))
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Split a token or quoted-string value off `s`
///
/// Returns `None` when no value is present or a quoted string is malformed.
fn consume_value(s: &str) -> Option<(String, &str)> {
    let Some(quoted) = s.strip_prefix('"') else {
        let (token, rest) = consume_token(s);
        if token.is_empty() {
            return None;
        }
        return Some((token.to_string(), rest));
    };

    let mut value = String::new();
    let mut chars = quoted.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Some((value, &quoted[idx + 1..])),
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(escaped);
            }
            '\r' | '\n' => return None,
            _ => value.push(c),
        }
    }

    // No closing quote
    None
}
