//! Parameter-string grammar
//!
//! Effects and button maps are written as a name followed by a
//! parenthesised list of `key=value` pairs:
//!
//! ```text
//! rgbgradient(duration=1000; colors=0%: red, 50%: blue)
//! buttons(button1=button2; button2=button1; layout=qwerty)
//! ```
//!
//! Only the syntax is checked here. Which keys are allowed and what ranges
//! their values may take is up to the handler that asked for the parse.

use std::collections::BTreeMap;

use crate::color::{self, GradientStop, Rgb};
use crate::error::EncodeError;

/// How to interpret the raw text of one parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamParser {
    /// Keep the trimmed text
    Text,
    /// Decimal integer
    Integer,
    /// Comma-separated decimal integers
    IntegerList,
    /// Gradient stops (`0%: red, 50%: blue`)
    Gradient,
    /// Comma-separated colors
    ColorList,
}

/// A parsed parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    IntegerList(Vec<i64>),
    Gradient(Vec<GradientStop>),
    Colors(Vec<Rgb>),
}

/// A parsed `name(key=value; ...)` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamExpr {
    /// Lowercased expression name
    pub name: String,
    /// Lowercased keys mapped to their parsed values
    pub values: BTreeMap<String, ParamValue>,
}

impl ParamExpr {
    /// Get a parameter by (lowercase) key
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Keys that are not in `allowed`
    pub fn unknown_keys<'a>(&'a self, allowed: &[&str]) -> Vec<&'a str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(|key| !allowed.contains(key))
            .collect()
    }
}

/// Split `name(body)` into its name and body, if the text has that shape
fn split_envelope(expr: &str) -> Option<(&str, &str)> {
    let expr = expr.trim();
    let open = expr.find('(')?;
    let body = expr.strip_suffix(')')?.get(open + 1..)?;
    let name = expr[..open].trim();

    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid_name.then_some((name, body))
}

/// Check whether the text looks like a parameter expression
pub fn is_param_expr(expr: &str) -> bool {
    split_envelope(expr).is_some()
}

/// Parse a parameter expression
///
/// `parsers` selects a [`ParamParser`] per key; keys without an entry are
/// kept as [`ParamValue::Text`].
pub fn parse_params(
    expr: &str,
    parsers: &[(&str, ParamParser)],
) -> Result<ParamExpr, EncodeError> {
    let (name, body) = split_envelope(expr).ok_or_else(|| {
        EncodeError::MalformedParameterString(format!(
            "expected \"name(key=value; ...)\", got \"{}\"",
            expr.trim()
        ))
    })?;

    let mut values = BTreeMap::new();
    for entry in body.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (key, raw) = entry.split_once('=').ok_or_else(|| {
            EncodeError::MalformedParameterString(format!("missing \"=\" in \"{entry}\""))
        })?;
        let key = key.trim().to_ascii_lowercase();
        let raw = raw.trim();
        if key.is_empty() {
            return Err(EncodeError::MalformedParameterString(format!(
                "empty parameter name in \"{entry}\""
            )));
        }

        let parser = parsers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
            .map_or(ParamParser::Text, |(_, p)| *p);

        let value = parse_value(parser, raw).map_err(|reason| {
            EncodeError::MalformedParameterString(format!("{key}={raw}: {reason}"))
        })?;
        values.insert(key, value);
    }

    Ok(ParamExpr {
        name: name.to_ascii_lowercase(),
        values,
    })
}

fn parse_integer(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("\"{}\" is not an integer", raw.trim()))
}

fn parse_value(parser: ParamParser, raw: &str) -> Result<ParamValue, String> {
    match parser {
        ParamParser::Text => Ok(ParamValue::Text(raw.to_string())),
        ParamParser::Integer => parse_integer(raw).map(ParamValue::Integer),
        ParamParser::IntegerList => raw
            .split(',')
            .filter(|item| !item.trim().is_empty())
            .map(parse_integer)
            .collect::<Result<Vec<_>, _>>()
            .map(ParamValue::IntegerList),
        ParamParser::Gradient => color::parse_gradient(raw)
            .map(ParamValue::Gradient)
            .map_err(|e| e.to_string()),
        ParamParser::ColorList => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| color::parse_color(item).map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, _>>()
            .map(ParamValue::Colors),
    }
}
