//! Text rendering and parsing of DBX number and flag records
//!
//! Binary DBX does not say whether a 4-byte word is an integer or a float.
//! Words are rendered as integers when their bit pattern cannot be a sensible
//! float (tiny positive values, negative values just below zero, NaN and
//! infinity patterns), and text is parsed back with the same rule.

use super::document::{DbxNumbers, DbxValue};
use super::{
    DOUBLES, EMPTYNUMS, HALVES, HASHES, NONZERO_LANE, NONZERO_WORD, TYPE2, ZERO_LANE,
};
use crate::error::{Error, Result};

/// Render a number vector as `/`-separated text.
///
/// `field` is the value of the record's first attribute (its field name).
pub(crate) fn render_numbers(numbers: &DbxNumbers, field: &str) -> String {
    match numbers {
        DbxNumbers::Halves(values) => join(values.iter().map(ToString::to_string)),
        DbxNumbers::Doubles(values) => join(values.iter().map(|v| format_float(*v))),
        DbxNumbers::Words(words) => {
            let lane = padding_lane(words);
            join(words.iter().enumerate().map(|(i, &word)| match lane {
                Some(text) if i % 4 == 3 => text.to_string(),
                _ => render_word(word, field),
            }))
        }
    }
}

/// Render a flag byte.
pub(crate) fn render_flag(value: u8) -> String {
    match value {
        1 => "true".to_string(),
        0 => "false".to_string(),
        other => other.to_string(),
    }
}

/// Render a single 4-byte word as int or float.
pub(crate) fn render_word(word: u32, field: &str) -> String {
    let signed = word as i32;
    if HASHES.contains(&field) || is_int_word(i128::from(signed)) {
        signed.to_string()
    } else {
        format_float(f32::from_bits(word))
    }
}

/// Vectors of 4-component words often pad the fourth lane with `00000000` or
/// `CDCDCDCD`; if every fourth word is the same filler, name it.
fn padding_lane(words: &[u32]) -> Option<&'static str> {
    if words.is_empty() || words.len() % 4 != 0 {
        return None;
    }
    let mut lane = words.iter().skip(3).step_by(4);
    if lane.clone().all(|&w| w == 0) {
        Some(ZERO_LANE)
    } else if lane.all(|&w| w == NONZERO_WORD) {
        Some(NONZERO_LANE)
    } else {
        None
    }
}

/// Integers whose bit pattern stays an integer in text form.
fn is_int_word(value: i128) -> bool {
    (value >> 24) == 0 || matches!(value >> 23, 255 | -1)
}

/// Shortest round-tripping text, always with a decimal point for finite values.
fn format_float<F: ToString>(value: F) -> String {
    let mut text = value.to_string();
    if text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        text.push_str(".0");
    }
    text
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join("/")
}

/// Decide how a leaf element's text is stored.
///
/// Only records with a single `name` attribute carry numbers or flags; all
/// other leaves, and any text that does not parse as numbers, are strings.
pub(crate) fn classify_leaf(attributes: &[(String, String)], content: &str) -> Result<DbxValue> {
    let field = match attributes {
        [(key, value)] if key == "name" && !TYPE2.contains(&value.as_str()) => value.as_str(),
        _ => return Ok(DbxValue::String(content.to_string())),
    };

    match content {
        "true" => return Ok(DbxValue::Flag(1)),
        "false" => return Ok(DbxValue::Flag(0)),
        _ => {}
    }

    if field == "ChannelCount" {
        return content
            .trim()
            .parse::<u8>()
            .map(DbxValue::Flag)
            .map_err(|_| invalid("channel count", field, content));
    }

    if content.is_empty() {
        return Ok(if EMPTYNUMS.contains(&field) {
            DbxValue::Numbers(DbxNumbers::Words(Vec::new()))
        } else {
            DbxValue::String(String::new())
        });
    }

    let items: Vec<&str> = content.split('/').map(str::trim).collect();

    if HALVES.contains(&field) {
        let values = items
            .iter()
            .map(|item| item.parse::<u16>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid("short int", field, content))?;
        return Ok(DbxValue::Numbers(DbxNumbers::Halves(values)));
    }

    if DOUBLES.contains(&field) {
        let values = items
            .iter()
            .map(|item| item.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid("double float", field, content))?;
        return Ok(DbxValue::Numbers(DbxNumbers::Doubles(values)));
    }

    if HASHES.contains(&field) {
        return match items
            .iter()
            .map(|item| item.parse::<i32>())
            .collect::<std::result::Result<Vec<_>, _>>()
        {
            Ok(values) => Ok(DbxValue::Numbers(DbxNumbers::Words(
                values.into_iter().map(|v| v as u32).collect(),
            ))),
            Err(_) if field == "Id" => Ok(DbxValue::String(content.to_string())),
            Err(_) => Err(invalid("hash int", field, content)),
        };
    }

    let mut words = Vec::with_capacity(items.len());
    for item in items {
        if item == ZERO_LANE {
            words.push(0);
        } else if item == NONZERO_LANE {
            words.push(NONZERO_WORD);
        } else if let Ok(value) = item.parse::<i128>() {
            if !is_int_word(value) {
                return Err(invalid("integer", field, item));
            }
            words.push(value as i32 as u32);
        } else {
            match parse_float_word(item) {
                Some(Ok(word)) => words.push(word),
                Some(Err(kind)) => return Err(invalid(kind, field, item)),
                None => return Ok(DbxValue::String(content.to_string())),
            }
        }
    }

    Ok(DbxValue::Numbers(DbxNumbers::Words(words)))
}

/// Parse a float item into a word; `None` if the text is not a number.
fn parse_float_word(item: &str) -> Option<std::result::Result<u32, &'static str>> {
    let wide = item.parse::<f64>().ok()?;
    let narrow = item.parse::<f32>().ok()?;

    if narrow.is_infinite() && wide.is_finite() {
        return Some(Err("float (too large)"));
    }
    let word = narrow.to_bits();
    // Would be rendered back as an integer
    if word >> 24 == 0 && word != 0 {
        return Some(Err("float (too small)"));
    }
    Some(Ok(word))
}

fn invalid(kind: &'static str, field: &str, value: &str) -> Error {
    Error::InvalidNumber {
        kind,
        name: field.to_string(),
        value: value.to_string(),
    }
}
