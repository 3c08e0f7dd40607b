use serde::{Deserialize, Serialize};
use std::fmt;

/// An image model advertised by the upstream service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub default: bool,
}

/// A form value that may arrive as text, a number or a boolean.
///
/// Browser forms send everything as strings while JSON clients send native
/// types, so the boundary accepts all of them and coerces later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LooseValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseValue {
    /// Coerces to a strictly positive integer. Zero, negatives, fractions and
    /// garbage all yield `None`.
    pub fn as_positive_u32(&self) -> Option<u32> {
        match self {
            LooseValue::Int(n) if *n > 0 => u32::try_from(*n).ok(),
            LooseValue::Float(f) => float_to_u32(*f),
            LooseValue::Text(s) => {
                let s = s.trim();
                match s.parse::<u32>() {
                    Ok(0) => None,
                    Ok(n) => Some(n),
                    Err(_) => s.parse::<f64>().ok().and_then(float_to_u32),
                }
            }
            _ => None,
        }
    }

    pub fn as_flag(&self) -> bool {
        match self {
            LooseValue::Bool(b) => *b,
            LooseValue::Int(n) => *n == 1,
            LooseValue::Float(_) => false,
            LooseValue::Text(s) => matches!(s.trim(), "true" | "on" | "1"),
        }
    }

    /// Text content with surrounding whitespace removed, or `None` when blank.
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            LooseValue::Text(s) => s.trim().to_string(),
            LooseValue::Int(n) => n.to_string(),
            LooseValue::Float(f) => f.to_string(),
            LooseValue::Bool(b) => b.to_string(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl fmt::Display for LooseValue {
    /// Renders the value as submitted, without trimming.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LooseValue::Bool(b) => write!(f, "{}", b),
            LooseValue::Int(n) => write!(f, "{}", n),
            LooseValue::Float(x) => write!(f, "{}", x),
            LooseValue::Text(s) => f.write_str(s),
        }
    }
}

fn float_to_u32(f: f64) -> Option<u32> {
    if f.is_finite() && f >= 1.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}
