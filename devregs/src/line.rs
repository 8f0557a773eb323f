//! classify a single line of a devregs file
use crate::types::DEFAULT_WIDTH;
use thiserror::Error;

/// field declaration as read from the input, `start <= stop`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub start: u32,
    pub stop: u32,
}

/// register declaration as read from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDecl {
    pub name: String,
    pub address: String,
    pub width: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// blank or comment-only
    Comment,
    Register(RegisterDecl),
    Field(FieldDecl),
    ParseError(LineError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("field {0} missing bitfield")]
    MissingBitfield(String),
    #[error("invalid bitfield {0}")]
    InvalidBitfield(String),
    #[error("invalid bit number {0}")]
    InvalidBit(String),
    #[error("invalid register: expected `NAME ADDRESS[.WIDTH]`, got {0}")]
    InvalidRegister(String),
    #[error("unrecognized line {0}")]
    Unrecognized(String),
}

/// classify one raw line
///
/// everything after `#` is dropped, the rest is trimmed and upper-cased before
/// matching. never fails: malformed input comes back as `Line::ParseError`.
pub fn classify(raw: &str) -> Line {
    let stripped = match raw.find('#') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let line = stripped.trim().to_uppercase();

    let result = match line.chars().next() {
        None => return Line::Comment,
        Some(':') => parse_field(&line[1..]).map(Line::Field),
        Some(c) if c == '_' || c.is_ascii_uppercase() => {
            parse_register(&line).map(Line::Register)
        }
        Some(_) => Err(LineError::Unrecognized(line.clone())),
    };

    result.unwrap_or_else(Line::ParseError)
}

/// `NAME:BITS` (leading `:` already removed)
fn parse_field(body: &str) -> Result<FieldDecl, LineError> {
    let parts: Vec<&str> = body.split(':').collect();
    let [name, bitspec] = parts[..] else {
        return Err(LineError::MissingBitfield(body.to_string()));
    };

    let bits: Vec<&str> = bitspec.split('-').collect();
    let (first, second) = match bits[..] {
        [bit] => {
            let bit = parse_bit(bit)?;
            (bit, bit)
        }
        [a, b] => (parse_bit(a)?, parse_bit(b)?),
        _ => return Err(LineError::InvalidBitfield(bitspec.to_string())),
    };

    Ok(FieldDecl {
        name: name.to_string(),
        start: first.min(second),
        stop: first.max(second),
    })
}

fn parse_bit(token: &str) -> Result<u32, LineError> {
    let token = token.trim();
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LineError::InvalidBit(token.to_string()));
    }
    token
        .parse()
        .map_err(|_| LineError::InvalidBit(token.to_string()))
}

/// `NAME ADDRESS[.WIDTH]`
fn parse_register(line: &str) -> Result<RegisterDecl, LineError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [name, address_spec] = tokens[..] else {
        return Err(LineError::InvalidRegister(line.to_string()));
    };

    let mut segments = address_spec.split('.');
    let address = segments.next().unwrap_or_default();
    let width = match segments.next() {
        Some(width) if !width.is_empty() => width,
        _ => DEFAULT_WIDTH,
    };

    Ok(RegisterDecl {
        name: name.to_string(),
        address: address.to_string(),
        width: width.to_string(),
    })
}
