use std::collections::BTreeMap;

use log::debug;

use super::error::{DecodeError, ErrorKind};
use crate::bencode::bvalue::BValue;

/// Deepest list/dictionary nesting accepted.
const MAX_DEPTH: usize = 256;

/// Decodes exactly one value. Bytes left over after it are an error.
///
/// Lists and dictionaries may nest up to 256 levels; deeper input fails with
/// `NestingTooDeep` instead of exhausting the stack.
pub fn decode(input: &[u8]) -> Result<BValue, DecodeError> {
    let mut decoder = Decoder::new(input);
    let value = decoder.decode_value(0)?;

    if decoder.pos != input.len() {
        return Err(decoder.error(ErrorKind::TrailingData, input.len()));
    }
    Ok(value)
}

/// Decodes the first value in `input` and returns how many bytes it took.
pub fn decode_bencode(input: &[u8]) -> Result<(usize, BValue), DecodeError> {
    let mut decoder = Decoder::new(input);
    let value = decoder.decode_value(0)?;
    Ok((decoder.pos, value))
}

/// Recursive-descent parser over an immutable buffer.
///
/// Dictionaries keep the last value when a key repeats within one literal.
struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn new(input: &'a [u8]) -> Self {
        Decoder { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Position of the next `byte` at or after the cursor.
    fn find(&self, byte: u8) -> Option<usize> {
        self.input[self.pos..]
            .iter()
            .position(|&b| b == byte)
            .map(|offset| self.pos + offset)
    }

    /// Error at the cursor, quoting the input up to `end`.
    fn error(&self, kind: ErrorKind, end: usize) -> DecodeError {
        DecodeError::new(kind, self.input, self.pos, end)
    }

    /// Error pointing back at the structure opened at `start`.
    fn error_at(&self, kind: ErrorKind, start: usize) -> DecodeError {
        DecodeError::new(kind, self.input, start, self.pos + 1)
    }

    fn unmatched(&self, delimiter: u8, start: usize) -> DecodeError {
        let kind = ErrorKind::UnmatchedDelimiter {
            delimiter: delimiter as char,
        };
        DecodeError::new(kind, self.input, start, start + 1)
    }

    fn decode_value(&mut self, depth: usize) -> Result<BValue, DecodeError> {
        match self.peek() {
            Some(b'i') => self.decode_integer().map(BValue::Integer),
            Some(b'l') => self.decode_list(depth),
            Some(b'd') => self.decode_dict(depth),
            // everything else is either a string or garbage
            _ => self.decode_string().map(BValue::ByteString),
        }
    }

    /// `<length>:<bytes>`
    fn decode_string(&mut self) -> Result<Vec<u8>, DecodeError> {
        let start = self.pos;
        let end_of_input = self.input.len();

        if !self.peek().map_or(false, |b| b.is_ascii_digit()) {
            return Err(self.error(ErrorKind::InvalidString, end_of_input));
        }

        let colon = self
            .find(b':')
            .ok_or_else(|| self.error(ErrorKind::InvalidString, end_of_input))?;

        let length = parse_length(&self.input[start..colon])
            .ok_or_else(|| self.error(ErrorKind::InvalidStringLength, colon + 1))?;

        let data_start = colon + 1;
        let data_end = data_start
            .checked_add(length)
            .filter(|&end| end <= end_of_input)
            .ok_or_else(|| self.error(ErrorKind::InvalidStringLength, end_of_input))?;

        self.pos = data_end;
        Ok(self.input[data_start..data_end].to_vec())
    }

    /// `i<number>e`
    fn decode_integer(&mut self) -> Result<i64, DecodeError> {
        let start = self.pos;
        let end = self.find(b'e').ok_or_else(|| self.unmatched(b'i', start))?;

        let body = &self.input[start + 1..end];
        if body.is_empty() || body == b"-" {
            return Err(self.error(ErrorKind::InvalidInteger, end + 1));
        }

        let value = parse_integer(body)
            .ok_or_else(|| self.error(ErrorKind::InvalidIntegerValue, end + 1))?;

        self.pos = end + 1;
        Ok(value)
    }

    /// `l<values>e`
    fn decode_list(&mut self, depth: usize) -> Result<BValue, DecodeError> {
        let start = self.pos;
        if depth >= MAX_DEPTH {
            return Err(self.error(ErrorKind::NestingTooDeep, start + 1));
        }
        self.pos += 1; // skip 'l'

        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => return Err(self.unmatched(b'l', start)),
                Some(b'e') => break,
                Some(_) => items.push(self.decode_value(depth + 1)?),
            }
        }

        self.pos += 1; // skip 'e'
        Ok(BValue::List(items))
    }

    /// `d<key><value>...e`, keys must be strings.
    fn decode_dict(&mut self, depth: usize) -> Result<BValue, DecodeError> {
        let start = self.pos;
        if depth >= MAX_DEPTH {
            return Err(self.error(ErrorKind::NestingTooDeep, start + 1));
        }
        self.pos += 1; // skip 'd'

        let mut map = BTreeMap::new();
        loop {
            match self.peek() {
                None => return Err(self.unmatched(b'd', start)),
                Some(b'e') => break,
                Some(b) if !b.is_ascii_digit() => {
                    return Err(self.error_at(ErrorKind::NonStringKey, start));
                }
                Some(_) => {}
            }

            let key_start = self.pos;
            let key = self.decode_string()?;

            match self.peek() {
                None => return Err(self.unmatched(b'd', start)),
                Some(b'e') => return Err(self.error_at(ErrorKind::MissingValue, start)),
                Some(_) => {}
            }

            let value = self.decode_value(depth + 1)?;
            if map.contains_key(&key) {
                debug!(
                    "duplicate key '{}' at column {}, keeping the last value",
                    String::from_utf8_lossy(&key),
                    key_start + 1
                );
            }
            map.insert(key, value);
        }

        self.pos += 1; // skip 'e'
        Ok(BValue::Dict(map))
    }
}

/// All-digit length prefix of a string. No sign, leading zeros tolerated.
fn parse_length(digits: &[u8]) -> Option<usize> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0usize, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add((b - b'0') as usize)
    })
}

/// Canonical base-10 integer: optional '-', no leading zeros, no "-0".
fn parse_integer(body: &[u8]) -> Option<i64> {
    let (negative, digits) = match body.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, body),
    };

    if digits.is_empty() || !digits.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits[0] == b'0' && (digits.len() > 1 || negative) {
        return None;
    }

    // negatives accumulate downwards so i64::MIN is reachable
    digits.iter().try_fold(0i64, |acc, &b| {
        let digit = (b - b'0') as i64;
        let acc = acc.checked_mul(10)?;
        if negative {
            acc.checked_sub(digit)
        } else {
            acc.checked_add(digit)
        }
    })
}
