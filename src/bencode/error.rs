use thiserror::Error;

/// Longest slice of input quoted back in an error message.
pub const SNIPPET_LEN: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
	#[error("invalid string")]
	InvalidString,

	#[error("invalid string length")]
	InvalidStringLength,

	#[error("invalid integer")]
	InvalidInteger,

	#[error("invalid integer value")]
	InvalidIntegerValue,

	#[error("unmatched '{delimiter}' delimiter")]
	UnmatchedDelimiter { delimiter: char },

	#[error("dictionary key is not a string")]
	NonStringKey,

	#[error("dictionary key has no value")]
	MissingValue,

	#[error("nesting too deep")]
	NestingTooDeep,

	#[error("trailing data after value")]
	TrailingData,
}

/// A decoding failure: what went wrong, the input around it and the 1-based
/// column it was detected at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error at column {column}: {kind} near '{snippet}'")]
pub struct DecodeError {
	pub kind: ErrorKind,
	pub snippet: String,
	pub column: usize,
}

impl DecodeError {
	/// Builds an error quoting `input[start..end]`, cut to `SNIPPET_LEN` bytes.
	pub(crate) fn new(kind: ErrorKind, input: &[u8], start: usize, end: usize) -> Self {
		let start = start.min(input.len());
		let end = end.clamp(start, input.len());
		let cut = end.min(start + SNIPPET_LEN);

		let mut snippet = String::from_utf8_lossy(&input[start..cut]).into_owned();
		if cut < end {
			snippet.push_str("...");
		}

		DecodeError {
			kind,
			snippet,
			column: start + 1,
		}
	}
}
