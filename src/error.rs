/*!
# Error types

This module holds the error types returned by the various functions of
this crate. Every error carries the line/column position at which it was
raised.
*/
use std::error;
use std::fmt;
use std::result::Result as StdResult;

/// Line/column position in the character input.
///
/// Lines and columns are counted from one. The position of an event is
/// the position of its first character; the position of an error is the
/// reader position at the moment of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
	pub line: usize,
	pub column: usize,
}

impl Position {
	/// Position of the first character of a document.
	pub const START: Position = Position { line: 1, column: 1 };

	pub const fn new(line: usize, column: usize) -> Position {
		Position { line, column }
	}
}

impl fmt::Display for Position {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}:{}", self.line, self.column)
	}
}

/// Violation of a well-formedness constraint of XML 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WFError {
	/// Ending tag name does not match the opening tag
	/// (WFC: Element Type Match).
	ElementMismatch,

	/// Reference to an entity which has not been declared
	/// (WFC: Entity Declared).
	UndeclaredEntity,

	/// Entity whose replacement text refers to itself, directly or
	/// indirectly (WFC: No Recursion).
	RecursiveEntity,
}

impl error::Error for WFError {}

impl fmt::Display for WFError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			WFError::ElementMismatch => f.write_str("start and end tag do not match"),
			WFError::UndeclaredEntity => f.write_str("use of undeclared entity"),
			WFError::RecursiveEntity => f.write_str("recursive entity expansion"),
		}
	}
}

/// Violation of a namespace constraint of Namespaces in XML 1.0/1.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NWFError {
	/// Use of an undeclared namespace prefix (NSC: Prefix Declared).
	UndeclaredPrefix,

	/// Attempt to undeclare a namespace under XML 1.0, where only
	/// XML 1.1 permits it (NSC: No Prefix Undeclaring).
	NoPrefixUndeclaring,

	/// Two attributes of the same element resolve to the same
	/// `(uri, localname)` pair (NSC: Attributes Unique).
	///
	/// **Note:** This is also emitted for literally identical attribute
	/// names, even though that is technically a well-formedness
	/// constraint.
	DuplicateAttribute,

	/// Declared namespace URI is empty where that is not an undeclaring.
	EmptyNamespaceUri,
}

impl error::Error for NWFError {}

impl fmt::Display for NWFError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			NWFError::UndeclaredPrefix => f.write_str("use of undeclared namespace prefix"),
			NWFError::NoPrefixUndeclaring => {
				f.write_str("namespace undeclaring is not allowed in XML 1.0")
			}
			NWFError::DuplicateAttribute => f.write_str("duplicate attribute"),
			NWFError::EmptyNamespaceUri => f.write_str("namespace URI is empty"),
		}
	}
}

/// Classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// A violation of the XML 1.0/1.1 grammar.
	///
	/// The first member is the number of the violated production in the
	/// XML 1.0 specification; the second is a human-readable message.
	Syntax(&'static str, &'static str),

	/// A violation of a well-formedness constraint.
	NotWellFormed(WFError),

	/// A violation of a namespace constraint.
	NotNamespaceWellFormed(NWFError),

	/// Mismatch between template placeholders and supplied arguments.
	///
	/// This is not part of the XML error taxonomy; it can only be raised
	/// by the templated parsing entrypoints.
	Template(&'static str),
}

impl fmt::Display for ErrorKind {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			ErrorKind::Syntax(prod, msg) => write!(f, "syntax error [{}]: {}", prod, msg),
			ErrorKind::NotWellFormed(e) => write!(f, "not-well-formed: {}", e),
			ErrorKind::NotNamespaceWellFormed(e) => {
				write!(f, "not namespace-well-formed: {}", e)
			}
			ErrorKind::Template(msg) => write!(f, "template error: {}", msg),
		}
	}
}

/// Error raised by the parser or one of the resolvers.
///
/// All errors are fatal; after the first error, the input queue is
/// closed and the parser will keep returning the same error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
	pub kind: ErrorKind,
	pub position: Position,
}

pub type Result<T> = StdResult<T, Error>;

impl Error {
	pub fn new(kind: ErrorKind, position: Position) -> Error {
		Error { kind, position }
	}

	/// Construct a grammar violation of the given production.
	pub fn syntax(production: &'static str, message: &'static str, position: Position) -> Error {
		Error::new(ErrorKind::Syntax(production, message), position)
	}

	pub(crate) fn wf(e: WFError, position: Position) -> Error {
		Error::new(ErrorKind::NotWellFormed(e), position)
	}

	pub(crate) fn nwf(e: NWFError, position: Position) -> Error {
		Error::new(ErrorKind::NotNamespaceWellFormed(e), position)
	}

	/// Construct the error for an end-of-input in the middle of the
	/// given production.
	pub(crate) fn eof(production: &'static str, position: Position) -> Error {
		Error::syntax(production, "unexpected end of input", position)
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} at {}", self.kind, self.position)
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match &self.kind {
			ErrorKind::NotWellFormed(e) => Some(e),
			ErrorKind::NotNamespaceWellFormed(e) => Some(e),
			ErrorKind::Syntax(..) | ErrorKind::Template(..) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn error_display_includes_production_and_position() {
		let e = Error::syntax("14", "']]>' not allowed in character data", Position::new(3, 7));
		assert_eq!(
			e.to_string(),
			"syntax error [14]: ']]>' not allowed in character data at 3:7"
		);
	}

	#[test]
	fn wf_error_display() {
		let e = Error::wf(WFError::ElementMismatch, Position::START);
		assert_eq!(e.to_string(), "not-well-formed: start and end tag do not match at 1:1");
	}
}
