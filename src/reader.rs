/*!
# Character reader over a queue of input sources

The parser core is fed decoded characters, not bytes: byte decoding is
the job of whatever does the I/O. The [`Reader`] wraps an ordered queue
of string fragments, hands out one character at a time with
single-character lookahead, tracks the line/column position and rejects
codepoints which are forbidden by the active XML version.

New fragments may be appended at any time via [`Reader::feed()`]; this
is what makes the templated parsing mode work, where parsing suspends at
the end of a fragment and resumes once the next one has been fed.
*/
use std::collections::VecDeque;

use crate::chars::XmlChar;
use crate::error::{Error, Position, Result};
use crate::event::XmlVersion;

/// Ordered queue of input fragments.
///
/// Fragments are consumed front to back; a fragment which has been read
/// completely is dropped. Appending is legal at any time.
struct SourceQueue {
	q: VecDeque<String>,
	/// byte offset into the front fragment
	offset: usize,
}

impl SourceQueue {
	fn new() -> SourceQueue {
		SourceQueue {
			q: VecDeque::new(),
			offset: 0,
		}
	}

	fn push<T: Into<String>>(&mut self, src: T) {
		let src = src.into();
		if !src.is_empty() {
			self.q.push_back(src);
		}
	}

	fn clear(&mut self) {
		self.q.clear();
		self.offset = 0;
	}

	/// Next char in the queue, without consuming it.
	fn peek(&mut self) -> Option<char> {
		loop {
			let front = self.q.front()?;
			match front[self.offset..].chars().next() {
				Some(ch) => return Some(ch),
				None => {
					self.q.pop_front();
					self.offset = 0;
				}
			}
		}
	}

	/// Consume one char from the queue.
	fn advance(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.offset += ch.len_utf8();
		Some(ch)
	}
}

/**
# Character-at-a-time reader with position tracking

Exposes [`peek()`](Reader::peek), [`next_opt()`](Reader::next_opt) and
[`next_char()`](Reader::next_char) over the source queue. Every consumed
character is validated against the `Char` production of the active XML
version; forbidden codepoints fail with production "2".

Lines advance on a line feed; a lone carriage return not followed by a
line feed also counts as a line terminator. This is position accounting
only, the characters are passed through unchanged (line ending
normalisation happens in the content readers of the parser).
*/
pub struct Reader {
	sources: SourceQueue,
	position: Position,
	version: XmlVersion,
	closed: bool,
}

impl Reader {
	pub fn new() -> Reader {
		Reader {
			sources: SourceQueue::new(),
			position: Position::START,
			version: XmlVersion::V1_0,
			closed: false,
		}
	}

	/// Construct a reader over a single source fragment.
	pub fn from_str<T: Into<String>>(src: T) -> Reader {
		let mut r = Reader::new();
		r.feed(src);
		r
	}

	/// Append a source fragment to the input queue.
	///
	/// # Panics
	///
	/// If the reader has been closed.
	pub fn feed<T: Into<String>>(&mut self, src: T) {
		if self.closed {
			panic!("cannot feed a closed reader");
		}
		self.sources.push(src);
	}

	/// Drop all remaining input and refuse further feeding.
	pub fn close(&mut self) {
		self.sources.clear();
		self.closed = true;
	}

	/// Position of the next character to be consumed.
	pub fn position(&self) -> Position {
		self.position
	}

	/// Switch the character validation to the given XML version.
	///
	/// Called by the parser once the XML declaration has been read.
	pub fn set_version(&mut self, version: XmlVersion) {
		self.version = version;
	}

	pub fn version(&self) -> XmlVersion {
		self.version
	}

	/// Whether the codepoint is allowed under the active XML version.
	pub fn is_valid(&self, c: char) -> bool {
		match self.version {
			XmlVersion::V1_0 => c.is_xml10_char(),
			XmlVersion::V1_1 => c.is_xml11_char(),
		}
	}

	/// Next character without consuming it, if any input is left.
	pub fn peek(&mut self) -> Option<char> {
		self.sources.peek()
	}

	/// Consume one character, or return `None` at the end of the
	/// currently fed input.
	pub fn next_opt(&mut self) -> Result<Option<char>> {
		let ch = match self.sources.peek() {
			None => return Ok(None),
			Some(ch) => ch,
		};
		if !self.is_valid(ch) {
			return Err(Error::syntax("2", "forbidden codepoint", self.position));
		}
		self.sources.advance();
		match ch {
			'\n' => {
				self.position.line += 1;
				self.position.column = 1;
			}
			// a lone CR terminates the line as well; CRLF is counted
			// once, by the LF
			'\r' if self.sources.peek() != Some('\n') => {
				self.position.line += 1;
				self.position.column = 1;
			}
			_ => {
				self.position.column += 1;
			}
		}
		Ok(Some(ch))
	}

	/// Consume one character; end of input is an error.
	pub fn next_char(&mut self) -> Result<char> {
		match self.next_opt()? {
			Some(ch) => Ok(ch),
			None => Err(Error::eof("1", self.position)),
		}
	}

	/// Consume the next character, which must be `expected`.
	pub fn expect_char(
		&mut self,
		expected: char,
		production: &'static str,
		message: &'static str,
	) -> Result<()> {
		let at = self.position;
		match self.next_opt()? {
			Some(ch) if ch == expected => Ok(()),
			Some(_) => Err(Error::syntax(production, message, at)),
			None => Err(Error::eof(production, at)),
		}
	}

	/// Consume the given literal character sequence.
	pub fn expect_str(
		&mut self,
		expected: &'static str,
		production: &'static str,
		message: &'static str,
	) -> Result<()> {
		for ch in expected.chars() {
			self.expect_char(ch, production, message)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reader_reads_across_fragment_boundaries() {
		let mut r = Reader::from_str("fo");
		r.feed("ob");
		assert_eq!(r.next_char().unwrap(), 'f');
		assert_eq!(r.next_char().unwrap(), 'o');
		assert_eq!(r.next_char().unwrap(), 'o');
		assert_eq!(r.next_char().unwrap(), 'b');
		assert!(r.next_opt().unwrap().is_none());
	}

	#[test]
	fn reader_peek_does_not_consume() {
		let mut r = Reader::from_str("x");
		assert_eq!(r.peek(), Some('x'));
		assert_eq!(r.peek(), Some('x'));
		assert_eq!(r.next_char().unwrap(), 'x');
		assert_eq!(r.peek(), None);
	}

	#[test]
	fn reader_tracks_lines_and_columns() {
		let mut r = Reader::from_str("a\nbc");
		assert_eq!(r.position(), Position::new(1, 1));
		r.next_char().unwrap();
		assert_eq!(r.position(), Position::new(1, 2));
		r.next_char().unwrap();
		assert_eq!(r.position(), Position::new(2, 1));
		r.next_char().unwrap();
		assert_eq!(r.position(), Position::new(2, 2));
	}

	#[test]
	fn reader_counts_crlf_as_one_line() {
		let mut r = Reader::from_str("a\r\nb");
		r.next_char().unwrap();
		r.next_char().unwrap(); // CR, followed by LF: no line bump yet
		assert_eq!(r.position().line, 1);
		r.next_char().unwrap(); // LF
		assert_eq!(r.position(), Position::new(2, 1));
	}

	#[test]
	fn reader_counts_lone_cr_as_line_terminator() {
		let mut r = Reader::from_str("a\rb");
		r.next_char().unwrap();
		r.next_char().unwrap();
		assert_eq!(r.position(), Position::new(2, 1));
	}

	#[test]
	fn reader_rejects_forbidden_codepoints() {
		let mut r = Reader::from_str("a\x01b");
		r.next_char().unwrap();
		let err = r.next_char().err().unwrap();
		assert!(matches!(err.kind, crate::error::ErrorKind::Syntax("2", _)));
		assert_eq!(err.position, Position::new(1, 2));
	}

	#[test]
	fn reader_allows_c0_controls_under_xml11() {
		let mut r = Reader::from_str("\x01");
		r.set_version(XmlVersion::V1_1);
		assert_eq!(r.next_char().unwrap(), '\x01');
	}

	#[test]
	fn reader_eof_is_production_1() {
		let mut r = Reader::from_str("");
		let err = r.next_char().err().unwrap();
		assert!(matches!(err.kind, crate::error::ErrorKind::Syntax("1", _)));
	}

	#[test]
	fn closed_reader_returns_no_input() {
		let mut r = Reader::from_str("leftover");
		r.close();
		assert_eq!(r.peek(), None);
	}
}
