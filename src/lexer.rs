/*!
# Lexical primitives and markup classification

The building blocks the pull parser is made of: small functions which
read one production each from the [`Reader`], and the markup tokenizer
which classifies what follows a `<`.

All functions fail fast with the production number of the violated
grammar rule; none of them recover or resynchronise.
*/
use crate::chars::XmlChar;
use crate::error::{Error, Result};
use crate::reader::Reader;
use crate::strings::{CData, NCName, Name};
use crate::tree::ValuePart;

/// Consume zero or more whitespace characters; return whether any was
/// consumed.
pub fn skip_space(r: &mut Reader) -> Result<bool> {
	let mut any = false;
	while let Some(c) = r.peek() {
		if !c.is_xml_space() {
			break;
		}
		r.next_opt()?;
		any = true;
	}
	Ok(any)
}

/// Consume whitespace, requiring at least one character of it.
pub fn require_space(r: &mut Reader, production: &'static str, message: &'static str) -> Result<()> {
	let at = r.position();
	if !skip_space(r)? {
		return Err(Error::syntax(production, message, at));
	}
	Ok(())
}

/// Read an NCName (production "5" minus colons).
pub fn read_ncname(r: &mut Reader) -> Result<NCName> {
	let at = r.position();
	match r.peek() {
		None => return Err(Error::eof("5", at)),
		Some(c) if !c.is_ncname_start() => {
			return Err(Error::syntax("5", "expected name start character", at))
		}
		Some(_) => (),
	}
	let mut s = String::new();
	s.push(r.next_char()?);
	while let Some(c) = r.peek() {
		if !c.is_ncname() {
			break;
		}
		s.push(c);
		r.next_opt()?;
	}
	Ok(unsafe { NCName::from_string_unchecked(s) })
}

/// Read a QName: an NCName, optionally followed by a colon and a second
/// NCName.
pub fn read_qname(r: &mut Reader) -> Result<(Option<NCName>, NCName)> {
	let first = read_ncname(r)?;
	if r.peek() == Some(':') {
		r.next_opt()?;
		let local = read_ncname(r)?;
		Ok((Some(first), local))
	} else {
		Ok((None, first))
	}
}

/// Read a QName in its unsplit [`Name`] form.
pub fn read_name(r: &mut Reader) -> Result<Name> {
	let (prefix, local) = read_qname(r)?;
	Ok(match prefix {
		None => local.as_name(),
		Some(prefix) => prefix.with_suffix(&local),
	})
}

/// Read the opening delimiter of a quoted literal (`"` or `'`).
pub fn read_quote(r: &mut Reader, production: &'static str) -> Result<char> {
	let at = r.position();
	match r.next_opt()? {
		Some(c) if c == '"' || c == '\'' => Ok(c),
		Some(_) => Err(Error::syntax(production, "expected quoted literal", at)),
		None => Err(Error::eof(production, at)),
	}
}

/// Read a simple quoted literal up to the matching delimiter, without
/// reference processing (SystemLiteral and the XML declaration
/// pseudo-attributes).
pub fn read_literal(r: &mut Reader, production: &'static str) -> Result<CData> {
	let at = r.position();
	let delim = read_quote(r, production)?;
	let mut s = String::new();
	loop {
		match r.next_opt()? {
			None => return Err(Error::eof(production, at)),
			Some(c) if c == delim => break,
			Some(c) => s.push(c),
		}
	}
	Ok(unsafe { CData::from_string_unchecked(s) })
}

/// Read a PubidLiteral (production "12"), which restricts the allowed
/// character set and excludes `'` inside a `'…'` literal.
pub fn read_pubid_literal(r: &mut Reader) -> Result<CData> {
	let at = r.position();
	let delim = read_quote(r, "12")?;
	let mut s = String::new();
	loop {
		let cat = r.position();
		match r.next_opt()? {
			None => return Err(Error::eof("12", at)),
			Some(c) if c == delim => break,
			Some('\'') if delim == '"' => s.push('\''),
			Some(c) if c.is_pubid() => s.push(c),
			Some(_) => {
				return Err(Error::syntax(
					"13",
					"forbidden character in public identifier",
					cat,
				))
			}
		}
	}
	Ok(unsafe { CData::from_string_unchecked(s) })
}

/// Read the body of a character reference after `&#` has been consumed:
/// decimal or (after `x`) hexadecimal digits, terminated by `;`.
///
/// The denoted codepoint must be a valid character under the reader's
/// active XML version.
pub fn read_char_ref(r: &mut Reader) -> Result<char> {
	let at = r.position();
	let radix: u32 = if r.peek() == Some('x') {
		r.next_opt()?;
		16
	} else {
		10
	};
	let mut digits = String::new();
	loop {
		match r.peek() {
			Some(c)
				if (radix == 10 && c.is_ascii_digit())
					|| (radix == 16 && c.is_ascii_hexdigit()) =>
			{
				digits.push(c);
				r.next_opt()?;
			}
			_ => break,
		}
	}
	if digits.is_empty() {
		return Err(Error::syntax(
			"66",
			"expected digits in character reference",
			r.position(),
		));
	}
	r.expect_char(';', "66", "character reference must end with ';'")?;
	let ch = u32::from_str_radix(&digits, radix)
		.ok()
		.and_then(std::char::from_u32)
		.ok_or_else(|| Error::syntax("2", "character reference to forbidden codepoint", at))?;
	if !r.is_valid(ch) {
		return Err(Error::syntax(
			"2",
			"character reference to forbidden codepoint",
			at,
		));
	}
	Ok(ch)
}

/// Push `c` onto `buf`, folding CR and CRLF into a single LF.
pub fn push_line_normalized(r: &mut Reader, buf: &mut String, c: char) -> Result<()> {
	if c == '\r' {
		if r.peek() == Some('\n') {
			r.next_opt()?;
		}
		buf.push('\n');
	} else {
		buf.push(c);
	}
	Ok(())
}

/// Read a comment body after `<!--` has been consumed. `--` is not
/// allowed inside; the comment ends at `-->`.
pub fn read_comment_body(r: &mut Reader) -> Result<CData> {
	let at = r.position();
	let mut s = String::new();
	loop {
		match r.next_opt()? {
			None => return Err(Error::eof("15", at)),
			Some('-') => {
				if r.peek() == Some('-') {
					r.next_opt()?;
					r.expect_char('>', "15", "'--' not allowed inside a comment")?;
					break;
				}
				s.push('-');
			}
			Some(c) => push_line_normalized(r, &mut s, c)?,
		}
	}
	Ok(unsafe { CData::from_string_unchecked(s) })
}

/// Read a processing instruction body after the target: optional
/// whitespace, then everything up to `?>`.
pub fn read_pi_body(r: &mut Reader) -> Result<CData> {
	let at = r.position();
	let mut s = String::new();
	let had_space = skip_space(r)?;
	if !had_space {
		// without separating whitespace, only the `?>` may follow
		r.expect_str("?>", "16", "expected '?>' or whitespace after PI target")?;
		return Ok(unsafe { CData::from_string_unchecked(s) });
	}
	loop {
		match r.next_opt()? {
			None => return Err(Error::eof("16", at)),
			Some('?') if r.peek() == Some('>') => {
				r.next_opt()?;
				break;
			}
			Some(c) => push_line_normalized(r, &mut s, c)?,
		}
	}
	Ok(unsafe { CData::from_string_unchecked(s) })
}

/// Keyword of a `<![…[` section: either a literal name or a parameter
/// entity reference which resolves to one.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionName {
	Name(NCName),
	PERef(NCName),
}

/// Classification of the markup following a `<`.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupToken {
	/// `<name`: start tag opener. Attributes and the closing `>`/`/>`
	/// are read by the parser.
	Start((Option<NCName>, NCName)),
	/// `</name>`: complete end tag.
	End((Option<NCName>, NCName)),
	/// `<?target`: processing instruction opener; the body is read
	/// separately.
	PI(NCName),
	/// `<!NAME`: declaration opener (DOCTYPE, ELEMENT, ATTLIST, …).
	Decl(Name),
	/// `<!--…-->`: complete comment.
	Comment(CData),
	/// `<![NAME[` or `<![%pe;[`: section opener.
	Section(SectionName),
}

/// Classify and read the markup construct after a `<` has been
/// consumed.
pub fn read_markup(r: &mut Reader) -> Result<MarkupToken> {
	let at = r.position();
	match r.peek() {
		None => Err(Error::eof("40", at)),
		Some('/') => {
			r.next_opt()?;
			let name = read_qname(r)?;
			skip_space(r)?;
			r.expect_char('>', "42", "expected '>' after end tag name")?;
			Ok(MarkupToken::End(name))
		}
		Some('?') => {
			r.next_opt()?;
			Ok(MarkupToken::PI(read_ncname(r)?))
		}
		Some('!') => {
			r.next_opt()?;
			match r.peek() {
				Some('-') => {
					r.next_opt()?;
					r.expect_char('-', "15", "expected '<!--'")?;
					Ok(MarkupToken::Comment(read_comment_body(r)?))
				}
				Some('[') => {
					r.next_opt()?;
					skip_space(r)?;
					let name = if r.peek() == Some('%') {
						r.next_opt()?;
						let name = read_ncname(r)?;
						r.expect_char(';', "69", "parameter entity reference must end with ';'")?;
						SectionName::PERef(name)
					} else {
						SectionName::Name(read_ncname(r)?)
					};
					skip_space(r)?;
					r.expect_char('[', "19", "expected '[' after section keyword")?;
					Ok(MarkupToken::Section(name))
				}
				Some(c) if c.is_ncname_start() => Ok(MarkupToken::Decl(read_name(r)?)),
				Some(_) => Err(Error::syntax("29", "expected markup declaration", at)),
				None => Err(Error::eof("29", at)),
			}
		}
		Some(c) if c.is_ncname_start() => Ok(MarkupToken::Start(read_qname(r)?)),
		Some(_) => Err(Error::syntax("40", "expected element name after '<'", at)),
	}
}

/// Read a quoted attribute value into an ordered sequence of chunks,
/// applying attribute-value normalisation: CRLF and lone CR become a
/// single space, and tab/LF become spaces. Entity and character
/// references split the chunk.
pub fn read_att_value(r: &mut Reader) -> Result<Vec<ValuePart>> {
	let at = r.position();
	let delim = read_quote(r, "10")?;
	let mut parts = Vec::new();
	let mut buf = String::new();
	loop {
		let cat = r.position();
		match r.next_opt()? {
			None => return Err(Error::eof("10", at)),
			Some(c) if c == delim => break,
			Some('<') => {
				return Err(Error::syntax(
					"10",
					"'<' not allowed in attribute value",
					cat,
				))
			}
			Some('&') => {
				if !buf.is_empty() {
					parts.push(ValuePart::Text(unsafe {
						CData::from_string_unchecked(std::mem::take(&mut buf))
					}));
				}
				if r.peek() == Some('#') {
					r.next_opt()?;
					parts.push(ValuePart::CharRef(read_char_ref(r)?));
				} else {
					let name = read_ncname(r)?;
					r.expect_char(';', "68", "entity reference must end with ';'")?;
					parts.push(ValuePart::EntityRef(name));
				}
			}
			Some('\r') => {
				if r.peek() == Some('\n') {
					r.next_opt()?;
				}
				buf.push(' ');
			}
			Some('\t') | Some('\n') | Some(' ') => buf.push(' '),
			Some(c) => buf.push(c),
		}
	}
	if !buf.is_empty() {
		parts.push(ValuePart::Text(unsafe {
			CData::from_string_unchecked(buf)
		}));
	}
	Ok(parts)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;

	fn reader(s: &str) -> Reader {
		Reader::from_str(s)
	}

	#[test]
	fn skip_space_reports_whether_any_was_consumed() {
		let mut r = reader("  x");
		assert!(skip_space(&mut r).unwrap());
		assert!(!skip_space(&mut r).unwrap());
		assert_eq!(r.peek(), Some('x'));
	}

	#[test]
	fn read_ncname_stops_at_delimiters() {
		let mut r = reader("foo-bar.baz>");
		let name = read_ncname(&mut r).unwrap();
		assert_eq!(name, "foo-bar.baz");
		assert_eq!(r.peek(), Some('>'));
	}

	#[test]
	fn read_ncname_rejects_leading_digit() {
		let mut r = reader("1foo");
		let err = read_ncname(&mut r).err().unwrap();
		assert!(matches!(err.kind, ErrorKind::Syntax("5", _)));
	}

	#[test]
	fn read_qname_splits_on_colon() {
		let mut r = reader("ns:local ");
		let (prefix, local) = read_qname(&mut r).unwrap();
		assert_eq!(prefix.unwrap(), "ns");
		assert_eq!(local, "local");
	}

	#[test]
	fn read_char_ref_decimal_and_hex() {
		let mut r = reader("65;");
		assert_eq!(read_char_ref(&mut r).unwrap(), 'A');
		let mut r = reader("x41;");
		assert_eq!(read_char_ref(&mut r).unwrap(), 'A');
	}

	#[test]
	fn read_char_ref_astral_plane() {
		let mut r = reader("x10000;");
		assert_eq!(read_char_ref(&mut r).unwrap(), '\u{10000}');
	}

	#[test]
	fn read_char_ref_rejects_forbidden_codepoint() {
		let mut r = reader("x0;");
		let err = read_char_ref(&mut r).err().unwrap();
		assert!(matches!(err.kind, ErrorKind::Syntax("2", _)));
		// surrogate
		let mut r = reader("xd800;");
		let err = read_char_ref(&mut r).err().unwrap();
		assert!(matches!(err.kind, ErrorKind::Syntax("2", _)));
	}

	#[test]
	fn read_comment_body_rejects_double_dash() {
		let mut r = reader("a -- b-->");
		let err = read_comment_body(&mut r).err().unwrap();
		assert!(matches!(err.kind, ErrorKind::Syntax("15", _)));
	}

	#[test]
	fn read_comment_body_allows_single_dash() {
		let mut r = reader("a - b-->");
		assert_eq!(read_comment_body(&mut r).unwrap(), "a - b");
	}

	#[test]
	fn read_pi_body_reads_until_close() {
		let mut r = reader(" some body ?>");
		assert_eq!(read_pi_body(&mut r).unwrap(), "some body ");
	}

	#[test]
	fn read_pi_body_allows_empty() {
		let mut r = reader("?>");
		assert_eq!(read_pi_body(&mut r).unwrap(), "");
	}

	#[test]
	fn read_markup_classifies_constructs() {
		let mut r = reader("foo ");
		assert!(matches!(read_markup(&mut r).unwrap(), MarkupToken::Start((None, n)) if n == "foo"));
		let mut r = reader("/foo>");
		assert!(matches!(read_markup(&mut r).unwrap(), MarkupToken::End((None, n)) if n == "foo"));
		let mut r = reader("?pi ");
		assert!(matches!(read_markup(&mut r).unwrap(), MarkupToken::PI(n) if n == "pi"));
		let mut r = reader("!DOCTYPE ");
		assert!(matches!(read_markup(&mut r).unwrap(), MarkupToken::Decl(n) if n == "DOCTYPE"));
		let mut r = reader("!--c-->");
		assert!(matches!(read_markup(&mut r).unwrap(), MarkupToken::Comment(c) if c == "c"));
		let mut r = reader("![CDATA[");
		assert!(matches!(
			read_markup(&mut r).unwrap(),
			MarkupToken::Section(SectionName::Name(n)) if n == "CDATA"
		));
		let mut r = reader("![%cond;[");
		assert!(matches!(
			read_markup(&mut r).unwrap(),
			MarkupToken::Section(SectionName::PERef(n)) if n == "cond"
		));
	}

	#[test]
	fn read_att_value_normalizes_whitespace() {
		let mut r = reader("'a\tb\r\nc\rd'");
		let parts = read_att_value(&mut r).unwrap();
		assert_eq!(parts.len(), 1);
		assert!(matches!(&parts[0], ValuePart::Text(s) if s == "a b c d"));
	}

	#[test]
	fn read_att_value_chunks_references() {
		let mut r = reader("\"a&amp;b&#x41;c\"");
		let parts = read_att_value(&mut r).unwrap();
		assert_eq!(parts.len(), 5);
		assert!(matches!(&parts[0], ValuePart::Text(s) if s == "a"));
		assert!(matches!(&parts[1], ValuePart::EntityRef(n) if n == "amp"));
		assert!(matches!(&parts[2], ValuePart::Text(s) if s == "b"));
		assert!(matches!(&parts[3], ValuePart::CharRef('A')));
		assert!(matches!(&parts[4], ValuePart::Text(s) if s == "c"));
	}

	#[test]
	fn read_att_value_rejects_lt() {
		let mut r = reader("'a<b'");
		let err = read_att_value(&mut r).err().unwrap();
		assert!(matches!(err.kind, ErrorKind::Syntax("10", _)));
	}

	#[test]
	fn read_pubid_literal_restricts_alphabet() {
		let mut r = reader("\"-//W3C//DTD XHTML 1.0//EN\"");
		assert_eq!(read_pubid_literal(&mut r).unwrap(), "-//W3C//DTD XHTML 1.0//EN");
		let mut r = reader("'{bad}'");
		let err = read_pubid_literal(&mut r).err().unwrap();
		assert!(matches!(err.kind, ErrorKind::Syntax("13", _)));
	}
}
