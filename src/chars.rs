/*!
# Character classification for the XML productions

One extension trait over [`char`] answers the membership questions the
lexer and the checked string types ask: XML whitespace, the
version-specific `Char` production, NCName start and continuation
characters, and the PubidLiteral alphabet. The ranges are those of the
XML 1.0/1.1 and Namespaces in XML recommendations.

The string validators at the bottom back the `TryFrom` constructors of
[`crate::strings`].
*/

/// Membership tests against the XML grammar productions.
pub trait XmlChar {
	/// Whitespace (XML 1.0 § 2.3 [3]).
	fn is_xml_space(self) -> bool;

	/// The `Char` production of XML 1.0 (§ 2.2 [2]).
	fn is_xml10_char(self) -> bool;

	/// The `Char` production of XML 1.1 (§ 2.2 [2]).
	///
	/// Unlike XML 1.0, the C0 controls are allowed, except NUL.
	fn is_xml11_char(self) -> bool;

	/// First character of an NCName (Namespaces in XML 1.0 § 3 [4]).
	fn is_ncname_start(self) -> bool;

	/// Any character of an NCName (Namespaces in XML 1.0 § 3 [5]).
	fn is_ncname(self) -> bool;

	/// A PubidChar other than the apostrophe (XML 1.0 § 2.3 [13]).
	///
	/// The apostrophe is left to the literal reader, which admits it
	/// only inside double-quoted literals.
	fn is_pubid(self) -> bool;
}

impl XmlChar for char {
	fn is_xml_space(self) -> bool {
		matches!(self, ' ' | '\t' | '\r' | '\n')
	}

	fn is_xml10_char(self) -> bool {
		matches!(self,
			'\u{9}' | '\u{a}' | '\u{d}'
			| '\u{20}'..='\u{d7ff}'
			| '\u{e000}'..='\u{fffd}'
			| '\u{10000}'..='\u{10ffff}')
	}

	fn is_xml11_char(self) -> bool {
		matches!(self,
			'\u{1}'..='\u{d7ff}'
			| '\u{e000}'..='\u{fffd}'
			| '\u{10000}'..='\u{10ffff}')
	}

	fn is_ncname_start(self) -> bool {
		matches!(self,
			'A'..='Z' | '_' | 'a'..='z'
			| '\u{c0}'..='\u{d6}'
			| '\u{d8}'..='\u{f6}'
			| '\u{f8}'..='\u{2ff}'
			| '\u{370}'..='\u{37d}'
			| '\u{37f}'..='\u{1fff}'
			| '\u{200c}'..='\u{200d}'
			| '\u{2070}'..='\u{218f}'
			| '\u{2c00}'..='\u{2fef}'
			| '\u{3001}'..='\u{d7ff}'
			| '\u{f900}'..='\u{fdcf}'
			| '\u{fdf0}'..='\u{fffd}'
			| '\u{10000}'..='\u{effff}')
	}

	fn is_ncname(self) -> bool {
		self.is_ncname_start()
			|| matches!(self,
				'-' | '.' | '0'..='9' | '\u{b7}'
				| '\u{300}'..='\u{36f}'
				| '\u{203f}'..='\u{2040}')
	}

	fn is_pubid(self) -> bool {
		matches!(self,
			'\u{a}' | '\u{d}'
			| ' '..='!'
			| '#'..='%'
			| '('..=';'
			| '='
			| '?'..='Z'
			| '_'
			| 'a'..='z')
	}
}

/// Error from the string validator functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
	/// The production requires at least one character.
	Empty,
	/// The contained character is not allowed by the production.
	Forbidden(char),
}

/// Check that a str is a valid NCName.
pub fn validate_ncname(s: &str) -> Result<(), ValidationError> {
	let mut chars = s.chars();
	let first = chars.next().ok_or(ValidationError::Empty)?;
	if !first.is_ncname_start() {
		return Err(ValidationError::Forbidden(first));
	}
	match chars.find(|c| !c.is_ncname()) {
		Some(c) => Err(ValidationError::Forbidden(c)),
		None => Ok(()),
	}
}

/// Check that a str is a valid Name with at most one colon (the unsplit
/// form of a QName): an NCName, or two NCNames joined by a colon.
pub fn validate_name(s: &str) -> Result<(), ValidationError> {
	match s.find(':') {
		None => validate_ncname(s),
		Some(pos) => {
			validate_ncname(&s[..pos])?;
			// a second colon surfaces from here as a forbidden char
			validate_ncname(&s[pos + 1..])
		}
	}
}

/// Check that a str consists only of XML 1.0 `Char`s.
pub fn validate_cdata(s: &str) -> Result<(), ValidationError> {
	match s.chars().find(|c| !c.is_xml10_char()) {
		Some(c) => Err(ValidationError::Forbidden(c)),
		None => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ncname_start_chars_are_ncname_chars() {
		for cp in 0x0..=0x10ffffu32 {
			if let Some(ch) = std::char::from_u32(cp) {
				if ch.is_ncname_start() && !ch.is_ncname() {
					panic!("U+{:x} may start a name but not continue one", cp)
				}
			}
		}
	}

	#[test]
	fn xml10_chars_are_xml11_chars() {
		for cp in 0x0..=0x10ffffu32 {
			if let Some(ch) = std::char::from_u32(cp) {
				if ch.is_xml10_char() && !ch.is_xml11_char() {
					panic!("U+{:x} is valid in 1.0 but not in 1.1", cp)
				}
			}
		}
	}

	#[test]
	fn xml11_admits_c0_controls_but_not_nul() {
		assert!(!'\u{0}'.is_xml10_char());
		assert!(!'\u{0}'.is_xml11_char());
		assert!(!'\u{1}'.is_xml10_char());
		assert!('\u{1}'.is_xml11_char());
	}

	#[test]
	fn pubid_excludes_the_apostrophe_and_braces() {
		assert!('-'.is_pubid());
		assert!(':'.is_pubid());
		assert!('@'.is_pubid());
		assert!(!'\''.is_pubid());
		assert!(!'{'.is_pubid());
		assert!(!'<'.is_pubid());
	}

	#[test]
	fn validate_ncname_rejects_colon_and_empty() {
		validate_ncname("foo-bar.baz").unwrap();
		assert_eq!(
			validate_ncname("foo:bar"),
			Err(ValidationError::Forbidden(':'))
		);
		assert_eq!(validate_ncname(""), Err(ValidationError::Empty));
		assert_eq!(
			validate_ncname("1foo"),
			Err(ValidationError::Forbidden('1'))
		);
	}

	#[test]
	fn validate_name_accepts_a_single_colon() {
		validate_name("foo").unwrap();
		validate_name("foo:bar").unwrap();
		assert_eq!(
			validate_name("foo:bar:baz"),
			Err(ValidationError::Forbidden(':'))
		);
		assert_eq!(validate_name(":bar"), Err(ValidationError::Empty));
		assert_eq!(validate_name("bar:"), Err(ValidationError::Empty));
	}

	#[test]
	fn validate_cdata_rejects_control_chars() {
		validate_cdata("foo bar <fnord!>").unwrap();
		assert_eq!(
			validate_cdata("\x01"),
			Err(ValidationError::Forbidden('\x01'))
		);
	}
}
