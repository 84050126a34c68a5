/*!
# Event pull parser

The state machine that turns characters into [`XmlEvent`]s. The parser
tracks where in the document it is (prolog, body, epilog), the open
element depth and the active XML version; it drives the markup tokenizer
in [`crate::lexer`] and delegates the internal DTD subset to
[`dtd`].

## Pull contract

[`Parser::next_event`] returns `Ok(Some(event))` in document order,
`Ok(None)` after the final [`XmlEvent::EndDocument`], and errors
indefinitely after the first failure (the parser is *poisoned* and the
input queue is closed, so no further data can leak past an error).

## Partial (templated) parsing

With the `partial` flag set, end-of-input at one of the three splice
points does not fail but yields a placeholder event instead:

- between attributes: [`XmlEvent::ExpectAttributes`]
- after `name=`, before the value: [`XmlEvent::ExpectAttributeValue`]
- in element content: [`XmlEvent::ExpectNodes`]

The consumer reacts by feeding the next source fragment via
[`Parser::feed`] (or [`Parser::feed_final`], which also clears the
`partial` flag) and pulling again; the parser resumes where it stopped.
*/
use std::collections::VecDeque;

use crate::error::{Error, Position, Result};
use crate::event::{ExternalId, XmlEvent, XmlVersion};
use crate::lexer::{
	read_att_value, read_char_ref, read_literal, read_markup, read_name, read_ncname,
	read_pi_body, read_qname, require_space, skip_space, MarkupToken, SectionName,
};
use crate::reader::Reader;
use crate::strings::{CData, NCName};
use crate::tree::{Attribute, QName};

pub mod dtd;

/// Where in the document the parser currently is.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DocPos {
	/// Before the XML declaration.
	Prolog0,
	/// Between the XML declaration and the DOCTYPE.
	Prolog1,
	/// Between the DOCTYPE and the root element.
	Prolog2,
	/// Inside the root element.
	Body,
	/// After the root element.
	Postlog,
	/// After the end of the document.
	End,
}

/// An element header in progress: the state carried across attribute
/// reads, and across placeholder suspensions in partial mode.
struct TagState {
	name: QName,
	position: Position,
	attributes: Vec<Attribute>,
	/// whitespace before the next attribute has already been consumed
	/// (set when resuming after a placeholder)
	space_seen: bool,
}

/**
# XML 1.0/1.1 pull parser

See the [module documentation](self) for the contract.
*/
pub struct Parser {
	reader: Reader,
	pos: DocPos,
	level: usize,
	version: XmlVersion,
	partial: bool,
	started: bool,
	tag: Option<TagState>,
	/// Internal queue for events which will be returned from the
	/// current and potentially future calls to `next_event()`.
	///
	/// Some inputs produce multiple events from a single step (most
	/// notably self-closing tags), which is why the queue exists.
	eventq: VecDeque<XmlEvent>,
	err: Option<Box<Error>>,
}

impl Parser {
	/// Create a parser with an empty input queue.
	pub fn new() -> Parser {
		Parser {
			reader: Reader::new(),
			pos: DocPos::Prolog0,
			level: 0,
			version: XmlVersion::V1_0,
			partial: false,
			started: false,
			tag: None,
			eventq: VecDeque::new(),
			err: None,
		}
	}

	/// Create a parser over a complete document.
	pub fn from_str<T: Into<String>>(src: T) -> Parser {
		let mut p = Parser::new();
		p.feed(src);
		p
	}

	/// Create a partial parser over the first fragment of a templated
	/// document.
	pub fn with_partial<T: Into<String>>(src: T) -> Parser {
		let mut p = Parser::new();
		p.partial = true;
		p.feed(src);
		p
	}

	/// Append a source fragment to the input queue.
	pub fn feed<T: Into<String>>(&mut self, src: T) {
		self.reader.feed(src);
	}

	/// Append the final source fragment and leave partial mode:
	/// subsequent end-of-input is the end of the document.
	pub fn feed_final<T: Into<String>>(&mut self, src: T) {
		self.reader.feed(src);
		self.partial = false;
	}

	/// Whether placeholder events may still be emitted.
	pub fn is_partial(&self) -> bool {
		self.partial
	}

	/// The XML version in effect (set by the XML declaration).
	pub fn version(&self) -> XmlVersion {
		self.version
	}

	/// Current position of the underlying reader.
	pub fn position(&self) -> Position {
		self.reader.position()
	}

	/// Close the input queue and drop all remaining input.
	pub fn close(&mut self) {
		self.reader.close();
	}

	fn emit(&mut self, ev: XmlEvent) {
		self.eventq.push_back(ev);
	}

	/// Poison the parser, making it return the same error for all
	/// eternity.
	fn poison(&mut self, e: Error) {
		self.err = Some(Box::new(e));
	}

	fn check_poison(&self) -> Result<()> {
		if let Some(e) = self.err.as_ref() {
			Err((**e).clone())
		} else {
			Ok(())
		}
	}

	/// Pull the next event.
	pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
		self.check_poison()?;
		loop {
			if let Some(ev) = self.eventq.pop_front() {
				return Ok(Some(ev));
			}
			match self.step() {
				Ok(true) => (),
				Ok(false) => return Ok(None),
				Err(e) => {
					self.poison(e.clone());
					self.reader.close();
					return Err(e);
				}
			}
		}
	}

	/// Iterator adapter over `next_event`.
	pub fn events(&mut self) -> Events<'_> {
		Events {
			parser: self,
			done: false,
		}
	}

	/// Pull all remaining events, invoking `cb` for each.
	pub fn read_all<F: FnMut(XmlEvent)>(&mut self, mut cb: F) -> Result<()> {
		loop {
			match self.next_event()? {
				None => return Ok(()),
				Some(ev) => cb(ev),
			}
		}
	}

	/// Advance the state machine; returns false only at the terminal
	/// state.
	fn step(&mut self) -> Result<bool> {
		if !self.started {
			self.started = true;
			self.emit(XmlEvent::StartDocument {
				position: self.reader.position(),
			});
			return Ok(true);
		}
		if let Some(tag) = self.tag.take() {
			return self.continue_start_tag(tag);
		}
		match self.pos {
			DocPos::Prolog0 | DocPos::Prolog1 | DocPos::Prolog2 => self.step_prolog(),
			DocPos::Body => self.step_body(),
			DocPos::Postlog => self.step_postlog(),
			DocPos::End => Ok(false),
		}
	}

	fn step_prolog(&mut self) -> Result<bool> {
		skip_space(&mut self.reader)?;
		let at = self.reader.position();
		match self.reader.peek() {
			None => Err(Error::syntax("1", "missing root element", at)),
			Some('<') => {
				self.reader.next_opt()?;
				match read_markup(&mut self.reader)? {
					MarkupToken::PI(target) => {
						if target == "xml" {
							if self.pos != DocPos::Prolog0 {
								return Err(Error::syntax(
									"23",
									"xml declaration must come first",
									at,
								));
							}
							self.parse_xml_decl(at)?;
							self.pos = DocPos::Prolog1;
						} else if target.eq_ignore_ascii_case("xml") {
							return Err(Error::syntax("17", "reserved PI target", at));
						} else {
							let data = read_pi_body(&mut self.reader)?;
							self.emit(XmlEvent::ProcessingInstruction {
								position: at,
								target,
								data,
							});
						}
						Ok(true)
					}
					MarkupToken::Decl(name) if name == "DOCTYPE" => {
						if self.pos == DocPos::Prolog2 {
							return Err(Error::syntax(
								"28",
								"only one document type declaration is allowed",
								at,
							));
						}
						self.parse_doctype(at)?;
						self.pos = DocPos::Prolog2;
						Ok(true)
					}
					MarkupToken::Decl(_) => {
						Err(Error::syntax("22", "expected DOCTYPE declaration", at))
					}
					// comments in the prolog are discarded
					MarkupToken::Comment(_) => Ok(true),
					MarkupToken::Start(name) => self.begin_start_tag(name, at),
					MarkupToken::End(_) => {
						Err(Error::syntax("22", "end tag without open element", at))
					}
					MarkupToken::Section(_) => Err(Error::syntax(
						"22",
						"CDATA section not allowed in the prolog",
						at,
					)),
				}
			}
			Some(_) => Err(Error::syntax(
				"27",
				"character data not allowed outside the root element",
				at,
			)),
		}
	}

	/// Parse the remainder of `<?xml …?>` after the target.
	fn parse_xml_decl(&mut self, at: Position) -> Result<()> {
		let r = &mut self.reader;
		require_space(r, "24", "expected whitespace after '<?xml'")?;
		let kat = r.position();
		let kw = read_ncname(r)?;
		if kw != "version" {
			return Err(Error::syntax(
				"24",
				"'<?xml' must be followed by a version attribute",
				kat,
			));
		}
		skip_space(r)?;
		r.expect_char('=', "25", "expected '=' after 'version'")?;
		skip_space(r)?;
		let vat = r.position();
		let value = read_literal(r, "26")?;
		let version = match parse_version(&value) {
			Some(v) => v,
			None => {
				return Err(Error::syntax(
					"26",
					"version must match '1.' followed by digits",
					vat,
				))
			}
		};
		self.version = version;
		r.set_version(version);

		let mut encoding: Option<CData> = None;
		let mut standalone: Option<bool> = None;
		loop {
			let had_space = skip_space(r)?;
			let kat = r.position();
			match r.peek() {
				None => return Err(Error::eof("23", kat)),
				Some('?') => {
					r.next_opt()?;
					r.expect_char('>', "23", "expected '?>' to close the xml declaration")?;
					break;
				}
				Some(_) => {
					if !had_space {
						return Err(Error::syntax(
							"23",
							"expected whitespace or '?>'",
							kat,
						));
					}
					let kw = read_ncname(r)?;
					skip_space(r)?;
					r.expect_char('=', "25", "expected '=' in the xml declaration")?;
					skip_space(r)?;
					let vat = r.position();
					match kw.as_str() {
						"encoding" if encoding.is_none() && standalone.is_none() => {
							let value = read_literal(r, "80")?;
							if !is_encoding_name(&value) {
								return Err(Error::syntax(
									"81",
									"malformed encoding name",
									vat,
								));
							}
							encoding = Some(value);
						}
						"standalone" if standalone.is_none() => {
							let value = read_literal(r, "32")?;
							standalone = Some(match value.as_str() {
								"yes" => true,
								"no" => false,
								_ => {
									return Err(Error::syntax(
										"32",
										"standalone must be 'yes' or 'no'",
										vat,
									))
								}
							});
						}
						_ => {
							return Err(Error::syntax(
								"23",
								"unexpected attribute in the xml declaration",
								kat,
							))
						}
					}
				}
			}
		}
		self.emit(XmlEvent::XmlDeclaration {
			position: at,
			version,
			encoding,
			standalone,
		});
		Ok(())
	}

	/// Parse the remainder of `<!DOCTYPE …>` after the keyword.
	fn parse_doctype(&mut self, at: Position) -> Result<()> {
		let r = &mut self.reader;
		require_space(r, "28", "expected whitespace after DOCTYPE")?;
		let name = read_name(r)?;
		let had_space = skip_space(r)?;
		let mut external_id: Option<ExternalId> = None;
		if had_space {
			match r.peek() {
				Some('S') | Some('P') => {
					external_id = Some(dtd::parse_external_id(r, true)?);
					skip_space(r)?;
				}
				_ => (),
			}
		}
		let mut subset = None;
		if r.peek() == Some('[') {
			subset = Some(dtd::parse_internal_subset(r)?);
			skip_space(r)?;
		}
		r.expect_char('>', "28", "expected '>' to close DOCTYPE")?;
		self.emit(XmlEvent::Doctype {
			position: at,
			name,
			external_id,
			subset,
		});
		Ok(())
	}

	fn begin_start_tag(&mut self, name: (Option<NCName>, NCName), at: Position) -> Result<bool> {
		let (prefix, local) = name;
		self.tag = Some(TagState {
			name: QName::from_parts(prefix, local),
			position: at,
			attributes: Vec::new(),
			space_seen: false,
		});
		Ok(true)
	}

	/// Read attributes and the header close; suspends at the two
	/// attribute splice points in partial mode.
	fn continue_start_tag(&mut self, mut tag: TagState) -> Result<bool> {
		loop {
			let had_space = skip_space(&mut self.reader)? || tag.space_seen;
			tag.space_seen = false;
			let at = self.reader.position();
			match self.reader.peek() {
				None => {
					if self.partial {
						let attributes = std::mem::take(&mut tag.attributes);
						let ev = XmlEvent::ExpectAttributes {
							position: at,
							name: tag.name.clone(),
							attributes,
						};
						tag.space_seen = had_space;
						self.tag = Some(tag);
						self.emit(ev);
						return Ok(true);
					}
					return Err(Error::eof("40", tag.position));
				}
				Some('>') => {
					self.reader.next_opt()?;
					self.emit(XmlEvent::StartElement {
						position: tag.position,
						name: tag.name,
						attributes: tag.attributes,
						empty: false,
					});
					self.level += 1;
					self.pos = DocPos::Body;
					return Ok(true);
				}
				Some('/') => {
					self.reader.next_opt()?;
					self.reader
						.expect_char('>', "44", "expected '>' after '/'")?;
					self.emit(XmlEvent::StartElement {
						position: tag.position,
						name: tag.name.clone(),
						attributes: tag.attributes,
						empty: true,
					});
					// the paired end tag, same name and position
					self.emit(XmlEvent::EndElement {
						position: tag.position,
						name: tag.name,
					});
					if self.level == 0 {
						self.pos = DocPos::Postlog;
					}
					return Ok(true);
				}
				Some(_) => {
					if !had_space {
						return Err(Error::syntax(
							"40",
							"expected whitespace before attribute",
							at,
						));
					}
					let (prefix, local) = read_qname(&mut self.reader)?;
					let attr_name = QName::from_parts(prefix, local);
					skip_space(&mut self.reader)?;
					self.reader
						.expect_char('=', "41", "expected '=' after attribute name")?;
					skip_space(&mut self.reader)?;
					if self.reader.peek().is_none() {
						if self.partial {
							let attributes = std::mem::take(&mut tag.attributes);
							let ev = XmlEvent::ExpectAttributeValue {
								position: self.reader.position(),
								name: tag.name.clone(),
								attributes,
								attribute: attr_name,
							};
							self.tag = Some(tag);
							self.emit(ev);
							return Ok(true);
						}
						return Err(Error::eof("41", at));
					}
					let value = read_att_value(&mut self.reader)?;
					tag.attributes.push(Attribute::new(attr_name, value));
				}
			}
		}
	}

	fn step_body(&mut self) -> Result<bool> {
		let at = self.reader.position();
		match self.reader.peek() {
			None => {
				if self.partial {
					self.emit(XmlEvent::ExpectNodes { position: at });
					return Ok(true);
				}
				Err(Error::eof("43", at))
			}
			Some('<') => {
				self.reader.next_opt()?;
				match read_markup(&mut self.reader)? {
					MarkupToken::Start(name) => self.begin_start_tag(name, at),
					MarkupToken::End((prefix, local)) => {
						self.emit(XmlEvent::EndElement {
							position: at,
							name: QName::from_parts(prefix, local),
						});
						self.level -= 1;
						if self.level == 0 {
							self.pos = DocPos::Postlog;
						}
						Ok(true)
					}
					MarkupToken::PI(target) => {
						if target.eq_ignore_ascii_case("xml") {
							return Err(Error::syntax("17", "reserved PI target", at));
						}
						let data = read_pi_body(&mut self.reader)?;
						self.emit(XmlEvent::ProcessingInstruction {
							position: at,
							target,
							data,
						});
						Ok(true)
					}
					MarkupToken::Comment(data) => {
						self.emit(XmlEvent::Comment { position: at, data });
						Ok(true)
					}
					MarkupToken::Decl(_) => Err(Error::syntax(
						"43",
						"markup declaration not allowed in content",
						at,
					)),
					MarkupToken::Section(SectionName::Name(kw)) if kw == "CDATA" => {
						let data = self.read_cdata_section(at)?;
						self.emit(XmlEvent::Text {
							position: at,
							data,
							cdata: true,
						});
						Ok(true)
					}
					MarkupToken::Section(_) => {
						Err(Error::syntax("19", "expected CDATA section", at))
					}
				}
			}
			Some('&') => {
				self.reader.next_opt()?;
				if self.reader.peek() == Some('#') {
					self.reader.next_opt()?;
					let ch = read_char_ref(&mut self.reader)?;
					self.emit(XmlEvent::CharRef { position: at, ch });
				} else {
					let name = read_ncname(&mut self.reader)?;
					self.reader
						.expect_char(';', "68", "entity reference must end with ';'")?;
					self.emit(XmlEvent::EntityRef { position: at, name });
				}
				Ok(true)
			}
			Some(_) => self.read_text(at),
		}
	}

	/// Read character data up to the next markup or reference,
	/// folding line endings and rejecting a stray `]]>`.
	fn read_text(&mut self, at: Position) -> Result<bool> {
		let mut buf = String::new();
		loop {
			match self.reader.peek() {
				None | Some('<') | Some('&') => break,
				Some(']') => {
					let jat = self.reader.position();
					self.reader.next_opt()?;
					if self.reader.peek() == Some(']') {
						self.reader.next_opt()?;
						if self.reader.peek() == Some('>') {
							return Err(Error::syntax(
								"14",
								"']]>' not allowed in character data",
								jat,
							));
						}
						buf.push_str("]]");
					} else {
						buf.push(']');
					}
				}
				Some('\r') => {
					self.reader.next_opt()?;
					if self.reader.peek() == Some('\n') {
						self.reader.next_opt()?;
					}
					buf.push('\n');
				}
				Some(_) => {
					let c = self.reader.next_char()?;
					buf.push(c);
				}
			}
		}
		self.emit(XmlEvent::Text {
			position: at,
			data: unsafe { CData::from_string_unchecked(buf) },
			cdata: false,
		});
		Ok(true)
	}

	/// Read a CDATA section body after `<![CDATA[`.
	///
	/// Line endings are folded; the literal sequence `&gt;` is
	/// recognised and emitted as `>`, a workaround for documents
	/// produced by escapers which do not special-case CDATA.
	fn read_cdata_section(&mut self, at: Position) -> Result<CData> {
		let r = &mut self.reader;
		let mut buf = String::new();
		loop {
			match r.next_opt()? {
				None => return Err(Error::eof("20", at)),
				Some(']') => {
					if r.peek() != Some(']') {
						buf.push(']');
						continue;
					}
					let mut brackets = 1usize;
					while r.peek() == Some(']') {
						r.next_opt()?;
						brackets += 1;
					}
					if brackets >= 2 && r.peek() == Some('>') {
						r.next_opt()?;
						for _ in 0..brackets - 2 {
							buf.push(']');
						}
						break;
					}
					for _ in 0..brackets {
						buf.push(']');
					}
				}
				Some('&') => {
					let mut matched = 0usize;
					for expected in ['g', 't', ';'].iter() {
						if r.peek() == Some(*expected) {
							r.next_opt()?;
							matched += 1;
						} else {
							break;
						}
					}
					match matched {
						3 => buf.push('>'),
						n => {
							buf.push('&');
							buf.push_str(&"gt;"[..n]);
						}
					}
				}
				Some('\r') => {
					if r.peek() == Some('\n') {
						r.next_opt()?;
					}
					buf.push('\n');
				}
				Some(c) => buf.push(c),
			}
		}
		Ok(unsafe { CData::from_string_unchecked(buf) })
	}

	fn step_postlog(&mut self) -> Result<bool> {
		skip_space(&mut self.reader)?;
		let at = self.reader.position();
		match self.reader.peek() {
			None => {
				self.emit(XmlEvent::EndDocument { position: at });
				self.pos = DocPos::End;
				Ok(true)
			}
			Some('<') => {
				self.reader.next_opt()?;
				match read_markup(&mut self.reader)? {
					MarkupToken::Comment(data) => {
						self.emit(XmlEvent::Comment { position: at, data });
						Ok(true)
					}
					MarkupToken::PI(target) => {
						if target.eq_ignore_ascii_case("xml") {
							return Err(Error::syntax("17", "reserved PI target", at));
						}
						let data = read_pi_body(&mut self.reader)?;
						self.emit(XmlEvent::ProcessingInstruction {
							position: at,
							target,
							data,
						});
						Ok(true)
					}
					MarkupToken::Start(_) => {
						Err(Error::syntax("1", "several root elements", at))
					}
					_ => Err(Error::syntax(
						"1",
						"unexpected markup after the root element",
						at,
					)),
				}
			}
			Some(_) => Err(Error::syntax(
				"27",
				"character data not allowed outside the root element",
				at,
			)),
		}
	}
}

fn parse_version(value: &str) -> Option<XmlVersion> {
	let rest = value.strip_prefix("1.")?;
	if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	Some(if value == "1.1" {
		XmlVersion::V1_1
	} else {
		XmlVersion::V1_0
	})
}

fn is_encoding_name(value: &str) -> bool {
	let mut bytes = value.bytes();
	match bytes.next() {
		Some(b) if b.is_ascii_alphabetic() => (),
		_ => return false,
	}
	bytes.all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
}

/// Iterator over the events of a [`Parser`].
///
/// Yields `Err` once and then stops (the parser is poisoned at that
/// point anyway).
pub struct Events<'p> {
	parser: &'p mut Parser,
	done: bool,
}

impl<'p> Iterator for Events<'p> {
	type Item = Result<XmlEvent>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		match self.parser.next_event() {
			Ok(Some(ev)) => Some(Ok(ev)),
			Ok(None) => {
				self.done = true;
				None
			}
			Err(e) => {
				self.done = true;
				Some(Err(e))
			}
		}
	}
}
