/*!
# Internal DTD subset parser

Reads the markup declarations between the `[` and `]` of a DOCTYPE
declaration: ELEMENT, ATTLIST, ENTITY and NOTATION declarations,
processing instructions, comments, parameter entity references and
conditional sections.

Declarations are recorded, not enforced: content models and attribute
defaults end up in the [`MarkupDecl`] list of the doctype event, and
internal general entities feed the reference resolver. Parameter
entities are accumulated into a local environment and substituted where
they are referenced between declarations.
*/
use std::collections::HashMap;

use crate::error::{Error, Result, WFError};
use crate::event::{
	AttDef, AttDefault, AttType, ContentModel, ContentSpec, EntityDef, ExternalId, MarkupDecl,
	Repeat,
};
use crate::lexer::{
	read_att_value, read_char_ref, read_literal, read_markup, read_name, read_ncname,
	read_pi_body, read_pubid_literal, read_quote, require_space, skip_space, MarkupToken,
	SectionName,
};
use crate::reader::Reader;
use crate::chars::XmlChar;
use crate::strings::{CData, NCName};
use crate::tree::ValuePart;

/// Where a declaration loop ends.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Terminator {
	/// The `]` closing the internal subset.
	Subset,
	/// The `]]>` closing an INCLUDE section.
	Conditional,
	/// The end of a parameter entity replacement text.
	Replacement,
}

/// Parse the internal subset after its opening `[`, consuming the
/// closing `]`. The `>` of the DOCTYPE declaration is left to the
/// caller.
pub fn parse_internal_subset(r: &mut Reader) -> Result<Vec<MarkupDecl>> {
	r.expect_char('[', "28", "expected '[' to open the internal subset")?;
	let mut pes = HashMap::new();
	let mut decls = Vec::new();
	parse_decls(r, &mut pes, &mut decls, Terminator::Subset)?;
	Ok(decls)
}

fn parse_decls(
	r: &mut Reader,
	pes: &mut HashMap<NCName, String>,
	decls: &mut Vec<MarkupDecl>,
	terminator: Terminator,
) -> Result<()> {
	loop {
		skip_space(r)?;
		let at = r.position();
		match r.peek() {
			None => match terminator {
				Terminator::Replacement => return Ok(()),
				Terminator::Subset => return Err(Error::eof("28a", at)),
				Terminator::Conditional => return Err(Error::eof("62", at)),
			},
			Some(']') => {
				r.next_opt()?;
				match terminator {
					Terminator::Subset => return Ok(()),
					Terminator::Conditional => {
						r.expect_str("]>", "62", "expected ']]>' to close the section")?;
						return Ok(());
					}
					Terminator::Replacement => {
						return Err(Error::syntax(
							"28a",
							"']' not allowed in parameter entity replacement",
							at,
						))
					}
				}
			}
			Some('%') => {
				r.next_opt()?;
				let name = read_ncname(r)?;
				r.expect_char(';', "69", "parameter entity reference must end with ';'")?;
				let replacement = match pes.get(&name) {
					Some(text) => text.clone(),
					None => return Err(Error::wf(WFError::UndeclaredEntity, at)),
				};
				let mut sub = Reader::from_str(replacement);
				sub.set_version(r.version());
				parse_decls(&mut sub, pes, decls, Terminator::Replacement)?;
			}
			Some('<') => {
				r.next_opt()?;
				match read_markup(r)? {
					MarkupToken::Decl(name) => match name.as_str() {
						"ELEMENT" => decls.push(parse_element_decl(r)?),
						"ATTLIST" => decls.push(parse_attlist_decl(r)?),
						"ENTITY" => decls.push(parse_entity_decl(r, pes)?),
						"NOTATION" => decls.push(parse_notation_decl(r)?),
						_ => {
							return Err(Error::syntax("29", "unknown markup declaration", at))
						}
					},
					MarkupToken::Comment(_) => (),
					MarkupToken::PI(target) => {
						let data = read_pi_body(r)?;
						decls.push(MarkupDecl::PI { target, data });
					}
					MarkupToken::Section(name) => {
						let keyword = match name {
							SectionName::Name(n) => String::from(n.as_str()),
							SectionName::PERef(n) => match pes.get(&n) {
								Some(text) => text.trim().to_string(),
								None => return Err(Error::wf(WFError::UndeclaredEntity, at)),
							},
						};
						match keyword.as_str() {
							"INCLUDE" => {
								parse_decls(r, pes, decls, Terminator::Conditional)?
							}
							"IGNORE" => skip_ignore_section(r)?,
							_ => {
								return Err(Error::syntax(
									"61",
									"expected INCLUDE or IGNORE",
									at,
								))
							}
						}
					}
					MarkupToken::Start(_) | MarkupToken::End(_) => {
						return Err(Error::syntax(
							"28a",
							"tags are not allowed in the internal subset",
							at,
						))
					}
				}
			}
			Some(_) => {
				return Err(Error::syntax(
					"28a",
					"expected markup declaration",
					at,
				))
			}
		}
	}
}

/// Skip an `<![IGNORE[ … ]]>` section body, honouring nested `<![`/`]]>`
/// pairs. Called after the opening `[` of the section.
fn skip_ignore_section(r: &mut Reader) -> Result<()> {
	let at = r.position();
	let mut depth = 1usize;
	loop {
		match r.next_opt()? {
			None => return Err(Error::eof("63", at)),
			Some('<') => {
				if r.peek() == Some('!') {
					r.next_opt()?;
					if r.peek() == Some('[') {
						r.next_opt()?;
						depth += 1;
					}
				}
			}
			Some(']') => {
				if r.peek() == Some(']') {
					r.next_opt()?;
					if r.peek() == Some('>') {
						r.next_opt()?;
						depth -= 1;
						if depth == 0 {
							return Ok(());
						}
					}
				}
			}
			Some(_) => (),
		}
	}
}

fn read_repeat(r: &mut Reader) -> Result<Repeat> {
	let rep = match r.peek() {
		Some('?') => Repeat::Opt,
		Some('*') => Repeat::Star,
		Some('+') => Repeat::Plus,
		_ => return Ok(Repeat::One),
	};
	r.next_opt()?;
	Ok(rep)
}

/// One content particle: a name or a parenthesised group, with an
/// optional repetition modifier.
fn parse_cp(r: &mut Reader) -> Result<ContentModel> {
	skip_space(r)?;
	if r.peek() == Some('(') {
		r.next_opt()?;
		parse_group(r)
	} else {
		let name = read_name(r)?;
		let rep = read_repeat(r)?;
		Ok(ContentModel::Name(name, rep))
	}
}

/// A choice or sequence group, after its opening `(`.
fn parse_group(r: &mut Reader) -> Result<ContentModel> {
	let first = parse_cp(r)?;
	let mut items = vec![first];
	let mut separator: Option<char> = None;
	loop {
		skip_space(r)?;
		let at = r.position();
		match r.next_opt()? {
			None => return Err(Error::eof("47", at)),
			Some(')') => break,
			Some(c) if c == '|' || c == ',' => {
				match separator {
					None => separator = Some(c),
					Some(prev) if prev == c => (),
					Some(_) => {
						return Err(Error::syntax(
							"49",
							"cannot mix '|' and ',' in one group",
							at,
						))
					}
				}
				items.push(parse_cp(r)?);
			}
			Some(_) => {
				return Err(Error::syntax("47", "expected '|', ',' or ')'", at));
			}
		}
	}
	let rep = read_repeat(r)?;
	Ok(match separator {
		Some('|') => ContentModel::Choice(items, rep),
		_ => ContentModel::Seq(items, rep),
	})
}

/// `<!ELEMENT name contentspec >`, after the `ELEMENT` keyword.
fn parse_element_decl(r: &mut Reader) -> Result<MarkupDecl> {
	require_space(r, "45", "expected whitespace after ELEMENT")?;
	let name = read_name(r)?;
	require_space(r, "45", "expected whitespace after element name")?;
	let at = r.position();
	let content = match r.peek() {
		Some('(') => {
			r.next_opt()?;
			skip_space(r)?;
			if r.peek() == Some('#') {
				r.expect_str("#PCDATA", "51", "expected '#PCDATA'")?;
				let mut names = Vec::new();
				loop {
					skip_space(r)?;
					let at = r.position();
					match r.next_opt()? {
						None => return Err(Error::eof("51", at)),
						Some(')') => break,
						Some('|') => {
							skip_space(r)?;
							names.push(read_name(r)?);
						}
						Some(_) => {
							return Err(Error::syntax("51", "expected '|' or ')'", at))
						}
					}
				}
				if names.is_empty() {
					// the trailing '*' is optional for a bare (#PCDATA)
					if r.peek() == Some('*') {
						r.next_opt()?;
					}
				} else {
					r.expect_char('*', "51", "mixed content must be repeatable")?;
				}
				ContentSpec::Mixed(names)
			} else {
				ContentSpec::Children(parse_group(r)?)
			}
		}
		Some(_) => {
			let kw = read_ncname(r)?;
			match kw.as_str() {
				"EMPTY" => ContentSpec::Empty,
				"ANY" => ContentSpec::Any,
				_ => return Err(Error::syntax("46", "expected EMPTY, ANY or '('", at)),
			}
		}
		None => return Err(Error::eof("46", at)),
	};
	skip_space(r)?;
	r.expect_char('>', "45", "expected '>' to close the element declaration")?;
	Ok(MarkupDecl::Element { name, content })
}

/// An Nmtoken (production "7"): one or more name characters.
fn read_nmtoken(r: &mut Reader) -> Result<CData> {
	let at = r.position();
	let mut s = String::new();
	while let Some(c) = r.peek() {
		if !(c.is_ncname() || c == ':') {
			break;
		}
		s.push(c);
		r.next_opt()?;
	}
	if s.is_empty() {
		return Err(Error::syntax("7", "expected name token", at));
	}
	Ok(unsafe { CData::from_string_unchecked(s) })
}

fn parse_att_type(r: &mut Reader) -> Result<AttType> {
	let at = r.position();
	if r.peek() == Some('(') {
		r.next_opt()?;
		let mut tokens = Vec::new();
		loop {
			skip_space(r)?;
			tokens.push(read_nmtoken(r)?);
			skip_space(r)?;
			let at = r.position();
			match r.next_opt()? {
				None => return Err(Error::eof("59", at)),
				Some('|') => (),
				Some(')') => break,
				Some(_) => return Err(Error::syntax("59", "expected '|' or ')'", at)),
			}
		}
		return Ok(AttType::Enumeration(tokens));
	}
	let kw = read_ncname(r)?;
	Ok(match kw.as_str() {
		"CDATA" => AttType::Cdata,
		"ID" => AttType::Id,
		"IDREF" => AttType::IdRef,
		"IDREFS" => AttType::IdRefs,
		"ENTITY" => AttType::Entity,
		"ENTITIES" => AttType::Entities,
		"NMTOKEN" => AttType::NmToken,
		"NMTOKENS" => AttType::NmTokens,
		"NOTATION" => {
			require_space(r, "58", "expected whitespace after NOTATION")?;
			r.expect_char('(', "58", "expected '(' after NOTATION")?;
			let mut names = Vec::new();
			loop {
				skip_space(r)?;
				names.push(read_ncname(r)?);
				skip_space(r)?;
				let at = r.position();
				match r.next_opt()? {
					None => return Err(Error::eof("58", at)),
					Some('|') => (),
					Some(')') => break,
					Some(_) => return Err(Error::syntax("58", "expected '|' or ')'", at)),
				}
			}
			AttType::Notation(names)
		}
		_ => return Err(Error::syntax("54", "unknown attribute type", at)),
	})
}

fn parse_att_default(r: &mut Reader) -> Result<AttDefault> {
	let at = r.position();
	if r.peek() == Some('#') {
		r.next_opt()?;
		let kw = read_ncname(r)?;
		return Ok(match kw.as_str() {
			"REQUIRED" => AttDefault::Required,
			"IMPLIED" => AttDefault::Implied,
			"FIXED" => {
				require_space(r, "60", "expected whitespace after #FIXED")?;
				AttDefault::Fixed(read_att_value(r)?)
			}
			_ => {
				return Err(Error::syntax(
					"60",
					"expected #REQUIRED, #IMPLIED or #FIXED",
					at,
				))
			}
		});
	}
	Ok(AttDefault::Value(read_att_value(r)?))
}

/// `<!ATTLIST name (attdef)* >`, after the `ATTLIST` keyword.
fn parse_attlist_decl(r: &mut Reader) -> Result<MarkupDecl> {
	require_space(r, "52", "expected whitespace after ATTLIST")?;
	let name = read_name(r)?;
	let mut defs = Vec::new();
	loop {
		let had_space = skip_space(r)?;
		let at = r.position();
		match r.peek() {
			None => return Err(Error::eof("52", at)),
			Some('>') => {
				r.next_opt()?;
				break;
			}
			Some(_) => {
				if !had_space {
					return Err(Error::syntax(
						"53",
						"expected whitespace before attribute definition",
						at,
					));
				}
				let name = read_name(r)?;
				require_space(r, "53", "expected whitespace after attribute name")?;
				let att_type = parse_att_type(r)?;
				require_space(r, "53", "expected whitespace before default declaration")?;
				let default = parse_att_default(r)?;
				defs.push(AttDef {
					name,
					att_type,
					default,
				});
			}
		}
	}
	Ok(MarkupDecl::AttList { name, defs })
}

/// Read an EntityValue (production "9"): a quoted literal in which
/// character and general entity references are chunked and parameter
/// entity references are substituted textually.
fn read_entity_value(r: &mut Reader, pes: &HashMap<NCName, String>) -> Result<Vec<ValuePart>> {
	let at = r.position();
	let delim = read_quote(r, "9")?;
	let mut parts = Vec::new();
	let mut buf = String::new();
	loop {
		let cat = r.position();
		match r.next_opt()? {
			None => return Err(Error::eof("9", at)),
			Some(c) if c == delim => break,
			Some('&') => {
				if r.peek() == Some('#') {
					r.next_opt()?;
					if !buf.is_empty() {
						parts.push(ValuePart::Text(unsafe {
							CData::from_string_unchecked(std::mem::take(&mut buf))
						}));
					}
					parts.push(ValuePart::CharRef(read_char_ref(r)?));
				} else {
					let name = read_ncname(r)?;
					r.expect_char(';', "68", "entity reference must end with ';'")?;
					if !buf.is_empty() {
						parts.push(ValuePart::Text(unsafe {
							CData::from_string_unchecked(std::mem::take(&mut buf))
						}));
					}
					parts.push(ValuePart::EntityRef(name));
				}
			}
			Some('%') => {
				let name = read_ncname(r)?;
				r.expect_char(';', "69", "parameter entity reference must end with ';'")?;
				match pes.get(&name) {
					Some(text) => buf.push_str(text),
					None => return Err(Error::wf(WFError::UndeclaredEntity, cat)),
				}
			}
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

/// Flatten an entity value for use as parameter entity replacement
/// text. General entity references are bypassed (kept verbatim).
fn flatten_entity_value(parts: &[ValuePart]) -> String {
	let mut out = String::new();
	for part in parts {
		match part {
			ValuePart::Text(s) => out.push_str(s),
			ValuePart::CharRef(ch) => out.push(*ch),
			ValuePart::EntityRef(name) => {
				out.push('&');
				out.push_str(name);
				out.push(';');
			}
		}
	}
	out
}

/// Read an ExternalID (production "75"): `SYSTEM` with a system
/// literal, or `PUBLIC` with a pubid literal and a system literal which
/// is optional only in notation declarations.
pub(crate) fn parse_external_id(r: &mut Reader, system_required: bool) -> Result<ExternalId> {
	let at = r.position();
	let kw = read_ncname(r)?;
	match kw.as_str() {
		"SYSTEM" => {
			require_space(r, "75", "expected whitespace after SYSTEM")?;
			Ok(ExternalId::System(read_literal(r, "11")?))
		}
		"PUBLIC" => {
			require_space(r, "75", "expected whitespace after PUBLIC")?;
			let pubid = read_pubid_literal(r)?;
			if system_required {
				require_space(r, "75", "expected whitespace after public identifier")?;
				Ok(ExternalId::Public(pubid, Some(read_literal(r, "11")?)))
			} else {
				// notation declarations may omit the system literal
				let had_space = skip_space(r)?;
				match r.peek() {
					Some('"') | Some('\'') if had_space => {
						Ok(ExternalId::Public(pubid, Some(read_literal(r, "11")?)))
					}
					_ => Ok(ExternalId::Public(pubid, None)),
				}
			}
		}
		_ => Err(Error::syntax("75", "expected SYSTEM or PUBLIC", at)),
	}
}

/// `<!ENTITY [%] name def >`, after the `ENTITY` keyword.
fn parse_entity_decl(
	r: &mut Reader,
	pes: &mut HashMap<NCName, String>,
) -> Result<MarkupDecl> {
	require_space(r, "70", "expected whitespace after ENTITY")?;
	let parameter = if r.peek() == Some('%') {
		r.next_opt()?;
		require_space(r, "72", "expected whitespace after '%'")?;
		true
	} else {
		false
	};
	let name = read_ncname(r)?;
	require_space(r, "70", "expected whitespace after entity name")?;
	let at = r.position();
	let def = match r.peek() {
		Some('"') | Some('\'') => EntityDef::Internal(read_entity_value(r, pes)?),
		Some(_) => {
			let id = parse_external_id(r, true)?;
			let mut ndata = None;
			if !parameter {
				let had_space = skip_space(r)?;
				if had_space && r.peek() != Some('>') {
					let kw = read_ncname(r)?;
					if kw != "NDATA" {
						return Err(Error::syntax("76", "expected NDATA", at));
					}
					require_space(r, "76", "expected whitespace after NDATA")?;
					ndata = Some(read_ncname(r)?);
				}
			}
			EntityDef::External { id, ndata }
		}
		None => return Err(Error::eof("70", at)),
	};
	skip_space(r)?;
	r.expect_char('>', "70", "expected '>' to close the entity declaration")?;
	if parameter {
		if let EntityDef::Internal(parts) = &def {
			// first binding wins, as for general entities
			pes.entry(name.clone())
				.or_insert_with(|| flatten_entity_value(parts));
		}
		Ok(MarkupDecl::ParameterEntity { name, def })
	} else {
		Ok(MarkupDecl::GeneralEntity { name, def })
	}
}

/// `<!NOTATION name id >`, after the `NOTATION` keyword.
fn parse_notation_decl(r: &mut Reader) -> Result<MarkupDecl> {
	require_space(r, "82", "expected whitespace after NOTATION")?;
	let name = read_ncname(r)?;
	require_space(r, "82", "expected whitespace after notation name")?;
	let id = parse_external_id(r, false)?;
	skip_space(r)?;
	r.expect_char('>', "82", "expected '>' to close the notation declaration")?;
	Ok(MarkupDecl::Notation { name, id })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;

	fn parse(subset: &str) -> Result<Vec<MarkupDecl>> {
		let mut r = Reader::from_str(subset);
		parse_internal_subset(&mut r)
	}

	#[test]
	fn empty_subset() {
		assert_eq!(parse("[]").unwrap(), vec![]);
		assert_eq!(parse("[ \n ]").unwrap(), vec![]);
	}

	#[test]
	fn element_decl_keywords() {
		let decls = parse("[<!ELEMENT a EMPTY><!ELEMENT b ANY>]").unwrap();
		assert!(matches!(
			&decls[0],
			MarkupDecl::Element { name, content: ContentSpec::Empty } if name == "a"
		));
		assert!(matches!(
			&decls[1],
			MarkupDecl::Element { content: ContentSpec::Any, .. }
		));
	}

	#[test]
	fn element_decl_mixed() {
		let decls = parse("[<!ELEMENT p (#PCDATA | b | i)*>]").unwrap();
		match &decls[0] {
			MarkupDecl::Element {
				content: ContentSpec::Mixed(names),
				..
			} => {
				assert_eq!(names.len(), 2);
				assert_eq!(names[0], "b");
				assert_eq!(names[1], "i");
			}
			other => panic!("unexpected declaration: {:?}", other),
		}
	}

	#[test]
	fn element_decl_bare_pcdata_without_star() {
		let decls = parse("[<!ELEMENT p (#PCDATA)>]").unwrap();
		assert!(matches!(
			&decls[0],
			MarkupDecl::Element { content: ContentSpec::Mixed(names), .. } if names.is_empty()
		));
	}

	#[test]
	fn element_decl_mixed_with_names_requires_star() {
		let err = parse("[<!ELEMENT p (#PCDATA | b)>]").err().unwrap();
		assert!(matches!(err.kind, ErrorKind::Syntax("51", _)));
	}

	#[test]
	fn element_decl_children() {
		let decls = parse("[<!ELEMENT r (a, (b | c)*, d?)+>]").unwrap();
		match &decls[0] {
			MarkupDecl::Element {
				content: ContentSpec::Children(ContentModel::Seq(items, Repeat::Plus)),
				..
			} => {
				assert_eq!(items.len(), 3);
				assert!(matches!(&items[0], ContentModel::Name(n, Repeat::One) if n == "a"));
				assert!(matches!(
					&items[1],
					ContentModel::Choice(inner, Repeat::Star) if inner.len() == 2
				));
				assert!(matches!(&items[2], ContentModel::Name(n, Repeat::Opt) if n == "d"));
			}
			other => panic!("unexpected declaration: {:?}", other),
		}
	}

	#[test]
	fn content_model_cannot_mix_separators() {
		let err = parse("[<!ELEMENT r (a | b, c)>]").err().unwrap();
		assert!(matches!(err.kind, ErrorKind::Syntax("49", _)));
	}

	#[test]
	fn attlist_decl_types_and_defaults() {
		let decls = parse(
			"[<!ATTLIST e \
				a CDATA #IMPLIED \
				b ID #REQUIRED \
				c (x | y) \"x\" \
				d NOTATION (n1 | n2) #IMPLIED \
				e NMTOKENS #FIXED \"a b\">]",
		)
		.unwrap();
		match &decls[0] {
			MarkupDecl::AttList { name, defs } => {
				assert_eq!(name, "e");
				assert_eq!(defs.len(), 5);
				assert!(matches!(
					&defs[0],
					AttDef { att_type: AttType::Cdata, default: AttDefault::Implied, .. }
				));
				assert!(matches!(
					&defs[1],
					AttDef { att_type: AttType::Id, default: AttDefault::Required, .. }
				));
				match &defs[2] {
					AttDef {
						att_type: AttType::Enumeration(tokens),
						default: AttDefault::Value(v),
						..
					} => {
						assert_eq!(tokens.len(), 2);
						assert!(matches!(&v[0], ValuePart::Text(s) if s == "x"));
					}
					other => panic!("unexpected attdef: {:?}", other),
				}
				assert!(matches!(
					&defs[3],
					AttDef { att_type: AttType::Notation(names), .. } if names.len() == 2
				));
				assert!(matches!(
					&defs[4],
					AttDef { att_type: AttType::NmTokens, default: AttDefault::Fixed(_), .. }
				));
			}
			other => panic!("unexpected declaration: {:?}", other),
		}
	}

	#[test]
	fn entity_decl_internal_and_external() {
		let decls = parse(
			"[<!ENTITY e \"text\">\
			  <!ENTITY ext SYSTEM \"http://example.com/x.ent\">\
			  <!ENTITY pic SYSTEM \"pic.gif\" NDATA gif>]",
		)
		.unwrap();
		assert!(matches!(
			&decls[0],
			MarkupDecl::GeneralEntity { name, def: EntityDef::Internal(parts) }
				if name == "e" && matches!(&parts[0], ValuePart::Text(s) if s == "text")
		));
		assert!(matches!(
			&decls[1],
			MarkupDecl::GeneralEntity {
				def: EntityDef::External { id: ExternalId::System(_), ndata: None },
				..
			}
		));
		assert!(matches!(
			&decls[2],
			MarkupDecl::GeneralEntity {
				def: EntityDef::External { ndata: Some(n), .. },
				..
			} if n == "gif"
		));
	}

	#[test]
	fn entity_value_chunks_references() {
		let decls = parse("[<!ENTITY e \"a&amp;b&#65;\">]").unwrap();
		match &decls[0] {
			MarkupDecl::GeneralEntity {
				def: EntityDef::Internal(parts),
				..
			} => {
				assert_eq!(parts.len(), 4);
				assert!(matches!(&parts[1], ValuePart::EntityRef(n) if n == "amp"));
				assert!(matches!(&parts[3], ValuePart::CharRef('A')));
			}
			other => panic!("unexpected declaration: {:?}", other),
		}
	}

	#[test]
	fn parameter_entity_substitutes_between_declarations() {
		let decls = parse("[<!ENTITY % decls \"<!ELEMENT a EMPTY>\"> %decls;]").unwrap();
		assert_eq!(decls.len(), 2);
		assert!(matches!(&decls[0], MarkupDecl::ParameterEntity { name, .. } if name == "decls"));
		assert!(matches!(
			&decls[1],
			MarkupDecl::Element { name, content: ContentSpec::Empty } if name == "a"
		));
	}

	#[test]
	fn undeclared_parameter_entity_is_rejected() {
		let err = parse("[%nope;]").err().unwrap();
		assert!(matches!(
			err.kind,
			ErrorKind::NotWellFormed(WFError::UndeclaredEntity)
		));
	}

	#[test]
	fn notation_decl_public_without_system() {
		let decls = parse("[<!NOTATION n PUBLIC \"-//example//n//EN\">]").unwrap();
		assert!(matches!(
			&decls[0],
			MarkupDecl::Notation { id: ExternalId::Public(_, None), .. }
		));
	}

	#[test]
	fn notation_decl_system() {
		let decls = parse("[<!NOTATION n SYSTEM \"n.bin\">]").unwrap();
		assert!(matches!(
			&decls[0],
			MarkupDecl::Notation { id: ExternalId::System(s), .. } if s == "n.bin"
		));
	}

	#[test]
	fn include_section_is_parsed() {
		let decls = parse("[<![INCLUDE[<!ELEMENT a EMPTY>]]>]").unwrap();
		assert_eq!(decls.len(), 1);
		assert!(matches!(&decls[0], MarkupDecl::Element { .. }));
	}

	#[test]
	fn ignore_section_is_skipped() {
		let decls =
			parse("[<![IGNORE[<!ELEMENT a EMPTY><![IGNORE[nested]]>]]><!ELEMENT b ANY>]")
				.unwrap();
		assert_eq!(decls.len(), 1);
		assert!(matches!(
			&decls[0],
			MarkupDecl::Element { name, .. } if name == "b"
		));
	}

	#[test]
	fn conditional_keyword_via_parameter_entity() {
		let decls =
			parse("[<!ENTITY % kw \"INCLUDE\"> <![%kw;[<!ELEMENT a EMPTY>]]>]").unwrap();
		assert_eq!(decls.len(), 2);
		assert!(matches!(&decls[1], MarkupDecl::Element { .. }));
	}

	#[test]
	fn pi_in_subset_is_recorded() {
		let decls = parse("[<?keep this?>]").unwrap();
		assert!(matches!(
			&decls[0],
			MarkupDecl::PI { target, data } if target == "keep" && data == "this"
		));
	}

	#[test]
	fn comment_in_subset_is_discarded() {
		assert_eq!(parse("[<!-- nothing -->]").unwrap(), vec![]);
	}
}
