/*!
# Reference resolution

Substitutes character and general entity references to produce plain
text: in attribute values, in tree nodes and in whole trees. The entity
environment is populated with the five predefined entities and with the
internal general entities declared in the DTD subset.

Resolution is idempotent: applying it to an already resolved tree is the
identity, since resolved trees contain no reference nodes.
*/
use std::collections::HashMap;
use std::convert::TryInto;

use crate::error::{Error, Position, WFError};
use crate::event::{EntityDef, MarkupDecl};
use crate::strings::{CData, NCName};
use crate::tree::{Attribute, Element, ValuePart, XmlNode};

/// Failure during reference resolution.
///
/// Converted into a positioned [`Error`] by the callers which know the
/// position of the offending reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefError {
	/// Reference to an entity which is not in the environment.
	Undeclared(NCName),
	/// Entity expansion reached the entity currently being expanded.
	Recursive(NCName),
}

impl RefError {
	pub(crate) fn at(self, position: Position) -> Error {
		match self {
			RefError::Undeclared(_) => Error::wf(WFError::UndeclaredEntity, position),
			RefError::Recursive(_) => Error::wf(WFError::RecursiveEntity, position),
		}
	}
}

/**
# General entity environment

Maps entity names to their (chunked) replacement text. The five
predefined entities `lt`, `gt`, `amp`, `apos` and `quot` are always
present. Declared external entities have no replacement text available
to an internal-subset-only parser; referencing one fails like an
undeclared entity.
*/
pub struct EntityEnv {
	map: HashMap<NCName, Vec<ValuePart>>,
}

impl EntityEnv {
	/// Create an environment holding only the predefined entities.
	pub fn new() -> EntityEnv {
		let mut map = HashMap::new();
		for (name, text) in &[
			("lt", "<"),
			("gt", ">"),
			("amp", "&"),
			("apos", "'"),
			("quot", "\""),
		] {
			let name: NCName = (*name).try_into().unwrap();
			let text: CData = (*text).try_into().unwrap();
			map.insert(name, vec![ValuePart::Text(text)]);
		}
		EntityEnv { map }
	}

	/// Record an internal entity declaration.
	///
	/// If the name is already bound, the first binding wins, as the XML
	/// specification requires.
	pub fn declare(&mut self, name: NCName, replacement: Vec<ValuePart>) {
		self.map.entry(name).or_insert(replacement);
	}

	/// Record all internal general entity declarations of a DTD subset.
	pub fn declare_from_subset(&mut self, subset: &[MarkupDecl]) {
		for decl in subset {
			if let MarkupDecl::GeneralEntity {
				name,
				def: EntityDef::Internal(parts),
			} = decl
			{
				self.declare(name.clone(), parts.clone());
			}
		}
	}

	/// Whether a replacement text is available for the given name.
	pub fn is_declared(&self, name: &NCName) -> bool {
		self.map.contains_key(name)
	}

	fn expand_into(
		&self,
		name: &NCName,
		out: &mut String,
		active: &mut Vec<NCName>,
	) -> Result<(), RefError> {
		if active.iter().any(|n| n == name) {
			return Err(RefError::Recursive(name.clone()));
		}
		let replacement = match self.map.get(name) {
			None => return Err(RefError::Undeclared(name.clone())),
			Some(parts) => parts,
		};
		active.push(name.clone());
		for part in replacement {
			match part {
				ValuePart::Text(s) => out.push_str(s),
				ValuePart::CharRef(ch) => out.push(*ch),
				ValuePart::EntityRef(inner) => self.expand_into(inner, out, active)?,
			}
		}
		active.pop();
		Ok(())
	}

	/// Fully expand the replacement text of the given entity.
	pub fn expand(&self, name: &NCName) -> Result<CData, RefError> {
		let mut out = String::new();
		let mut active = Vec::new();
		self.expand_into(name, &mut out, &mut active)?;
		Ok(unsafe { CData::from_string_unchecked(out) })
	}

	/// Flatten a chunked attribute value into plain text, expanding all
	/// references.
	pub fn flatten_value(&self, parts: &[ValuePart]) -> Result<CData, RefError> {
		let mut out = String::new();
		let mut active = Vec::new();
		for part in parts {
			match part {
				ValuePart::Text(s) => out.push_str(s),
				ValuePart::CharRef(ch) => out.push(*ch),
				ValuePart::EntityRef(name) => self.expand_into(name, &mut out, &mut active)?,
			}
		}
		Ok(unsafe { CData::from_string_unchecked(out) })
	}

	fn resolve_attribute(&self, attr: Attribute) -> Result<Attribute, RefError> {
		let flat = self.flatten_value(&attr.value)?;
		let value = if flat.is_empty() {
			Vec::new()
		} else {
			vec![ValuePart::Text(flat)]
		};
		Ok(Attribute {
			name: attr.name,
			value,
		})
	}

	/// Substitute references in a sequence of nodes.
	///
	/// Character references become their denoted character, entity
	/// references become their fully expanded replacement text. Each
	/// reference becomes a text node of its own; adjacent text nodes are
	/// not merged.
	pub fn resolve_nodes(&self, nodes: Vec<XmlNode>) -> Result<Vec<XmlNode>, RefError> {
		let mut out = Vec::with_capacity(nodes.len());
		for node in nodes {
			out.push(match node {
				XmlNode::CharRef(ch) => {
					XmlNode::Text(unsafe { CData::from_string_unchecked(ch.to_string()) })
				}
				XmlNode::EntityRef(name) => XmlNode::Text(self.expand(&name)?),
				XmlNode::Element(e) => XmlNode::Element(self.resolve_tree(e)?),
				other => other,
			});
		}
		Ok(out)
	}

	/// Substitute references in a whole tree, attribute values included.
	pub fn resolve_tree(&self, elem: Element) -> Result<Element, RefError> {
		let mut attributes = Vec::with_capacity(elem.attributes.len());
		for attr in elem.attributes {
			attributes.push(self.resolve_attribute(attr)?);
		}
		Ok(Element {
			name: elem.name,
			attributes,
			children: self.resolve_nodes(elem.children)?,
		})
	}
}

impl Default for EntityEnv {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tree::QName;

	fn ncname(s: &str) -> NCName {
		s.try_into().unwrap()
	}

	fn text_part(s: &str) -> ValuePart {
		ValuePart::Text(s.try_into().unwrap())
	}

	#[test]
	fn predefined_entities_expand() {
		let env = EntityEnv::new();
		assert_eq!(env.expand(&ncname("lt")).unwrap(), "<");
		assert_eq!(env.expand(&ncname("amp")).unwrap(), "&");
		assert_eq!(env.expand(&ncname("quot")).unwrap(), "\"");
	}

	#[test]
	fn undeclared_entity_is_an_error() {
		let env = EntityEnv::new();
		assert!(matches!(
			env.expand(&ncname("nope")),
			Err(RefError::Undeclared(n)) if n == "nope"
		));
	}

	#[test]
	fn declared_entities_expand_recursively() {
		let mut env = EntityEnv::new();
		env.declare(ncname("inner"), vec![text_part("world")]);
		env.declare(
			ncname("outer"),
			vec![
				text_part("hello "),
				ValuePart::EntityRef(ncname("inner")),
			],
		);
		assert_eq!(env.expand(&ncname("outer")).unwrap(), "hello world");
	}

	#[test]
	fn first_declaration_wins() {
		let mut env = EntityEnv::new();
		env.declare(ncname("e"), vec![text_part("first")]);
		env.declare(ncname("e"), vec![text_part("second")]);
		assert_eq!(env.expand(&ncname("e")).unwrap(), "first");
	}

	#[test]
	fn recursive_expansion_is_detected() {
		let mut env = EntityEnv::new();
		env.declare(ncname("a"), vec![ValuePart::EntityRef(ncname("b"))]);
		env.declare(ncname("b"), vec![ValuePart::EntityRef(ncname("a"))]);
		assert!(matches!(
			env.expand(&ncname("a")),
			Err(RefError::Recursive(_))
		));
	}

	#[test]
	fn flatten_value_expands_all_chunks() {
		let env = EntityEnv::new();
		let parts = vec![
			text_part("a"),
			ValuePart::EntityRef(ncname("amp")),
			text_part("b"),
			ValuePart::CharRef('A'),
		];
		assert_eq!(env.flatten_value(&parts).unwrap(), "a&bA");
	}

	#[test]
	fn resolve_nodes_keeps_each_reference_separate() {
		let env = EntityEnv::new();
		let nodes = vec![
			XmlNode::Text("a".try_into().unwrap()),
			XmlNode::EntityRef(ncname("amp")),
			XmlNode::CharRef('A'),
			XmlNode::Text("c".try_into().unwrap()),
		];
		let resolved = env.resolve_nodes(nodes).unwrap();
		assert_eq!(
			resolved,
			vec![
				XmlNode::Text("a".try_into().unwrap()),
				XmlNode::Text("&".try_into().unwrap()),
				XmlNode::Text("A".try_into().unwrap()),
				XmlNode::Text("c".try_into().unwrap()),
			]
		);
	}

	#[test]
	fn resolve_tree_is_idempotent() {
		let env = EntityEnv::new();
		let elem = Element {
			name: QName::local(ncname("r")),
			attributes: vec![Attribute::new(
				QName::local(ncname("a")),
				vec![text_part("1"), ValuePart::CharRef('!')],
			)],
			children: vec![XmlNode::EntityRef(ncname("lt"))],
		};
		let once = env.resolve_tree(elem).unwrap();
		let twice = env.resolve_tree(once.clone()).unwrap();
		assert_eq!(once, twice);
		assert_eq!(once.attributes[0].as_text(), Some("1!"));
	}
}
