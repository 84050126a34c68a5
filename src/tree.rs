/*!
# Document tree types

The tree built from the event stream is a rose tree: each element
carries its qualified name, its attributes in document order and an
ordered child sequence. Trees are value-like and immutable once the
builder returns them.
*/
use std::fmt;
#[cfg(not(feature = "mt"))]
use std::rc::Rc;
#[cfg(feature = "mt")]
use std::sync::Arc;

use crate::event::XmlVersion;
use crate::strings::{CData, NCName};

/// Wrapper pointer around namespace URIs
///
/// In builds with the `mt` feature, this is an [`Arc`]. In non-`mt`
/// builds, this is a [`std::rc::Rc`].
#[cfg(feature = "mt")]
pub type RcPtr<T> = Arc<T>;
/// Wrapper pointer around namespace URIs
///
/// In builds with the `mt` feature, this is a [`std::sync::Arc`].
/// In non-`mt` builds, this is a [`Rc`].
#[cfg(not(feature = "mt"))]
pub type RcPtr<T> = Rc<T>;

/// Shared namespace URI
pub type NamespaceName = RcPtr<CData>;

/// XML core namespace URI (implicitly bound to the `xml:` prefix)
pub const XMLNS_XML: &'static str = "http://www.w3.org/XML/1998/namespace";
/// XML namespace URI (for the `xmlns:` prefix itself)
pub const XMLNS_XMLNS: &'static str = "http://www.w3.org/2000/xmlns/";

/**
# Qualified name

A name with an optional prefix, a localpart and an optional namespace
name (URI). A `QName` is *resolved* iff it has no prefix or its URI is
present.

Equality compares localpart and URI when both sides are resolved, and
localpart and prefix otherwise.
*/
#[derive(Debug, Clone)]
pub struct QName {
	pub prefix: Option<NCName>,
	pub local: NCName,
	pub uri: Option<NamespaceName>,
}

impl QName {
	/// Construct an unprefixed, unbound name.
	pub fn local(local: NCName) -> QName {
		QName {
			prefix: None,
			local,
			uri: None,
		}
	}

	/// Construct a prefixed name whose URI is not resolved yet.
	pub fn prefixed(prefix: NCName, local: NCName) -> QName {
		QName {
			prefix: Some(prefix),
			local,
			uri: None,
		}
	}

	pub fn from_parts(prefix: Option<NCName>, local: NCName) -> QName {
		QName {
			prefix,
			local,
			uri: None,
		}
	}

	/// Return a copy of this name bound to the given namespace name.
	pub fn with_uri(mut self, uri: Option<NamespaceName>) -> QName {
		self.uri = uri;
		self
	}

	/// A name is resolved iff it has no prefix or a namespace URI.
	pub fn is_resolved(&self) -> bool {
		self.prefix.is_none() || self.uri.is_some()
	}
}

impl PartialEq for QName {
	fn eq(&self, other: &QName) -> bool {
		if self.local != other.local {
			return false;
		}
		if self.is_resolved() && other.is_resolved() {
			match (self.uri.as_ref(), other.uri.as_ref()) {
				(None, None) => true,
				(Some(a), Some(b)) => a == b,
				_ => false,
			}
		} else {
			self.prefix == other.prefix
		}
	}
}

impl Eq for QName {}

impl fmt::Display for QName {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self.prefix.as_ref() {
			Some(prefix) => write!(f, "{}:{}", prefix, self.local),
			None => f.write_str(&self.local),
		}
	}
}

/// One chunk of an attribute value.
///
/// Attribute values are kept as an ordered sequence of chunks until
/// reference resolution, so that references keep their identity and
/// template-injected values can be concatenated without premature
/// flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValuePart {
	Text(CData),
	CharRef(char),
	EntityRef(NCName),
}

/// Attribute node: a qualified name and a chunked value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: QName,
	pub value: Vec<ValuePart>,
}

impl Attribute {
	pub fn new(name: QName, value: Vec<ValuePart>) -> Attribute {
		Attribute { name, value }
	}

	/// Construct an attribute with a plain text value.
	pub fn text(name: QName, value: CData) -> Attribute {
		Attribute {
			name,
			value: vec![ValuePart::Text(value)],
		}
	}

	/// The value as a string slice, if it consists of a single resolved
	/// text chunk.
	///
	/// Attribute values in trees returned by the parsing entrypoints are
	/// always fully resolved, so this returns `Some` there; `None` means
	/// the value still contains unresolved references.
	pub fn as_text(&self) -> Option<&str> {
		match self.value.as_slice() {
			[] => Some(""),
			[ValuePart::Text(s)] => Some(s),
			_ => None,
		}
	}
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
	Element(Element),
	/// Character data.
	Text(CData),
	/// Character data which originated from a CDATA section.
	CData(CData),
	Comment(CData),
	/// Unresolved character reference.
	CharRef(char),
	/// Unresolved general entity reference.
	EntityRef(NCName),
	PI {
		target: NCName,
		data: CData,
	},
}

impl XmlNode {
	/// Return the contained element, if this node is one.
	pub fn as_element(&self) -> Option<&Element> {
		match self {
			XmlNode::Element(e) => Some(e),
			_ => None,
		}
	}
}

impl From<Element> for XmlNode {
	fn from(e: Element) -> XmlNode {
		XmlNode::Element(e)
	}
}

/// Element node: name, attributes in document order, ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	pub name: QName,
	pub attributes: Vec<Attribute>,
	pub children: Vec<XmlNode>,
}

impl Element {
	pub fn new(name: QName) -> Element {
		Element {
			name,
			attributes: Vec::new(),
			children: Vec::new(),
		}
	}

	/// Look up an attribute by its qualified name.
	pub fn attribute(&self, name: &QName) -> Option<&Attribute> {
		self.attributes.iter().find(|a| a.name == *name)
	}

	/// Look up an unprefixed attribute by its localname.
	pub fn attribute_local(&self, local: &str) -> Option<&Attribute> {
		self.attributes
			.iter()
			.find(|a| a.name.prefix.is_none() && a.name.local == *local)
	}

	/// Iterate over the child elements, skipping other node kinds.
	pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
		self.children.iter().filter_map(XmlNode::as_element)
	}
}

/// A parsed document: the root element plus the facts recorded from the
/// XML declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
	pub version: Option<XmlVersion>,
	pub encoding: Option<CData>,
	pub standalone: Option<bool>,
	pub root: Element,
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::convert::TryInto;

	fn ncname(s: &str) -> NCName {
		s.try_into().unwrap()
	}

	fn nsname(s: &str) -> NamespaceName {
		RcPtr::new(s.try_into().unwrap())
	}

	#[test]
	fn unresolved_qnames_compare_by_prefix_and_local() {
		let a = QName::prefixed(ncname("ns"), ncname("x"));
		let b = QName::prefixed(ncname("ns"), ncname("x"));
		let c = QName::prefixed(ncname("other"), ncname("x"));
		assert_eq!(a, b);
		assert_ne!(a, c);
	}

	#[test]
	fn resolved_qnames_compare_by_uri_and_local() {
		let a = QName::prefixed(ncname("ns"), ncname("x")).with_uri(Some(nsname("urn:a")));
		let b = QName::prefixed(ncname("other"), ncname("x")).with_uri(Some(nsname("urn:a")));
		let c = QName::prefixed(ncname("ns"), ncname("x")).with_uri(Some(nsname("urn:b")));
		assert_eq!(a, b);
		assert_ne!(a, c);
	}

	#[test]
	fn unprefixed_qname_is_resolved() {
		assert!(QName::local(ncname("root")).is_resolved());
		assert!(!QName::prefixed(ncname("ns"), ncname("root")).is_resolved());
	}

	#[test]
	fn attribute_as_text() {
		let a = Attribute::text(QName::local(ncname("a")), "1".try_into().unwrap());
		assert_eq!(a.as_text(), Some("1"));
		let b = Attribute::new(
			QName::local(ncname("b")),
			vec![ValuePart::EntityRef(ncname("amp"))],
		);
		assert_eq!(b.as_text(), None);
	}
}
