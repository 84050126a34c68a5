/*!
# Logical XML document parts

The term *Event* is borrowed from SAX terminology. Each [`XmlEvent`]
refers to a logical bit of the XML document which has been parsed.

## Document event sequence

A well-formed document generates the following sequence of events:

1. [`XmlEvent::StartDocument`]
2. Zero or one [`XmlEvent::XmlDeclaration`]
3. Zero or one [`XmlEvent::Doctype`], mixed with any number of
   [`XmlEvent::ProcessingInstruction`] events
4. One *element sequence*
5. Trailing [`XmlEvent::Comment`] and
   [`XmlEvent::ProcessingInstruction`] events
6. [`XmlEvent::EndDocument`]

An *element sequence* is a [`XmlEvent::StartElement`] followed by child
events (element sequences, [`XmlEvent::Text`], [`XmlEvent::CharRef`],
[`XmlEvent::EntityRef`], comments and processing instructions, mixed
arbitrarily) and a matching [`XmlEvent::EndElement`]. A self-closing tag
emits its `EndElement` directly after the `StartElement`, with the same
name and position.

In partial (templated) parsing mode, the `Expect*` placeholder events
are emitted when the input ends at a splice point; the consumer is then
expected to feed the next source fragment before pulling further events.
*/
use crate::error::Position;
use crate::strings::{CData, NCName, Name};
use crate::tree::{Attribute, QName, ValuePart};

/**
# XML version number

Selected by the `version` pseudo-attribute of the XML declaration;
documents without a declaration are XML 1.0.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlVersion {
	/// XML Version 1.0
	V1_0,
	/// XML Version 1.1
	V1_1,
}

impl XmlVersion {
	pub fn as_str(&self) -> &'static str {
		match self {
			XmlVersion::V1_0 => "1.0",
			XmlVersion::V1_1 => "1.1",
		}
	}
}

/// External identifier of a DOCTYPE, entity or notation declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalId {
	/// `SYSTEM` + system literal
	System(CData),
	/// `PUBLIC` + pubid literal + optional system literal
	///
	/// The system literal is required everywhere except in notation
	/// declarations.
	Public(CData, Option<CData>),
}

/// Repetition modifier of a content particle (`?`, `*`, `+` or none).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
	One,
	Opt,
	Star,
	Plus,
}

/// A content particle of an element declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentModel {
	Name(Name, Repeat),
	Seq(Vec<ContentModel>, Repeat),
	Choice(Vec<ContentModel>, Repeat),
}

/// The content specification of an `<!ELEMENT …>` declaration.
///
/// Recorded, but not used to validate element content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSpec {
	Empty,
	Any,
	/// `(#PCDATA | name | …)*`
	Mixed(Vec<Name>),
	Children(ContentModel),
}

/// Declared type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttType {
	Cdata,
	Id,
	IdRef,
	IdRefs,
	Entity,
	Entities,
	NmToken,
	NmTokens,
	Notation(Vec<NCName>),
	Enumeration(Vec<CData>),
}

/// Default declaration of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttDefault {
	Required,
	Implied,
	Fixed(Vec<ValuePart>),
	Value(Vec<ValuePart>),
}

/// One attribute definition inside an `<!ATTLIST …>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttDef {
	pub name: Name,
	pub att_type: AttType,
	pub default: AttDefault,
}

/// Definition of a general or parameter entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityDef {
	/// Internal entity with its (chunked) replacement text.
	Internal(Vec<ValuePart>),
	/// External entity; `ndata` marks an unparsed entity.
	External {
		id: ExternalId,
		ndata: Option<NCName>,
	},
}

/// A markup declaration from the internal DTD subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupDecl {
	Element {
		name: Name,
		content: ContentSpec,
	},
	AttList {
		name: Name,
		defs: Vec<AttDef>,
	},
	GeneralEntity {
		name: NCName,
		def: EntityDef,
	},
	ParameterEntity {
		name: NCName,
		def: EntityDef,
	},
	Notation {
		name: NCName,
		id: ExternalId,
	},
	PI {
		target: NCName,
		data: CData,
	},
}

/**
# Event emitted by the pull parser

Every variant carries the position of its first character in the input.
*/
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
	/// Start of the document; always the first event.
	StartDocument { position: Position },

	/// The XML declaration.
	XmlDeclaration {
		position: Position,
		version: XmlVersion,
		/// Encoding name as declared. Recorded, not enforced: decoding
		/// bytes into characters is the job of whatever feeds the
		/// parser.
		encoding: Option<CData>,
		standalone: Option<bool>,
	},

	/// The document type declaration.
	Doctype {
		position: Position,
		/// Declared name of the root element.
		name: Name,
		external_id: Option<ExternalId>,
		/// Markup declarations of the internal subset, if present.
		subset: Option<Vec<MarkupDecl>>,
	},

	/// Start of an element.
	///
	/// Attribute values are chunked and unnormalised with respect to
	/// references; namespace declarations still appear as ordinary
	/// attributes at this stage.
	StartElement {
		position: Position,
		name: QName,
		attributes: Vec<Attribute>,
		/// Whether this was a self-closing tag. If true, the matching
		/// [`XmlEvent::EndElement`] follows immediately with the same
		/// name and position.
		empty: bool,
	},

	/// End of an element.
	EndElement { position: Position, name: QName },

	/// Character data.
	///
	/// **Note:** Multiple consecutive `Text` events may be emitted for a
	/// single consecutive stretch of character data, for instance when
	/// it is interrupted by references or spans input fragments.
	Text {
		position: Position,
		data: CData,
		/// Whether the data originated from a CDATA section.
		cdata: bool,
	},

	/// Unexpanded character reference.
	CharRef { position: Position, ch: char },

	/// Unexpanded general entity reference.
	EntityRef { position: Position, name: NCName },

	/// Comment.
	///
	/// Comments inside the prolog are discarded and do not generate
	/// events.
	Comment { position: Position, data: CData },

	/// Processing instruction.
	ProcessingInstruction {
		position: Position,
		target: NCName,
		data: CData,
	},

	/// End of the document; always the last event.
	EndDocument { position: Position },

	/// Placeholder: the input ended between attributes of an element
	/// header and the consumer is expected to supply attributes and the
	/// next source fragment.
	ExpectAttributes {
		position: Position,
		name: QName,
		/// Attributes read since the element name or the last
		/// placeholder.
		attributes: Vec<Attribute>,
	},

	/// Placeholder: the input ended after `name=` inside an element
	/// header and the consumer is expected to supply the value and the
	/// next source fragment.
	ExpectAttributeValue {
		position: Position,
		name: QName,
		attributes: Vec<Attribute>,
		/// Name of the attribute whose value is requested.
		attribute: QName,
	},

	/// Placeholder: the input ended in element content and the consumer
	/// is expected to supply child nodes and the next source fragment.
	ExpectNodes { position: Position },
}

impl XmlEvent {
	pub const NAME_START_DOCUMENT: &'static str = "StartDocument";
	pub const NAME_XML_DECLARATION: &'static str = "XmlDeclaration";
	pub const NAME_DOCTYPE: &'static str = "Doctype";
	pub const NAME_START_ELEMENT: &'static str = "StartElement";
	pub const NAME_END_ELEMENT: &'static str = "EndElement";
	pub const NAME_TEXT: &'static str = "Text";
	pub const NAME_CHAR_REF: &'static str = "CharRef";
	pub const NAME_ENTITY_REF: &'static str = "EntityRef";
	pub const NAME_COMMENT: &'static str = "Comment";
	pub const NAME_PI: &'static str = "ProcessingInstruction";
	pub const NAME_END_DOCUMENT: &'static str = "EndDocument";
	pub const NAME_EXPECT_ATTRIBUTES: &'static str = "ExpectAttributes";
	pub const NAME_EXPECT_ATTRIBUTE_VALUE: &'static str = "ExpectAttributeValue";
	pub const NAME_EXPECT_NODES: &'static str = "ExpectNodes";

	/// Return a static string describing the event type.
	///
	/// This is intended for error messages.
	pub fn name(&self) -> &'static str {
		match self {
			Self::StartDocument { .. } => Self::NAME_START_DOCUMENT,
			Self::XmlDeclaration { .. } => Self::NAME_XML_DECLARATION,
			Self::Doctype { .. } => Self::NAME_DOCTYPE,
			Self::StartElement { .. } => Self::NAME_START_ELEMENT,
			Self::EndElement { .. } => Self::NAME_END_ELEMENT,
			Self::Text { .. } => Self::NAME_TEXT,
			Self::CharRef { .. } => Self::NAME_CHAR_REF,
			Self::EntityRef { .. } => Self::NAME_ENTITY_REF,
			Self::Comment { .. } => Self::NAME_COMMENT,
			Self::ProcessingInstruction { .. } => Self::NAME_PI,
			Self::EndDocument { .. } => Self::NAME_END_DOCUMENT,
			Self::ExpectAttributes { .. } => Self::NAME_EXPECT_ATTRIBUTES,
			Self::ExpectAttributeValue { .. } => Self::NAME_EXPECT_ATTRIBUTE_VALUE,
			Self::ExpectNodes { .. } => Self::NAME_EXPECT_NODES,
		}
	}

	/// Return the position of the first character of the event.
	pub fn position(&self) -> Position {
		match self {
			Self::StartDocument { position }
			| Self::XmlDeclaration { position, .. }
			| Self::Doctype { position, .. }
			| Self::StartElement { position, .. }
			| Self::EndElement { position, .. }
			| Self::Text { position, .. }
			| Self::CharRef { position, .. }
			| Self::EntityRef { position, .. }
			| Self::Comment { position, .. }
			| Self::ProcessingInstruction { position, .. }
			| Self::EndDocument { position }
			| Self::ExpectAttributes { position, .. }
			| Self::ExpectAttributeValue { position, .. }
			| Self::ExpectNodes { position } => *position,
		}
	}

	/// Whether this is one of the templating placeholder events.
	pub fn is_placeholder(&self) -> bool {
		matches!(
			self,
			Self::ExpectAttributes { .. }
				| Self::ExpectAttributeValue { .. }
				| Self::ExpectNodes { .. }
		)
	}
}
