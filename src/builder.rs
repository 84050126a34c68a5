/*!
# Tree building

Consumes the event stream of a [`Parser`] and produces the immutable
document tree: a stack of open start tags with a parallel stack of
child-list builders, the bottom of which collects the root element and
any top-level comments and processing instructions.

Namespace resolution runs inline while building (so end tags are matched
against start tags by *resolved* name and namespace declarations are
stripped), and references are expanded as they are appended, with the
event position available for error reporting.

In templated parsing, the builder reacts to the placeholder events by
splicing the next [`TemplateArg`] into its buffers and feeding the next
source fragment to the parser.
*/
use std::collections::VecDeque;
use std::convert::TryFrom;

use crate::error::{Error, ErrorKind, Position, Result, WFError};
use crate::event::{XmlEvent, XmlVersion};
use crate::namespaces::NamespaceResolver;
use crate::parser::Parser;
use crate::refs::EntityEnv;
use crate::strings::CData;
use crate::tree::{Attribute, Document, Element, QName, ValuePart, XmlNode};

/// One externally supplied value for a template placeholder.
///
/// The kind must match the placeholder it answers: attribute sequences
/// for [`XmlEvent::ExpectAttributes`], an optional value for
/// [`XmlEvent::ExpectAttributeValue`] (where `None` drops the attribute
/// altogether), and a node sequence for [`XmlEvent::ExpectNodes`].
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArg {
	Attributes(Vec<Attribute>),
	Value(Option<String>),
	Nodes(Vec<XmlNode>),
}

struct OpenElement {
	name: QName,
	attributes: Vec<Attribute>,
}

/**
# Event-stream to tree converter

Usually invoked through the [`parse`], [`parse_document`],
[`parse_parts`] and [`parse_parts_document`] entrypoints.
*/
pub struct TreeBuilder {
	parser: Parser,
	fragments: VecDeque<String>,
	args: VecDeque<TemplateArg>,
	resolver: NamespaceResolver,
	entities: EntityEnv,
	open: Vec<OpenElement>,
	builders: Vec<Vec<XmlNode>>,
	/// templated attributes waiting for the enclosing start tag to
	/// complete
	attr_buffer: Vec<Attribute>,
	version: Option<XmlVersion>,
	encoding: Option<CData>,
	standalone: Option<bool>,
}

impl TreeBuilder {
	/// Wrap a parser; `fragments` and `args` are the remaining template
	/// inputs (both empty for plain parsing).
	pub fn new(parser: Parser, fragments: VecDeque<String>, args: VecDeque<TemplateArg>) -> Self {
		Self {
			parser,
			fragments,
			args,
			resolver: NamespaceResolver::new(),
			entities: EntityEnv::new(),
			open: Vec::new(),
			builders: vec![Vec::new()],
			attr_buffer: Vec::new(),
			version: None,
			encoding: None,
			standalone: None,
		}
	}

	fn top(&mut self) -> &mut Vec<XmlNode> {
		self.builders.last_mut().unwrap()
	}

	fn next_arg(&mut self, position: Position) -> Result<TemplateArg> {
		self.args.pop_front().ok_or_else(|| {
			Error::new(
				ErrorKind::Template("more placeholders than arguments"),
				position,
			)
		})
	}

	fn feed_next(&mut self, position: Position) -> Result<()> {
		match self.fragments.pop_front() {
			None => Err(Error::new(
				ErrorKind::Template("more placeholders than source fragments"),
				position,
			)),
			Some(fragment) => {
				if self.fragments.is_empty() {
					self.parser.feed_final(fragment);
				} else {
					self.parser.feed(fragment);
				}
				Ok(())
			}
		}
	}

	fn flatten_attribute(&self, attr: Attribute, position: Position) -> Result<Attribute> {
		let flat = self
			.entities
			.flatten_value(&attr.value)
			.map_err(|e| e.at(position))?;
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

	/// Drive the parser to the end of the document and reify the tree.
	pub fn run(mut self) -> Result<Document> {
		let mut end_position = Position::START;
		loop {
			let ev = match self.parser.next_event()? {
				None => break,
				Some(ev) => ev,
			};
			match ev {
				XmlEvent::StartDocument { .. } => (),
				XmlEvent::XmlDeclaration {
					version,
					encoding,
					standalone,
					..
				} => {
					self.version = Some(version);
					self.encoding = encoding;
					self.standalone = standalone;
					self.resolver.set_version(version);
				}
				XmlEvent::Doctype { subset, .. } => {
					if let Some(subset) = subset.as_ref() {
						self.entities.declare_from_subset(subset);
					}
				}
				XmlEvent::ProcessingInstruction { target, data, .. } => {
					self.top().push(XmlNode::PI { target, data });
				}
				XmlEvent::Comment { data, .. } => {
					self.top().push(XmlNode::Comment(data));
				}
				XmlEvent::Text { data, cdata, .. } => {
					self.top().push(if cdata {
						XmlNode::CData(data)
					} else {
						XmlNode::Text(data)
					});
				}
				XmlEvent::CharRef { ch, .. } => {
					self.top().push(XmlNode::Text(unsafe {
						CData::from_string_unchecked(ch.to_string())
					}));
				}
				XmlEvent::EntityRef { position, name } => {
					let text = self
						.entities
						.expand(&name)
						.map_err(|e| e.at(position))?;
					self.top().push(XmlNode::Text(text));
				}
				XmlEvent::StartElement {
					position,
					name,
					attributes,
					..
				} => {
					// flush templated attributes accumulated through
					// placeholders, then the literally written ones
					let mut all = std::mem::take(&mut self.attr_buffer);
					all.extend(attributes);
					let mut flat = Vec::with_capacity(all.len());
					for attr in all {
						flat.push(self.flatten_attribute(attr, position)?);
					}
					let (name, attributes) =
						self.resolver.start_element(name, flat, position)?;
					self.open.push(OpenElement { name, attributes });
					self.builders.push(Vec::new());
				}
				XmlEvent::EndElement { position, name } => {
					let end_name = self.resolver.end_element(name, position)?;
					let open = self.open.pop().unwrap();
					if open.name != end_name {
						return Err(Error::wf(WFError::ElementMismatch, position));
					}
					let children = self.builders.pop().unwrap();
					self.top().push(XmlNode::Element(Element {
						name: open.name,
						attributes: open.attributes,
						children,
					}));
				}
				XmlEvent::ExpectAttributes {
					position,
					attributes,
					..
				} => {
					self.attr_buffer.extend(attributes);
					match self.next_arg(position)? {
						TemplateArg::Attributes(attrs) => self.attr_buffer.extend(attrs),
						_ => {
							return Err(Error::new(
								ErrorKind::Template("expected an attribute sequence argument"),
								position,
							))
						}
					}
					self.feed_next(position)?;
				}
				XmlEvent::ExpectAttributeValue {
					position,
					attributes,
					attribute,
					..
				} => {
					self.attr_buffer.extend(attributes);
					match self.next_arg(position)? {
						TemplateArg::Value(Some(value)) => {
							let value = CData::try_from(value).map_err(|_| {
								Error::new(
									ErrorKind::Template(
										"attribute value argument contains forbidden characters",
									),
									position,
								)
							})?;
							self.attr_buffer.push(Attribute::text(attribute, value));
						}
						// a null value drops the attribute entirely
						TemplateArg::Value(None) => (),
						_ => {
							return Err(Error::new(
								ErrorKind::Template("expected an attribute value argument"),
								position,
							))
						}
					}
					self.feed_next(position)?;
				}
				XmlEvent::ExpectNodes { position } => {
					match self.next_arg(position)? {
						TemplateArg::Nodes(nodes) => {
							let nodes = self
								.entities
								.resolve_nodes(nodes)
								.map_err(|e| e.at(position))?;
							self.top().extend(nodes);
						}
						_ => {
							return Err(Error::new(
								ErrorKind::Template("expected a node sequence argument"),
								position,
							))
						}
					}
					self.feed_next(position)?;
				}
				XmlEvent::EndDocument { position } => {
					end_position = position;
				}
			}
		}

		if !self.args.is_empty() {
			return Err(Error::new(
				ErrorKind::Template("unconsumed template arguments"),
				end_position,
			));
		}
		if !self.fragments.is_empty() {
			return Err(Error::new(
				ErrorKind::Template("unconsumed source fragments"),
				end_position,
			));
		}

		debug_assert!(self.open.is_empty());
		let bottom = self.builders.pop().unwrap();
		let mut root = None;
		for node in bottom {
			if let XmlNode::Element(e) = node {
				if root.is_some() {
					return Err(Error::syntax("1", "several root elements", end_position));
				}
				root = Some(e);
			}
		}
		let root = match root {
			Some(root) => root,
			None => return Err(Error::syntax("1", "missing root element", end_position)),
		};
		Ok(Document {
			version: self.version,
			encoding: self.encoding,
			standalone: self.standalone,
			root,
		})
	}
}

/// Parse a complete document and return its root element.
pub fn parse<T: Into<String>>(src: T) -> Result<Element> {
	Ok(parse_document(src)?.root)
}

/// Parse a complete document, keeping the facts recorded from the XML
/// declaration.
pub fn parse_document<T: Into<String>>(src: T) -> Result<Document> {
	let parser = Parser::from_str(src);
	TreeBuilder::new(parser, VecDeque::new(), VecDeque::new()).run()
}

/// Parse a templated document and return its root element.
///
/// `sources` and `args` interleave: with *k* source fragments there
/// must be *k − 1* arguments, one for the placeholder between each pair
/// of adjacent fragments.
pub fn parse_parts(sources: &[&str], args: Vec<TemplateArg>) -> Result<Element> {
	Ok(parse_parts_document(sources, args)?.root)
}

/// Templated counterpart of [`parse_document`].
pub fn parse_parts_document(sources: &[&str], args: Vec<TemplateArg>) -> Result<Document> {
	if sources.is_empty() {
		return Err(Error::new(
			ErrorKind::Template("at least one source fragment is required"),
			Position::START,
		));
	}
	if args.len() + 1 != sources.len() {
		return Err(Error::new(
			ErrorKind::Template("expected one argument between adjacent source fragments"),
			Position::START,
		));
	}
	let mut fragments: VecDeque<String> = sources.iter().map(|s| s.to_string()).collect();
	let first = fragments.pop_front().unwrap();
	let parser = if fragments.is_empty() {
		Parser::from_str(first)
	} else {
		Parser::with_partial(first)
	};
	TreeBuilder::new(parser, fragments, args.into()).run()
}
