/*!
# Namespace resolution

Converts namespace prefixes into namespace names (URIs), as described in
Namespaces in XML 1.0/1.1. The resolver maintains a stack of
prefix-to-URI scopes; entering an element pushes the declarations found
in its `xmlns` / `xmlns:prefix` attributes, leaving it pops them.

The default namespace applies to element names only; attribute names
without a prefix stay unbound. Namespace declaration attributes are
consumed by the resolver and do not appear on resolved elements.

The same machinery is usable as a tree transformer over an already built
(but unresolved) tree; applying it to a resolved tree is the identity.
*/
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::context::Context;
use crate::error::{Error, NWFError, Position, Result};
use crate::event::XmlVersion;
use crate::refs::EntityEnv;
use crate::strings::NCName;
use crate::tree::{
	Attribute, Element, NamespaceName, QName, RcPtr, ValuePart, XmlNode, XMLNS_XML,
};

/// Declarations introduced by one element.
///
/// `None` as a stored URI marks an undeclaring (XML 1.1); lookups treat
/// it as "not bound".
struct Scope {
	default: Option<Option<NamespaceName>>,
	prefixes: HashMap<NCName, Option<NamespaceName>>,
}

impl Scope {
	fn new() -> Scope {
		Scope {
			default: None,
			prefixes: HashMap::new(),
		}
	}
}

/**
# Namespace/attribute resolver

Resolves element and attribute [`QName`]s against the namespace
declarations in scope, strips the declaration attributes and rejects
duplicate attributes by resolved name.
*/
pub struct NamespaceResolver {
	ctx: RcPtr<Context>,
	fixed_xml_namespace: NamespaceName,
	stack: Vec<Scope>,
	version: XmlVersion,
}

impl NamespaceResolver {
	/// Create a new resolver with its own (unshared) [`Context`].
	pub fn new() -> Self {
		Self::with_context(RcPtr::new(Context::new()))
	}

	/// Create a new resolver with the given [`Context`].
	pub fn with_context(ctx: RcPtr<Context>) -> Self {
		let fixed_xml_namespace = ctx.namespace_name(XMLNS_XML);
		Self {
			ctx,
			fixed_xml_namespace,
			stack: Vec::new(),
			version: XmlVersion::V1_0,
		}
	}

	/// Switch the undeclaring rules to the given XML version.
	pub fn set_version(&mut self, version: XmlVersion) {
		self.version = version;
	}

	/// Access the inner context.
	pub fn context(&self) -> &RcPtr<Context> {
		&self.ctx
	}

	/// Current open-scope depth.
	pub fn depth(&self) -> usize {
		self.stack.len()
	}

	fn lookup_default(&self) -> Option<NamespaceName> {
		for scope in self.stack.iter().rev() {
			if let Some(decl) = scope.default.as_ref() {
				return decl.clone();
			}
		}
		None
	}

	fn lookup_prefix(&self, prefix: &NCName) -> std::result::Result<NamespaceName, NWFError> {
		if prefix == "xml" {
			return Ok(self.fixed_xml_namespace.clone());
		}
		for scope in self.stack.iter().rev() {
			if let Some(decl) = scope.prefixes.get(prefix) {
				return match decl {
					Some(uri) => Ok(uri.clone()),
					// undeclared in an inner scope
					None => Err(NWFError::UndeclaredPrefix),
				};
			}
		}
		Err(NWFError::UndeclaredPrefix)
	}

	fn declare_default(&mut self, scope: &mut Scope, uri: &str, position: Position) -> Result<()> {
		if scope.default.is_some() {
			return Err(Error::nwf(NWFError::DuplicateAttribute, position));
		}
		if uri.is_empty() {
			match self.version {
				XmlVersion::V1_1 => {
					scope.default = Some(None);
				}
				XmlVersion::V1_0 => {
					// only an error when it would actually undeclare
					// something
					if self.lookup_default().is_some() {
						return Err(Error::nwf(NWFError::NoPrefixUndeclaring, position));
					}
					scope.default = Some(None);
				}
			}
		} else {
			scope.default = Some(Some(self.ctx.namespace_name(uri)));
		}
		Ok(())
	}

	fn declare_prefix(
		&mut self,
		scope: &mut Scope,
		prefix: NCName,
		uri: &str,
		position: Position,
	) -> Result<()> {
		let decl = if uri.is_empty() {
			match self.version {
				XmlVersion::V1_1 => None,
				XmlVersion::V1_0 => {
					return Err(Error::nwf(NWFError::NoPrefixUndeclaring, position))
				}
			}
		} else {
			Some(self.ctx.namespace_name(uri))
		};
		match scope.prefixes.entry(prefix) {
			Entry::Occupied(_) => Err(Error::nwf(NWFError::DuplicateAttribute, position)),
			Entry::Vacant(e) => {
				e.insert(decl);
				Ok(())
			}
		}
	}

	/// Resolve an element name; the default namespace applies.
	///
	/// Names which already carry a URI are passed through unchanged.
	pub fn resolve_element_name(&self, name: QName, position: Position) -> Result<QName> {
		if name.uri.is_some() {
			return Ok(name);
		}
		let uri = match name.prefix.as_ref() {
			None => self.lookup_default(),
			Some(prefix) => Some(
				self.lookup_prefix(prefix)
					.map_err(|e| Error::nwf(e, position))?,
			),
		};
		Ok(name.with_uri(uri))
	}

	/// Resolve an attribute name; the default namespace does not apply.
	pub fn resolve_attribute_name(&self, name: QName, position: Position) -> Result<QName> {
		if name.uri.is_some() {
			return Ok(name);
		}
		let uri = match name.prefix.as_ref() {
			None => None,
			Some(prefix) => Some(
				self.lookup_prefix(prefix)
					.map_err(|e| Error::nwf(e, position))?,
			),
		};
		Ok(name.with_uri(uri))
	}

	/// Enter an element: process its namespace declarations, push the
	/// new scope, resolve the element name and the remaining attributes
	/// and check them for duplicates by resolved name.
	///
	/// Attribute values must be flattened (reference-resolved) before
	/// they are used as namespace names; the caller is expected to have
	/// run the [`EntityEnv`] over them.
	pub fn start_element(
		&mut self,
		name: QName,
		attributes: Vec<Attribute>,
		position: Position,
	) -> Result<(QName, Vec<Attribute>)> {
		let mut scope = Scope::new();
		let mut plain = Vec::with_capacity(attributes.len());
		for attr in attributes {
			let is_default = attr.name.prefix.is_none() && attr.name.local == "xmlns";
			let is_prefixed = attr.name.prefix.as_ref().map(|p| p == "xmlns").unwrap_or(false);
			if !is_default && !is_prefixed {
				plain.push(attr);
				continue;
			}
			let value = match attr.as_text() {
				Some(v) => v.to_string(),
				// unresolved references have no place in a namespace
				// name
				None => return Err(Error::nwf(NWFError::EmptyNamespaceUri, position)),
			};
			if is_default {
				self.declare_default(&mut scope, &value, position)?;
			} else {
				let prefix = attr.name.local.clone();
				self.declare_prefix(&mut scope, prefix, &value, position)?;
			}
		}
		self.stack.push(scope);

		let name = self.resolve_element_name(name, position)?;
		let mut resolved = Vec::with_capacity(plain.len());
		let mut seen: HashMap<(Option<NamespaceName>, NCName), ()> =
			HashMap::with_capacity(plain.len());
		for attr in plain {
			let rname = self.resolve_attribute_name(attr.name, position)?;
			match seen.entry((rname.uri.clone(), rname.local.clone())) {
				Entry::Occupied(_) => {
					return Err(Error::nwf(NWFError::DuplicateAttribute, position))
				}
				Entry::Vacant(e) => e.insert(()),
			};
			resolved.push(Attribute {
				name: rname,
				value: attr.value,
			});
		}
		Ok((name, resolved))
	}

	/// Leave an element: resolve the end tag name in the element's own
	/// scope and pop it.
	pub fn end_element(&mut self, name: QName, position: Position) -> Result<QName> {
		let resolved = self.resolve_element_name(name, position)?;
		self.stack.pop();
		Ok(resolved)
	}

	/// Resolve a whole tree.
	///
	/// Since trees carry no positions, errors are reported at the
	/// document start position. Attribute values containing references
	/// are flattened through `env` before namespace declarations are
	/// interpreted.
	pub fn resolve_tree(&mut self, elem: Element, env: &EntityEnv) -> Result<Element> {
		let position = Position::START;
		let mut attributes = Vec::with_capacity(elem.attributes.len());
		for attr in elem.attributes {
			let is_nsdecl = (attr.name.prefix.is_none() && attr.name.local == "xmlns")
				|| attr.name.prefix.as_ref().map(|p| p == "xmlns").unwrap_or(false);
			if is_nsdecl && attr.as_text().is_none() {
				let flat = env
					.flatten_value(&attr.value)
					.map_err(|e| e.at(position))?;
				attributes.push(Attribute {
					name: attr.name,
					value: vec![ValuePart::Text(flat)],
				});
			} else {
				attributes.push(attr);
			}
		}
		let (name, attributes) = self.start_element(elem.name, attributes, position)?;
		let mut children = Vec::with_capacity(elem.children.len());
		for child in elem.children {
			children.push(match child {
				XmlNode::Element(e) => XmlNode::Element(self.resolve_tree(e, env)?),
				other => other,
			});
		}
		self.stack.pop();
		Ok(Element {
			name,
			attributes,
			children,
		})
	}
}
