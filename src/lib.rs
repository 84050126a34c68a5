/*!
# XML 1.0/1.1 pull parsing with templated documents

This crate provides pull parsing of XML 1.0 and 1.1 documents with
namespacing, an internal-DTD-subset reader, and a tree builder with an
optional *partial parsing* mode in which a document is assembled from
source fragments and externally supplied values.

## Features

* Streamed pull parsing (the parser is an iterator of [`XmlEvent`]s)
* Namespace-well-formedness enforced; prefixes resolved to URIs
* Internal DTD subset parsed (markup declarations recorded, general
  entities usable in content and attribute values); no external DTD
  resources are ever fetched
* Character and entity references resolved, with recursion detection
* Partial (templated) parsing: parsing suspends at the end of a
  fragment and resumes once values and the next fragment are supplied
* Character input: the parser is fed decoded characters; byte decoding
  is the caller's concern
* Errors carry line/column positions and XML production numbers

## Example

```
let root = pxml::parse("<greeting kind='ceremonial'>Hello!</greeting>").unwrap();
assert_eq!(root.name.local, "greeting");
assert_eq!(root.attributes[0].as_text(), Some("ceremonial"));
```

## Event-level usage

For streaming consumers, drive the [`Parser`] directly:

```
use pxml::{Parser, XmlEvent};
let mut p = Parser::from_str("<hello>World!</hello>");
let mut texts = Vec::new();
p.read_all(|ev| {
	if let XmlEvent::Text { data, .. } = ev {
		texts.push(data);
	}
})
.unwrap();
assert_eq!(texts.len(), 1);
```

## Templated documents

[`parse_parts`] interleaves source fragments with arguments: attribute
sequences, attribute values (where `None` drops the attribute) and node
sequences:

```
use pxml::{parse_parts, TemplateArg};
let root = parse_parts(
	&["<item count=", "/>"],
	vec![TemplateArg::Value(Some("3".to_string()))],
)
.unwrap();
assert_eq!(root.attributes[0].as_text(), Some("3"));
```
*/

pub mod builder;
pub mod chars;
pub mod context;
pub mod error;
pub mod event;
pub mod lexer;
pub mod namespaces;
pub mod parser;
pub mod reader;
pub mod refs;
pub mod strings;
pub mod tree;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use builder::{parse, parse_document, parse_parts, parse_parts_document, TemplateArg, TreeBuilder};
#[doc(inline)]
pub use context::Context;
#[doc(inline)]
pub use error::{Error, ErrorKind, NWFError, Position, Result, WFError};
#[doc(inline)]
pub use event::{ExternalId, MarkupDecl, XmlEvent, XmlVersion};
#[doc(inline)]
pub use namespaces::NamespaceResolver;
#[doc(inline)]
pub use parser::{Events, Parser};
#[doc(inline)]
pub use reader::Reader;
#[doc(inline)]
pub use refs::EntityEnv;
pub use strings::{CData, NCName, Name};
#[doc(inline)]
pub use tree::{
	Attribute, Document, Element, NamespaceName, QName, RcPtr, ValuePart, XmlNode, XMLNS_XML,
	XMLNS_XMLNS,
};

/// Package version
pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
