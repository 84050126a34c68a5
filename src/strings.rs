/*!
# Strongly-typed strings for use with XML documents

String types which are checked to contain only text conforming to the
respective grammar production. Carrying the check in the type avoids
re-validating names and character data on every use.

## Type overview

- [`Name`] represents the `Name` production restricted to at most one
  colon; it is used for element type names inside DTD declarations and
  for document type names.
- [`NCName`] represents a `Name` without a colon; it is used for
  localnames, prefixes, entity names and PI targets.
- [`CData`] represents a string of XML `Char`s, which are slightly more
  restrictive than Rust `char`. It is used for attribute values and text.

Owned values are constructed through [`std::convert::TryFrom`] from
`&str`, [`String`] or [`smartstring::alias::String`]. `NCName` converts
into `Name` and both convert into `CData` losslessly via `From`.
*/
use std::borrow::Borrow;
use std::convert::TryFrom;
use std::fmt;
use std::ops::Deref;

use smartstring::alias::String as SmartString;

use crate::chars::{validate_cdata, validate_name, validate_ncname, ValidationError};

macro_rules! pxml_checked_string_type {
	(
		$(#[$outer:meta])*
		pub struct $name:ident($string:ty) use $check:ident;
	) => {
		$(#[$outer])*
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
		#[repr(transparent)]
		pub struct $name($string);

		impl $name {
			/// Extract the inner string and return it.
			pub fn into_inner(self) -> $string {
				self.0
			}

			/// Obtain a reference to the inner string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}

			/// Construct without checking the grammar production.
			///
			/// # Safety
			///
			/// The caller is responsible for ensuring that the passed
			/// string is in fact valid.
			pub unsafe fn from_str_unchecked<T: AsRef<str>>(s: T) -> Self {
				Self(s.as_ref().into())
			}

			/// Construct without checking the grammar production.
			///
			/// # Safety
			///
			/// The caller is responsible for ensuring that the passed
			/// string is in fact valid.
			pub unsafe fn from_string_unchecked<T: Into<$string>>(s: T) -> Self {
				Self(s.into())
			}
		}

		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}

		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}

		impl PartialEq<str> for $name {
			fn eq(&self, other: &str) -> bool {
				self.as_str() == other
			}
		}

		impl PartialEq<$name> for str {
			fn eq(&self, other: &$name) -> bool {
				self == other.as_str()
			}
		}

		impl PartialEq<&str> for $name {
			fn eq(&self, other: &&str) -> bool {
				self.as_str() == *other
			}
		}

		impl PartialEq<$name> for &str {
			fn eq(&self, other: &$name) -> bool {
				*self == other.as_str()
			}
		}

		impl From<$name> for String {
			fn from(other: $name) -> Self {
				other.0.into()
			}
		}

		impl TryFrom<&str> for $name {
			type Error = ValidationError;

			fn try_from(other: &str) -> Result<Self, Self::Error> {
				$check(other)?;
				Ok($name(other.into()))
			}
		}

		impl TryFrom<String> for $name {
			type Error = ValidationError;

			fn try_from(other: String) -> Result<Self, Self::Error> {
				$check(&other)?;
				Ok($name(other.into()))
			}
		}

		impl TryFrom<SmartString> for $name {
			type Error = ValidationError;

			fn try_from(other: SmartString) -> Result<Self, Self::Error> {
				$check(&other)?;
				Ok($name(other.into()))
			}
		}

		impl fmt::Display for $name {
			fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
				f.write_str(&self.0)
			}
		}
	};
}

pxml_checked_string_type! {
	/// String which conforms to the Name production, restricted to at
	/// most one colon.
	///
	/// This is the unsplit form of a qualified name as it appears in the
	/// document; splitting into prefix and localpart is done with
	/// [`Name::split_name()`].
	pub struct Name(SmartString) use validate_name;
}

pxml_checked_string_type! {
	/// String which conforms to the NCName production of Namespaces in
	/// XML 1.0 (a `Name` without colons).
	pub struct NCName(SmartString) use validate_ncname;
}

pxml_checked_string_type! {
	/// String which consists only of XML `Char`s.
	///
	/// `CData` values do not contain references or CDATA sections; those
	/// are expanded during parsing.
	pub struct CData(String) use validate_cdata;
}

impl Name {
	/// Split the name at the colon, if it exists.
	///
	/// If the name contains no colon, returns `(None, localname)`.
	/// The checks of the `Name` production guarantee that both sides of
	/// an existing colon are valid NCNames.
	pub fn split_name(self) -> (Option<NCName>, NCName) {
		let mut name = self.0;
		let colon_pos = match name.find(':') {
			None => return (None, unsafe { NCName::from_string_unchecked(name) }),
			Some(pos) => pos,
		};
		let localname = name.split_off(colon_pos + 1);
		name.pop();
		(
			Some(unsafe { NCName::from_string_unchecked(name) }),
			unsafe { NCName::from_string_unchecked(localname) },
		)
	}
}

impl NCName {
	/// Convert the [`NCName`] into a [`Name`].
	///
	/// This operation is O(1), as NCNames are a strict subset of Names.
	pub fn as_name(self) -> Name {
		unsafe { Name::from_string_unchecked(self.0) }
	}

	/// Compose a prefix and a localname to one [`Name`], separating them
	/// with a colon.
	///
	/// This is the inverse of [`Name::split_name()`].
	pub fn with_suffix(&self, suffix: &NCName) -> Name {
		let mut s = String::with_capacity(self.len() + 1 + suffix.len());
		s.push_str(self);
		s.push_str(":");
		s.push_str(suffix);
		// an NCName cannot contain a colon, so the composition has
		// exactly one
		unsafe { Name::from_string_unchecked(s) }
	}
}

impl From<NCName> for Name {
	fn from(other: NCName) -> Self {
		other.as_name()
	}
}

impl From<NCName> for CData {
	fn from(other: NCName) -> Self {
		// NCNames can only consist of valid XML chars
		unsafe { CData::from_string_unchecked(other.0) }
	}
}

impl From<Name> for CData {
	fn from(other: Name) -> Self {
		// Names can only consist of valid XML chars
		unsafe { CData::from_string_unchecked(other.0) }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::convert::TryInto;

	#[test]
	fn split_name_without_colon() {
		let nm: Name = "foo".try_into().unwrap();
		let (prefix, local) = nm.split_name();
		assert!(prefix.is_none());
		assert_eq!(local, "foo");
	}

	#[test]
	fn split_name_with_colon() {
		let nm: Name = "foo:bar".try_into().unwrap();
		let (prefix, local) = nm.split_name();
		assert_eq!(prefix.unwrap(), "foo");
		assert_eq!(local, "bar");
	}

	#[test]
	fn name_rejects_two_colons() {
		let r: Result<Name, _> = "a:b:c".try_into();
		assert!(r.is_err());
	}

	#[test]
	fn with_suffix_is_inverse_of_split_name() {
		let prefix: NCName = "xmlns".try_into().unwrap();
		let local: NCName = "stream".try_into().unwrap();
		let name = prefix.with_suffix(&local);
		assert_eq!(name, "xmlns:stream");
		let (p, l) = name.split_name();
		assert_eq!(p.unwrap(), "xmlns");
		assert_eq!(l, "stream");
	}

	#[test]
	fn cdata_allows_slashes_and_markup_chars() {
		let _: CData = "http://www.w3.org/XML/1998/namespace".try_into().unwrap();
		let _: CData = "foo bar <fnord!>".try_into().unwrap();
	}

	#[test]
	fn cdata_rejects_forbidden_chars() {
		let r: Result<CData, _> = "\x00".try_into();
		assert!(r.is_err());
	}
}
