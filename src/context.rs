/*!
# Shared context for multiple parsers

Parsers running in the same application tend to see the same namespace
URIs over and over. The context deduplicates them: every
[`NamespaceName`] handed out for a given URI points at the same
allocation for as long as at least one tree still references it, and
entries expire on their own once the last reference is gone.

Deduplication requires the `shared_ns` feature; without it the context
is inert and hands out fresh allocations. With the `mt` feature the
context is Send and Sync, otherwise it is neither.
*/
use std::fmt;

#[cfg(not(feature = "shared_ns"))]
use crate::strings::CData;
#[cfg(not(feature = "shared_ns"))]
use crate::tree::RcPtr;

use crate::tree::NamespaceName;

/// The one place where the `mt` feature picks the lock flavour and the
/// weak pointer to match; the rest of the module only sees
/// [`storage::with`].
#[cfg(feature = "shared_ns")]
mod storage {
	use crate::strings::CData;

	#[cfg(feature = "mt")]
	pub(super) type NameSet = weak_table::WeakHashSet<std::sync::Weak<CData>>;
	#[cfg(not(feature = "mt"))]
	pub(super) type NameSet = weak_table::WeakHashSet<std::rc::Weak<CData>>;

	#[cfg(feature = "mt")]
	pub(super) type Lock = std::sync::Mutex<NameSet>;
	#[cfg(not(feature = "mt"))]
	pub(super) type Lock = std::cell::RefCell<NameSet>;

	pub(super) fn with<R>(lock: &Lock, f: impl FnOnce(&mut NameSet) -> R) -> R {
		#[cfg(feature = "mt")]
		return f(&mut lock.lock().unwrap());
		#[cfg(not(feature = "mt"))]
		return f(&mut lock.borrow_mut());
	}
}

pub struct Context {
	#[cfg(feature = "shared_ns")]
	names: storage::Lock,
}

impl Context {
	pub fn new() -> Context {
		Context {
			#[cfg(feature = "shared_ns")]
			names: storage::Lock::new(storage::NameSet::new()),
		}
	}

	/// Hand out a shared pointer for a namespace URI.
	///
	/// With `shared_ns`, an existing allocation for the same URI is
	/// reused. The caller guarantees that the string consists of valid
	/// XML chars, which attribute values always do.
	#[cfg(feature = "shared_ns")]
	pub(crate) fn namespace_name(&self, uri: &str) -> NamespaceName {
		use crate::strings::CData;
		use crate::tree::RcPtr;

		storage::with(&self.names, |names| {
			if let Some(shared) = names.get(uri) {
				return shared;
			}
			let fresh = RcPtr::new(unsafe { CData::from_str_unchecked(uri) });
			names.insert(fresh.clone());
			fresh
		})
	}

	/// Hand out a pointer for a namespace URI.
	///
	/// Without `shared_ns`, every call allocates. The caller guarantees
	/// that the string consists of valid XML chars, which attribute
	/// values always do.
	#[cfg(not(feature = "shared_ns"))]
	pub(crate) fn namespace_name(&self, uri: &str) -> NamespaceName {
		RcPtr::new(unsafe { CData::from_str_unchecked(uri) })
	}

	/// Number of distinct URIs currently held, expired entries
	/// included. Always zero without `shared_ns`.
	pub fn interned(&self) -> usize {
		#[cfg(feature = "shared_ns")]
		return storage::with(&self.names, |names| names.len());
		#[cfg(not(feature = "shared_ns"))]
		0
	}

	/// Drop expired entries and give their storage back.
	///
	/// Expiry also happens lazily as new names are inserted, so calling
	/// this is rarely necessary.
	pub fn sweep(&self) {
		#[cfg(feature = "shared_ns")]
		storage::with(&self.names, |names| {
			names.remove_expired();
			names.shrink_to_fit();
		});
	}
}

impl Default for Context {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Context {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Context")
			.field("interned", &self.interned())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn namespace_names_compare_equal() {
		let ctx = Context::new();
		let a = ctx.namespace_name("urn:example");
		let b = ctx.namespace_name("urn:example");
		assert_eq!(a, b);
	}

	#[cfg(feature = "shared_ns")]
	#[test]
	fn equal_uris_share_one_allocation() {
		use crate::tree::RcPtr;

		let ctx = Context::new();
		let a = ctx.namespace_name("urn:example");
		let b = ctx.namespace_name("urn:example");
		assert!(RcPtr::ptr_eq(&a, &b));
		assert_eq!(ctx.interned(), 1);
	}

	#[cfg(feature = "shared_ns")]
	#[test]
	fn entries_expire_with_their_last_reference() {
		let ctx = Context::new();
		let a = ctx.namespace_name("urn:example");
		drop(a);
		ctx.sweep();
		assert_eq!(ctx.interned(), 0);
	}
}
