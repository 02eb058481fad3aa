//! Merges shadow fragments into live subtrees.
//!
//! This is not a tree diff. Each shadow child is located in the live tree by the strongest identity it carries
//! (`tag[uid]`, then `id`, then first class token, then deep equality) and is then skipped, replaced, removed,
//! appended or merged one level deeper. Unmatched nodes are always appended at the end, so sibling order
//! is only kept for nodes that were matched in place.

use crate::{
	document::{materialize, Document, NodeKind},
	error::{Error, Result},
	identity::{Identity, Lookup},
	options::{AttributeNames, PatchMode, PatchOptions},
	selector::Selector,
	shadow::{ShadowElement, ShadowNode},
};
use core::fmt::{self, Debug, Formatter};
use tracing::{error, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// Owns a [`Document`] and keeps live subtrees of it in sync with successive renders.
///
/// # Correct Use
///
/// Only one patch may run against a given live subtree at a time, and nothing else may mutate that subtree meanwhile.
/// There is no rollback: If the document reports an error, the subtree is left as far as the patch got.
#[derive(Debug)]
pub struct Patcher<D: Document> {
	document: D,
	options: PatchOptions,
}

impl<D: Document> Patcher<D> {
	#[must_use]
	pub fn new(document: D) -> Self {
		Self::with_options(document, PatchOptions::default())
	}

	#[must_use]
	pub fn with_options(document: D, options: PatchOptions) -> Self {
		Self { document, options }
	}

	#[must_use]
	pub fn options(&self) -> &PatchOptions {
		&self.options
	}

	#[must_use]
	pub fn document(&self) -> &D {
		&self.document
	}

	pub fn document_mut(&mut self) -> &mut D {
		&mut self.document
	}

	#[must_use]
	pub fn into_document(self) -> D {
		self.document
	}

	/// Merges `fragment` into the children of `live`.
	///
	/// # Errors
	///
	/// Iff the [`Document`] reports one. Nothing is rolled back.
	#[instrument(skip(self, fragment))]
	pub fn patch(&mut self, fragment: &[ShadowNode], live: &D::Node, mode: PatchMode) -> Result<()> {
		let Self { document, options } = self;
		let result = Reconciler {
			document,
			names: &options.attribute_names,
			mode,
			path: TracePath::default(),
		}
		.patch_children(fragment, live);

		if let Err(error) = &result {
			error!("Patch aborted, the live tree may be partially updated: {}", redact_error(error));
		}
		result
	}
}

struct Reconciler<'a, D: Document> {
	document: &'a mut D,
	names: &'a AttributeNames,
	mode: PatchMode,
	path: TracePath,
}

impl<'a, D: Document> Reconciler<'a, D> {
	fn patch_children(&mut self, fragment: &[ShadowNode], live: &D::Node) -> Result<()> {
		if !self.document.has_child_nodes(live) {
			let span = trace_span!("Appending fragment to empty live node", path = ?self.path, fragment_len = fragment.len());
			let _enter = span.enter();
			for shadow in fragment {
				self.append(live, shadow)?;
			}
			return Ok(());
		}

		// Text is placed against the children as they were before this pass.
		let snapshot = self.document.child_nodes(live);
		for (index, shadow) in fragment.iter().enumerate() {
			self.path.push(index);
			let result = match shadow {
				ShadowNode::Text(text) => self.patch_text(index, shadow, text, live, &snapshot),
				ShadowNode::Element(element) => self.patch_element(shadow, element, live),
			};
			self.path.pop();
			result?;
		}
		Ok(())
	}

	/// Text nodes aren't content-addressed. Non-blank text goes in front of the live child that sat at its index
	/// when the pass started, as long as that child is still under `live`.
	fn patch_text(&mut self, index: usize, shadow: &ShadowNode, text: &str, live: &D::Node, snapshot: &[D::Node]) -> Result<()> {
		if shadow.is_blank_text() {
			let span = trace_span!("Appending blank text", path = ?self.path, text = ?redact(text));
			let _enter = span.enter();
			return self.append(live, shadow);
		}

		let reference = snapshot.get(index).filter(|reference| self.document.parent_node(reference).as_ref() == Some(live));
		match reference {
			Some(reference) => {
				let span = trace_span!("Inserting text at live index", path = ?self.path, index, text = ?redact(text));
				let _enter = span.enter();
				let node = materialize(&mut *self.document, shadow)?;
				self.document.insert_before(live, &node, reference)
			}
			None => {
				let span = trace_span!("Appending text without a live sibling at its index", path = ?self.path, index, text = ?redact(text));
				let _enter = span.enter();
				self.append(live, shadow)
			}
		}
	}

	fn patch_element(&mut self, shadow: &ShadowNode, element: &ShadowElement, live: &D::Node) -> Result<()> {
		let identity = Identity::of(element, self.names);
		let tier = identity.tier();
		let span = trace_span!("Patching element", path = ?self.path, tag = %element.tag, ?tier, id = ?identity.id.map(redact), class = ?identity.class.map(redact), hash = ?identity.hash.map(redact), uid = ?identity.uid.map(redact));
		let _enter = span.enter();

		match identity.lookup(&element.tag) {
			Lookup::Structural => {
				let candidates = self.document.child_nodes(live);
				self.replace_equal_or_append(live, &candidates, shadow)
			}

			Lookup::Class(selector) => {
				let candidates = self.document.query_selector_all(live, &selector, self.names)?;
				if candidates.is_empty() {
					trace!("No live node carries class {}", redact_selector(&selector));
					self.append(live, shadow)
				} else {
					trace!("{} live candidate(s) for class {}", candidates.len(), redact_selector(&selector));
					self.replace_equal_or_append(live, &candidates, shadow)
				}
			}

			Lookup::Id(selector) => match self.document.query_selector(live, &selector, self.names)? {
				None => {
					trace!("No live node with {}. Appending.", redact_selector(&selector));
					self.append(live, shadow)
				}
				Some(target) => {
					trace!("Found {}. Replacing wholesale.", redact_selector(&selector));
					self.replace(&target, shadow)
				}
			},

			Lookup::Uid(selector) => self.patch_keyed(shadow, element, &identity, &selector, live),
		}
	}

	fn patch_keyed(&mut self, shadow: &ShadowNode, element: &ShadowElement, identity: &Identity<'_>, selector: &Selector, live: &D::Node) -> Result<()> {
		let target = match self.document.query_selector(live, selector, self.names)? {
			Some(target) => target,
			None => {
				trace!("Nothing matches {}. Appending as new.", redact_selector(selector));
				return self.append(live, shadow);
			}
		};

		if cfg!(debug_assertions) && STATIC_MAX_LEVEL >= Level::WARN {
			let count = self.document.query_selector_all(live, selector, self.names)?.len();
			if count > 1 {
				warn!("{} live nodes match {}; only the first one is patched.", count, redact_selector(selector));
			}
		}

		if self.mode == PatchMode::ReplaceOnly {
			trace!("Replace-only mode. Replacing {}.", redact_selector(selector));
			return self.replace(&target, shadow);
		}

		if element.has_attribute(&self.names.removed) {
			trace!("Removal marker set. Removing {}.", redact_selector(selector));
			return self.remove(&target);
		}

		if identity.hash.is_some() && self.document.get_attribute(&target, &self.names.hash).as_deref() == identity.hash {
			trace!("Hash unchanged. Skipping subtree.");
			return Ok(());
		}

		if element.children.is_empty() {
			trace!("Hash changed and no shadow children. Replacing {}.", redact_selector(selector));
			return self.replace(&target, shadow);
		}

		self.remove_text_children(&target)?;
		self.merge_attributes(&target, element)?;

		if self.document.child_nodes(&target).len() <= 1 {
			let span = trace_span!("Resetting content", children = element.children.len());
			let _enter = span.enter();
			self.document.clear_children(&target)?;
			for child in &element.children {
				self.append(&target, child)?;
			}
			Ok(())
		} else {
			let span = trace_span!("Recursing into", selector = %redact_selector(selector));
			let _enter = span.enter();
			self.patch_children(&element.children, &target)
		}
	}

	/// Copies every shadow attribute onto `target`. Attributes only `target` has are kept.
	#[instrument(skip(self, element))]
	fn merge_attributes(&mut self, target: &D::Node, element: &ShadowElement) -> Result<()> {
		for attribute in &element.attributes {
			self.document.set_attribute(target, &attribute.name, &attribute.value)?;
		}
		trace!("Merged {} attribute(s).", element.attributes.len());
		Ok(())
	}

	fn remove_text_children(&mut self, target: &D::Node) -> Result<()> {
		for child in self.document.child_nodes(target) {
			if self.document.kind(&child) == NodeKind::Text {
				self.document.remove_child(target, &child)?;
			}
		}
		Ok(())
	}

	/// Last resort for nodes without identity: replaces the first candidate deep-equal to `shadow` in place, or appends.
	fn replace_equal_or_append(&mut self, live: &D::Node, candidates: &[D::Node], shadow: &ShadowNode) -> Result<()> {
		let node = materialize(&mut *self.document, shadow)?;
		match candidates.iter().find(|candidate| self.document.is_equal_node(candidate, &node)) {
			Some(equal) => {
				trace!("Found an equal live node. Swapping in place.");
				let parent = self.parent_of(equal, "replace_child")?;
				self.document.replace_child(&parent, &node, equal)
			}
			None => {
				trace!("No equal live node among {} candidate(s). Appending.", candidates.len());
				self.document.append_child(live, &node)
			}
		}
	}

	fn append(&mut self, live: &D::Node, shadow: &ShadowNode) -> Result<()> {
		let node = materialize(&mut *self.document, shadow)?;
		self.document.append_child(live, &node)
	}

	/// `target` may sit anywhere below the live node, so it's swapped out through its own parent.
	fn replace(&mut self, target: &D::Node, shadow: &ShadowNode) -> Result<()> {
		let parent = self.parent_of(target, "replace_child")?;
		let node = materialize(&mut *self.document, shadow)?;
		self.document.replace_child(&parent, &node, target)
	}

	fn remove(&mut self, target: &D::Node) -> Result<()> {
		let parent = self.parent_of(target, "remove_child")?;
		self.document.remove_child(&parent, target)
	}

	fn parent_of(&self, node: &D::Node, operation: &'static str) -> Result<D::Node> {
		self.document.parent_node(node).ok_or_else(|| Error::inconsistency(operation, format!("matched node {:?} has no parent", node)))
	}
}

/// Shadow child indices from the patch root down to the current node.
/// Only recorded with the `log-paths` feature.
#[derive(Default)]
struct TracePath(#[cfg(feature = "log-paths")] Vec<usize>);

impl TracePath {
	#[allow(clippy::unused_self)]
	fn push(&mut self, _index: usize) {
		#[cfg(feature = "log-paths")]
		self.0.push(_index);
	}

	#[allow(clippy::unused_self)]
	fn pop(&mut self) {
		#[cfg(feature = "log-paths")]
		self.0.pop();
	}
}

impl Debug for TracePath {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		#[cfg(feature = "log-paths")]
		return Debug::fmt(&self.0, f);
		#[cfg(not(feature = "log-paths"))]
		f.write_str("…")
	}
}

#[cfg(feature = "dangerous-logging")]
fn redact(text: &str) -> &str {
	text
}

#[cfg(not(feature = "dangerous-logging"))]
fn redact(text: &str) -> Redacted {
	Redacted(text.len())
}

#[cfg(not(feature = "dangerous-logging"))]
struct Redacted(usize);

#[cfg(not(feature = "dangerous-logging"))]
impl Debug for Redacted {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "<{} bytes>", self.0)
	}
}

#[cfg(feature = "dangerous-logging")]
fn redact_selector(selector: &Selector) -> &Selector {
	selector
}

#[cfg(not(feature = "dangerous-logging"))]
fn redact_selector(selector: &Selector) -> RedactedSelector<'_> {
	RedactedSelector(selector)
}

/// Renders the shape of a selector, with its attribute value reduced to a length.
#[cfg(not(feature = "dangerous-logging"))]
struct RedactedSelector<'a>(&'a Selector);

#[cfg(not(feature = "dangerous-logging"))]
impl fmt::Display for RedactedSelector<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.0 {
			Selector::Id(id) => write!(f, "#{:?}", Redacted(id.len())),
			Selector::Class(class) => write!(f, ".{:?}", Redacted(class.len())),
			Selector::TagUid { tag, uid } => write!(f, "{}[uid={:?}]", tag, Redacted(uid.len())),
		}
	}
}

#[cfg(feature = "dangerous-logging")]
fn redact_error(error: &Error) -> &Error {
	error
}

#[cfg(not(feature = "dangerous-logging"))]
fn redact_error(error: &Error) -> RedactedError<'_> {
	RedactedError(error)
}

/// [`Error`]'s message without the rejected selector.
#[cfg(not(feature = "dangerous-logging"))]
struct RedactedError<'a>(&'a Error);

#[cfg(not(feature = "dangerous-logging"))]
impl fmt::Display for RedactedError<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.0 {
			Error::Selector { reason, .. } => write!(f, "selector rejected: {}", reason),
			error => fmt::Display::fmt(error, f),
		}
	}
}
