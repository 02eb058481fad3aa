//! The capability set the reconciler needs from whatever owns the live tree.

use crate::{
	error::Result,
	options::AttributeNames,
	selector::Selector,
	shadow::{ShadowElement, ShadowNode},
};
use core::fmt::Debug;
use tracing::{instrument, trace};

/// What a live node is, as far as the reconciler cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	Element,
	Text,
	/// Comments, processing instructions and the like. Never matched.
	Other,
}

/// A live document the reconciler can read from and write to.
///
/// Queries search all descendants of `root`, not just its children, in document order.
///
/// # Correct Use
///
/// Implementations are single-writer: nothing else may mutate a subtree while a patch runs against it.
/// Errors are passed straight through by the reconciler, so they should describe the failed primitive.
pub trait Document {
	/// A cheap handle to a node of this document.
	type Node: Clone + Debug + PartialEq;

	fn create_element(&mut self, tag: &str) -> Result<Self::Node>;
	fn create_text_node(&mut self, text: &str) -> Result<Self::Node>;

	fn kind(&self, node: &Self::Node) -> NodeKind;
	fn tag_name(&self, node: &Self::Node) -> Option<String>;
	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
	fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;
	fn has_child_nodes(&self, node: &Self::Node) -> bool;
	fn get_attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
	fn has_attribute(&self, node: &Self::Node, name: &str) -> bool;

	fn query_selector(&self, root: &Self::Node, selector: &Selector, names: &AttributeNames) -> Result<Option<Self::Node>>;
	fn query_selector_all(&self, root: &Self::Node, selector: &Selector, names: &AttributeNames) -> Result<Vec<Self::Node>>;

	/// Moves `child` to the end of `parent`'s child list.
	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<()>;
	/// `reference` must be a child of `parent`.
	fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, reference: &Self::Node) -> Result<()>;
	/// `old` must be a child of `parent`.
	fn replace_child(&mut self, parent: &Self::Node, new: &Self::Node, old: &Self::Node) -> Result<()>;
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<()>;
	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<()>;
	/// Removes all children, like assigning an empty `innerHTML`.
	fn clear_children(&mut self, node: &Self::Node) -> Result<()>;

	/// Deep structural equality, like `Node.isEqualNode`.
	fn is_equal_node(&self, a: &Self::Node, b: &Self::Node) -> bool;
}

/// Builds a detached live node (with its whole subtree) from `shadow`.
#[instrument(skip(document, shadow))]
pub fn materialize<D: Document + ?Sized>(document: &mut D, shadow: &ShadowNode) -> Result<D::Node> {
	match shadow {
		ShadowNode::Text(text) => document.create_text_node(text),
		ShadowNode::Element(element) => materialize_element(document, element),
	}
}

fn materialize_element<D: Document + ?Sized>(document: &mut D, element: &ShadowElement) -> Result<D::Node> {
	let node = document.create_element(&element.tag)?;
	for attribute in &element.attributes {
		document.set_attribute(&node, &attribute.name, &attribute.value)?;
	}
	for child in &element.children {
		let child = materialize(document, child)?;
		document.append_child(&node, &child)?;
	}
	trace!(tag = %element.tag, children = element.children.len(), "Materialized element");
	Ok(node)
}
