//! An arena-backed [`Document`] that runs anywhere, without a browser.

use crate::{
	document::{Document, NodeKind},
	error::{Error, Result},
	options::AttributeNames,
	selector::Selector,
	shadow::{self, Attribute, ShadowElement, ShadowNode},
};
use core::fmt::{self, Write as _};
use hashbrown::HashMap;
use tracing::{instrument, trace};

/// Handle to a node inside one [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
	Element { tag: String, attributes: Vec<Attribute> },
	Text(String),
	Comment(String),
}

#[derive(Debug, Clone)]
struct Slot {
	data: NodeData,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

/// Nodes are never freed. Detached subtrees simply stay in the arena until the document is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
	slots: Vec<Slot>,
	mutations: usize,
}

impl MemoryDocument {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a detached element to patch into. Doesn't count as a mutation.
	pub fn create_root(&mut self, tag: &str) -> NodeId {
		self.push(NodeData::Element {
			tag: tag.to_owned(),
			attributes: Vec::new(),
		})
	}

	pub fn create_comment(&mut self, comment: &str) -> NodeId {
		self.push(NodeData::Comment(comment.to_owned()))
	}

	/// Number of mutating adapter calls so far, including those on detached nodes.
	#[must_use]
	pub fn mutation_count(&self) -> usize {
		self.mutations
	}

	/// Text content of a text or comment node.
	#[must_use]
	pub fn text(&self, node: NodeId) -> Option<&str> {
		match &self.slots.get(node.0)?.data {
			NodeData::Text(text) | NodeData::Comment(text) => Some(text),
			NodeData::Element { .. } => None,
		}
	}

	/// Reads a live subtree back into shadow form. Comments are dropped.
	#[must_use]
	pub fn snapshot(&self, node: NodeId) -> Option<ShadowNode> {
		let slot = self.slots.get(node.0)?;
		match &slot.data {
			NodeData::Text(text) => Some(ShadowNode::Text(text.clone())),
			NodeData::Comment(_) => None,
			NodeData::Element { tag, attributes } => Some(ShadowNode::Element(ShadowElement {
				tag: tag.clone(),
				attributes: attributes.clone(),
				children: slot.children.iter().filter_map(|&child| self.snapshot(child)).collect(),
			})),
		}
	}

	#[must_use]
	pub fn outer_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		self.write_html(&mut html, node).ok();
		html
	}

	#[must_use]
	pub fn inner_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		for &child in self.slots.get(node.0).map_or(&[][..], |slot| slot.children.as_slice()) {
			self.write_html(&mut html, child).ok();
		}
		html
	}

	fn write_html(&self, out: &mut String, node: NodeId) -> fmt::Result {
		let slot = match self.slots.get(node.0) {
			Some(slot) => slot,
			None => return Ok(()),
		};
		match &slot.data {
			NodeData::Text(text) => shadow::write_escaped(out, text, false),
			NodeData::Comment(comment) => write!(out, "<!--{}-->", comment),
			NodeData::Element { tag, attributes } => {
				write!(out, "<{}", tag)?;
				for Attribute { name, value } in attributes {
					write!(out, " {}=\"", name)?;
					shadow::write_escaped(out, value, true)?;
					out.write_char('"')?;
				}
				// A void element that got children anyway keeps its closing tag.
				if shadow::is_void_tag(tag) && slot.children.is_empty() {
					return out.write_str(" />");
				}
				out.write_char('>')?;
				for &child in &slot.children {
					self.write_html(out, child)?;
				}
				write!(out, "</{}>", tag)
			}
		}
	}

	fn push(&mut self, data: NodeData) -> NodeId {
		self.slots.push(Slot { data, parent: None, children: Vec::new() });
		NodeId(self.slots.len() - 1)
	}

	fn slot(&self, node: NodeId, operation: &'static str) -> Result<&Slot> {
		self.slots.get(node.0).ok_or_else(|| Error::inconsistency(operation, format!("{:?} doesn't belong to this document", node)))
	}

	fn slot_mut(&mut self, node: NodeId, operation: &'static str) -> Result<&mut Slot> {
		self.slots.get_mut(node.0).ok_or_else(|| Error::inconsistency(operation, format!("{:?} doesn't belong to this document", node)))
	}

	fn expect_element(&self, node: NodeId, operation: &'static str) -> Result<()> {
		match self.slot(node, operation)?.data {
			NodeData::Element { .. } => Ok(()),
			_ => Err(Error::inconsistency(operation, format!("{:?} is not an element", node))),
		}
	}

	fn expect_child(&self, parent: NodeId, child: NodeId, operation: &'static str) -> Result<usize> {
		self.slot(child, operation)?;
		self.slot(parent, operation)?
			.children
			.iter()
			.position(|&c| c == child)
			.ok_or_else(|| Error::inconsistency(operation, format!("{:?} is not a child of {:?}", child, parent)))
	}

	/// Makes sure `child` can be put under `parent` without creating a cycle.
	fn check_insertable(&self, parent: NodeId, child: NodeId, operation: &'static str) -> Result<()> {
		self.expect_element(parent, operation)?;
		self.slot(child, operation)?;
		let mut ancestor = Some(parent);
		while let Some(current) = ancestor {
			if current == child {
				return Err(Error::inconsistency(operation, format!("{:?} is an inclusive ancestor of {:?}", child, parent)));
			}
			ancestor = self.slots[current.0].parent;
		}
		Ok(())
	}

	fn detach(&mut self, node: NodeId) {
		if let Some(parent) = self.slots[node.0].parent.take() {
			self.slots[parent.0].children.retain(|&c| c != node);
		}
	}

	fn descendants(&self, root: NodeId) -> Vec<NodeId> {
		let mut found = Vec::new();
		let mut stack: Vec<NodeId> = self.slots.get(root.0).map(|slot| slot.children.iter().rev().copied().collect()).unwrap_or_default();
		while let Some(node) = stack.pop() {
			found.push(node);
			stack.extend(self.slots[node.0].children.iter().rev().copied());
		}
		found
	}

	fn matching(&self, root: NodeId, selector: &Selector, names: &AttributeNames) -> impl Iterator<Item = NodeId> + '_ {
		let selector = selector.clone();
		let names = names.clone();
		self.descendants(root).into_iter().filter(move |&node| match &self.slots[node.0].data {
			NodeData::Element { tag, attributes } => {
				let attributes: &[Attribute] = attributes;
				selector.matches(tag, move |name| attribute_value(attributes, name), &names)
			}
			_ => false,
		})
	}
}

fn attribute_value<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
	attributes.iter().find(|attribute| attribute.name == name).map(|attribute| attribute.value.as_str())
}

impl Document for MemoryDocument {
	type Node = NodeId;

	fn create_element(&mut self, tag: &str) -> Result<NodeId> {
		self.mutations += 1;
		Ok(self.push(NodeData::Element {
			tag: tag.to_owned(),
			attributes: Vec::new(),
		}))
	}

	fn create_text_node(&mut self, text: &str) -> Result<NodeId> {
		self.mutations += 1;
		Ok(self.push(NodeData::Text(text.to_owned())))
	}

	fn kind(&self, node: &NodeId) -> NodeKind {
		match self.slots.get(node.0).map(|slot| &slot.data) {
			Some(NodeData::Element { .. }) => NodeKind::Element,
			Some(NodeData::Text(_)) => NodeKind::Text,
			Some(NodeData::Comment(_)) | None => NodeKind::Other,
		}
	}

	fn tag_name(&self, node: &NodeId) -> Option<String> {
		match &self.slots.get(node.0)?.data {
			NodeData::Element { tag, .. } => Some(tag.clone()),
			_ => None,
		}
	}

	fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
		self.slots.get(node.0)?.parent
	}

	fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
		self.slots.get(node.0).map(|slot| slot.children.clone()).unwrap_or_default()
	}

	fn has_child_nodes(&self, node: &NodeId) -> bool {
		self.slots.get(node.0).map_or(false, |slot| !slot.children.is_empty())
	}

	fn get_attribute(&self, node: &NodeId, name: &str) -> Option<String> {
		match &self.slots.get(node.0)?.data {
			NodeData::Element { attributes, .. } => attribute_value(attributes, name).map(ToOwned::to_owned),
			_ => None,
		}
	}

	fn has_attribute(&self, node: &NodeId, name: &str) -> bool {
		self.get_attribute(node, name).is_some()
	}

	fn query_selector(&self, root: &NodeId, selector: &Selector, names: &AttributeNames) -> Result<Option<NodeId>> {
		self.slot(*root, "query_selector")?;
		Ok(self.matching(*root, selector, names).next())
	}

	fn query_selector_all(&self, root: &NodeId, selector: &Selector, names: &AttributeNames) -> Result<Vec<NodeId>> {
		self.slot(*root, "query_selector_all")?;
		Ok(self.matching(*root, selector, names).collect())
	}

	#[instrument(skip(self))]
	fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()> {
		self.check_insertable(*parent, *child, "append_child")?;
		self.mutations += 1;
		self.detach(*child);
		self.slots[child.0].parent = Some(*parent);
		self.slots[parent.0].children.push(*child);
		trace!("Appended");
		Ok(())
	}

	#[instrument(skip(self))]
	fn insert_before(&mut self, parent: &NodeId, child: &NodeId, reference: &NodeId) -> Result<()> {
		self.expect_child(*parent, *reference, "insert_before")?;
		self.check_insertable(*parent, *child, "insert_before")?;
		self.mutations += 1;
		if child == reference {
			return Ok(());
		}
		self.detach(*child);
		let index = self.expect_child(*parent, *reference, "insert_before")?;
		self.slots[child.0].parent = Some(*parent);
		self.slots[parent.0].children.insert(index, *child);
		Ok(())
	}

	#[instrument(skip(self))]
	fn replace_child(&mut self, parent: &NodeId, new: &NodeId, old: &NodeId) -> Result<()> {
		self.expect_child(*parent, *old, "replace_child")?;
		self.check_insertable(*parent, *new, "replace_child")?;
		self.mutations += 1;
		if new == old {
			return Ok(());
		}
		self.detach(*new);
		let index = self.expect_child(*parent, *old, "replace_child")?;
		self.slots[parent.0].children[index] = *new;
		self.slots[new.0].parent = Some(*parent);
		self.slots[old.0].parent = None;
		Ok(())
	}

	#[instrument(skip(self))]
	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()> {
		let index = self.expect_child(*parent, *child, "remove_child")?;
		self.mutations += 1;
		self.slots[parent.0].children.remove(index);
		self.slots[child.0].parent = None;
		Ok(())
	}

	fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<()> {
		let slot = self.slot_mut(*node, "set_attribute")?;
		match &mut slot.data {
			NodeData::Element { attributes, .. } => {
				match attributes.iter_mut().find(|attribute| attribute.name == name) {
					Some(existing) => existing.value = value.to_owned(),
					None => attributes.push(Attribute {
						name: name.to_owned(),
						value: value.to_owned(),
					}),
				}
				self.mutations += 1;
				Ok(())
			}
			_ => Err(Error::inconsistency("set_attribute", format!("{:?} is not an element", node))),
		}
	}

	fn clear_children(&mut self, node: &NodeId) -> Result<()> {
		let children = core::mem::take(&mut self.slot_mut(*node, "clear_children")?.children);
		for child in children {
			self.slots[child.0].parent = None;
		}
		self.mutations += 1;
		Ok(())
	}

	fn is_equal_node(&self, a: &NodeId, b: &NodeId) -> bool {
		let (a, b) = match (self.slots.get(a.0), self.slots.get(b.0)) {
			(Some(a), Some(b)) => (a, b),
			_ => return false,
		};
		let same_data = match (&a.data, &b.data) {
			(NodeData::Text(a), NodeData::Text(b)) | (NodeData::Comment(a), NodeData::Comment(b)) => a == b,
			(NodeData::Element { tag: tag_a, attributes: attributes_a }, NodeData::Element { tag: tag_b, attributes: attributes_b }) => {
				tag_a.eq_ignore_ascii_case(tag_b) && attributes_a.len() == attributes_b.len() && {
					let attributes_a: HashMap<&str, &str> = attributes_a.iter().map(|attribute| (attribute.name.as_str(), attribute.value.as_str())).collect();
					attributes_b.iter().all(|attribute| attributes_a.get(attribute.name.as_str()) == Some(&attribute.value.as_str()))
				}
			}
			_ => false,
		};
		same_data && a.children.len() == b.children.len() && a.children.iter().zip(&b.children).all(|(a, b)| self.is_equal_node(a, b))
	}
}
