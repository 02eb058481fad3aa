//! [`Document`] over the browser DOM.

use crate::{
	document::{Document, NodeKind},
	error::{Error, Result},
	options::{AttributeNames, PatchMode},
	patch::Patcher,
	selector::Selector,
	shadow::{Attribute, ShadowElement, ShadowFragment, ShadowNode},
};
use tracing::{instrument, trace};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, NamedNodeMap, Node, NodeList, Text};

#[derive(Debug, Clone)]
pub struct WebDocument {
	document: web_sys::Document,
}

impl WebDocument {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self { document }
	}

	/// The `document` of the current global `window`.
	///
	/// # Errors
	///
	/// [`Error::EnvironmentUnavailable`] outside of a browser main thread.
	pub fn from_window() -> Result<Self> {
		let window = web_sys::window().ok_or_else(|| Error::EnvironmentUnavailable {
			reason: "no global `window`".to_owned(),
		})?;
		let document = window.document().ok_or_else(|| Error::EnvironmentUnavailable {
			reason: "`window` has no `document`".to_owned(),
		})?;
		Ok(Self::new(document))
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	/// Parses `markup` into shadow nodes.
	///
	/// `DocumentFragment` can't parse HTML by itself, so the markup goes through a discarded `<div>`'s `innerHTML`
	/// and its children are then moved over one by one. Whatever the parser does with the markup inside a `<div>`
	/// (implied end tags, dropped `<tr>`s outside tables…) applies here too.
	#[instrument(skip(self, markup))]
	pub fn shadow_fragment(&self, markup: &str) -> Result<ShadowFragment> {
		let scratch = self.document.create_element("div").map_err(|error| js_inconsistency("create_element", &error))?;
		scratch.set_inner_html(markup);

		let fragment = self.document.create_document_fragment();
		while let Some(child) = scratch.first_child() {
			fragment.append_child(&child).map_err(|error| js_inconsistency("append_child", &error))?;
		}

		let nodes = load_child_nodes(&fragment.child_nodes());
		trace!("Parsed {} top-level node(s).", nodes.len());
		Ok(ShadowFragment(nodes))
	}

	/// Reads an existing DOM subtree back into shadow form. Comments are dropped.
	#[must_use]
	pub fn load(&self, node: &Node) -> Option<ShadowNode> {
		load_node(node)
	}
}

impl Patcher<WebDocument> {
	/// Parses `markup` and patches it into `live`.
	///
	/// # Errors
	///
	/// See [`WebDocument::shadow_fragment`] and [`Patcher::patch`].
	pub fn patch_markup(&mut self, markup: &str, live: &Node, mode: PatchMode) -> Result<()> {
		let fragment = self.document().shadow_fragment(markup)?;
		self.patch(&fragment, live, mode)
	}
}

fn load_child_nodes(child_nodes: &NodeList) -> Vec<ShadowNode> {
	(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).filter_map(|child| load_node(&child)).collect()
}

fn load_node(node: &Node) -> Option<ShadowNode> {
	if let Some(element) = node.dyn_ref::<Element>() {
		Some(ShadowNode::Element(load_element(element)))
	} else if let Some(text) = node.dyn_ref::<Text>() {
		Some(ShadowNode::Text(text.data()))
	} else {
		trace!("Skipping non-element, non-text node {:?}.", node.node_name());
		None
	}
}

fn load_element(element: &Element) -> ShadowElement {
	let node: &Node = element.as_ref();
	ShadowElement {
		tag: element.local_name(),
		attributes: load_attributes(&element.attributes()),
		children: load_child_nodes(&node.child_nodes()),
	}
}

fn load_attributes(attributes: &NamedNodeMap) -> Vec<Attribute> {
	(0..attributes.length())
		.filter_map(|i| attributes.item(i))
		.map(|attribute| Attribute {
			name: attribute.name(),
			value: attribute.value(),
		})
		.collect()
}

fn describe(error: &JsValue) -> String {
	match error.dyn_ref::<js_sys::Error>() {
		Some(error) => String::from(error.message()),
		None => format!("{:?}", error),
	}
}

fn js_inconsistency(operation: &'static str, error: &JsValue) -> Error {
	Error::inconsistency(operation, describe(error))
}

fn as_element<'a>(node: &'a Node, operation: &'static str) -> Result<&'a Element> {
	node.dyn_ref::<Element>().ok_or_else(|| Error::inconsistency(operation, format!("{} is not an element", node.node_name())))
}

impl Document for WebDocument {
	type Node = Node;

	fn create_element(&mut self, tag: &str) -> Result<Node> {
		self.document.create_element(tag).map(Into::into).map_err(|error| js_inconsistency("create_element", &error))
	}

	fn create_text_node(&mut self, text: &str) -> Result<Node> {
		Ok(self.document.create_text_node(text).into())
	}

	fn kind(&self, node: &Node) -> NodeKind {
		match node.node_type() {
			Node::ELEMENT_NODE => NodeKind::Element,
			Node::TEXT_NODE => NodeKind::Text,
			_ => NodeKind::Other,
		}
	}

	fn tag_name(&self, node: &Node) -> Option<String> {
		node.dyn_ref::<Element>().map(Element::local_name)
	}

	fn parent_node(&self, node: &Node) -> Option<Node> {
		node.parent_node()
	}

	fn child_nodes(&self, node: &Node) -> Vec<Node> {
		let child_nodes = node.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).collect()
	}

	fn has_child_nodes(&self, node: &Node) -> bool {
		node.has_child_nodes()
	}

	fn get_attribute(&self, node: &Node, name: &str) -> Option<String> {
		node.dyn_ref::<Element>()?.get_attribute(name)
	}

	fn has_attribute(&self, node: &Node, name: &str) -> bool {
		node.dyn_ref::<Element>().map_or(false, |element| element.has_attribute(name))
	}

	fn query_selector(&self, root: &Node, selector: &Selector, names: &AttributeNames) -> Result<Option<Node>> {
		let css = selector.to_css(names);
		as_element(root, "query_selector")?
			.query_selector(&css)
			.map(|found| found.map(Into::into))
			.map_err(|error| Error::Selector { reason: describe(&error), selector: css })
	}

	fn query_selector_all(&self, root: &Node, selector: &Selector, names: &AttributeNames) -> Result<Vec<Node>> {
		let css = selector.to_css(names);
		let found = as_element(root, "query_selector_all")?
			.query_selector_all(&css)
			.map_err(|error| Error::Selector { reason: describe(&error), selector: css })?;
		Ok((0..found.length()).filter_map(|i| found.get(i)).collect())
	}

	fn append_child(&mut self, parent: &Node, child: &Node) -> Result<()> {
		parent.append_child(child).map(drop).map_err(|error| js_inconsistency("append_child", &error))
	}

	fn insert_before(&mut self, parent: &Node, child: &Node, reference: &Node) -> Result<()> {
		parent.insert_before(child, Some(reference)).map(drop).map_err(|error| js_inconsistency("insert_before", &error))
	}

	fn replace_child(&mut self, parent: &Node, new: &Node, old: &Node) -> Result<()> {
		parent.replace_child(new, old).map(drop).map_err(|error| js_inconsistency("replace_child", &error))
	}

	fn remove_child(&mut self, parent: &Node, child: &Node) -> Result<()> {
		parent.remove_child(child).map(drop).map_err(|error| js_inconsistency("remove_child", &error))
	}

	fn set_attribute(&mut self, node: &Node, name: &str, value: &str) -> Result<()> {
		as_element(node, "set_attribute")?.set_attribute(name, value).map_err(|error| js_inconsistency("set_attribute", &error))
	}

	fn clear_children(&mut self, node: &Node) -> Result<()> {
		match node.dyn_ref::<Element>() {
			Some(element) => element.set_inner_html(""),
			None => node.set_text_content(None),
		}
		Ok(())
	}

	fn is_equal_node(&self, a: &Node, b: &Node) -> bool {
		a.is_equal_node(Some(b))
	}
}
