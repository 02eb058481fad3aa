//! Detached, owned render output that [`Patcher`](`crate::patch::Patcher`) merges into a live tree.

use core::{
	fmt::{self, Display, Formatter, Write as _},
	iter::FromIterator,
	ops::Deref,
};

/// Elements that never have content and are rendered without a closing tag.
const VOID_ELEMENTS: &[&str] = &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: String,
	pub value: String,
}

/// One freshly rendered node.
///
/// The reconciler only ever reads these. Whenever a shadow node ends up in the live tree,
/// the adapter builds a new live node from it and copies the attribute values over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShadowNode {
	Text(String),
	Element(ShadowElement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowElement {
	pub tag: String,
	/// In insertion order. Names are unique.
	pub attributes: Vec<Attribute>,
	pub children: Vec<ShadowNode>,
}

impl ShadowNode {
	#[must_use]
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	#[must_use]
	pub fn element(tag: impl Into<String>) -> Self {
		Self::Element(ShadowElement::new(tag))
	}

	/// Sets an attribute, overwriting an existing value in place.
	///
	/// Has no effect on text nodes.
	#[must_use]
	pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		if let Self::Element(element) = &mut self {
			element.set_attribute(name, value);
		}
		self
	}

	/// Appends a child. Has no effect on text nodes.
	#[must_use]
	pub fn child(mut self, child: ShadowNode) -> Self {
		if let Self::Element(element) = &mut self {
			element.children.push(child);
		}
		self
	}

	#[must_use]
	pub fn children(mut self, children: impl IntoIterator<Item = ShadowNode>) -> Self {
		if let Self::Element(element) = &mut self {
			element.children.extend(children);
		}
		self
	}

	#[must_use]
	pub fn as_element(&self) -> Option<&ShadowElement> {
		match self {
			Self::Element(element) => Some(element),
			Self::Text(_) => None,
		}
	}

	pub fn as_element_mut(&mut self) -> Option<&mut ShadowElement> {
		match self {
			Self::Element(element) => Some(element),
			Self::Text(_) => None,
		}
	}

	/// Whether this is a text node without any non-whitespace content.
	#[must_use]
	pub fn is_blank_text(&self) -> bool {
		matches!(self, Self::Text(text) if text.trim().is_empty())
	}

	#[must_use]
	pub fn to_html(&self) -> String {
		let mut html = String::new();
		self.write_html(&mut html).ok();
		html
	}

	/// Serializes this node as HTML, with text and attribute values escaped.
	pub fn write_html(&self, out: &mut impl fmt::Write) -> fmt::Result {
		match self {
			Self::Text(text) => write_escaped(out, text, false),
			Self::Element(element) => element.write_html(out, &mut |_: &str| false),
		}
	}
}

impl Display for ShadowNode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		self.write_html(f)
	}
}

impl ShadowElement {
	#[must_use]
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			attributes: Vec::new(),
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn get_attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|attribute| attribute.name == name).map(|attribute| attribute.value.as_str())
	}

	#[must_use]
	pub fn has_attribute(&self, name: &str) -> bool {
		self.attributes.iter().any(|attribute| attribute.name == name)
	}

	pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		match self.attributes.iter_mut().find(|attribute| attribute.name == name) {
			Some(existing) => existing.value = value,
			None => self.attributes.push(Attribute { name, value }),
		}
	}

	#[must_use]
	pub fn is_void(&self) -> bool {
		is_void_tag(&self.tag)
	}

	/// Like [`ShadowNode::write_html`], but leaves out any attribute for which `skip_attribute` returns `true`.
	/// Children are written in full.
	pub(crate) fn write_html(&self, out: &mut impl fmt::Write, skip_attribute: &mut dyn FnMut(&str) -> bool) -> fmt::Result {
		write!(out, "<{}", self.tag)?;
		for Attribute { name, value } in &self.attributes {
			if skip_attribute(name.as_str()) {
				continue;
			}
			write!(out, " {}=\"", name)?;
			write_escaped(out, value, true)?;
			out.write_char('"')?;
		}
		if self.is_void() {
			return out.write_str(" />");
		}
		out.write_char('>')?;
		for child in &self.children {
			child.write_html(out)?;
		}
		write!(out, "</{}>", self.tag)
	}
}

pub(crate) fn is_void_tag(tag: &str) -> bool {
	VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(tag))
}

pub(crate) fn write_escaped(out: &mut impl fmt::Write, text: &str, attribute: bool) -> fmt::Result {
	for c in text.chars() {
		match c {
			'&' => out.write_str("&amp;")?,
			'<' => out.write_str("&lt;")?,
			'>' => out.write_str("&gt;")?,
			'"' if attribute => out.write_str("&quot;")?,
			c => out.write_char(c)?,
		}
	}
	Ok(())
}

/// The ordered top level of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowFragment(pub Vec<ShadowNode>);

impl ShadowFragment {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn to_html(&self) -> String {
		self.to_string()
	}
}

impl Deref for ShadowFragment {
	type Target = [ShadowNode];

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl From<Vec<ShadowNode>> for ShadowFragment {
	fn from(nodes: Vec<ShadowNode>) -> Self {
		Self(nodes)
	}
}

impl FromIterator<ShadowNode> for ShadowFragment {
	fn from_iter<T: IntoIterator<Item = ShadowNode>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl Display for ShadowFragment {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		for node in &self.0 {
			node.write_html(f)?;
		}
		Ok(())
	}
}
