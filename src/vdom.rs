//! Shadow fragments from [`lignin`] VDOM trees, for renderers that already produce those.

use crate::shadow::{Attribute, ShadowElement, ShadowFragment, ShadowNode};
use lignin::ThreadBound;
use tracing::{instrument, trace, warn};

impl ShadowFragment {
	/// Flattens `vdom` into shadow nodes.
	///
	/// [`Multi`](`lignin::Node::Multi`), [`Keyed`](`lignin::Node::Keyed`) and [`Memoized`](`lignin::Node::Memoized`) are transparent.
	/// Comments are skipped since the reconciler doesn't handle them.
	/// Event bindings and DOM bindings are dropped, as the reconciler copies markup only.
	#[must_use]
	#[instrument(skip(vdom))]
	pub fn from_lignin(vdom: &lignin::Node<'_, ThreadBound>) -> Self {
		let mut nodes = Vec::new();
		flatten_into(&mut nodes, vdom);
		Self(nodes)
	}
}

#[allow(unreachable_patterns)]
fn flatten_into(out: &mut Vec<ShadowNode>, vdom: &lignin::Node<'_, ThreadBound>) {
	match *vdom {
		lignin::Node::Comment { .. } => trace!("Skipping comment."),
		lignin::Node::HtmlElement { element, .. } | lignin::Node::MathMlElement { element, .. } | lignin::Node::SvgElement { element, .. } => {
			out.push(ShadowNode::Element(element_from_lignin(element)));
		}
		lignin::Node::Memoized { content, .. } => flatten_into(out, content),
		lignin::Node::Multi(nodes) => {
			for node in nodes {
				flatten_into(out, node);
			}
		}
		lignin::Node::Keyed(reorderable_fragments) => {
			for lignin::ReorderableFragment { content, .. } in reorderable_fragments {
				flatten_into(out, content);
			}
		}
		lignin::Node::Text { text, .. } => out.push(ShadowNode::Text(text.to_owned())),
		lignin::Node::RemnantSite(_) => warn!("Skipping remnant site, which has no markup of its own."),
		_ => warn!("Skipping unsupported VDOM node."),
	}
}

fn element_from_lignin(element: &lignin::Element<'_, ThreadBound>) -> ShadowElement {
	let mut children = Vec::new();
	flatten_into(&mut children, &element.content);
	ShadowElement {
		tag: element.name.to_owned(),
		attributes: element
			.attributes
			.iter()
			.map(|&lignin::Attribute { name, value }| Attribute {
				name: name.to_owned(),
				value: value.to_owned(),
			})
			.collect(),
		children,
	}
}
