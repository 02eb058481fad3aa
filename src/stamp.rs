//! Content fingerprints for render output.
//!
//! A renderer that stamps its elements this way gets the reconciler's skip-if-unchanged behaviour for free.
//! Uids can't be derived from content and have to come from the template.

use crate::{
	options::AttributeNames,
	shadow::{ShadowElement, ShadowNode},
};

/// Hex digits kept from the BLAKE3 digest.
pub const HASH_LENGTH: usize = 16;

/// Fingerprints `node` as rendered, ignoring its own hash attribute.
#[must_use]
pub fn hash_of(node: &ShadowNode, names: &AttributeNames) -> String {
	match node {
		ShadowNode::Text(_) => digest(&node.to_html()),
		ShadowNode::Element(element) => element_hash(element, names),
	}
}

fn element_hash(element: &ShadowElement, names: &AttributeNames) -> String {
	let mut html = String::new();
	element.write_html(&mut html, &mut |name: &str| name == names.hash).ok();
	digest(&html)
}

fn digest(html: &str) -> String {
	blake3::hash(html.as_bytes()).to_hex()[..HASH_LENGTH].to_owned()
}

/// Stamps a hash attribute onto every element in `node`, children first.
pub fn stamp_hashes(node: &mut ShadowNode, names: &AttributeNames) {
	if let ShadowNode::Element(element) = node {
		for child in &mut element.children {
			stamp_hashes(child, names);
		}
		let hash = element_hash(element, names);
		element.set_attribute(names.hash.clone(), hash);
	}
}

pub fn stamp_fragment(fragment: &mut [ShadowNode], names: &AttributeNames) {
	for node in fragment {
		stamp_hashes(node, names);
	}
}
