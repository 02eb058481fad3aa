use lignin::{Attribute, Element, ElementCreationOptions, Node, ReorderableFragment, ThreadBound};
use shadow_patch::{
	identity::{Identity, Lookup, MatchTier},
	options::AttributeNames,
	selector::Selector,
	stamp::{hash_of, stamp_fragment, stamp_hashes, HASH_LENGTH},
	Document, PatchMode, ShadowFragment, ShadowNode,
};

use memory_patcher_::patcher;

fn card(text: &str) -> ShadowNode {
	ShadowNode::element("div").attribute("uid", "card").child(ShadowNode::element("p").child(ShadowNode::text(text)))
}

#[test]
fn stamps_are_short_hex_and_deterministic() {
	let names = AttributeNames::default();
	let mut a = card("x");
	let mut b = card("x");
	stamp_hashes(&mut a, &names);
	stamp_hashes(&mut b, &names);

	assert_eq!(a, b);
	let hash = a.as_element().unwrap().get_attribute("hash").unwrap();
	assert_eq!(hash.len(), HASH_LENGTH);
	assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
	assert!(a.as_element().unwrap().children[0].as_element().unwrap().has_attribute("hash"));
}

#[test]
fn restamping_is_stable() {
	let names = AttributeNames::default();
	let mut node = card("x");
	stamp_hashes(&mut node, &names);
	let first = node.clone();

	stamp_hashes(&mut node, &names);

	assert_eq!(node, first);
	assert_eq!(Some(hash_of(&node, &names).as_str()), node.as_element().unwrap().get_attribute("hash"));
}

#[test]
fn stale_stamps_are_overwritten() {
	let names = AttributeNames::default();
	let mut fresh = card("x");
	stamp_hashes(&mut fresh, &names);

	let mut tampered = card("x");
	tampered.as_element_mut().unwrap().set_attribute("hash", "stale");
	stamp_hashes(&mut tampered, &names);

	assert_eq!(tampered, fresh);
	assert_eq!(tampered.as_element().unwrap().attributes.len(), 2);
}

#[test]
fn content_changes_change_the_stamp() {
	let names = AttributeNames::default();
	assert_ne!(hash_of(&card("x"), &names), hash_of(&card("y"), &names));
}

#[test]
fn stamped_fragments_skip_unchanged_subtrees() {
	let names = AttributeNames::default();
	let (mut patcher, root) = patcher();
	let mut fragment = vec![card("x")];
	stamp_fragment(&mut fragment, &names);
	patcher.patch(&fragment, &root, PatchMode::Merge).unwrap();
	let mutations = patcher.document().mutation_count();

	let mut same = vec![card("x")];
	stamp_fragment(&mut same, &names);
	patcher.patch(&same, &root, PatchMode::Merge).unwrap();
	assert_eq!(patcher.document().mutation_count(), mutations);

	let mut changed = vec![card("y")];
	stamp_fragment(&mut changed, &names);
	patcher.patch(&changed, &root, PatchMode::Merge).unwrap();
	assert!(patcher.document().mutation_count() > mutations);
	let live = patcher.document().child_nodes(&root);
	assert_eq!(live.len(), 1);
	assert_eq!(patcher.document().snapshot(live[0]).as_ref(), changed.first());
}

#[test]
fn lignin_trees_are_flattened() {
	let strong_text = [Node::Text { text: "bold", dom_binding: None }];
	let strong = Element {
		name: "strong",
		creation_options: ElementCreationOptions::new(),
		attributes: &[],
		content: Node::Multi(&strong_text),
		event_bindings: &[],
	};
	let attributes = [Attribute { name: "uid", value: "7" }, Attribute { name: "class", value: "note" }];
	let memoized_content = Node::Text { text: "plain ", dom_binding: None };
	let content = [
		Node::Comment { comment: "ignored", dom_binding: None },
		Node::Memoized { state_key: 1, content: &memoized_content },
		Node::HtmlElement { element: &strong, dom_binding: None },
	];
	let section = Element {
		name: "section",
		creation_options: ElementCreationOptions::new(),
		attributes: &attributes,
		content: Node::Multi(&content),
		event_bindings: &[],
	};
	let keyed = [ReorderableFragment {
		dom_key: 0,
		content: Node::HtmlElement { element: &section, dom_binding: None },
	}];
	let vdom: Node<'_, ThreadBound> = Node::Keyed(&keyed);

	let fragment = ShadowFragment::from_lignin(&vdom);

	assert_eq!(fragment.len(), 1);
	assert_eq!(fragment.to_html(), r#"<section uid="7" class="note">plain <strong>bold</strong></section>"#);
}

#[test]
fn shadow_html_is_escaped() {
	let node = ShadowNode::element("img").attribute("alt", r#"a "b" & c"#);
	assert_eq!(node.to_html(), r#"<img alt="a &quot;b&quot; &amp; c" />"#);
	assert_eq!(ShadowNode::text("1 < 2").to_string(), "1 &lt; 2");
}

#[test]
fn selectors_render_escaped_css() {
	let names = AttributeNames::default();
	assert_eq!(
		Selector::TagUid {
			tag: "DIV".to_owned(),
			uid: "it's".to_owned()
		}
		.to_css(&names),
		r"div[uid='it\'s']"
	);
	assert_eq!(Selector::Id("1a".to_owned()).to_string(), r"#\31 a");
	assert_eq!(Selector::Class("x".to_owned()).to_string(), ".x");

	let custom = AttributeNames::default().with_uid("data-uid");
	assert_eq!(
		Selector::TagUid {
			tag: "div".to_owned(),
			uid: "1".to_owned()
		}
		.to_css(&custom),
		"div[data-uid='1']"
	);
}

#[test]
fn selectors_match_structurally() {
	let names = AttributeNames::default();
	let class = Selector::Class("b".to_owned());
	assert!(class.matches("li", |name| if name == "class" { Some("a b") } else { None }, &names));
	assert!(!class.matches("li", |name| if name == "class" { Some("ab") } else { None }, &names));

	let uid = Selector::TagUid {
		tag: "div".to_owned(),
		uid: String::new(),
	};
	assert!(uid.matches("DIV", |name| if name == "uid" { Some("") } else { None }, &names));
	assert!(!uid.matches("DIV", |_| None, &names));
}

#[test]
fn identity_picks_the_strongest_tier() {
	let names = AttributeNames::default();
	let tier = |node: ShadowNode| Identity::of(node.as_element().unwrap(), &names).tier();

	assert_eq!(tier(ShadowNode::element("p")), MatchTier::Structural);
	assert_eq!(tier(ShadowNode::element("p").attribute("id", "").attribute("class", " ")), MatchTier::Structural);
	assert_eq!(tier(ShadowNode::element("p").attribute("class", "a b")), MatchTier::Class);
	assert_eq!(tier(ShadowNode::element("p").attribute("class", "a").attribute("id", "i")), MatchTier::Id);
	assert_eq!(tier(ShadowNode::element("p").attribute("id", "i").attribute("hash", "h")), MatchTier::Uid);
	assert_eq!(tier(ShadowNode::element("p").attribute("uid", "u")), MatchTier::Uid);

	let node = ShadowNode::element("P").attribute("class", "first second");
	let identity = Identity::of(node.as_element().unwrap(), &names);
	assert_eq!(identity.class, Some("first"));
	assert_eq!(identity.lookup("P"), Lookup::Class(Selector::Class("first".to_owned())));

	let node = ShadowNode::element("P").attribute("hash", "h");
	assert_eq!(
		Identity::of(node.as_element().unwrap(), &names).lookup("P"),
		Lookup::Uid(Selector::TagUid {
			tag: "p".to_owned(),
			uid: String::new()
		})
	);
}
