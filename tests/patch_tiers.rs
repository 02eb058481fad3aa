use shadow_patch::{
	document::NodeKind,
	memory::MemoryDocument,
	options::{AttributeNames, PatchOptions},
	Document, Error, PatchMode, Patcher, ShadowNode,
};

use memory_patcher_::{init_logging, keyed, patcher};

fn text_element(tag: &str, text: &str) -> ShadowNode {
	ShadowNode::element(tag).child(ShadowNode::text(text))
}

#[test]
fn id_match_is_replaced_wholesale() {
	let (mut patcher, root) = patcher();
	patcher.patch(&[text_element("p", "old").attribute("id", "intro").attribute("title", "t")], &root, PatchMode::Merge).unwrap();
	let old = patcher.document().child_nodes(&root)[0];

	patcher.patch(&[text_element("p", "new").attribute("id", "intro")], &root, PatchMode::Merge).unwrap();

	assert_ne!(patcher.document().child_nodes(&root)[0], old);
	assert_eq!(patcher.document().inner_html(root), r#"<p id="intro">new</p>"#);
}

#[test]
fn id_miss_is_appended() {
	let (mut patcher, root) = patcher();
	patcher.patch(&[text_element("p", "a").attribute("id", "a")], &root, PatchMode::Merge).unwrap();

	patcher.patch(&[text_element("p", "b").attribute("id", "b")], &root, PatchMode::Merge).unwrap();

	assert_eq!(patcher.document().inner_html(root), r#"<p id="a">a</p><p id="b">b</p>"#);
}

#[test]
fn id_match_below_the_live_node_is_replaced_in_place() {
	let (mut patcher, root) = patcher();
	patcher
		.patch(&[ShadowNode::element("section").child(text_element("p", "old").attribute("id", "deep"))], &root, PatchMode::Merge)
		.unwrap();

	patcher.patch(&[text_element("p", "new").attribute("id", "deep")], &root, PatchMode::Merge).unwrap();

	assert_eq!(patcher.document().inner_html(root), r#"<section><p id="deep">new</p></section>"#);
}

#[test]
fn class_match_requires_equality_among_candidates() {
	let (mut patcher, root) = patcher();
	patcher.patch(&[text_element("li", "a").attribute("class", "item first")], &root, PatchMode::Merge).unwrap();
	let first = patcher.document().child_nodes(&root)[0];

	// Equal: swapped in place.
	patcher.patch(&[text_element("li", "a").attribute("class", "item first")], &root, PatchMode::Merge).unwrap();
	let children = patcher.document().child_nodes(&root);
	assert_eq!(children.len(), 1);
	assert_ne!(children[0], first);

	// Same first class, different content: appended.
	patcher.patch(&[text_element("li", "b").attribute("class", "item")], &root, PatchMode::Merge).unwrap();
	assert_eq!(patcher.document().inner_html(root), r#"<li class="item first">a</li><li class="item">b</li>"#);
}

#[test]
fn class_without_candidates_is_appended() {
	let (mut patcher, root) = patcher();
	patcher.patch(&[text_element("li", "a").attribute("class", "item")], &root, PatchMode::Merge).unwrap();

	patcher.patch(&[text_element("li", "a").attribute("class", "other item")], &root, PatchMode::Merge).unwrap();

	assert_eq!(patcher.document().inner_html(root), r#"<li class="item">a</li><li class="other item">a</li>"#);
}

#[test]
fn unmarked_elements_fall_back_to_structural_equality() {
	let (mut patcher, root) = patcher();
	patcher.patch(&[text_element("em", "a")], &root, PatchMode::Merge).unwrap();

	patcher.patch(&[text_element("em", "a")], &root, PatchMode::Merge).unwrap();
	assert_eq!(patcher.document().inner_html(root), "<em>a</em>");

	patcher.patch(&[text_element("em", "b")], &root, PatchMode::Merge).unwrap();
	assert_eq!(patcher.document().inner_html(root), "<em>a</em><em>b</em>");
}

#[test]
fn hash_without_uid_only_matches_empty_uid() {
	let (mut patcher, root) = patcher();
	patcher.patch(&[text_element("div", "x").attribute("hash", "h")], &root, PatchMode::Merge).unwrap();

	patcher.patch(&[text_element("div", "x").attribute("hash", "h")], &root, PatchMode::Merge).unwrap();
	assert_eq!(patcher.document().child_nodes(&root).len(), 2);

	let (mut patcher, root) = self::patcher();
	patcher.patch(&[text_element("div", "x").attribute("uid", "").attribute("hash", "h")], &root, PatchMode::Merge).unwrap();
	let mutations = patcher.document().mutation_count();
	patcher.patch(&[text_element("div", "y").attribute("uid", "").attribute("hash", "h")], &root, PatchMode::Merge).unwrap();
	assert_eq!(patcher.document().mutation_count(), mutations);
}

#[test]
fn uid_tag_match_ignores_case() {
	let (mut patcher, root) = patcher();
	patcher.patch(&[keyed("DIV", "1", "a").child(ShadowNode::text("x"))], &root, PatchMode::Merge).unwrap();

	patcher.patch(&[keyed("div", "1", "a").attribute("removed", "yes")], &root, PatchMode::Merge).unwrap();

	assert!(!patcher.document().has_child_nodes(&root));
}

#[test]
fn blank_text_is_always_appended() {
	let (mut patcher, root) = patcher();
	patcher.patch(&[keyed("div", "1", "h").child(ShadowNode::text("x"))], &root, PatchMode::Merge).unwrap();

	patcher.patch(&[ShadowNode::text(" \n\t")], &root, PatchMode::Merge).unwrap();

	assert_eq!(patcher.document().inner_html(root), "<div uid=\"1\" hash=\"h\">x</div> \n\t");
}

#[test]
fn text_is_inserted_by_position() {
	let (mut patcher, root) = patcher();
	patcher.patch(&[keyed("div", "1", "h").child(ShadowNode::text("x"))], &root, PatchMode::Merge).unwrap();

	patcher.patch(&[ShadowNode::text("before")], &root, PatchMode::Merge).unwrap();
	assert_eq!(patcher.document().inner_html(root), r#"before<div uid="1" hash="h">x</div>"#);

	// Index 2 is past the two live children, so it's appended.
	patcher.patch(&[keyed("div", "1", "h"), keyed("div", "1", "h"), ShadowNode::text("after")], &root, PatchMode::Merge).unwrap();
	assert_eq!(patcher.document().inner_html(root), r#"before<div uid="1" hash="h">x</div>after"#);
}

#[test]
fn text_position_ignores_siblings_added_in_the_same_pass() {
	let (mut patcher, root) = patcher();
	patcher.patch(&[keyed("div", "1", "h").child(ShadowNode::text("x"))], &root, PatchMode::Merge).unwrap();

	// Index 1 was past the end before the new `<div>` went in.
	patcher.patch(&[keyed("div", "9", "n"), ShadowNode::text("t")], &root, PatchMode::Merge).unwrap();

	assert_eq!(patcher.document().inner_html(root), r#"<div uid="1" hash="h">x</div><div uid="9" hash="n"></div>t"#);
}

#[test]
fn text_is_appended_when_its_positional_sibling_was_removed() {
	let (mut patcher, root) = patcher();
	patcher
		.patch(&[keyed("div", "1", "a").child(ShadowNode::text("one")), keyed("div", "2", "b").child(ShadowNode::text("two"))], &root, PatchMode::Merge)
		.unwrap();

	patcher.patch(&[keyed("div", "2", "b").attribute("removed", ""), ShadowNode::text("t")], &root, PatchMode::Merge).unwrap();

	assert_eq!(patcher.document().inner_html(root), r#"<div uid="1" hash="a">one</div>t"#);
}

#[test]
fn comments_are_never_matched() {
	init_logging();
	let mut document = MemoryDocument::new();
	let root = document.create_root("body");
	let comment = document.create_comment("note");
	document.append_child(&root, &comment).unwrap();
	assert_eq!(document.kind(&comment), NodeKind::Other);
	let mut patcher = Patcher::new(document);

	patcher.patch(&[text_element("em", "a")], &root, PatchMode::Merge).unwrap();
	assert_eq!(patcher.document().inner_html(root), "<!--note--><em>a</em>");

	patcher.patch(&[text_element("em", "a")], &root, PatchMode::Merge).unwrap();
	let children = patcher.document().child_nodes(&root);
	assert_eq!(children.len(), 2);
	assert_eq!(children[0], comment);
	assert_eq!(patcher.document().text(comment), Some("note"));
	assert_eq!(patcher.document().snapshot(root), Some(ShadowNode::element("body").child(text_element("em", "a"))));
}

#[test]
fn text_drift_is_cleaned_before_recursing() {
	let (mut patcher, root) = patcher();
	patcher
		.patch(
			&[keyed("p", "1", "a").children(vec![ShadowNode::text("stray "), keyed("b", "2", "b1").child(ShadowNode::text("B")), keyed("i", "3", "i1").child(ShadowNode::text("I"))])],
			&root,
			PatchMode::Merge,
		)
		.unwrap();

	patcher
		.patch(&[keyed("p", "1", "z").children(vec![keyed("b", "2", "b1").child(ShadowNode::text("B")), keyed("i", "3", "i2").child(ShadowNode::text("I2"))])], &root, PatchMode::Merge)
		.unwrap();

	assert_eq!(patcher.document().inner_html(root), r#"<p uid="1" hash="z"><b uid="2" hash="b1">B</b><i uid="3" hash="i2">I2</i></p>"#);
}

#[test]
fn custom_attribute_names_are_honoured() {
	init_logging();
	let mut document = MemoryDocument::new();
	let root = document.create_root("body");
	let names = AttributeNames::default().with_uid("data-uid").with_hash("data-hash").with_removed("data-gone");
	let mut patcher = Patcher::with_options(document, PatchOptions::new().with_attribute_names(names));
	let item = |hash: &str| ShadowNode::element("div").attribute("data-uid", "1").attribute("data-hash", hash);

	patcher.patch(&[item("a").child(ShadowNode::text("x"))], &root, PatchMode::Merge).unwrap();
	let mutations = patcher.document().mutation_count();
	patcher.patch(&[item("a").child(ShadowNode::text("y"))], &root, PatchMode::Merge).unwrap();
	assert_eq!(patcher.document().mutation_count(), mutations);

	patcher.patch(&[item("a").attribute("data-gone", "")], &root, PatchMode::Merge).unwrap();
	assert!(!patcher.document().has_child_nodes(&root));
}

#[test]
fn adapter_errors_propagate_unchanged() {
	let (mut patcher, _) = patcher();
	let mut other = MemoryDocument::new();
	for _ in 0..3 {
		other.create_root("div");
	}
	let foreign = other.create_root("div");

	let error = patcher.patch(&[ShadowNode::text("x")], &foreign, PatchMode::Merge).unwrap_err();

	assert!(matches!(error, Error::AdapterInconsistency { operation: "append_child", .. }), "{:?}", error);
}
