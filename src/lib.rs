#![doc(html_root_url = "https://docs.rs/shadow-patch/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub use lignin;

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod document;
pub mod error;
pub mod identity;
pub mod memory;
pub mod options;
pub mod patch;
pub mod selector;
pub mod shadow;
pub mod stamp;
mod vdom;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use crate::{
	document::Document,
	error::{Error, Result},
	options::{AttributeNames, PatchMode, PatchOptions},
	patch::Patcher,
	shadow::{ShadowFragment, ShadowNode},
};
