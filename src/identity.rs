use crate::{options::AttributeNames, selector::Selector, shadow::ShadowElement};

/// The matching keys of one shadow element. Empty attribute values count as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity<'a> {
	pub id: Option<&'a str>,
	/// First token of the class list only.
	pub class: Option<&'a str>,
	pub hash: Option<&'a str>,
	pub uid: Option<&'a str>,
}

/// Which lookup strategy a shadow element gets, strongest applicable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
	/// No keys at all: deep equality against the live parent's children.
	Structural,
	/// Only a class: every descendant carrying that class is a candidate.
	Class,
	/// An id but neither hash nor uid.
	Id,
	/// Hash and/or uid: `tag[uid='…']`.
	Uid,
}

impl<'a> Identity<'a> {
	#[must_use]
	pub fn of(element: &'a ShadowElement, names: &AttributeNames) -> Self {
		Self {
			id: non_empty(element, &names.id),
			class: non_empty(element, &names.class).and_then(|class| class.split_ascii_whitespace().next()),
			hash: non_empty(element, &names.hash),
			uid: non_empty(element, &names.uid),
		}
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.id.is_none() && self.class.is_none() && self.hash.is_none() && self.uid.is_none()
	}

	#[must_use]
	pub fn tier(&self) -> MatchTier {
		if self.is_empty() {
			MatchTier::Structural
		} else if self.hash.is_none() && self.uid.is_none() {
			if self.id.is_none() {
				MatchTier::Class
			} else {
				MatchTier::Id
			}
		} else {
			MatchTier::Uid
		}
	}

	/// How the live counterpart is looked up, with the selector for the chosen tier.
	///
	/// A hash without a uid still selects on the uid attribute, with an empty value.
	#[must_use]
	pub fn lookup(&self, tag: &str) -> Lookup {
		match self.tier() {
			MatchTier::Structural => Lookup::Structural,
			MatchTier::Class => Lookup::Class(Selector::Class(self.class.unwrap_or_default().to_owned())),
			MatchTier::Id => Lookup::Id(Selector::Id(self.id.unwrap_or_default().to_owned())),
			MatchTier::Uid => Lookup::Uid(Selector::TagUid {
				tag: tag.to_ascii_lowercase(),
				uid: self.uid.unwrap_or_default().to_owned(),
			}),
		}
	}
}

/// [`MatchTier`] plus the query it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
	Structural,
	Class(Selector),
	Id(Selector),
	Uid(Selector),
}

fn non_empty<'a>(element: &'a ShadowElement, name: &str) -> Option<&'a str> {
	element.get_attribute(name).filter(|value| !value.is_empty())
}
