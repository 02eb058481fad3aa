/// Names of the attributes the reconciler reads its matching heuristics from.
///
/// A renderer has to stamp the same names onto its output for matching to work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNames {
	pub id: String,
	pub class: String,
	/// Content fingerprint. Equal values mean the subtree isn't revisited.
	pub hash: String,
	/// Stable per-template-position identity.
	pub uid: String,
	/// Presence on a shadow element deletes its live counterpart.
	pub removed: String,
}

impl Default for AttributeNames {
	fn default() -> Self {
		Self {
			id: "id".to_owned(),
			class: "class".to_owned(),
			hash: "hash".to_owned(),
			uid: "uid".to_owned(),
			removed: "removed".to_owned(),
		}
	}
}

impl AttributeNames {
	#[must_use]
	pub fn with_hash(mut self, name: impl Into<String>) -> Self {
		self.hash = name.into();
		self
	}

	#[must_use]
	pub fn with_uid(mut self, name: impl Into<String>) -> Self {
		self.uid = name.into();
		self
	}

	#[must_use]
	pub fn with_removed(mut self, name: impl Into<String>) -> Self {
		self.removed = name.into();
		self
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOptions {
	pub attribute_names: AttributeNames,
}

impl PatchOptions {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_attribute_names(mut self, attribute_names: AttributeNames) -> Self {
		self.attribute_names = attribute_names;
		self
	}
}

/// How a matched live node is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchMode {
	/// Skip unchanged hashes, merge attributes and recurse where possible.
	Merge,
	/// Swap every matched node wholesale.
	ReplaceOnly,
}

impl Default for PatchMode {
	fn default() -> Self {
		Self::Merge
	}
}
