use thiserror::Error;

/// Failures surfaced by a [`Document`](`crate::document::Document`) adapter.
///
/// The reconciler never recovers from these locally.
/// Whatever the adapter reports is returned unchanged from [`Patcher::patch`](`crate::patch::Patcher::patch`),
/// and the live tree is left as far as the patch got.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	/// The adapter's primitives can't be reached from here, e.g. there is no `window` or `document`.
	#[error("document environment unavailable: {reason}")]
	EnvironmentUnavailable { reason: String },

	/// The adapter rejected a selector.
	#[error("selector {selector:?} rejected: {reason}")]
	Selector { selector: String, reason: String },

	/// A node vanished or changed shape between lookup and mutation, or a handle doesn't belong to the document.
	#[error("adapter inconsistency during {operation}: {reason}")]
	AdapterInconsistency { operation: &'static str, reason: String },
}

impl Error {
	pub(crate) fn inconsistency(operation: &'static str, reason: impl Into<String>) -> Self {
		Self::AdapterInconsistency { operation, reason: reason.into() }
	}
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
