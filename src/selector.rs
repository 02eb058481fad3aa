use crate::options::AttributeNames;
use core::fmt::{self, Display, Formatter, Write as _};

/// The selector subset the reconciler queries live trees with.
///
/// [`Display`] renders standard CSS syntax, which browser adapters can hand to `querySelector` directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
	/// `#id`
	Id(String),
	/// `.class`, matched against each whitespace-separated token of the class attribute.
	Class(String),
	/// `tag[uid='value']`. `tag` is compared ASCII-case-insensitively.
	TagUid { tag: String, uid: String },
}

impl Selector {
	/// Structural evaluation for adapters without a native selector engine.
	///
	/// `attribute` looks up attribute values of the candidate element by name.
	/// `names` says which attribute each variant reads.
	pub fn matches<'a>(&self, tag: &str, attribute: impl Fn(&str) -> Option<&'a str>, names: &AttributeNames) -> bool {
		match self {
			Self::Id(id) => attribute(&names.id) == Some(id.as_str()),
			Self::Class(class) => attribute(&names.class).map_or(false, |classes| classes.split_ascii_whitespace().any(|token| token == class)),
			Self::TagUid { tag: selector_tag, uid } => selector_tag.eq_ignore_ascii_case(tag) && attribute(&names.uid) == Some(uid.as_str()),
		}
	}

	/// Renders CSS for the given attribute names.
	///
	/// `#` and `.` shorthands are only used while id and class keep their standard names.
	#[must_use]
	pub fn to_css(&self, names: &AttributeNames) -> String {
		let mut css = String::new();
		self.write_css(&mut css, names).ok();
		css
	}

	fn write_css(&self, out: &mut impl fmt::Write, names: &AttributeNames) -> fmt::Result {
		match self {
			Self::Id(id) if names.id == "id" => {
				out.write_char('#')?;
				write_identifier(out, id)
			}
			Self::Class(class) if names.class == "class" => {
				out.write_char('.')?;
				write_identifier(out, class)
			}
			Self::Id(id) => write_attribute_selector(out, &names.id, "=", id),
			Self::Class(class) => write_attribute_selector(out, &names.class, "~=", class),
			Self::TagUid { tag, uid } => {
				write_identifier(out, &tag.to_ascii_lowercase())?;
				write_attribute_selector(out, &names.uid, "=", uid)
			}
		}
	}
}

impl Display for Selector {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		self.write_css(f, &AttributeNames::default())
	}
}

fn write_attribute_selector(out: &mut impl fmt::Write, name: &str, operator: &str, value: &str) -> fmt::Result {
	out.write_char('[')?;
	write_identifier(out, name)?;
	out.write_str(operator)?;
	out.write_char('\'')?;
	for c in value.chars() {
		match c {
			'\'' | '\\' => {
				out.write_char('\\')?;
				out.write_char(c)?;
			}
			'\n' => out.write_str("\\a ")?,
			c => out.write_char(c)?,
		}
	}
	out.write_str("']")
}

/// Escapes a CSS identifier. Leading digits are hex-escaped like `CSS.escape` does.
fn write_identifier(out: &mut impl fmt::Write, identifier: &str) -> fmt::Result {
	for (i, c) in identifier.chars().enumerate() {
		match c {
			'0'..='9' if i == 0 => write!(out, "\\{:x} ", c as u32)?,
			'-' | '_' => out.write_char(c)?,
			c if c.is_ascii_alphanumeric() || !c.is_ascii() => out.write_char(c)?,
			c => {
				out.write_char('\\')?;
				out.write_char(c)?;
			}
		}
	}
	Ok(())
}
