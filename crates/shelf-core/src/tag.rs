//! Tag codec: the boundary between wire tags (`["i", "isbn:X"]`) and the
//! typed [`Tag`] variants all list logic operates on.
//!
//! Only two shapes carry list semantics:
//!
//! | Wire form | Variant |
//! |-----------|---------|
//! | `["i", "isbn:<value>"]` | [`Tag::Membership`] |
//! | `["k", "isbn"]` | [`Tag::Marker`] |
//!
//! Everything else, including malformed `i` tags, is [`Tag::Opaque`] and is
//! reproduced verbatim when encoded.

use std::collections::BTreeSet;

use crate::book::Isbn;

const MEMBERSHIP: &str = "i";
const MARKER: &str = "k";
const ISBN_PREFIX: &str = "isbn:";

/// A raw tag as it travels on the wire.
pub type WireTag = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
  /// One list entry.
  Membership(Isbn),
  /// Declares that the event's `i` tags hold ISBNs.
  Marker,
  /// Any tag this core does not interpret.
  Opaque(WireTag),
}

impl Tag {
  pub fn from_wire(raw: &[String]) -> Self {
    match raw {
      [name, value] if name == MEMBERSHIP => value
        .strip_prefix(ISBN_PREFIX)
        .and_then(|isbn| Isbn::new(isbn).ok())
        .map_or_else(|| Self::Opaque(raw.to_vec()), Self::Membership),
      [name, value] if name == MARKER && value == "isbn" => Self::Marker,
      _ => Self::Opaque(raw.to_vec()),
    }
  }

  pub fn to_wire(&self) -> WireTag {
    match self {
      Self::Membership(isbn) => vec![MEMBERSHIP.to_string(), membership_value(isbn)],
      Self::Marker => vec![MARKER.to_string(), "isbn".to_string()],
      Self::Opaque(raw) => raw.clone(),
    }
  }

  /// An opaque tag with the given name and values.
  pub fn opaque<I, S>(parts: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self::Opaque(parts.into_iter().map(Into::into).collect())
  }

  pub fn is_membership_of(&self, isbn: &Isbn) -> bool {
    matches!(self, Self::Membership(i) if i == isbn)
  }

  /// The tag name (first element) for any variant.
  pub fn name(&self) -> Option<&str> {
    match self {
      Self::Membership(_) => Some(MEMBERSHIP),
      Self::Marker => Some(MARKER),
      Self::Opaque(raw) => raw.first().map(String::as_str),
    }
  }
}

/// The value of `isbn`'s membership tag (`isbn:<value>`), as used in `#i`
/// query filters.
pub fn membership_value(isbn: &Isbn) -> String { format!("{ISBN_PREFIX}{isbn}") }

/// The membership tag for one ISBN.
pub fn encode_membership(isbn: &Isbn) -> Tag { Tag::Membership(isbn.clone()) }

/// The set of ISBNs held by membership tags. Non-membership tags are
/// ignored.
pub fn decode_membership(tags: &[Tag]) -> BTreeSet<Isbn> {
  tags
    .iter()
    .filter_map(|tag| match tag {
      Tag::Membership(isbn) => Some(isbn.clone()),
      _ => None,
    })
    .collect()
}

pub fn decode_tags(raw: &[WireTag]) -> Vec<Tag> {
  raw.iter().map(|t| Tag::from_wire(t)).collect()
}

pub fn encode_tags(tags: &[Tag]) -> Vec<WireTag> {
  tags.iter().map(Tag::to_wire).collect()
}

/// Shortcut for [`decode_membership`] over wire tags.
pub fn membership_from_wire(raw: &[WireTag]) -> BTreeSet<Isbn> {
  decode_membership(&decode_tags(raw))
}

/// The first value of the first tag named `name`, if any.
pub fn first_value<'a>(raw: &'a [WireTag], name: &str) -> Option<&'a str> {
  raw
    .iter()
    .find(|t| t.first().is_some_and(|n| n == name))
    .and_then(|t| t.get(1))
    .map(String::as_str)
}
