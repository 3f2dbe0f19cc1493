//! The book aggregate: protocol-sourced list state merged with external
//! metadata by ISBN.
//!
//! Books are values. Every update (`with_metadata`, `with_rating`) returns a
//! new `Book`; nothing is edited in place.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, kind::ListKind};

// ─── Isbn ────────────────────────────────────────────────────────────────────

/// A trimmed, non-empty ISBN string. Digits are not checked: the network
/// carries whatever identifiers other clients publish.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Isbn(String);

impl Isbn {
  pub fn new(raw: impl AsRef<str>) -> Result<Self> {
    let trimmed = raw.as_ref().trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
      return Err(Error::InvalidIsbn(raw.as_ref().to_string()));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Isbn {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for Isbn {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::new(s) }
}

impl TryFrom<String> for Isbn {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<Isbn> for String {
  fn from(value: Isbn) -> Self { value.0 }
}

// ─── Rating ──────────────────────────────────────────────────────────────────

/// A 1–5 star rating. On the wire it is the integer star count; on the
/// [`Book`] aggregate it is exposed as a fraction in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(u8);

impl Rating {
  pub fn from_stars(stars: u8) -> Result<Self> {
    if (1..=5).contains(&stars) {
      Ok(Self(stars))
    } else {
      Err(Error::InvalidRating(stars))
    }
  }

  /// Convert a normalised fraction back to stars, rounding to the nearest
  /// whole star.
  pub fn from_fraction(fraction: f64) -> Result<Self> {
    if !(fraction > 0.0 && fraction <= 1.0) {
      return Err(Error::InvalidRatingFraction(fraction));
    }
    let stars = (fraction * 5.0).round().clamp(1.0, 5.0) as u8;
    Ok(Self(stars))
  }

  /// Parse the value of a `["rating", ...]` tag. Integers are star counts;
  /// some clients publish the normalised fraction instead.
  pub fn from_tag_value(value: &str) -> Option<Self> {
    let value = value.trim();
    if let Ok(stars) = value.parse::<u8>() {
      return Self::from_stars(stars).ok();
    }
    value
      .parse::<f64>()
      .ok()
      .and_then(|f| Self::from_fraction(f).ok())
  }

  pub fn stars(self) -> u8 { self.0 }

  pub fn fraction(self) -> f64 { f64::from(self.0) / 5.0 }
}

impl TryFrom<f64> for Rating {
  type Error = Error;

  fn try_from(value: f64) -> Result<Self> { Self::from_fraction(value) }
}

impl From<Rating> for f64 {
  fn from(value: Rating) -> Self { value.fraction() }
}

// ─── Metadata ────────────────────────────────────────────────────────────────

/// Externally sourced bibliographic data (title, author, cover, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
  pub title:       String,
  pub author:      String,
  pub cover_url:   Option<String>,
  pub description: String,
  pub pub_date:    String,
  pub page_count:  u32,
  pub categories:  Vec<String>,
}

// ─── Book ────────────────────────────────────────────────────────────────────

/// Where a book sits in the user's lists, and since when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingStatus {
  pub list:       ListKind,
  /// `created_at` of the list event the book was read from.
  pub date_added: DateTime<Utc>,
  pub rating:     Option<Rating>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
  pub id:             String,
  pub isbn:           Option<Isbn>,
  pub title:          String,
  pub author:         String,
  pub cover_url:      Option<String>,
  pub description:    String,
  pub pub_date:       String,
  pub page_count:     u32,
  pub categories:     Vec<String>,
  pub reading_status: Option<ReadingStatus>,
}

/// Cover image served by the OpenLibrary covers service.
pub fn default_cover_url(isbn: &Isbn) -> String {
  format!("https://covers.openlibrary.org/b/isbn/{isbn}-L.jpg")
}

impl Book {
  /// A bare book known only by ISBN, not on any list.
  pub fn from_isbn(isbn: Isbn) -> Self {
    Self {
      id:             format!("isbn:{isbn}"),
      cover_url:      Some(default_cover_url(&isbn)),
      isbn:           Some(isbn),
      title:          String::new(),
      author:         String::new(),
      description:    String::new(),
      pub_date:       String::new(),
      page_count:     0,
      categories:     Vec::new(),
      reading_status: None,
    }
  }

  /// A book read out of a list event. The id combines the event id with the
  /// ISBN, since one list event holds many books.
  pub fn from_list_entry(
    event_id: &str,
    isbn: Isbn,
    list: ListKind,
    date_added: DateTime<Utc>,
  ) -> Self {
    let mut book = Self::from_isbn(isbn);
    book.id = format!("{event_id}-{}", book.isbn_str());
    book.reading_status = Some(ReadingStatus {
      list,
      date_added,
      rating: None,
    });
    book
  }

  fn isbn_str(&self) -> &str {
    self.isbn.as_ref().map(Isbn::as_str).unwrap_or_default()
  }

  /// The ISBN, or a validation error if the book has none.
  pub fn require_isbn(&self) -> Result<&Isbn> {
    self
      .isbn
      .as_ref()
      .ok_or_else(|| Error::InvalidIsbn(String::new()))
  }

  /// The list the book is currently known to be on.
  pub fn current_list(&self) -> Option<ListKind> {
    self.reading_status.as_ref().map(|s| s.list)
  }

  /// Overlay external metadata, keeping identity, ISBN and reading status.
  /// An absent cover in `meta` keeps the existing cover.
  pub fn with_metadata(self, meta: BookMetadata) -> Self {
    Self {
      title: meta.title,
      author: meta.author,
      cover_url: meta.cover_url.or(self.cover_url),
      description: meta.description,
      pub_date: meta.pub_date,
      page_count: meta.page_count,
      categories: meta.categories,
      ..self
    }
  }

  /// Attach (or clear) the user's rating. A book with no reading status is
  /// returned unchanged.
  pub fn with_rating(self, rating: Option<Rating>) -> Self {
    let reading_status = self
      .reading_status
      .map(|status| ReadingStatus { rating, ..status });
    Self {
      reading_status,
      ..self
    }
  }

  /// Same book, now known to be on `list`.
  pub fn on_list(self, list: ListKind, date_added: DateTime<Utc>) -> Self {
    let rating = self.reading_status.as_ref().and_then(|s| s.rating);
    Self {
      reading_status: Some(ReadingStatus {
        list,
        date_added,
        rating,
      }),
      ..self
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn isbn_is_trimmed_and_rejects_blank() {
    assert_eq!(Isbn::new("  9780141439518 ").unwrap().as_str(), "9780141439518");
    assert!(Isbn::new("   ").is_err());
    assert!(Isbn::new("978 0141").is_err());
  }

  #[test]
  fn rating_fraction_matches_stars() {
    let r = Rating::from_stars(4).unwrap();
    assert!((r.fraction() - 0.8).abs() < f64::EPSILON);
    assert_eq!(Rating::from_fraction(0.8).unwrap(), r);
    assert!(Rating::from_stars(0).is_err());
    assert!(Rating::from_stars(6).is_err());
    assert!(Rating::from_fraction(0.0).is_err());
  }

  #[test]
  fn rating_tag_accepts_stars_or_fraction() {
    assert_eq!(Rating::from_tag_value("5").unwrap().stars(), 5);
    assert_eq!(Rating::from_tag_value("0.6").unwrap().stars(), 3);
    assert!(Rating::from_tag_value("7").is_none());
    assert!(Rating::from_tag_value("great").is_none());
  }

  #[test]
  fn with_metadata_keeps_identity_and_status() {
    let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let isbn = Isbn::new("9780141439518").unwrap();
    let book = Book::from_list_entry("ev1", isbn.clone(), ListKind::Reading, at);

    let enriched = book.clone().with_metadata(BookMetadata {
      title: "Pride and Prejudice".into(),
      author: "Jane Austen".into(),
      ..Default::default()
    });

    assert_eq!(enriched.id, "ev1-9780141439518");
    assert_eq!(enriched.isbn, Some(isbn));
    assert_eq!(enriched.title, "Pride and Prejudice");
    assert_eq!(enriched.cover_url, book.cover_url);
    assert_eq!(enriched.current_list(), Some(ListKind::Reading));
  }

  #[test]
  fn missing_isbn_is_a_validation_error() {
    let mut book = Book::from_isbn(Isbn::new("1").unwrap());
    book.isbn = None;
    assert!(matches!(book.require_isbn(), Err(Error::InvalidIsbn(_))));
  }
}
