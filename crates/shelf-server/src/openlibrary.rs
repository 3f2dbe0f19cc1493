//! [`MetadataSource`] backed by the OpenLibrary JSON API.
//!
//! A lookup is two requests: the edition record at `/isbn/{isbn}.json`,
//! then the work it belongs to for description and subjects. A missing
//! work record degrades to edition-only metadata.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shelf_core::{
  book::{BookMetadata, Isbn, default_cover_url},
  metadata::MetadataSource,
};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_AUTHOR: &str = "Unknown Author";
const MAX_CATEGORIES: usize = 3;

#[derive(Debug, Error)]
pub enum OpenLibraryError {
  #[error("openlibrary request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("GET {url} → {status}")]
  Status { url: String, status: StatusCode },
}

/// Async client for OpenLibrary.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OpenLibrary {
  client:   Client,
  base_url: String,
}

impl OpenLibrary {
  pub fn new(base_url: impl Into<String>) -> Result<Self, OpenLibraryError> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    })
  }

  /// GET `path` as JSON. A 404 is `Ok(None)`.
  async fn get_json<D>(&self, path: &str) -> Result<Option<D>, OpenLibraryError>
  where
    D: for<'de> Deserialize<'de>,
  {
    let url = format!("{}{path}", self.base_url);
    let resp = self.client.get(&url).send().await?;
    match resp.status() {
      StatusCode::NOT_FOUND => Ok(None),
      status if !status.is_success() => Err(OpenLibraryError::Status { url, status }),
      _ => Ok(Some(resp.json().await?)),
    }
  }
}

impl MetadataSource for OpenLibrary {
  type Error = OpenLibraryError;

  async fn lookup(&self, isbn: &Isbn) -> Result<Option<BookMetadata>, OpenLibraryError> {
    let Some(segment) = isbn_path(isbn) else {
      tracing::debug!(%isbn, "isbn not usable in an openlibrary path");
      return Ok(None);
    };
    let Some(edition) = self
      .get_json::<Edition>(&format!("/isbn/{segment}.json"))
      .await?
    else {
      tracing::debug!(%isbn, "no openlibrary edition");
      return Ok(None);
    };

    let work = match edition.works.first() {
      Some(work_ref) => match self.get_json::<Work>(&format!("{}.json", work_ref.key)).await {
        Ok(work) => work,
        Err(e) => {
          tracing::warn!(%isbn, work = %work_ref.key, error = %e, "work lookup failed");
          None
        }
      },
      None => None,
    };

    Ok(Some(to_metadata(isbn, edition, work)))
  }
}

/// `isbn` as a path segment: hyphens dropped, and only digits or a check
/// `X` allowed through.
fn isbn_path(isbn: &Isbn) -> Option<String> {
  let segment: String = isbn.as_str().chars().filter(|c| *c != '-').collect();
  let valid = !segment.is_empty()
    && segment
      .chars()
      .all(|c| c.is_ascii_digit() || c.eq_ignore_ascii_case(&'x'));
  valid.then_some(segment)
}

// ─── Wire records ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Edition {
  title:           Option<String>,
  authors:         Vec<AuthorRef>,
  covers:          Vec<i64>,
  publish_date:    Option<String>,
  number_of_pages: Option<u32>,
  works:           Vec<KeyRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthorRef {
  name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeyRef {
  key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Work {
  description:        Option<Description>,
  first_publish_date: Option<String>,
  subjects:           Vec<String>,
}

/// Works carry their description either as a bare string or as
/// `{"type": "/type/text", "value": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Description {
  Plain(String),
  Typed { value: String },
}

impl Description {
  fn into_text(self) -> String {
    match self {
      Self::Plain(text) | Self::Typed { value: text } => text,
    }
  }
}

fn cover_url(isbn: &Isbn, covers: &[i64]) -> String {
  match covers.iter().find(|id| **id > 0) {
    Some(id) => format!("https://covers.openlibrary.org/b/id/{id}-L.jpg"),
    None => default_cover_url(isbn),
  }
}

fn capitalise(subject: &str) -> String {
  let mut chars = subject.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

fn to_metadata(isbn: &Isbn, edition: Edition, work: Option<Work>) -> BookMetadata {
  let work = work.unwrap_or_default();
  BookMetadata {
    title:       edition
      .title
      .filter(|t| !t.trim().is_empty())
      .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
    author:      edition
      .authors
      .into_iter()
      .find_map(|a| a.name)
      .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
    cover_url:   Some(cover_url(isbn, &edition.covers)),
    description: work.description.map(Description::into_text).unwrap_or_default(),
    pub_date:    edition
      .publish_date
      .or(work.first_publish_date)
      .unwrap_or_default(),
    page_count:  edition.number_of_pages.unwrap_or(0),
    categories:  work
      .subjects
      .iter()
      .take(MAX_CATEGORIES)
      .map(String::as_str)
      .map(capitalise)
      .collect(),
  }
}
