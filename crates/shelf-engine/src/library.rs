//! Loading a user's library: their three lists expanded into books, with
//! ratings and bibliographic metadata attached.

use std::{
  collections::{BTreeMap, HashMap, HashSet},
  sync::Arc,
};

use shelf_core::{
  book::{Book, BookMetadata, Isbn, Rating},
  event::{Event, latest},
  filter::Filter,
  kind::{BOOK_RATING, ListKind},
  metadata::MetadataSource,
  review::BookReview,
  tag::membership_from_wire,
  transport::Transport,
};
use strum::IntoEnumIterator;
use tokio::task::JoinSet;

use crate::SyncContext;

pub struct Library<T, M> {
  ctx:      SyncContext<T>,
  metadata: Arc<M>,
}

impl<T, M> Library<T, M>
where
  T: Transport,
  M: MetadataSource + 'static,
{
  pub fn new(ctx: SyncContext<T>, metadata: Arc<M>) -> Self { Self { ctx, metadata } }

  /// Every book on `pubkey`'s lists, newest list first.
  ///
  /// Only the newest event of each list counts. A book on two lists is
  /// shown on the one whose event is newer. Read failures yield an empty
  /// library; failed metadata lookups leave single books unenriched.
  pub async fn load(&self, pubkey: &str) -> Vec<Book> {
    let filter = Filter::new()
      .kinds(ListKind::iter().map(ListKind::event_kind))
      .author(pubkey)
      .limit(self.ctx.config().library_limit);
    let events = self.ctx.query_or_empty(&filter).await;

    let books = expand_lists(&events, pubkey);
    if books.is_empty() {
      return books;
    }

    let ratings = self.ratings_by(pubkey).await;
    let books: Vec<Book> = books
      .into_iter()
      .map(|book| {
        let rating = book.isbn.as_ref().and_then(|isbn| ratings.get(isbn)).copied();
        book.with_rating(rating)
      })
      .collect();

    self.enrich(books).await
  }

  /// The latest rating `pubkey` gave each book.
  pub async fn ratings_by(&self, pubkey: &str) -> HashMap<Isbn, Rating> {
    let filter = Filter::new().kind(BOOK_RATING).author(pubkey);
    let events = self.ctx.query_or_empty(&filter).await;

    let mut newest: HashMap<Isbn, &Event> = HashMap::new();
    for event in events.iter().filter(|e| filter.matches(e)) {
      let Some(isbn) = membership_from_wire(&event.tags).into_iter().next() else {
        continue;
      };
      if newest.get(&isbn).is_none_or(|prev| event.supersedes(prev)) {
        newest.insert(isbn, event);
      }
    }

    newest
      .into_iter()
      .filter_map(|(isbn, event)| {
        let rating = BookReview::from_event(event)?.rating?;
        Some((isbn, rating))
      })
      .collect()
  }

  /// Look every book up concurrently and overlay what was found.
  pub async fn enrich(&self, books: Vec<Book>) -> Vec<Book> {
    let mut lookups = JoinSet::new();
    let isbns: Vec<Isbn> = books.iter().filter_map(|b| b.isbn.clone()).collect();
    for isbn in isbns {
      let source = Arc::clone(&self.metadata);
      lookups.spawn(async move {
        let found = source.lookup(&isbn).await;
        (isbn, found.map_err(|e| e.to_string()))
      });
    }

    let mut found: HashMap<Isbn, BookMetadata> = HashMap::new();
    while let Some(joined) = lookups.join_next().await {
      match joined {
        Ok((isbn, Ok(Some(meta)))) => {
          found.insert(isbn, meta);
        }
        Ok((isbn, Ok(None))) => {
          tracing::debug!(%isbn, "no metadata found");
        }
        Ok((isbn, Err(e))) => {
          tracing::warn!(%isbn, error = %e, "metadata lookup failed; leaving book unenriched");
        }
        Err(e) => {
          tracing::warn!(error = %e, "metadata lookup task failed");
        }
      }
    }

    books
      .into_iter()
      .map(|book| {
        match book.isbn.as_ref().and_then(|isbn| found.remove(isbn)) {
          Some(meta) => book.with_metadata(meta),
          None => book,
        }
      })
      .collect()
  }
}

/// One book per ISBN from the newest event of each list.
fn expand_lists(events: &[Event], pubkey: &str) -> Vec<Book> {
  let mut newest: BTreeMap<ListKind, &Event> = BTreeMap::new();
  for list in ListKind::iter() {
    let of_list = events
      .iter()
      .filter(|e| e.kind == list.event_kind() && e.pubkey == pubkey);
    if let Some(event) = latest(of_list) {
      newest.insert(list, event);
    }
  }

  let mut ordered: Vec<(ListKind, &Event)> = newest.into_iter().collect();
  ordered.sort_by(|(_, a), (_, b)| {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
  });

  let mut placed: HashSet<Isbn> = HashSet::new();
  let mut books = Vec::new();
  for (list, event) in ordered {
    for isbn in membership_from_wire(&event.tags) {
      if !placed.insert(isbn.clone()) {
        continue;
      }
      books.push(Book::from_list_entry(&event.id, isbn, list, event.created_at));
    }
  }
  books
}
