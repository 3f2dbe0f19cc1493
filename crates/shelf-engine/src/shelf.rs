//! [`Shelf`]: one value holding every engine component for one user.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shelf_core::{
  activity::{ActivityKind, FeedItem},
  book::{Book, Isbn},
  kind::ListKind,
  metadata::{MetadataSource, NoMetadata},
  transport::Transport,
};

use crate::{
  Result, SyncContext,
  feed::{Feed, FeedPage, FeedSource},
  follows::{FollowOutcome, Follows},
  library::Library,
  lists::{MoveOutcome, ReadingLists},
  reactions::ReactionAggregator,
  reviews::Reviews,
};

/// A page of the rendered feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItems {
  pub items:  Vec<FeedItem>,
  pub source: FeedSource,
}

pub struct Shelf<T, M = NoMetadata> {
  ctx:       SyncContext<T>,
  lists:     ReadingLists<T>,
  feed:      Feed<T>,
  reactions: ReactionAggregator<T>,
  library:   Library<T, M>,
  reviews:   Reviews<T>,
  follows:   Follows<T>,
}

impl<T, M> Shelf<T, M>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  pub fn new(ctx: SyncContext<T>, metadata: M) -> Self {
    Self {
      lists:     ReadingLists::new(ctx.clone()),
      feed:      Feed::new(ctx.clone()),
      reactions: ReactionAggregator::new(ctx.clone()),
      library:   Library::new(ctx.clone(), Arc::new(metadata)),
      reviews:   Reviews::new(ctx.clone()),
      follows:   Follows::new(ctx.clone()),
      ctx,
    }
  }

  pub fn context(&self) -> &SyncContext<T> { &self.ctx }

  pub fn lists(&self) -> &ReadingLists<T> { &self.lists }

  pub fn feed(&self) -> &Feed<T> { &self.feed }

  pub fn reactions(&self) -> &ReactionAggregator<T> { &self.reactions }

  pub fn library(&self) -> &Library<T, M> { &self.library }

  pub fn reviews(&self) -> &Reviews<T> { &self.reviews }

  pub fn follows(&self) -> &Follows<T> { &self.follows }

  pub async fn follow(&self, pubkey: &str) -> Result<FollowOutcome> {
    self.follows.follow(pubkey).await
  }

  /// Move the book `isbn` onto `target`. `current` is the list the caller
  /// believes the book is on now; that list is cleaned up first.
  pub async fn move_book(
    &self,
    isbn: Isbn,
    target: ListKind,
    current: Option<ListKind>,
  ) -> Result<MoveOutcome> {
    let book = match current {
      Some(list) => Book::from_isbn(isbn).on_list(list, Utc::now()),
      None => Book::from_isbn(isbn),
    };
    self.lists.move_to_list(&book, target).await
  }

  /// The global feed rendered as items with reaction overlays, at most
  /// `limit` of them. Entries that claim to be about books but name none
  /// are dropped.
  pub async fn feed_items(&self, limit: usize, until: Option<DateTime<Utc>>) -> FeedItems {
    let page = self.feed.global(limit, until).await;
    self.render(page, limit).await
  }

  /// Like [`Shelf::feed_items`], restricted to users the current user
  /// follows.
  pub async fn following_items(&self, limit: usize, until: Option<DateTime<Utc>>) -> FeedItems {
    let page = self.feed.following(limit, until).await;
    self.render(page, limit).await
  }

  async fn render(&self, page: FeedPage, limit: usize) -> FeedItems {
    let ids: Vec<String> = page.events.iter().map(|e| e.id.clone()).collect();
    self.reactions.load(&ids).await;

    let mut items: Vec<FeedItem> = self
      .reactions
      .apply(page.events)
      .into_iter()
      .filter(|item| item.activity == ActivityKind::Post || !item.isbns.is_empty())
      .collect();
    items.truncate(limit);
    FeedItems {
      items,
      source: page.source,
    }
  }
}
