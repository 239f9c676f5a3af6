//! Cleaning applied to every comment table before it may be persisted.

use crate::models::{Column, CommentTable};
use ahash::AHashSet;

/// A comment table that has been through [`clean_comments`].
/// Writers in `export` only accept this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanTable(CommentTable);

impl CleanTable {
    pub fn table(&self) -> &CommentTable {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 1. drop rows whose body was already seen (first occurrence wins)
/// 2. drop rows by the `[deleted]` author
/// 3. optionally drop the author column altogether
pub fn clean_comments(mut table: CommentTable, erase_authors: bool) -> CleanTable {
    let before = table.len();

    let mut seen: AHashSet<String> = AHashSet::with_capacity(table.len());
    table.retain(|c| seen.insert(c.body.clone()));
    let deduped = table.len();

    table.retain(|c| !c.is_deleted_author());
    let kept = table.len();

    if erase_authors {
        table.drop_column(Column::Author);
    }

    tracing::info!(
        "Cleaned comments: {} in, {} duplicate(s), {} deleted-author row(s), {} kept{}",
        before,
        before - deduped,
        deduped - kept,
        kept,
        if erase_authors { ", usernames erased" } else { "" }
    );
    CleanTable(table)
}
