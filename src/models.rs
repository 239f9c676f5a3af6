//! Records exchanged with the archive and the in-memory comment table.

use serde::{Deserialize, Serialize};

/// A submission reduced to what the comment lookup needs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Submission {
    pub id: String,
    #[serde(default)]
    pub num_comments: u64,
    /// Only used as a pagination cursor by the HTTP client.
    #[serde(default)]
    pub created_utc: Option<i64>,
}

impl Submission {
    pub fn new(id: impl Into<String>, num_comments: u64) -> Self {
        Self { id: id.into(), num_comments, created_utc: None }
    }
}

/// Author sentinel the archive uses for removed accounts.
pub const DELETED_AUTHOR: &str = "[deleted]";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Comment {
    /// Lookup key only; never written out.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created_utc: i64,
    #[serde(default)]
    pub permalink: String,
}

impl Comment {
    pub fn new(author: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            author: author.map(str::to_string),
            body: body.into(),
            created_utc: 0,
            permalink: String::new(),
        }
    }

    pub fn is_deleted_author(&self) -> bool {
        self.author.as_deref() == Some(DELETED_AUTHOR)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Author,
    Body,
    CreatedUtc,
    Permalink,
}

impl Column {
    /// Field name in the archive API and header name in the CSV.
    pub fn name(self) -> &'static str {
        match self {
            Column::Author => "author",
            Column::Body => "body",
            Column::CreatedUtc => "created_utc",
            Column::Permalink => "permalink",
        }
    }

    pub fn value(self, c: &Comment) -> String {
        match self {
            Column::Author => c.author.clone().unwrap_or_default(),
            Column::Body => c.body.clone(),
            Column::CreatedUtc => c.created_utc.to_string(),
            Column::Permalink => c.permalink.clone(),
        }
    }
}

/// Columns requested from the comment lookup, in output order.
pub const COMMENT_COLUMNS: [Column; 4] = [Column::Author, Column::Body, Column::CreatedUtc, Column::Permalink];

/// Comment rows plus the active column set. Row order carries no meaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentTable {
    columns: Vec<Column>,
    rows: Vec<Comment>,
}

impl Default for CommentTable {
    fn default() -> Self {
        Self { columns: COMMENT_COLUMNS.to_vec(), rows: Vec::new() }
    }
}

impl CommentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Comment>) -> Self {
        Self { rows, ..Self::default() }
    }

    pub fn append(&mut self, mut rows: Vec<Comment>) {
        self.rows.append(&mut rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Comment] {
        &self.rows
    }

    pub fn has_column(&self, col: Column) -> bool {
        self.columns.contains(&col)
    }

    pub(crate) fn retain<F: FnMut(&Comment) -> bool>(&mut self, f: F) {
        self.rows.retain(f);
    }

    /// Removes the column and blanks the field on every row.
    pub(crate) fn drop_column(&mut self, col: Column) {
        self.columns.retain(|c| *c != col);
        if col == Column::Author {
            for r in &mut self.rows {
                r.author = None;
            }
        }
    }
}
