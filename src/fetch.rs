//! The three fetch stages: submissions, their comment ids, then the comments.

use crate::config::{HarvestOptions, SearchCriteria};
use crate::error::{HarvestError, Result};
use crate::models::{CommentTable, Submission, COMMENT_COLUMNS};
use crate::progress::ProgressScope;
use crate::service::{SearchService, SubmissionQuery};
use crate::util::{chunk_ids, elapsed_secs};
use std::time::Instant;

/// Only `id` and `num_comments` are needed downstream.
pub const SUBMISSION_FIELDS: [&str; 2] = ["id", "num_comments"];

/// Search submissions for the criteria's subreddit, keyword and period window.
/// Zero matches is reported as [`HarvestError::EmptyResult`].
pub fn fetch_submissions<S: SearchService + ?Sized>(
    service: &S,
    criteria: &SearchCriteria,
) -> Result<Vec<Submission>> {
    let t = Instant::now();
    let window = criteria.window()?;
    tracing::info!("Searching r/{} for {:?} ({}: {})", criteria.subreddit, criteria.query, criteria.period, window);

    let q = SubmissionQuery {
        subreddit: &criteria.subreddit,
        query: &criteria.query,
        limit: criteria.limit,
        window,
        fields: &SUBMISSION_FIELDS,
    };
    let mut posts = service.search_submissions(&q)?;
    if posts.is_empty() {
        tracing::warn!("No posts found matching the search criteria");
        return Err(HarvestError::EmptyResult);
    }
    posts.truncate(criteria.limit);
    tracing::info!("Retrieved {} posts; time taken: {} second(s)", posts.len(), elapsed_secs(t));
    Ok(posts)
}

/// Collect comment ids for submissions with more than `opts.min_comments` comments.
pub fn fetch_comment_ids<S: SearchService + ?Sized>(
    service: &S,
    submissions: &[Submission],
    opts: &HarvestOptions,
) -> Result<Vec<String>> {
    let t = Instant::now();
    let ids: Vec<String> = submissions
        .iter()
        .filter(|s| s.num_comments > opts.min_comments)
        .map(|s| s.id.clone())
        .collect();
    tracing::info!(
        "Collecting comment IDs from {} post(s) with > {} comments; this may take some time",
        ids.len(),
        opts.min_comments
    );
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let comment_ids = service.search_comment_ids(&ids)?;
    tracing::info!("Collected {} comment IDs; time taken: {} second(s)", comment_ids.len(), elapsed_secs(t));
    Ok(comment_ids)
}

/// Look up comments by id, at most `opts.batch_size` ids per request.
pub fn fetch_comments<S: SearchService + ?Sized>(
    service: &S,
    comment_ids: &[String],
    opts: &HarvestOptions,
) -> Result<CommentTable> {
    let mut table = CommentTable::new();
    if comment_ids.is_empty() {
        tracing::info!("No comment IDs to look up");
        return Ok(table);
    }

    if comment_ids.len() > opts.batch_size {
        let chunks = chunk_ids(comment_ids, opts.batch_size);
        let total = chunks.len();
        tracing::info!("Chunking comment ids as >{} comments found", opts.batch_size);
        let pb = ProgressScope::count("Fetching comments", total as u64, opts.progress);
        for (n, chunk) in chunks.iter().enumerate() {
            let t = Instant::now();
            tracing::info!("Collecting {} comments. Chunk {} of {}.", chunk.len(), n + 1, total);
            let rows = service.search_comments(chunk, &COMMENT_COLUMNS)?;
            table.append(rows);
            pb.inc_items(1);
            tracing::info!("Chunk {} done; time taken: {} second(s)", n + 1, elapsed_secs(t));
        }
        pb.finish(format!("{} chunk(s)", total));
    } else {
        let t = Instant::now();
        let rows = service.search_comments(comment_ids, &COMMENT_COLUMNS)?;
        table.append(rows);
        tracing::info!("Time taken: {} second(s)", elapsed_secs(t));
    }

    tracing::info!("Collected {} comments", table.len());
    Ok(table)
}
