//! The archive search boundary: a trait the pipeline talks to, and the
//! Pushshift-style HTTP client that implements it.

use crate::config::{HarvestOptions, RetryPolicy};
use crate::error::{HarvestError, Result};
use crate::models::{Column, Comment, Submission};
use crate::region::TimeWindow;
use ahash::AHashSet;
use reqwest::blocking::{Client, Response};
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::thread::sleep;
use std::time::Duration;

/// Parameters for one submission search.
#[derive(Clone, Debug)]
pub struct SubmissionQuery<'a> {
    pub subreddit: &'a str,
    pub query: &'a str,
    pub limit: usize,
    pub window: TimeWindow,
    pub fields: &'a [&'a str],
}

/// The three lookups the pipeline needs from the archive.
/// Calls are blocking and issued one at a time.
pub trait SearchService {
    fn search_submissions(&self, q: &SubmissionQuery<'_>) -> Result<Vec<Submission>>;
    fn search_comment_ids(&self, submission_ids: &[String]) -> Result<Vec<String>>;
    fn search_comments(&self, ids: &[String], fields: &[Column]) -> Result<Vec<Comment>>;
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Vec<T>,
}

/// Blocking client for a Pushshift-compatible API. Construct once per run and pass by reference.
pub struct PushshiftClient {
    http: Client,
    base: String,
    page_size: usize,
    retry: RetryPolicy,
}

impl PushshiftClient {
    pub fn new(opts: &HarvestOptions) -> Result<Self> {
        let http = Client::builder()
            .timeout(opts.request_timeout)
            .user_agent(concat!("subcorpus/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base: opts.api_base.trim_end_matches('/').to_string(),
            page_size: opts.page_size.max(1),
            retry: opts.retry.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// GET `path` and return the `data` array, retrying 429/5xx and transport failures.
    fn get_data<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base, path);
        let attempts = self.retry.attempts.max(1);
        let mut last = String::new();

        for attempt in 0..attempts {
            let wait = match self.http.get(&url).query(params).send() {
                Ok(resp) if resp.status().is_success() => {
                    let env: Envelope<T> = resp.json()?;
                    return Ok(env.data);
                }
                Ok(resp) if is_retriable_status(resp.status()) => {
                    last = format!("HTTP {}", resp.status());
                    retry_after(&resp, &self.retry).unwrap_or_else(|| self.retry.delay_for(attempt))
                }
                Ok(resp) => {
                    return Err(HarvestError::Remote(format!("{url}: HTTP {}", resp.status())));
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    last = e.to_string();
                    self.retry.delay_for(attempt)
                }
                Err(e) => return Err(e.into()),
            };
            if attempt + 1 < attempts {
                tracing::warn!("{url}: {last}; retrying in {}ms (attempt {}/{})", wait.as_millis(), attempt + 1, attempts);
                sleep(wait);
            }
        }
        Err(HarvestError::Remote(format!("{url}: gave up after {attempts} attempt(s): {last}")))
    }
}

fn is_retriable_status(s: StatusCode) -> bool {
    s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error()
}

fn retry_after(resp: &Response, policy: &RetryPolicy) -> Option<Duration> {
    let secs: u64 = resp.headers().get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    Some(Duration::from_secs(secs).min(policy.max))
}

impl SearchService for PushshiftClient {
    /// Pages backwards from `window.before`, newest first, until `limit` is reached
    /// or the archive returns a short page. `before` is exclusive, so each next page
    /// starts one second past the oldest post seen and repeats are dropped by id.
    fn search_submissions(&self, q: &SubmissionQuery<'_>) -> Result<Vec<Submission>> {
        let mut fields: Vec<&str> = q.fields.to_vec();
        if !fields.contains(&"created_utc") {
            fields.push("created_utc");
        }
        let fields = fields.join(",");

        let mut out: Vec<Submission> = Vec::new();
        let mut seen: AHashSet<String> = AHashSet::new();
        let mut before = q.window.before;
        while out.len() < q.limit {
            let size = (q.limit - out.len()).min(self.page_size);
            let mut params = vec![
                ("subreddit", q.subreddit.to_string()),
                ("size", size.to_string()),
                ("after", q.window.after.to_string()),
                ("before", before.to_string()),
                ("fields", fields.clone()),
                ("sort", "desc".to_string()),
                ("sort_type", "created_utc".to_string()),
            ];
            if !q.query.is_empty() {
                params.push(("q", q.query.to_string()));
            }
            let page: Vec<Submission> = self.get_data("/reddit/search/submission/", &params)?;
            let got = page.len();
            let cursor = page.iter().filter_map(|s| s.created_utc).min();
            let prev = out.len();
            out.extend(page.into_iter().filter(|s| seen.insert(s.id.clone())));
            tracing::debug!("submission page: {got} result(s), {} new, {} total", out.len() - prev, out.len());

            if got < size || out.len() == prev {
                break;
            }
            match cursor {
                Some(c) if c + 1 < before => before = c + 1,
                _ => break,
            }
        }
        out.truncate(q.limit);
        Ok(out)
    }

    fn search_comment_ids(&self, submission_ids: &[String]) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for id in submission_ids {
            let ids: Vec<String> = self.get_data(&format!("/reddit/submission/comment_ids/{id}"), &[])?;
            out.extend(ids);
        }
        Ok(out)
    }

    /// Looks ids up in pages of at most `page_size`, then asks again for any ids the
    /// archive left out, until everything is resolved or a round brings nothing new.
    fn search_comments(&self, ids: &[String], fields: &[Column]) -> Result<Vec<Comment>> {
        let mut names: Vec<&str> = fields.iter().map(|c| c.name()).collect();
        names.push("id");
        let fields = names.join(",");

        let mut out: Vec<Comment> = Vec::with_capacity(ids.len());
        let mut pending: Vec<String> = ids.to_vec();
        while !pending.is_empty() {
            let wanted: AHashSet<&str> = pending.iter().map(String::as_str).collect();
            let mut found: AHashSet<String> = AHashSet::new();
            for part in pending.chunks(self.page_size) {
                let params = [
                    ("ids", part.join(",")),
                    ("fields", fields.clone()),
                    ("size", part.len().to_string()),
                ];
                let page: Vec<Comment> = self.get_data("/reddit/search/comment/", &params)?;
                for c in page {
                    if wanted.contains(c.id.as_str()) && found.insert(c.id.clone()) {
                        out.push(c);
                    }
                }
            }
            if found.is_empty() {
                break;
            }
            pending.retain(|id| !found.contains(id));
        }

        if !pending.is_empty() {
            tracing::warn!("{} of {} comment id(s) were not returned by the archive", pending.len(), ids.len());
        }
        Ok(out)
    }
}
