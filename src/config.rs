use crate::error::HarvestError;
use crate::region::{Region, TimeWindow};
use crate::util::{is_path_safe, is_valid_subreddit};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Which side of the region's first recorded case to search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeriodMode {
    Precovid,
    Postcovid,
}

impl PeriodMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodMode::Precovid => "precovid",
            PeriodMode::Postcovid => "postcovid",
        }
    }
}

impl fmt::Display for PeriodMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodMode {
    type Err = HarvestError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "precovid" | "pre" => Ok(PeriodMode::Precovid),
            "postcovid" | "post" => Ok(PeriodMode::Postcovid),
            other => Err(HarvestError::InvalidInput(format!(
                "period must be precovid or postcovid, got {other:?}"
            ))),
        }
    }
}

/// One run's search parameters. Validated once, then read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchCriteria {
    pub subreddit: String,
    pub query: String,
    pub limit: usize,
    pub period: PeriodMode,
    /// Overrides the region derived from the subreddit name.
    pub region: Option<Region>,
}

impl SearchCriteria {
    pub fn new(subreddit: impl AsRef<str>, query: impl Into<String>, limit: usize, period: PeriodMode) -> Self {
        let mut sub = subreddit.as_ref().trim().to_string();
        if let Some(rest) = sub.strip_prefix("r/") {
            sub = rest.to_string();
        }
        let query: String = query.into();
        Self { subreddit: sub, query: query.trim().to_string(), limit, period, region: None }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Explicit region, else the subreddit name looked up as a region.
    pub fn region(&self) -> Result<Region, HarvestError> {
        match self.region {
            Some(r) => Ok(r),
            None => self.subreddit.parse(),
        }
    }

    pub fn window(&self) -> Result<TimeWindow, HarvestError> {
        Ok(self.region()?.window(self.period))
    }

    pub fn validate(&self) -> Result<(), HarvestError> {
        if !is_valid_subreddit(&self.subreddit) {
            return Err(HarvestError::InvalidInput(format!("not a subreddit name: {:?}", self.subreddit)));
        }
        if !is_path_safe(&self.query) {
            return Err(HarvestError::InvalidInput(format!(
                "keyword {:?} cannot be used in a folder or file name",
                self.query
            )));
        }
        if self.limit == 0 {
            return Err(HarvestError::InvalidInput("limit must be at least 1".into()));
        }
        self.region().map(|_| ())
    }

    /// `{subreddit}_{period}_keyword_{query}`
    pub fn folder_name(&self) -> String {
        format!("{}_{}_keyword_{}", self.subreddit, self.period, self.query)
    }

    /// `{subreddit}_comments_{query}.csv`
    pub fn csv_file_name(&self) -> String {
        format!("{}_comments_{}.csv", self.subreddit, self.query)
    }
}

/// Post-fetch decisions: what to do with authors and whether to write the raw corpus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunChoices {
    pub erase_authors: bool,
    pub save_corpus: bool,
}

/// Retry/backoff policy applied by the HTTP client to 429, 5xx and transport errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub initial: Duration,
    pub max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 5, initial: Duration::from_millis(1000), max: Duration::from_secs(30) }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): doubling from `initial`, capped at `max`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

pub const DEFAULT_API_BASE: &str = "https://api.pushshift.io";

/// Harvester knobs with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct HarvestOptions {
    pub api_base: String,
    pub output_root: PathBuf,
    pub batch_size: usize,    // max comment ids per lookup request
    pub min_comments: u64,    // submissions need strictly more comments than this
    pub page_size: usize,     // submissions per search page
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub progress: bool,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            output_root: PathBuf::from("."),
            batch_size: 300,
            min_comments: 1,
            page_size: 100,
            request_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            progress: true,
        }
    }
}

impl HarvestOptions {
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }
    pub fn with_output_root(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_root = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }
    pub fn with_min_comments(mut self, n: u64) -> Self {
        self.min_comments = n;
        self
    }
    pub fn with_page_size(mut self, n: usize) -> Self {
        self.page_size = n.max(1);
        self
    }
    pub fn with_request_timeout(mut self, t: Duration) -> Self {
        self.request_timeout = t;
        self
    }
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }

    pub fn run_dir(&self, criteria: &SearchCriteria) -> PathBuf {
        self.output_root.join(criteria.folder_name())
    }
}
