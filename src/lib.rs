mod config;
mod error;
mod region;
mod models;
mod util;
mod progress;

mod service;
mod fetch;
mod clean;
mod export;
mod prompt;
mod pipeline;

pub use crate::config::{HarvestOptions, PeriodMode, RetryPolicy, RunChoices, SearchCriteria, DEFAULT_API_BASE};
pub use crate::error::{HarvestError, Result};
pub use crate::region::{Anchors, Region, TimeWindow};
pub use crate::models::{Column, Comment, CommentTable, Submission, COMMENT_COLUMNS, DELETED_AUTHOR};

// Archive boundary: trait for the pipeline, HTTP client for real runs.
pub use crate::service::{PushshiftClient, SearchService, SubmissionQuery};

// Individual stages, usable without the orchestrator.
pub use crate::fetch::{fetch_comment_ids, fetch_comments, fetch_submissions, SUBMISSION_FIELDS};
pub use crate::clean::{clean_comments, CleanTable};
pub use crate::export::{ensure_dir, save_corpus, save_csv};

pub use crate::prompt::{ask_choices, ask_retry, ask_yes_no, collect_criteria, Prompter, TerminalPrompter};
pub use crate::pipeline::{Fetched, Harvester, RunOutcome, RunPreset, RunReport};

pub use crate::util::{chunk_ids, init_tracing_once, parse_yes};
