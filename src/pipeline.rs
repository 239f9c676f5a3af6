use crate::clean::clean_comments;
use crate::config::{HarvestOptions, RunChoices, SearchCriteria};
use crate::error::Result;
use crate::export::{save_corpus, save_csv};
use crate::fetch::{fetch_comment_ids, fetch_comments, fetch_submissions};
use crate::models::CommentTable;
use crate::prompt::{ask_choices, ask_retry, collect_criteria, Prompter};
use crate::region::Region;
use crate::service::SearchService;
use crate::util::elapsed_secs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Drives one harvest: fetch, clean, persist. Borrows the service handle for its lifetime.
pub struct Harvester<'a, S: SearchService + ?Sized> {
    service: &'a S,
    opts: HarvestOptions,
}

/// Raw results of the three fetch stages, before cleaning.
#[derive(Clone, Debug)]
pub struct Fetched {
    pub submissions: usize,
    pub comment_ids: usize,
    pub table: CommentTable,
    pub elapsed: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub criteria: SearchCriteria,
    pub submissions: usize,
    pub comment_ids: usize,
    pub fetched: usize,
    pub kept: usize,
    pub csv_path: PathBuf,
    pub corpus_files: Option<usize>,
    /// Fetch through persistence.
    pub elapsed: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Done(RunReport),
    Quit,
}

/// Answers supplied up front (e.g. from CLI flags) that the interactive loop should not ask for.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunPreset {
    pub region: Option<Region>,
    pub choices: Option<RunChoices>,
}

impl<'a, S: SearchService + ?Sized> Harvester<'a, S> {
    pub fn new(service: &'a S, opts: HarvestOptions) -> Self {
        Self { service, opts }
    }

    pub fn options(&self) -> &HarvestOptions {
        &self.opts
    }

    /// Submissions → comment ids → comments. An empty submission search surfaces as `EmptyResult`.
    pub fn fetch(&self, criteria: &SearchCriteria) -> Result<Fetched> {
        let t = Instant::now();
        let posts = fetch_submissions(self.service, criteria)?;
        let ids = fetch_comment_ids(self.service, &posts, &self.opts)?;
        let table = fetch_comments(self.service, &ids, &self.opts)?;
        tracing::info!("TOTAL TIME TAKEN: {} second(s)", elapsed_secs(t));
        Ok(Fetched { submissions: posts.len(), comment_ids: ids.len(), table, elapsed: t.elapsed() })
    }

    /// Clean the fetched table, then write the CSV and (if chosen) the text corpus.
    pub fn persist(&self, criteria: &SearchCriteria, fetched: Fetched, choices: RunChoices) -> Result<RunReport> {
        let t = Instant::now();
        let fetched_rows = fetched.table.len();
        let clean = clean_comments(fetched.table, choices.erase_authors);
        let dir = self.opts.run_dir(criteria);

        let csv_path = save_csv(&clean, &dir, &criteria.csv_file_name())?;
        let corpus_files = if choices.save_corpus {
            Some(save_corpus(&clean, &dir, self.opts.progress)?)
        } else {
            None
        };

        Ok(RunReport {
            criteria: criteria.clone(),
            submissions: fetched.submissions,
            comment_ids: fetched.comment_ids,
            fetched: fetched_rows,
            kept: clean.len(),
            csv_path,
            corpus_files,
            elapsed: fetched.elapsed + t.elapsed(),
        })
    }

    /// One non-interactive pass with pre-validated criteria and choices.
    pub fn run_once(&self, criteria: &SearchCriteria, choices: RunChoices) -> Result<RunReport> {
        criteria.validate()?;
        let fetched = self.fetch(criteria)?;
        self.persist(criteria, fetched, choices)
    }

    /// Prompt for criteria until a search returns something or the user quits.
    /// Only an empty result loops; every other error ends the run.
    pub fn run<P: Prompter + ?Sized>(&self, prompter: &mut P, preset: RunPreset) -> Result<RunOutcome> {
        loop {
            let criteria = collect_criteria(prompter, preset.region)?;
            match self.fetch(&criteria) {
                Ok(fetched) => {
                    let choices = match preset.choices {
                        Some(c) => c,
                        None => ask_choices(prompter)?,
                    };
                    return self.persist(&criteria, fetched, choices).map(RunOutcome::Done);
                }
                Err(e) if e.is_recoverable() => {
                    if !ask_retry(prompter)? {
                        tracing::info!("Quit requested");
                        return Ok(RunOutcome::Quit);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
