#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use subcorpus::{
    Column, Comment, HarvestError, HarvestOptions, Prompter, Result, SearchService, Submission, SubmissionQuery,
    TimeWindow,
};

/// In-memory archive that records every call it receives.
#[derive(Default)]
pub struct FakeService {
    pub submissions: Vec<Submission>,
    pub comment_ids: HashMap<String, Vec<String>>,
    pub comments: HashMap<String, Comment>,
    /// Number of submission searches that return nothing before the real data shows up.
    pub empty_searches: Cell<usize>,

    pub submission_calls: RefCell<Vec<(String, String, usize, TimeWindow)>>,
    pub comment_id_calls: RefCell<Vec<Vec<String>>>,
    pub comment_calls: RefCell<Vec<Vec<String>>>,
}

impl FakeService {
    pub fn empty() -> Self {
        Self::default()
    }

    /// `posts` submissions `p0..`, each with `per_post` comments `p{i}_c{j}` by "user{j}".
    pub fn with_posts(posts: usize, per_post: usize) -> Self {
        let mut svc = Self::default();
        for i in 0..posts {
            let pid = format!("p{i}");
            svc.submissions.push(Submission::new(&pid, per_post as u64));
            let ids: Vec<String> = (0..per_post).map(|j| format!("{pid}_c{j}")).collect();
            for (j, id) in ids.iter().enumerate() {
                let author = format!("user{j}");
                let mut c = Comment::new(Some(author.as_str()), format!("body of {id}"));
                c.created_utc = 1_580_000_000 + j as i64;
                c.permalink = format!("/r/test/comments/{pid}/_/{id}/");
                svc.comments.insert(id.clone(), c);
            }
            svc.comment_ids.insert(pid, ids);
        }
        svc
    }

    /// Comment ids `c0..c{n}` served directly, no submissions.
    pub fn with_comment_ids(n: usize) -> (Self, Vec<String>) {
        let mut svc = Self::default();
        let ids: Vec<String> = (0..n).map(|i| format!("c{i}")).collect();
        for id in &ids {
            svc.comments.insert(id.clone(), Comment::new(Some("someone"), format!("text {id}")));
        }
        (svc, ids)
    }
}

impl SearchService for FakeService {
    fn search_submissions(&self, q: &SubmissionQuery<'_>) -> Result<Vec<Submission>> {
        self.submission_calls
            .borrow_mut()
            .push((q.subreddit.to_string(), q.query.to_string(), q.limit, q.window));
        if self.empty_searches.get() > 0 {
            self.empty_searches.set(self.empty_searches.get() - 1);
            return Ok(Vec::new());
        }
        Ok(self.submissions.iter().take(q.limit).cloned().collect())
    }

    fn search_comment_ids(&self, submission_ids: &[String]) -> Result<Vec<String>> {
        self.comment_id_calls.borrow_mut().push(submission_ids.to_vec());
        Ok(submission_ids
            .iter()
            .flat_map(|id| self.comment_ids.get(id).cloned().unwrap_or_default())
            .collect())
    }

    fn search_comments(&self, ids: &[String], _fields: &[Column]) -> Result<Vec<Comment>> {
        self.comment_calls.borrow_mut().push(ids.to_vec());
        Ok(ids.iter().filter_map(|id| self.comments.get(id).cloned()).collect())
    }
}

/// Archive that fails every call, for fatal-error paths.
pub struct BrokenService;

impl SearchService for BrokenService {
    fn search_submissions(&self, _q: &SubmissionQuery<'_>) -> Result<Vec<Submission>> {
        Err(HarvestError::Remote("HTTP 502 Bad Gateway".into()))
    }
    fn search_comment_ids(&self, _ids: &[String]) -> Result<Vec<String>> {
        Err(HarvestError::Remote("unreachable".into()))
    }
    fn search_comments(&self, _ids: &[String], _fields: &[Column]) -> Result<Vec<Comment>> {
        Err(HarvestError::Remote("unreachable".into()))
    }
}

/// Answers prompts from a fixed script and remembers what was asked.
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { answers: answers.into_iter().map(Into::into).collect(), asked: Vec::new() }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| HarvestError::InvalidInput(format!("script exhausted at {prompt:?}")))
    }
}

/// Options suitable for tests: output under `root`, no progress bars.
pub fn test_options(root: &Path) -> HarvestOptions {
    HarvestOptions::default().with_output_root(root).with_progress(false)
}

/// Sorted `.txt` file names in `dir`.
pub fn txt_files(dir: &Path) -> Vec<PathBuf> {
    let mut v: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().map(|e| e == "txt").unwrap_or(false))
        .collect();
    v.sort();
    v
}

/// Parse a CSV file into (header, rows).
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut r = csv::Reader::from_path(path).unwrap();
    let header = r.headers().unwrap().iter().map(str::to_string).collect();
    let rows = r
        .records()
        .map(|rec| rec.unwrap().iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}
