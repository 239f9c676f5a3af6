//! Interactive input boundary. Everything the run needs from a person goes
//! through [`Prompter`], so the pipeline itself never touches the terminal.

use crate::config::{PeriodMode, RunChoices, SearchCriteria};
use crate::error::{HarvestError, Result};
use crate::region::Region;
use crate::util::parse_yes;

/// Blocking source of answers to prompts.
pub trait Prompter {
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// Reads answers from the terminal.
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| HarvestError::InvalidInput(format!("prompt failed: {e}")))
    }
}

pub fn ask_yes_no<P: Prompter + ?Sized>(p: &mut P, prompt: &str) -> Result<bool> {
    Ok(parse_yes(&p.ask(&format!("{prompt} Y/N"))?))
}

/// Ask for subreddit, keyword, limit and period. Re-asks a limit that isn't a positive integer.
pub fn collect_criteria<P: Prompter + ?Sized>(p: &mut P, region: Option<Region>) -> Result<SearchCriteria> {
    let subreddit = p.ask("Subreddit name to search through?")?;
    let query = p.ask("Keyword to search post titles for?")?;
    let limit = loop {
        let raw = p.ask("Limit number of posts to:")?;
        match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => break n,
            _ => tracing::warn!("{:?} is not a positive number", raw.trim()),
        }
    };
    let period = if ask_yes_no(p, "Search before first local covid case?")? {
        PeriodMode::Precovid
    } else {
        PeriodMode::Postcovid
    };
    tracing::info!("Search period: {period}");

    let mut criteria = SearchCriteria::new(subreddit, query, limit, period);
    if let Some(r) = region {
        criteria = criteria.with_region(r);
    }
    criteria.validate()?;
    Ok(criteria)
}

/// Post-fetch confirmations, asked in the order the run uses them.
pub fn ask_choices<P: Prompter + ?Sized>(p: &mut P) -> Result<RunChoices> {
    let erase_authors = ask_yes_no(p, "Erase usernames from data?")?;
    let save_corpus = ask_yes_no(p, "Save comment text as raw corpus?")?;
    Ok(RunChoices { erase_authors, save_corpus })
}

/// After an empty result: `q` quits, anything else tries again.
pub fn ask_retry<P: Prompter + ?Sized>(p: &mut P) -> Result<bool> {
    let answer = p.ask("Please try again with different search criteria (hit enter) or quit (\"q\")")?;
    Ok(!answer.trim().eq_ignore_ascii_case("q"))
}
