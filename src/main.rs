use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use subcorpus::{
    init_tracing_once, Harvester, HarvestOptions, PeriodMode, PushshiftClient, Region, RetryPolicy, RunChoices,
    RunOutcome, RunPreset, RunReport, SearchCriteria, TerminalPrompter, DEFAULT_API_BASE,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Collect a subreddit's comments for a keyword, before or after a region's first covid case")]
struct Args {
    /// Subreddit to search; also names the region unless --region is given.
    /// The four search flags go together: give all of them to run without prompts.
    #[arg(long, requires_all = ["query", "limit", "period"])]
    subreddit: Option<String>,

    /// Keyword to search post titles for.
    #[arg(long, requires_all = ["subreddit", "limit", "period"])]
    query: Option<String>,

    /// Maximum number of posts.
    #[arg(long, requires_all = ["subreddit", "query", "period"])]
    limit: Option<usize>,

    /// precovid or postcovid.
    #[arg(long, requires_all = ["subreddit", "query", "limit"])]
    period: Option<PeriodMode>,

    #[arg(long)]
    region: Option<Region>,

    #[arg(long, default_value_t = false)]
    erase_authors: bool,

    #[arg(long, default_value_t = false)]
    save_corpus: bool,

    #[arg(long, env = "SUBCORPUS_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, default_value_t = 300)]
    batch_size: usize,

    #[arg(long, default_value_t = 1)]
    min_comments: u64,

    #[arg(long, default_value_t = 100)]
    page_size: usize,

    #[arg(long, default_value_t = 5)]
    retries: u32,

    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    #[arg(long, default_value_t = false)]
    no_progress: bool,

    /// Print the known regions and exit.
    #[arg(long, default_value_t = false)]
    list_regions: bool,
}

impl Args {
    fn options(&self) -> HarvestOptions {
        HarvestOptions::default()
            .with_api_base(&self.api_base)
            .with_output_root(&self.output_dir)
            .with_batch_size(self.batch_size)
            .with_min_comments(self.min_comments)
            .with_page_size(self.page_size)
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry(RetryPolicy { attempts: self.retries.max(1), ..RetryPolicy::default() })
            .with_progress(!self.no_progress)
    }

    /// All four search parameters given: run without prompting.
    fn headless_criteria(&self) -> Option<SearchCriteria> {
        let (sub, q, limit, period) = (self.subreddit.as_ref()?, self.query.as_ref()?, self.limit?, self.period?);
        let c = SearchCriteria::new(sub, q.clone(), limit, period);
        Some(match self.region {
            Some(r) => c.with_region(r),
            None => c,
        })
    }

    fn choices(&self) -> RunChoices {
        RunChoices { erase_authors: self.erase_authors, save_corpus: self.save_corpus }
    }
}

fn print_report(r: &RunReport) {
    println!(
        "r/{} {:?} ({}): {} posts, {} comment ids, {} comments fetched, {} kept",
        r.criteria.subreddit, r.criteria.query, r.criteria.period, r.submissions, r.comment_ids, r.fetched, r.kept
    );
    println!("CSV: {}", r.csv_path.display());
    println!("Total time: {} second(s)", r.elapsed.as_secs_f64().round() as u64);
    if let Some(n) = r.corpus_files {
        println!("Corpus: {n} txt file(s)");
    }
}

fn main() -> Result<()> {
    init_tracing_once();
    let args = Args::parse();

    if args.list_regions {
        for r in Region::ALL {
            let a = r.anchors();
            println!("{:<14} month_before={} first_case={} month_after={}", r, a.month_before, a.first_case, a.month_after);
        }
        return Ok(());
    }

    let opts = args.options();
    let client = PushshiftClient::new(&opts).context("building HTTP client")?;
    tracing::info!("Using archive at {}", client.base_url());
    let harvester = Harvester::new(&client, opts);

    if let Some(criteria) = args.headless_criteria() {
        let report = harvester
            .run_once(&criteria, args.choices())
            .with_context(|| format!("harvesting r/{}", criteria.subreddit))?;
        print_report(&report);
        return Ok(());
    }

    let preset = RunPreset {
        region: args.region,
        choices: (args.erase_authors || args.save_corpus).then(|| args.choices()),
    };
    match harvester.run(&mut TerminalPrompter, preset)? {
        RunOutcome::Done(report) => print_report(&report),
        RunOutcome::Quit => println!("Quit."),
    }
    Ok(())
}
