use structopt::StructOpt;

/// Command-line options for the `linkwarden` binary.
///
/// This is the only collaborator that touches `std::env`/argv; everything
/// else in the crate is driven by the typed `Opts` this produces.
#[derive(Debug, StructOpt)]
#[structopt(name = "linkwarden", about = "A concurrent link checker.")]
pub struct Opts {
    /// One or more seed URLs to start crawling from.
    #[structopt(required = true)]
    pub seeds: Vec<String>,

    /// Explicit host-glob pattern (e.g. `http://example.com/guides**`).
    /// Repeatable. When omitted, each seed implicitly seeds the glob
    /// `<seed>**`.
    #[structopt(long = "glob")]
    pub globs: Vec<String>,

    /// Disables checking of external links (on by default).
    #[structopt(long)]
    pub no_external: bool,

    /// Number of concurrent fetch workers.
    #[structopt(long, short = "c", default_value = "4", env)]
    pub connections: usize,

    /// Per-request timeout, in seconds.
    #[structopt(long, default_value = "20", env)]
    pub timeout: f64,

    /// Stop the crawl after this many destinations have been checked.
    #[structopt(long, env)]
    pub quota: Option<usize>,

    /// Verbosity. By default, only warnings and errors are logged.
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: u8,

    /// Emit the crawl result as JSON instead of a colorized report.
    #[structopt(short = "j", long, env)]
    pub json: bool,
}

impl Opts {
    /// Whether external destinations should be fetched (never recursed into).
    /// External checking is on by default; `--no-external` turns it off.
    pub fn checks_external(&self) -> bool {
        !self.no_external
    }
}
