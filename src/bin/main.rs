//! The `linkwarden` binary: parses CLI options, runs a crawl, and renders
//! the result — either as the colorized report or as JSON, mirroring the
//! teacher's `main!` macro's two render paths and its exit-code mapping.

use std::time::Duration;

use ansi_term::Color::Red;
use structopt::StructOpt;
use url::Url;

use linkwarden::cli::Opts;
use linkwarden::crawler::SimpleDownloader;
use linkwarden::{coordinator, default_user_agent, init_logger, log_panics, pretty_print};

const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let opts = Opts::from_args();
    init_logger(opts.verbose);
    log_panics();

    let seeds: Vec<Url> = match opts
        .seeds
        .iter()
        .map(|seed| Url::parse(seed))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(seeds) => seeds,
        Err(error) => {
            eprintln!("{}: {}", Red.bold().paint("error"), error);
            std::process::exit(2);
        }
    };

    let downloader = SimpleDownloader::new(
        default_user_agent().to_owned(),
        MAX_BODY_SIZE,
        Duration::from_secs_f64(opts.timeout),
    );

    let options = coordinator::CoordinatorOptions {
        connections: opts.connections,
        checks_external: opts.checks_external(),
        quota: opts.quota,
    };

    match coordinator::crawl(seeds, opts.globs.clone(), downloader, options).await {
        Ok(result) => {
            if opts.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).expect("CrawlResult always serializes")
                );
            } else {
                pretty_print::pretty_print(&result);
            }

            if result.has_broken_links() {
                std::process::exit(1);
            }
            std::process::exit(0);
        }
        Err(error) => {
            eprintln!("{}: {}", Red.bold().paint("error"), error);
            std::process::exit(2);
        }
    }
}
