//! Colorized terminal rendering of a `CrawlResult`: green for healthy, red
//! for broken, yellow for anchor warnings, purple for unsupported schemes.

use ansi_term::Color::{self, Blue, Green, Purple, Red, White, Yellow};

use crate::model::{CrawlResult, Destination};
use crate::report::{self, Classification};

fn color_for(classification: Classification) -> Color {
    match classification {
        Classification::Broken => Red,
        Classification::Warning => Yellow,
        Classification::UnsupportedScheme => Purple,
        Classification::Healthy => Green,
    }
}

fn label_for(classification: Classification) -> &'static str {
    match classification {
        Classification::Broken => "broken",
        Classification::Warning => "warning",
        Classification::UnsupportedScheme => "unsupported scheme",
        Classification::Healthy => "ok",
    }
}

fn print_destination(destination: &Destination, classification: Classification) {
    let color = color_for(classification);
    let status = destination
        .status_code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "-".to_owned());

    println!(
        "  {} {} {}",
        color.bold().paint(format!("[{}]", label_for(classification))),
        White.paint(status),
        destination.url,
    );

    if !destination.redirects.is_empty() {
        let chain = destination
            .redirects
            .iter()
            .map(|hop| format!("{} ({})", hop.url, hop.status_code))
            .collect::<Vec<_>>()
            .join(" -> ");
        println!("      {} {}", Blue.paint("redirects:"), chain);
    }
}

/// Prints every non-healthy destination grouped by classification, then
/// anchor warnings, then a one-line summary.
pub fn pretty_print(result: &CrawlResult) {
    let summary = report::summarize(result);
    let warned_urls: std::collections::HashSet<&str> = result
        .anchor_warnings
        .iter()
        .map(|warning| warning.link.target_url.as_str())
        .collect();

    for destination in &result.destinations {
        let classification = report::classify(destination, &warned_urls);
        if classification != Classification::Healthy {
            print_destination(destination, classification);
        }
    }

    if !result.anchor_warnings.is_empty() {
        println!("{}", Yellow.bold().paint("anchor warnings:"));
        for warning in &result.anchor_warnings {
            println!(
                "  {} -> {}#{} (anchor not found)",
                warning.link.origin.source_url, warning.link.target_url, warning.fragment,
            );
        }
    }

    let summary_color = if summary.broken > 0 { Red } else { Green };
    println!(
        "{} {} destinations, {} broken, {} warnings, {} unsupported scheme, {} ok",
        summary_color.bold().paint("summary:"),
        summary.total,
        summary.broken,
        summary.warnings,
        summary.unsupported,
        summary.healthy,
    );
}
