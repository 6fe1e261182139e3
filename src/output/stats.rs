//! Crawl summary reporting

use crate::output::traits::CrawlSummary;

/// Prints a session summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary returned by the engine
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    let outcome = if summary.cancelled {
        "cancelled"
    } else if summary.budget_exhausted {
        "page budget reached"
    } else if summary.stalled {
        "every worker blocked on a full frontier"
    } else {
        "frontier exhausted"
    };
    println!("Finished: {} after {:.1}s", outcome, summary.elapsed.as_secs_f64());
    println!();

    println!("Pages:");
    println!("  Visited: {}", summary.pages_visited);
    println!("  Delivered: {}", summary.pages_delivered);
    println!("  Not HTML: {}", summary.non_html_pages);
    println!("  Fetch failures: {}", summary.fetch_failures);
    if summary.sink_failures > 0 {
        println!("  Output failures: {}", summary.sink_failures);
    }
    println!();

    println!("Links:");
    println!("  Enqueued: {}", summary.links_enqueued);
    println!("  Duplicates: {}", summary.links_duplicate);
    println!("  Denied: {}", summary.links_denied);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages delivered, {:.2} pages/sec)",
        summary.success_rate(),
        summary.pages_delivered,
        summary.pages_visited,
        summary.pages_per_second()
    );
}
