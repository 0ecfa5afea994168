pub mod error;
pub mod event;
pub mod graph;
pub mod manager;
pub mod session;

pub use error::CrawlError;
pub use event::{CrawlEvent, EventReceiver, EventSender, event_channel};
pub use graph::{CrawlGraph, Edge, GraphStats, NodeView, VisitRecord, VisitedRegistry};
pub use manager::{BatchOutcome, CancelToken, CrawlManager, CrawlOutcome};
pub use session::{CrawlBudgets, CrawlSession, SessionEnd};

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
        _ _    _                      _
 __ __ (_) |__(_)__ _ _ _ __ _ _ __ | |_  ___ _ _
 \ V  V /| | / / / _` | '_/ _` | '_ \| ' \/ -_) '_|
  \_/\_/ |_|_\_\_\__, |_| \__,_| .__/|_||_\___|_|
                 |___/         |_|
"#;
    eprintln!("{}", banner.bright_cyan());
    eprintln!(
        "{}",
        "  explore the Wikipedia link graph, one hop at a time\n".bright_white()
    );
}
