use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use tokio::signal;
use wikigrapher_core::{BatchOutcome, CrawlBudgets, CrawlManager, CrawlOutcome, event_channel};
use wikigrapher_scraper::{SuggestClient, WikipediaFetcher};

/// Read the crawl budgets out of parsed `crawl`/`graph` arguments.
pub fn budgets_from_args(args: &ArgMatches) -> CrawlBudgets {
    let depth = args.get_one::<usize>("depth").copied().unwrap_or(2);
    let max_pages = args.get_one::<usize>("max-pages").copied().unwrap_or(50);
    CrawlBudgets {
        max_pages,
        max_depth: Some(depth),
    }
}

fn init_tracing() {
    // Logs go to stderr so stdout stays a clean event stream.
    tracing_subscriber::fmt().with_writer(io::stderr).init();
}

/// Spawn a task that turns Ctrl-C into a cooperative stop request.
fn install_cancel_handler(manager: &CrawlManager) {
    let manager = manager.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} stopping after the current page...", "▪".yellow());
            manager.request_cancel();
        }
    });
}

pub async fn handle_crawl(args: &ArgMatches) -> Result<()> {
    init_tracing();

    let page = args.get_one::<String>("page").expect("page is required");
    let budgets = budgets_from_args(args);

    let fetcher = WikipediaFetcher::new();
    let manager = CrawlManager::new();
    install_cancel_handler(&manager);

    let (tx, mut rx) = event_channel();
    let crawl = {
        let manager = manager.clone();
        let seed = page.clone();
        tokio::spawn(async move { manager.crawl(&fetcher, &seed, budgets, &tx).await })
    };

    // Event records are flushed as they arrive, not at the end.
    let mut stdout = io::stdout();
    while let Some(event) = rx.recv().await {
        stdout.write_all(event.to_sse_frame().as_bytes())?;
        stdout.flush()?;
    }

    match crawl.await? {
        Ok(CrawlOutcome::Completed(stats)) => {
            eprintln!(
                "{} Crawl complete at {}: {} nodes, {} edges",
                "✓".green().bold(),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                stats.total_nodes,
                stats.total_edges
            );
            Ok(())
        }
        Ok(CrawlOutcome::Cancelled) => {
            eprintln!("{} Crawl cancelled; partial results remain valid", "▪".yellow());
            Ok(())
        }
        Ok(CrawlOutcome::Busy) => {
            eprintln!("{} Another crawl is in progress", "✗".red());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn handle_graph(args: &ArgMatches) -> Result<()> {
    init_tracing();

    let page = args.get_one::<String>("page").expect("page is required");
    let budgets = budgets_from_args(args);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Crawling from {}...", page));

    let fetcher = WikipediaFetcher::new();
    let manager = CrawlManager::new();
    install_cancel_handler(&manager);

    match manager.crawl_graph(&fetcher, page, budgets).await {
        Ok(BatchOutcome::Graph(graph)) => {
            spinner.finish_and_clear();
            println!("{}", serde_json::to_string_pretty(&graph)?);
            eprintln!(
                "{} {} nodes, {} edges",
                "✓".green().bold(),
                graph.stats.total_nodes,
                graph.stats.total_edges
            );
            Ok(())
        }
        Ok(BatchOutcome::Busy) => {
            spinner.finish_and_clear();
            eprintln!("{} Another crawl is in progress", "✗".red());
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

pub async fn handle_suggest(args: &ArgMatches) -> Result<()> {
    init_tracing();

    let query = args.get_one::<String>("query").expect("query is required");
    let list = SuggestClient::new().suggest(query).await;
    println!("{}", serde_json::to_string(&list)?);
    Ok(())
}
