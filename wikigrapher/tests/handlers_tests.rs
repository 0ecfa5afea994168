use wikigrapher::commands::command_argument_builder;
use wikigrapher::handlers::budgets_from_args;

fn crawl_matches(argv: &[&str]) -> clap::ArgMatches {
    let matches = command_argument_builder()
        .try_get_matches_from(argv.iter().copied())
        .expect("arguments should parse");
    let (_, sub) = matches.subcommand().expect("subcommand expected");
    sub.clone()
}

#[test]
fn test_crawl_requires_page() {
    let result = command_argument_builder().try_get_matches_from(["wikigrapher", "crawl"]);
    assert!(result.is_err());
}

#[test]
fn test_crawl_defaults() {
    let sub = crawl_matches(&["wikigrapher", "crawl", "--page", "Fergana_(moth)"]);
    let budgets = budgets_from_args(&sub);
    assert_eq!(budgets.max_pages, 50);
    assert_eq!(budgets.max_depth, Some(2));
}

#[test]
fn test_crawl_explicit_budgets() {
    let sub = crawl_matches(&[
        "wikigrapher",
        "crawl",
        "--page",
        "Moth",
        "--depth",
        "3",
        "--max-pages",
        "10",
    ]);
    let budgets = budgets_from_args(&sub);
    assert_eq!(budgets.max_pages, 10);
    assert_eq!(budgets.max_depth, Some(3));
}

#[test]
fn test_graph_shares_crawl_arguments() {
    let sub = crawl_matches(&["wikigrapher", "graph", "--page", "Moth", "-d", "1", "-m", "5"]);
    let budgets = budgets_from_args(&sub);
    assert_eq!(budgets.max_pages, 5);
    assert_eq!(budgets.max_depth, Some(1));
}

#[test]
fn test_suggest_requires_query() {
    let result = command_argument_builder().try_get_matches_from(["wikigrapher", "suggest"]);
    assert!(result.is_err());
}
