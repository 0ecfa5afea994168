use wikigrapher::commands::command_argument_builder;
use wikigrapher::handlers;
use wikigrapher_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handlers::handle_crawl(primary_command).await,
        Some(("graph", primary_command)) => handlers::handle_graph(primary_command).await,
        Some(("suggest", primary_command)) => handlers::handle_suggest(primary_command).await,
        None => Ok(()),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}
