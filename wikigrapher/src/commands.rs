use crate::CLAP_STYLING;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("wikigrapher")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wikigrapher")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Breadth-first crawl of the link graph around a seed article, streamed \
                as server-sent event records while it is discovered.",
                )
                .arg(
                    arg!(-p --"page" <PAGE>)
                        .required(true)
                        .help("Seed article title, e.g. Fergana_(moth)"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum traversal depth from the seed")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    arg!(-m --"max-pages" <NUM>)
                        .required(false)
                        .help("Maximum number of pages to visit")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                ),
        )
        .subcommand(
            command!("graph")
                .about(
                    "Same crawl, but printed as a single JSON graph document once the \
                whole traversal has finished.",
                )
                .arg(
                    arg!(-p --"page" <PAGE>)
                        .required(true)
                        .help("Seed article title, e.g. Fergana_(moth)"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum traversal depth from the seed")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    arg!(-m --"max-pages" <NUM>)
                        .required(false)
                        .help("Maximum number of pages to visit")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                ),
        )
        .subcommand(
            command!("suggest")
                .about("Look up article title suggestions for a query prefix")
                .arg(
                    arg!(-s --"query" <PREFIX>)
                        .required(true)
                        .help("Title prefix to autocomplete (at least 2 characters)"),
                ),
        )
}
