pub mod error;
pub mod fetcher;
pub mod suggest;

pub use error::FetchError;
pub use fetcher::{LinkFetcher, WikipediaFetcher};
pub use suggest::{SuggestClient, Suggestion, SuggestionList};
