mod client;
mod dispatcher;

pub use client::SearchClient;
pub use dispatcher::{empty_results_placeholder, RegionSearchResults, SearchDispatcher};
