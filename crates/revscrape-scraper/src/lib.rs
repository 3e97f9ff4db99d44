pub mod backend;
pub mod error;
pub mod orchestrator;
pub mod pacing;
pub mod pagination;
pub mod parse;
mod parse_helpers;
pub mod proxy;
pub mod selectors;

pub use backend::{
    BrowserOptions, BrowserSessionBackend, PageContent, RetrievalBackend, StaticFetchBackend,
    StaticOptions,
};
pub use error::{ExtractError, RetrievalError};
pub use orchestrator::{extract, to_output_rows, ExtractOptions};
pub use pagination::{page_url, PaginationController, PaginationOutcome};
pub use parse::{find_reviews_link, parse_product_aggregate, parse_review, parse_review_page};
pub use proxy::ProxyRotator;
