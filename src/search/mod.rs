pub mod matcher;
pub mod query;
pub mod synonyms;

pub use matcher::{search, SearchMode, SearchOutcome, MAX_SEARCH_CANDIDATES};
pub use query::{is_blank, tokenize};
