pub mod movie;
pub mod trending;

pub use movie::{CatalogPayload, MovieSummary};
pub use trending::{rank_entries, TrendingEntry};
