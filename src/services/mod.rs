pub mod catalog;
pub mod debounce;
pub mod search;
pub mod trending;

pub use catalog::{CatalogQuery, MovieCatalog, TmdbCatalog};
pub use search::{SearchSession, SessionDeps, SessionHandle};
pub use trending::{SearchRecord, TrendingStore};
