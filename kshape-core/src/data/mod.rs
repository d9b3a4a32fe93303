//! Series retrieval: providers, the fredgraph CSV format, and the series cache.

pub mod cache;
pub mod fred;
pub mod fredgraph;
pub mod local;
pub mod provider;

pub use cache::{SeriesCache, SeriesKey};
pub use fred::FredProvider;
pub use local::{save_series, LocalCsvProvider};
pub use provider::{DataError, DataSource, MemoryProvider, Observation, SeriesProvider};
