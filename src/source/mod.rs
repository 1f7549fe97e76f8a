pub use collection::CollectionSource;
pub use pipeline::PipelineSource;

pub mod collection;
pub mod pipeline;

use crate::DogearResult;
use async_trait::async_trait;

/// A handle that can count matching records and fetch one bounded slice
/// of them.
///
/// The pagination arithmetic only ever needs these two capabilities, so
/// the query and aggregation variants (and in-memory fakes in tests)
/// plug in behind this trait.
#[async_trait]
pub trait PageSource {
    type Item;

    /// Total records matching this source's filter, with no pagination
    /// stages applied.
    async fn count(&self) -> DogearResult<u64>;

    /// One sorted, offset, bounded slice of matching records.
    async fn fetch(&self, skip: u64, limit: u64) -> DogearResult<Vec<Self::Item>>;
}
