use crate::options::PaginateOptions;
use crate::page::{PageWindow, Paginated, Pagination};
use crate::source::{CollectionSource, PageSource, PipelineSource};
use crate::DogearResult;
use bson::Document;
use mongodb::Database;
use serde::de::DeserializeOwned;

/// Runs the pagination algorithm against any [`PageSource`].
///
/// Counts first, resolves the page window from the count, then fetches
/// the one bounded slice the window describes. The fetch depends on the
/// resolved skip, so the two operations are strictly ordered. Failures
/// from either capability propagate unchanged.
pub async fn paginate_source<S>(source: &S, options: &PaginateOptions) -> DogearResult<Paginated<S::Item>>
where
    S: PageSource + Sync,
{
    let total_items = source.count().await?;

    let window = PageWindow::resolve(
        total_items,
        options.limit,
        options.page_number,
        options.page_range,
    );

    let items = source.fetch(window.skip, window.limit).await?;

    let pagination = Pagination {
        items_count: items.len(),
        current_page: window.current_page,
        total_pages: window.total_pages,
        previous_pages: window.previous_pages,
        next_pages: window.next_pages,
    };

    Ok(Paginated { items, pagination })
}

/// Paginates a `find`-style query against a collection.
///
/// The filter passes through to the driver unmodified; sort, projection,
/// and reference expansions come from the options.
pub async fn paginate<T>(
    db: &Database,
    collection_name: &str,
    filter: Document,
    options: PaginateOptions,
) -> DogearResult<Paginated<T>>
where
    T: DeserializeOwned + Send + Sync + Unpin,
{
    let source = CollectionSource::new(db, collection_name, filter, &options);
    paginate_source(&source, &options).await
}

/// Paginates an aggregation pipeline.
///
/// The caller's stages run as-is; counting and slicing stages are
/// appended to copies of the pipeline per call.
pub async fn paginate_pipeline<T>(
    db: &Database,
    collection_name: &str,
    stages: Vec<Document>,
    options: PaginateOptions,
) -> DogearResult<Paginated<T>>
where
    T: DeserializeOwned + Send + Sync,
{
    let source = PipelineSource::new(db, collection_name, stages, &options);
    paginate_source(&source, &options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DogearError;
    use async_trait::async_trait;

    /// In-memory stand-in for a collection of sequential record IDs.
    struct FakeSource {
        records: Vec<u64>,
    }

    impl FakeSource {
        fn with_records(count: u64) -> Self {
            Self {
                records: (1..=count).collect(),
            }
        }
    }

    #[async_trait]
    impl PageSource for FakeSource {
        type Item = u64;

        async fn count(&self) -> DogearResult<u64> {
            Ok(self.records.len() as u64)
        }

        async fn fetch(&self, skip: u64, limit: u64) -> DogearResult<Vec<u64>> {
            let start = (skip as usize).min(self.records.len());
            let end = (start + limit as usize).min(self.records.len());
            Ok(self.records[start..end].to_vec())
        }
    }

    /// Fails on whichever capability is flagged, to prove errors pass
    /// through untouched.
    struct FailingSource {
        fail_count: bool,
    }

    #[async_trait]
    impl PageSource for FailingSource {
        type Item = u64;

        async fn count(&self) -> DogearResult<u64> {
            if self.fail_count {
                return Err(DogearError::Generic("count exploded".into()));
            }
            Ok(10)
        }

        async fn fetch(&self, _skip: u64, _limit: u64) -> DogearResult<Vec<u64>> {
            Err(DogearError::Generic("fetch exploded".into()))
        }
    }

    fn options(limit: u64, page_number: u64, page_range: u64) -> PaginateOptions {
        PaginateOptions::builder()
            .limit(limit)
            .page_number(page_number)
            .page_range(page_range)
            .build()
    }

    #[tokio::test]
    async fn test_middle_page() {
        let source = FakeSource::with_records(95);
        let result = paginate_source(&source, &options(10, 3, 2))
            .await
            .expect("pagination should succeed");

        assert_eq!(result.items, (21..=30).collect::<Vec<u64>>());
        assert_eq!(result.pagination.items_count, 10);
        assert_eq!(result.pagination.current_page, 3);
        assert_eq!(result.pagination.total_pages, 10);
        assert_eq!(result.pagination.previous_pages, vec![1, 2]);
        assert_eq!(result.pagination.next_pages, vec![4, 5]);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let source = FakeSource::with_records(0);
        let result = paginate_source(&source, &options(10, 1, 2))
            .await
            .expect("pagination should succeed");

        assert!(result.items.is_empty());
        assert_eq!(result.pagination.items_count, 0);
        assert_eq!(result.pagination.current_page, 1);
        assert_eq!(result.pagination.total_pages, 0);
        assert!(result.pagination.previous_pages.is_empty());
        assert!(result.pagination.next_pages.is_empty());
    }

    #[tokio::test]
    async fn test_page_past_the_end_returns_last_page() {
        let source = FakeSource::with_records(25);
        let result = paginate_source(&source, &options(10, 99, 1))
            .await
            .expect("pagination should succeed");

        assert_eq!(result.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(result.pagination.items_count, 5);
        assert_eq!(result.pagination.current_page, 3);
        assert_eq!(result.pagination.previous_pages, vec![2]);
        assert!(result.pagination.next_pages.is_empty());
    }

    #[tokio::test]
    async fn test_page_zero_is_treated_as_first_page() {
        let source = FakeSource::with_records(30);
        let result = paginate_source(&source, &options(10, 0, 2))
            .await
            .expect("pagination should succeed");

        assert_eq!(result.pagination.current_page, 1);
        assert_eq!(result.items, (1..=10).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_short_final_page() {
        let source = FakeSource::with_records(12);
        let result = paginate_source(&source, &options(10, 2, 2))
            .await
            .expect("pagination should succeed");

        assert_eq!(result.items, vec![11, 12]);
        assert_eq!(result.pagination.items_count, 2);
        assert!(result.pagination.items_count as u64 <= 10);
    }

    #[tokio::test]
    async fn test_count_failure_propagates() {
        let source = FailingSource { fail_count: true };
        let error = paginate_source(&source, &options(10, 1, 2))
            .await
            .expect_err("count failure should surface");

        assert!(matches!(error, DogearError::Generic(message) if message == "count exploded"));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let source = FailingSource { fail_count: false };
        let error = paginate_source(&source, &options(10, 1, 2))
            .await
            .expect_err("fetch failure should surface");

        assert!(matches!(error, DogearError::Generic(message) if message == "fetch exploded"));
    }

    /// Two sources with the same record count must produce the same
    /// arithmetic, no matter how their fetches are implemented.
    #[tokio::test]
    async fn test_arithmetic_depends_only_on_the_count() {
        struct ReversedSource {
            records: Vec<u64>,
        }

        #[async_trait]
        impl PageSource for ReversedSource {
            type Item = u64;

            async fn count(&self) -> DogearResult<u64> {
                Ok(self.records.len() as u64)
            }

            async fn fetch(&self, skip: u64, limit: u64) -> DogearResult<Vec<u64>> {
                let mut reversed: Vec<u64> = self.records.iter().rev().copied().collect();
                let start = (skip as usize).min(reversed.len());
                let end = (start + limit as usize).min(reversed.len());
                reversed.truncate(end);
                Ok(reversed.split_off(start))
            }
        }

        let opts = options(10, 3, 2);
        let plain = paginate_source(&FakeSource::with_records(95), &opts)
            .await
            .expect("pagination should succeed");
        let staged = paginate_source(
            &ReversedSource {
                records: (1..=95).collect(),
            },
            &opts,
        )
        .await
        .expect("pagination should succeed");

        assert_eq!(plain.pagination, staged.pagination);
        assert_ne!(plain.items, staged.items);
    }
}
