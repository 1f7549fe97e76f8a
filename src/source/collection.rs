use crate::options::{Lookup, PaginateOptions};
use crate::source::PageSource;
use crate::DogearResult;
use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::{options::FindOptions, Database};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Query-variant page source backed by a single collection.
///
/// Counts with `count_documents` and fetches with `find`, applying the
/// sort, skip, limit, and projection from the pagination options. When
/// reference expansions are requested the fetch runs as an aggregation
/// instead, since `$lookup` is only available through the pipeline API.
pub struct CollectionSource<'a, T> {
    db: &'a Database,
    collection_name: String,
    filter: Document,
    sort: Option<Document>,
    projection: Option<Document>,
    lookups: Vec<Lookup>,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T> CollectionSource<'a, T> {
    pub fn new(
        db: &'a Database,
        collection_name: impl Into<String>,
        filter: Document,
        options: &PaginateOptions,
    ) -> Self {
        Self {
            db,
            collection_name: collection_name.into(),
            filter,
            sort: options.sort.clone(),
            projection: options.projection.clone(),
            lookups: options.lookups.clone(),
            _record: PhantomData,
        }
    }

    fn page_find_options(&self, skip: u64, limit: u64) -> FindOptions {
        let mut find_options = FindOptions::default();
        find_options.sort = self.sort.clone();
        find_options.skip = Some(skip);
        find_options.limit = Some(limit as i64);
        find_options.projection = self.projection.clone();
        find_options
    }
}

/// Pipeline used when expansions are present. The page slice is selected
/// before the lookups run, so joins only touch the documents that will
/// be returned.
fn expansion_stages(
    filter: &Document,
    sort: Option<&Document>,
    projection: Option<&Document>,
    lookups: &[Lookup],
    skip: u64,
    limit: u64,
) -> Vec<Document> {
    let mut stages = vec![doc! { "$match": filter.clone() }];

    if let Some(sort) = sort {
        stages.push(doc! { "$sort": sort.clone() });
    }

    stages.push(doc! { "$skip": skip as i64 });
    stages.push(doc! { "$limit": limit as i64 });

    if let Some(projection) = projection {
        stages.push(doc! { "$project": projection.clone() });
    }

    stages.extend(lookups.iter().map(Lookup::to_stage));
    stages
}

#[async_trait]
impl<'a, T> PageSource for CollectionSource<'a, T>
where
    T: DeserializeOwned + Send + Sync + Unpin,
{
    type Item = T;

    async fn count(&self) -> DogearResult<u64> {
        let total_items = self
            .db
            .collection::<Document>(&self.collection_name)
            .count_documents(self.filter.clone())
            .await?;
        Ok(total_items)
    }

    async fn fetch(&self, skip: u64, limit: u64) -> DogearResult<Vec<T>> {
        if self.lookups.is_empty() {
            let items = self
                .db
                .collection::<T>(&self.collection_name)
                .find(self.filter.clone())
                .with_options(self.page_find_options(skip, limit))
                .await?
                .try_collect()
                .await?;
            return Ok(items);
        }

        let stages = expansion_stages(
            &self.filter,
            self.sort.as_ref(),
            self.projection.as_ref(),
            &self.lookups,
            skip,
            limit,
        );

        let documents: Vec<Document> = self
            .db
            .collection::<Document>(&self.collection_name)
            .aggregate(stages)
            .await?
            .try_collect()
            .await?;

        documents
            .into_iter()
            .map(|document| bson::from_document(document).map_err(Into::into))
            .collect()
    }
}
