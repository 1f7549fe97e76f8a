use crate::options::PaginateOptions;
use crate::source::PageSource;
use crate::DogearResult;
use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures_util::TryStreamExt;
use mongodb::Database;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Aggregation-variant page source.
///
/// The caller's transformation stages run unmodified; counting appends a
/// `$count` stage to a copy of the pipeline, and fetching appends
/// `$skip`/`$limit` plus a trailing `$sort` when the caller explicitly
/// requested one. The `createdAt` default sort never applies here: the
/// pipeline's own stages define the order of its output.
pub struct PipelineSource<'a, T> {
    db: &'a Database,
    collection_name: String,
    stages: Vec<Document>,
    sort: Option<Document>,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T> PipelineSource<'a, T> {
    pub fn new(
        db: &'a Database,
        collection_name: impl Into<String>,
        stages: Vec<Document>,
        options: &PaginateOptions,
    ) -> Self {
        Self {
            db,
            collection_name: collection_name.into(),
            stages,
            sort: options.pipeline_sort().cloned(),
            _record: PhantomData,
        }
    }
}

fn count_stages(stages: &[Document]) -> Vec<Document> {
    let mut counted = stages.to_vec();
    counted.push(doc! { "$count": "total" });
    counted
}

fn page_stages(stages: &[Document], sort: Option<&Document>, skip: u64, limit: u64) -> Vec<Document> {
    let mut paged = stages.to_vec();
    paged.push(doc! { "$skip": skip as i64 });
    paged.push(doc! { "$limit": limit as i64 });

    if let Some(sort) = sort {
        paged.push(doc! { "$sort": sort.clone() });
    }

    paged
}

/// Reads the `total` field produced by a `$count` stage. A pipeline that
/// matches nothing yields no documents at all, which means zero.
fn total_from_count(documents: &[Document]) -> u64 {
    let Some(total) = documents.first().and_then(|document| document.get("total")) else {
        return 0;
    };

    match total {
        Bson::Int32(count) => (*count).max(0) as u64,
        Bson::Int64(count) => (*count).max(0) as u64,
        _ => 0,
    }
}

#[async_trait]
impl<'a, T> PageSource for PipelineSource<'a, T>
where
    T: DeserializeOwned + Send + Sync,
{
    type Item = T;

    async fn count(&self) -> DogearResult<u64> {
        let documents: Vec<Document> = self
            .db
            .collection::<Document>(&self.collection_name)
            .aggregate(count_stages(&self.stages))
            .await?
            .try_collect()
            .await?;

        Ok(total_from_count(&documents))
    }

    async fn fetch(&self, skip: u64, limit: u64) -> DogearResult<Vec<T>> {
        let documents: Vec<Document> = self
            .db
            .collection::<Document>(&self.collection_name)
            .aggregate(page_stages(&self.stages, self.sort.as_ref(), skip, limit))
            .await?
            .try_collect()
            .await?;

        documents
            .into_iter()
            .map(|document| bson::from_document(document).map_err(Into::into))
            .collect()
    }
}
