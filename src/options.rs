use bson::{doc, Document};

/// A reference expansion resolved through a `$lookup` stage.
///
/// Joins documents from the `from` collection into each result under
/// `as_field`, matching `local_field` against `foreign_field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    pub as_field: String,
}

impl Lookup {
    pub fn new(
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
        }
    }

    pub(crate) fn to_stage(&self) -> Document {
        doc! {
            "$lookup": {
                "from": self.from.clone(),
                "localField": self.local_field.clone(),
                "foreignField": self.foreign_field.clone(),
                "as": self.as_field.clone(),
            }
        }
    }
}

/// Options controlling a single pagination call.
///
/// Every field has a default, so `PaginateOptions::default()` is a valid
/// "first page of fifteen, newest first" request. `limit` and
/// `page_number` are coerced to at least 1 when the call runs.
#[derive(Debug, Clone)]
pub struct PaginateOptions {
    /// Maximum number of items per page.
    pub limit: u64,

    /// The requested page, clamped to the valid page span per call.
    pub page_number: u64,

    /// Sort document applied to the fetch, e.g. `doc! { "createdAt": -1 }`.
    pub sort: Option<Document>,

    /// Field projection applied to the fetch.
    pub projection: Option<Document>,

    /// Reference expansions applied after the page slice is selected.
    pub lookups: Vec<Lookup>,

    /// How many neighboring page numbers to surface on each side.
    pub page_range: u64,

    // Whether `sort` is the untouched `createdAt` default. The default
    // belongs to the query variant only; pipelines get a trailing sort
    // solely when the caller asked for one.
    pub(crate) sort_is_default: bool,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            limit: 15,
            page_number: 1,
            sort: Some(doc! { "createdAt": -1 }),
            projection: None,
            lookups: Vec::new(),
            page_range: 3,
            sort_is_default: true,
        }
    }
}

impl PaginateOptions {
    pub fn builder() -> PaginateOptionsBuilder {
        PaginateOptionsBuilder::new()
    }

    /// Sort to apply to an aggregation pipeline. Only explicitly
    /// requested sorts qualify; the caller's stages already define an
    /// order, so the `createdAt` default must not reshuffle them.
    pub(crate) fn pipeline_sort(&self) -> Option<&Document> {
        if self.sort_is_default {
            None
        } else {
            self.sort.as_ref()
        }
    }
}

#[derive(Debug, Default)]
pub struct PaginateOptionsBuilder {
    limit: Option<u64>,
    page_number: Option<u64>,
    sort: Option<Document>,
    sort_set: bool,
    projection: Option<Document>,
    lookups: Vec<Lookup>,
    page_range: Option<u64>,
}

impl PaginateOptionsBuilder {
    pub fn new() -> PaginateOptionsBuilder {
        PaginateOptionsBuilder::default()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn page_number(mut self, page_number: u64) -> Self {
        self.page_number = Some(page_number);
        self
    }

    /// Overrides the default `{ createdAt: -1 }` sort. Passing `None`
    /// disables sorting entirely.
    pub fn sort(mut self, sort: impl Into<Option<Document>>) -> Self {
        self.sort = sort.into();
        self.sort_set = true;
        self
    }

    pub fn projection(mut self, projection: impl Into<Option<Document>>) -> Self {
        self.projection = projection.into();
        self
    }

    pub fn lookup(mut self, lookup: Lookup) -> Self {
        self.lookups.push(lookup);
        self
    }

    pub fn page_range(mut self, page_range: u64) -> Self {
        self.page_range = Some(page_range);
        self
    }

    pub fn build(self) -> PaginateOptions {
        let defaults = PaginateOptions::default();

        PaginateOptions {
            limit: self.limit.unwrap_or(defaults.limit),
            page_number: self.page_number.unwrap_or(defaults.page_number),
            sort: if self.sort_set { self.sort } else { defaults.sort },
            projection: self.projection,
            lookups: self.lookups,
            page_range: self.page_range.unwrap_or(defaults.page_range),
            sort_is_default: !self.sort_set,
        }
    }
}
