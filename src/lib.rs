mod error;
mod options;
mod page;
mod paginate;
mod source;

pub use error::{DogearError, DogearResult};
pub use options::{Lookup, PaginateOptions, PaginateOptionsBuilder};
pub use page::{Paginated, Pagination};
pub use paginate::{paginate, paginate_pipeline, paginate_source};
pub use source::{CollectionSource, PageSource, PipelineSource};
