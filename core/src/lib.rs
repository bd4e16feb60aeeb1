pub mod build;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod runner;
pub mod store;
pub mod tokenizer;
pub mod trec;

pub use error::{IndexError, QueryFileError, RunError};
pub use index::{DocId, DocMeta, Index, InvertedIndex, Posting, RankedResult, TermId};
pub use query::{Query, QueryId};
pub use runner::{ErrorPolicy, QueryRunner, RunOutcome, TimingSample};
pub use store::ResultStore;
