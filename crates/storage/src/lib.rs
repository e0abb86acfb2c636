#![forbid(unsafe_code)]

pub mod builtin;
pub mod json;
pub mod records;
pub mod repository;

pub use builtin::BuiltinSentenceCorpus;
pub use json::{JsonFileCorpus, parse_corpus};
pub use records::{ItemRecord, RecordError};
pub use repository::{CorpusRepository, InMemoryCorpus, StorageError};
