pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod tokenizer;

pub use builder::{build, BuildStats};
pub use config::{GeneratorConfig, IndexConfig, IndexFormat, ScoreWeights, SearchConfig};
pub use document::{index_document, PartialIndex};
pub use error::{IndexError, Result};
pub use index::{Document, InvertedIndex, Posting, RankOrder, RANK_ORDER};
pub use query::{search, Hit, Searcher, TERM_DELIMITER};
pub use tokenizer::ngrams;
