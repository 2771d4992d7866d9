pub mod collector;
pub mod models;
pub mod normalizer;
pub mod resolver;
pub mod r#trait;

pub use collector::PaginatedCollector;
pub use models::{
    CollectionPage, CollectionScope, DirectoryCandidate, PageRequest, RecordKind, RecordShape,
};
pub use normalizer::{normalize, normalize_all};
pub use r#trait::DirectoryApi;
pub use resolver::{FuzzyResolver, ResolutionResult};
