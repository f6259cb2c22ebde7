mod in_memory;
mod qdrant;

pub use in_memory::InMemoryCollectionStore;
pub use qdrant::QdrantCollectionStore;
