mod retrieval;

pub use retrieval::{RetrievalArgs, RetrievalTool, RetrievalToolError};
