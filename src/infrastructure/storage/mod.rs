mod files;

pub use files::FileStorage;
