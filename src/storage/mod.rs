mod cache;

pub use cache::*;
