//! The catalog API client, re-exported so consumers of the SDK don't need to
//! depend on `heap-catalog` directly.

pub use heap_catalog::*;
