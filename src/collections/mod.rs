//! Collections built on chunked, contiguous-storage layouts.

pub mod chunked_vec;

pub use chunked_vec::{ChunkedVec, ChunkedVecError, Iter, ListIter, SubView};


