//! # `chunked_seq` — a chunked, indexed sequence container
//!
//! A random-access growable sequence whose elements live across a
//! dynamically managed set of contiguous chunks rather than one contiguous
//! buffer. Compared to a single growable array, this trades a small amount
//! of indexing overhead (a hint/fast-map/binary-search lookup) for cheaper
//! insert/remove near arbitrary positions: instead of shifting the whole
//! sequence, a chunk grows in place until it is both oversized and densely
//! used, then splits in two.
//!
//! ## Key properties
//!
//! - Amortized O(1) append, near-O(1) indexed access
//! - Insert/remove cost bounded by the chunk they land in, not the whole
//!   sequence, once steady-state chunk sizing is reached
//! - Fail-fast iteration: structural mutation invalidates outstanding
//!   iterators (enforced by the borrow checker for the simple case, and by
//!   an explicit `mod_count` check for the mutating cursor type)
//!
//! ## Example
//!
//! ```rust
//! use chunked_seq::ChunkedVec;
//!
//! let mut seq = ChunkedVec::new();
//! for i in 0..1000 {
//!     seq.append(i);
//! }
//! seq.insert(500, -1).unwrap();
//! assert_eq!(*seq.get(500).unwrap(), -1);
//! assert_eq!(seq.size(), 1001);
//! ```

#![warn(missing_docs, clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod collections;

pub use collections::{ChunkedVec, ChunkedVecError, Iter, ListIter, SubView};
