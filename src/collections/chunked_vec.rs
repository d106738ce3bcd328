//! `ChunkedVec`, a random-access growable sequence stored in a dynamically
//! managed set of contiguous chunks rather than one contiguous buffer.
//!
//! Goals:
//! - amortized O(1) append, near-O(1) indexed access via a sparse fast-map
//! - bounded per-operation cost for insert/remove at arbitrary positions,
//!   by growing a chunk in place until it is both oversized and densely
//!   used, then splitting it, instead of shifting the whole sequence
//! - predictable steady-state chunk count (~`size / BASE_CHUNK`) via a
//!   normalize policy that replaces oversized, sparsely used chunks
//!
//! Unlike `ChunkedVec<T, const CHUNK: usize>` elsewhere in this crate family
//! (a fixed chunk size with append-only growth), this container needs
//! per-chunk capacities that change at runtime: chunks grow, split, and get
//! replaced by a fresh standard-sized chunk (normalize), so chunk capacity
//! is a runtime property of each chunk, not a const generic.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

/// Standard chunk capacity used whenever a fresh chunk is allocated.
pub const BASE_CHUNK: usize = 4096;
/// Capacity at which a densely used chunk becomes eligible to split.
pub const SPLIT_THRESHOLD: usize = 8192;
/// Logical-index stride of the fast-map.
pub const STEP: usize = 1024;
/// Capacity hint used by `ChunkedVec::new()`.
pub const DEFAULT_CAPACITY: usize = 10;

/// Errors produced by fallible `ChunkedVec` operations.
///
/// Covers a caller mistake (`IndexOutOfBounds`, `IllegalArgument`), an
/// iterator/cursor protocol violation (`NoSuchElement`, `IllegalState`), a
/// callback observed to have mutated the sequence underneath a snapshot
/// (`StructuralConflict`), or a broken invariant (`InternalInconsistency`,
/// a bug indicator rather than a recoverable condition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkedVecError {
    /// `index` was outside `[0, len)` (or `[0, len]` for insertion points).
    IndexOutOfBounds {
        /// The index that was supplied.
        index: usize,
        /// The bound it was checked against.
        len: usize,
    },
    /// A supplied argument was invalid independent of the sequence's length
    /// (e.g. a sub-view with `from > to`).
    IllegalArgument(&'static str),
    /// A callback-driven operation observed that the sequence was
    /// structurally mutated since it took its snapshot.
    StructuralConflict,
    /// An iterator was advanced past its end.
    NoSuchElement,
    /// A cursor operation (`remove`/`set`) was attempted without a
    /// preceding `next`/`previous`.
    IllegalState(&'static str),
    /// An invariant from the data model was violated; indicates a defect
    /// rather than a recoverable user error.
    InternalInconsistency(&'static str),
}

impl fmt::Display for ChunkedVecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::IllegalArgument(msg) => write!(f, "illegal argument: {msg}"),
            Self::StructuralConflict => {
                write!(f, "sequence was structurally modified during the operation")
            }
            Self::NoSuchElement => write!(f, "no more elements"),
            Self::IllegalState(msg) => write!(f, "illegal iterator state: {msg}"),
            Self::InternalInconsistency(msg) => {
                write!(f, "internal consistency violation: {msg}")
            }
        }
    }
}

impl std::error::Error for ChunkedVecError {}

/// A single chunk: an owning, contiguously stored prefix of elements.
///
/// Backed by `Vec<T>` rather than a hand-rolled `MaybeUninit` buffer: chunk
/// capacity maps onto `Vec::capacity`, `grow` onto `Vec::reserve_exact`, and
/// split/normalize onto `Vec::drain`, which gives the shifting and move-out
/// behavior the mutator needs for free and without unsafe bookkeeping.
struct Chunk<T> {
    data: Vec<T>,
}

impl<T> Chunk<T> {
    fn new(capacity_hint: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity_hint.max(1)),
        }
    }

    #[inline(always)]
    fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[inline(always)]
    fn used(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    fn has_space(&self) -> bool {
        self.data.len() < self.data.capacity()
    }

    /// Increases capacity by at least `delta`, preserving existing elements.
    fn grow(&mut self, delta: usize) {
        self.data.reserve_exact(delta.max(1));
    }

    /// Ensures capacity is at least `target`, preserving existing elements.
    ///
    /// `Vec::reserve_exact` sizes its `additional` argument relative to
    /// `len`, not the current capacity, so this converts the target
    /// capacity into the right `additional` value rather than calling
    /// `grow` with a raw delta against capacity.
    fn grow_to(&mut self, target: usize) {
        if target > self.data.capacity() {
            self.data.reserve_exact(target - self.data.len());
        }
    }

    /// Pushes `value` into the next free slot.
    ///
    /// # Panics (debug only)
    /// Debug-asserts that the chunk has spare capacity; the caller is
    /// expected to have grown the chunk first.
    fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.has_space());
        self.data.push(value);
    }

    /// # Safety
    /// `index` must be `< used()`.
    #[inline(always)]
    unsafe fn get_unchecked(&self, index: usize) -> &T {
        self.data.get_unchecked(index)
    }

    /// # Safety
    /// `index` must be `< used()`.
    #[inline(always)]
    unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        self.data.get_unchecked_mut(index)
    }

    fn replace(&mut self, index: usize, value: T) -> T {
        std::mem::replace(&mut self.data[index], value)
    }

    fn insert_at(&mut self, offset: usize, value: T) {
        self.data.insert(offset, value);
    }

    fn remove_at(&mut self, offset: usize) -> T {
        self.data.remove(offset)
    }

    fn as_slice(&self) -> &[T] {
        &self.data
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Moves elements `[at, used)` into a fresh chunk, leaving `[0, at)` here.
    fn split_tail(&mut self, at: usize, new_capacity: usize) -> Chunk<T> {
        let mut new_data = Vec::with_capacity(new_capacity.max(self.data.len() - at));
        new_data.extend(self.data.drain(at..));
        Chunk { data: new_data }
    }

    /// Moves all elements into a fresh, standard-sized chunk.
    fn renormalized(&mut self, new_capacity: usize) -> Chunk<T> {
        let mut new_data = Vec::with_capacity(new_capacity.max(self.data.len()));
        new_data.extend(self.data.drain(..));
        Chunk { data: new_data }
    }

    fn drain_all(&mut self) -> std::vec::Drain<'_, T> {
        self.data.drain(..)
    }
}

/// A chunked, random-access growable sequence.
///
/// Elements live in a dynamically managed set of chunks. A chunk table
/// tracks, per chunk, the logical index of its first element
/// (`chunk_start`) and its capacity (`chunk_cap`); a sparse fast-map gives
/// near-O(1) logical-index lookup without storing one entry per element.
/// See the module invariants enforced by `locate`/`recompute_starts_from`.
pub struct ChunkedVec<T> {
    chunks: Vec<Chunk<T>>,
    chunk_start: Vec<usize>,
    chunk_cap: Vec<usize>,
    fast_map: Vec<usize>,
    size: usize,
    mod_count: u64,
    last_chunk_hint: Cell<Option<usize>>,
    last_start_hint: Cell<usize>,
    capacity_hint: usize,
    base_chunk: usize,
    split_threshold: usize,
    step: usize,
}

impl<T> ChunkedVec<T> {
    /// Creates an empty sequence with the default capacity hint.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty sequence whose first chunk is sized from `initial_capacity_hint`.
    ///
    /// `initial_capacity_hint` only influences the very first chunk
    /// (`Chunk::new` takes `max(hint, BASE_CHUNK)`); every chunk allocated
    /// afterward uses `BASE_CHUNK`. `initial_capacity_hint` is a `usize`, so
    /// there is no negative-capacity case to reject.
    pub fn with_capacity(initial_capacity_hint: usize) -> Self {
        Self::with_tuning(initial_capacity_hint, BASE_CHUNK, SPLIT_THRESHOLD, STEP)
    }

    /// Creates an empty sequence with non-default tuning constants.
    ///
    /// Exists so tests (and callers with unusual workloads) can exercise
    /// split/normalize/fast-map behavior without waiting for `BASE_CHUNK`
    /// (4096) elements.
    pub fn with_tuning(
        initial_capacity_hint: usize,
        base_chunk: usize,
        split_threshold: usize,
        step: usize,
    ) -> Self {
        Self {
            chunks: Vec::new(),
            chunk_start: Vec::new(),
            chunk_cap: Vec::new(),
            fast_map: Vec::new(),
            size: 0,
            mod_count: 0,
            last_chunk_hint: Cell::new(None),
            last_start_hint: Cell::new(0),
            capacity_hint: initial_capacity_hint.max(1),
            base_chunk: base_chunk.max(1),
            split_threshold: split_threshold.max(base_chunk.max(1)),
            step: step.max(1),
        }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alias for [`Self::size`], matching the `len`/`is_empty` convention
    /// used throughout this crate's other collections.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if there are no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of chunks currently allocated.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns total capacity across allocated chunks.
    pub fn capacity(&self) -> usize {
        self.chunks.iter().map(Chunk::capacity).sum()
    }

    fn update_hint(&self, chunk_id: usize) {
        self.last_chunk_hint.set(Some(chunk_id));
        self.last_start_hint.set(self.chunk_start[chunk_id]);
    }

    /// Resolves a logical index in `[0, size)` to `(chunk_id, offset)`.
    fn locate(&self, index: usize) -> Result<(usize, usize), ChunkedVecError> {
        if index >= self.size {
            return Err(ChunkedVecError::IndexOutOfBounds {
                index,
                len: self.size,
            });
        }

        // 1. Hint path: current chunk, then the next one (sequential access).
        if let Some(h) = self.last_chunk_hint.get() {
            if h < self.chunks.len() {
                let start = self.last_start_hint.get();
                let used = self.chunks[h].used();
                if index >= start && index < start + used {
                    return Ok((h, index - start));
                }
                if h + 1 < self.chunks.len() {
                    let next_start = start + used;
                    let next_used = self.chunks[h + 1].used();
                    if index >= next_start && index < next_start + next_used {
                        return Ok((h + 1, index - next_start));
                    }
                }
            }
        }

        // 2. Fast-map path.
        let k = index / self.step;
        if k < self.fast_map.len() {
            let mut c = self.fast_map[k].min(self.chunks.len().saturating_sub(1));
            while c > 0 && self.chunk_start[c] > index {
                c -= 1;
            }
            while c + 1 < self.chunks.len() && self.chunk_start[c + 1] <= index {
                c += 1;
            }
            return self.finish_locate(c, index);
        }

        // 3. Fallback: binary search the chunk starts.
        let c = match self.chunk_start.binary_search(&index) {
            Ok(exact) => exact,
            Err(insert_at) => insert_at.saturating_sub(1),
        };
        self.finish_locate(c, index)
    }

    fn finish_locate(&self, c: usize, index: usize) -> Result<(usize, usize), ChunkedVecError> {
        if c >= self.chunks.len() {
            return Err(ChunkedVecError::InternalInconsistency(
                "locator produced an out-of-range chunk id",
            ));
        }
        self.update_hint(c);
        Ok((c, index - self.chunk_start[c]))
    }

    /// Recomputes `chunk_start`/`chunk_cap` from chunk `c0` onward, then
    /// repairs the fast-map.
    fn recompute_starts_from(&mut self, c0: usize) {
        let mut start = if c0 == 0 {
            0
        } else {
            self.chunk_start[c0 - 1] + self.chunks[c0 - 1].used()
        };
        for c in c0..self.chunks.len() {
            self.chunk_start[c] = start;
            self.chunk_cap[c] = self.chunks[c].capacity();
            start += self.chunks[c].used();
        }
        self.repair_fast_map();
    }

    /// Rebuilds the fast-map so that `fast_map[k]` is the chunk containing
    /// `k * STEP` for every `k < ceil(size / STEP)`.
    ///
    /// Always a full, from-scratch rebuild rather than an incremental
    /// repair from a given chunk onward. `size` is typically small relative
    /// to `chunk_count * STEP`, so the rebuild costs
    /// `O(chunk_count + fast_map.len())` and stays correct by inspection.
    fn repair_fast_map(&mut self) {
        if self.size == 0 {
            self.fast_map.clear();
            return;
        }
        let needed = (self.size + self.step - 1) / self.step;
        if self.fast_map.len() < needed {
            let new_len = needed.max(self.fast_map.len() * 2).max(needed);
            self.fast_map.resize(new_len, 0);
        }
        let mut c = 0usize;
        for k in 0..needed {
            let target = k * self.step;
            while c + 1 < self.chunks.len() && self.chunk_start[c + 1] <= target {
                c += 1;
            }
            self.fast_map[k] = c;
        }
    }

    fn insert_chunk_at(&mut self, c: usize, chunk: Chunk<T>) {
        self.chunks.insert(c, chunk);
        self.chunk_start.insert(c, 0);
        self.chunk_cap.insert(c, 0);
        self.recompute_starts_from(c);
    }

    fn remove_chunk_at(&mut self, c: usize) {
        self.chunks.remove(c);
        self.chunk_start.remove(c);
        self.chunk_cap.remove(c);
        if c < self.chunks.len() {
            self.recompute_starts_from(c);
        } else if c > 0 {
            self.recompute_starts_from(c - 1);
        } else {
            self.fast_map.clear();
        }
    }

    /// Splits an oversized, densely used chunk in two.
    ///
    /// Precondition (checked by the caller, `insert`): `chunk[c].capacity()
    /// >= split_threshold && chunk[c].used() >= base_chunk`.
    fn split(&mut self, c: usize) {
        let used = self.chunks[c].used();
        let half = used / 2;
        let mut new_chunk = self.chunks[c].split_tail(half, self.base_chunk);
        if self.chunks[c].capacity() > self.base_chunk + self.base_chunk / 2 {
            let fresh = self.chunks[c].renormalized(self.base_chunk);
            self.chunks[c] = fresh;
        }
        // new_chunk itself may also be oversized relative to base_chunk if
        // split_tail had to allocate more than base_chunk (used - half > base_chunk
        // cannot happen given the precondition, but keep behavior symmetric).
        if new_chunk.capacity() > self.base_chunk + self.base_chunk / 2 {
            new_chunk = new_chunk.renormalized(self.base_chunk);
        }
        self.chunk_cap[c] = self.chunks[c].capacity();
        self.insert_chunk_at(c + 1, new_chunk);
        #[cfg(feature = "tracing")]
        tracing::debug!(chunk = c, new_used = used - half, "split chunk");
    }

    /// Replaces an oversized, sparsely used chunk with a standard-sized one.
    fn normalize(&mut self, c: usize) {
        let fresh = self.chunks[c].renormalized(self.base_chunk);
        self.chunks[c] = fresh;
        self.chunk_cap[c] = self.chunks[c].capacity();
        #[cfg(feature = "tracing")]
        tracing::trace!(chunk = c, "normalized chunk");
    }

    /// Structural append without bumping `mod_count`; shared by `append`
    /// and the bulk rebuild used by `remove_if`.
    fn push_element(&mut self, value: T) {
        if self.chunks.is_empty() {
            let chunk = Chunk::new(self.capacity_hint.max(self.base_chunk));
            self.chunks.push(chunk);
            self.chunk_start.push(0);
            self.chunk_cap.push(self.chunks[0].capacity());
        }
        let last = self.chunks.len() - 1;
        if !self.chunks[last].has_space() {
            let chunk = Chunk::new(self.base_chunk);
            self.chunks.push(chunk);
            self.chunk_start.push(0);
            let new_idx = self.chunks.len() - 1;
            self.chunk_cap.push(self.chunks[new_idx].capacity());
            self.chunks[new_idx].push_unchecked(value);
            self.size += 1;
            self.recompute_starts_from(new_idx);
            #[cfg(feature = "tracing")]
            tracing::trace!(chunk = new_idx, "allocated chunk on append overflow");
            return;
        }
        self.chunks[last].push_unchecked(value);
        self.size += 1;
    }

    /// Appends `value` to the end. Amortized O(1).
    pub fn append(&mut self, value: T) {
        self.push_element(value);
        self.mod_count += 1;
    }

    /// Inserts `value` at logical index `i`, shifting successors right.
    ///
    /// `i == size` is equivalent to `append`.
    pub fn insert(&mut self, i: usize, value: T) -> Result<(), ChunkedVecError> {
        if i > self.size {
            return Err(ChunkedVecError::IndexOutOfBounds {
                index: i,
                len: self.size,
            });
        }
        if i == self.size {
            self.append(value);
            return Ok(());
        }

        let (mut c, mut off) = self.locate(i)?;
        if off == self.chunks[c].used() && c + 1 < self.chunks.len() {
            c += 1;
            off = 0;
        }

        if !self.chunks[c].has_space() {
            let grow_by = (self.base_chunk / 4).max(1);
            self.chunks[c].grow(grow_by);
            self.chunk_cap[c] = self.chunks[c].capacity();
            if self.chunks[c].capacity() >= self.split_threshold
                && self.chunks[c].used() >= self.base_chunk
            {
                self.split(c);
                let (nc, noff) = self.locate(i)?;
                c = nc;
                off = noff;
            }
        }

        self.chunks[c].insert_at(off, value);
        self.size += 1;
        self.mod_count += 1;
        self.recompute_starts_from(c);
        Ok(())
    }

    /// Removes and returns the element at logical index `i`.
    pub fn remove(&mut self, i: usize) -> Result<T, ChunkedVecError> {
        let (c, off) = self.locate(i)?;
        let value = self.chunks[c].remove_at(off);
        self.size -= 1;
        self.mod_count += 1;

        if self.chunks[c].used() == 0 && self.chunks.len() > 1 {
            self.remove_chunk_at(c);
        } else {
            let base = self.base_chunk;
            let sparse = self.chunks[c].used() < self.chunks[c].capacity() / 4;
            let oversized = self.chunks[c].capacity() > base;
            if sparse && oversized && self.chunks.len() > 1 {
                self.normalize(c);
            }
            self.recompute_starts_from(c);
        }
        Ok(value)
    }

    /// Returns a reference to the element at `i`.
    pub fn get(&self, i: usize) -> Result<&T, ChunkedVecError> {
        let (c, off) = self.locate(i)?;
        // SAFETY: `locate` only returns offsets `< chunk[c].used()`.
        Ok(unsafe { self.chunks[c].get_unchecked(off) })
    }

    /// Replaces the element at `i`, returning the previous value.
    ///
    /// Does not bump `mod_count`: this changes an element's value, not the
    /// sequence's shape.
    pub fn set(&mut self, i: usize, value: T) -> Result<T, ChunkedVecError> {
        let (c, off) = self.locate(i)?;
        Ok(self.chunks[c].replace(off, value))
    }

    /// Removes every element, releasing all chunks.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.chunk_start.clear();
        self.chunk_cap.clear();
        self.fast_map.clear();
        self.size = 0;
        self.mod_count += 1;
        self.last_chunk_hint.set(None);
        self.last_start_hint.set(0);
    }

    /// Ensures total capacity across chunks is at least `n`.
    ///
    /// Grows the tail chunk in place rather than allocating additional
    /// fixed-size chunks, so every reserved slot is space `append` can
    /// actually fill; allocating several chunks up front would leave every
    /// chunk but the last permanently empty until enough appends land on it
    /// specifically.
    pub fn reserve_capacity(&mut self, n: usize) {
        if self.capacity() >= n {
            return;
        }
        if self.chunks.is_empty() {
            let chunk = Chunk::new(self.capacity_hint.max(self.base_chunk));
            self.chunks.push(chunk);
            self.chunk_start.push(0);
            self.chunk_cap.push(0);
        }
        let last = self.chunks.len() - 1;
        let other_capacity: usize = self.chunks[..last].iter().map(Chunk::capacity).sum();
        let target_last_capacity = n.saturating_sub(other_capacity);
        self.chunks[last].grow_to(target_last_capacity);
        self.recompute_starts_from(0);
    }

    /// Calls `f` with every element in order.
    pub fn for_each<F: FnMut(&T)>(&self, mut f: F) {
        for chunk in &self.chunks {
            for value in chunk.as_slice() {
                f(value);
            }
        }
    }

    /// Overwrites every element with `f(&element)`.
    ///
    /// Bumps `mod_count` once for the wholesale content change, so an
    /// outstanding cursor observes it even though no chunk is added,
    /// removed, or resized.
    pub fn replace_all<F: FnMut(&T) -> T>(&mut self, mut f: F) -> Result<(), ChunkedVecError> {
        let snapshot = self.mod_count;
        for chunk in &mut self.chunks {
            for slot in chunk.as_mut_slice() {
                *slot = f(slot);
            }
        }
        if self.mod_count != snapshot {
            return Err(ChunkedVecError::StructuralConflict);
        }
        self.mod_count += 1;
        Ok(())
    }

    /// Removes every element for which `predicate` returns `true`, keeping
    /// survivors in their original relative order. Returns the number
    /// removed.
    pub fn remove_if<P: FnMut(&T) -> bool>(
        &mut self,
        mut predicate: P,
    ) -> Result<usize, ChunkedVecError> {
        let snapshot = self.mod_count;
        let mut marks = Vec::with_capacity(self.size);
        for chunk in &self.chunks {
            for value in chunk.as_slice() {
                marks.push(predicate(value));
            }
        }
        if self.mod_count != snapshot {
            return Err(ChunkedVecError::StructuralConflict);
        }

        let mut survivors: Vec<T> = Vec::with_capacity(self.size);
        let mut marks_iter = marks.into_iter();
        for chunk in &mut self.chunks {
            for value in chunk.drain_all() {
                if marks_iter.next().unwrap_or(false) {
                    drop(value);
                } else {
                    survivors.push(value);
                }
            }
        }

        let removed = self.size - survivors.len();
        self.rebuild_from(survivors);
        if removed > 0 {
            self.mod_count += 1;
        }
        Ok(removed)
    }

    /// Clears the chunk table and re-appends `values`, letting the normal
    /// growth/split policy rebuild chunk boundaries from scratch.
    fn rebuild_from(&mut self, values: Vec<T>) {
        self.chunks.clear();
        self.chunk_start.clear();
        self.chunk_cap.clear();
        self.fast_map.clear();
        self.size = 0;
        self.last_chunk_hint.set(None);
        self.last_start_hint.set(0);
        for value in values {
            self.push_element(value);
        }
    }

    /// Sorts all elements with `cmp`, preserving chunk boundaries (each
    /// chunk keeps its original `used` count; this is a content change,
    /// not a structural one beyond the single `mod_count` bump).
    pub fn sort_by<F: FnMut(&T, &T) -> Ordering>(&mut self, mut cmp: F) {
        if self.size < 2 {
            return;
        }
        let used_counts: Vec<usize> = self.chunks.iter().map(Chunk::used).collect();
        let mut scratch: Vec<T> = Vec::with_capacity(self.size);
        for chunk in &mut self.chunks {
            scratch.extend(chunk.drain_all());
        }
        scratch.sort_by(&mut cmp);
        let mut iter = scratch.into_iter();
        for (chunk, count) in self.chunks.iter_mut().zip(used_counts) {
            chunk.data.extend((&mut iter).take(count));
        }
        self.mod_count += 1;
    }

    /// Returns a forward iterator over `&T`.
    ///
    /// `iter()` borrows `&self`, so the borrow checker statically forbids
    /// any call that would structurally mutate the sequence while it is
    /// alive. No runtime mod-count check is needed for this iterator.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            vec: self,
            index: 0,
        }
    }

    /// Returns a bidirectional cursor starting before logical index 0.
    pub fn list_iterator(&mut self) -> ListIter<'_, T> {
        self.list_iterator_at(0).expect("0 is always a valid cursor position")
    }

    /// Returns a bidirectional cursor starting before logical index `i`.
    pub fn list_iterator_at(&mut self, i: usize) -> Result<ListIter<'_, T>, ChunkedVecError> {
        if i > self.size {
            return Err(ChunkedVecError::IndexOutOfBounds {
                index: i,
                len: self.size,
            });
        }
        let mod_count = self.mod_count;
        Ok(ListIter {
            vec: self,
            cursor: i,
            last_returned: None,
            mod_count,
        })
    }

    /// Returns a mutable, positionally-scoped view over `[from, to)`.
    pub fn sub_view(&mut self, from: usize, to: usize) -> Result<SubView<'_, T>, ChunkedVecError> {
        if from > to || to > self.size {
            return Err(ChunkedVecError::IllegalArgument(
                "sub_view requires from <= to <= size",
            ));
        }
        Ok(SubView {
            parent: self,
            offset: from,
            size: to - from,
        })
    }
}

impl<T> Default for ChunkedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for ChunkedVec<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

impl<T> FromIterator<T> for ChunkedVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

impl<'a, T> IntoIterator for &'a ChunkedVec<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> std::ops::Index<usize> for ChunkedVec<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        self.get(i).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<T> std::ops::IndexMut<usize> for ChunkedVec<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        let (c, off) = self.locate(i).unwrap_or_else(|e| panic!("{e}"));
        // SAFETY: `locate` only returns offsets `< chunk[c].used()`.
        unsafe { self.chunks[c].get_unchecked_mut(off) }
    }
}

impl<T: fmt::Debug> fmt::Debug for ChunkedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone> Clone for ChunkedVec<T> {
    /// Deep-clones metadata and elements via `T: Clone`. Callers who want
    /// cheap, shared-reference clone semantics should use
    /// `ChunkedVec<Rc<T>>` (or `Arc<T>`), whose `Clone` is an O(1) refcount
    /// bump.
    fn clone(&self) -> Self {
        let mut out = Self::with_tuning(
            self.capacity_hint,
            self.base_chunk,
            self.split_threshold,
            self.step,
        );
        out.reserve_capacity(self.size);
        for value in self.iter() {
            out.append(value.clone());
        }
        out
    }
}

/// Forward iterator over `&T`.
pub struct Iter<'a, T> {
    vec: &'a ChunkedVec<T>,
    index: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.index >= self.vec.size {
            return None;
        }
        // SAFETY: `index < size`, and `get` never returns a dangling
        // reference for an in-range index.
        let item = self.vec.get(self.index).ok()?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vec.size.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
impl<'a, T> FusedIterator for Iter<'a, T> {}

/// A bidirectional, mutating cursor over a `ChunkedVec`.
///
/// Holds `&mut ChunkedVec<T>` exclusively: the borrow checker already
/// forbids any other path from structurally mutating the sequence while
/// this cursor is alive, so the `mod_count` check below only ever fires if
/// a future refactor reintroduces an aliasing path (e.g. interior
/// mutability). Kept as a real, cheap runtime check rather than removed.
pub struct ListIter<'a, T> {
    vec: &'a mut ChunkedVec<T>,
    cursor: usize,
    last_returned: Option<usize>,
    mod_count: u64,
}

impl<'a, T> ListIter<'a, T> {
    /// Index `next()` would return, if any.
    pub fn next_index(&self) -> usize {
        self.cursor
    }

    /// Index `previous()` would return, if any.
    pub fn previous_index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    /// `true` if `next()` would succeed.
    pub fn has_next(&self) -> bool {
        self.cursor < self.vec.size()
    }

    /// `true` if `previous()` would succeed.
    pub fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    fn check(&self) -> Result<(), ChunkedVecError> {
        if self.mod_count != self.vec.mod_count {
            return Err(ChunkedVecError::StructuralConflict);
        }
        Ok(())
    }

    /// Returns the next element and advances the cursor.
    pub fn next(&mut self) -> Result<&T, ChunkedVecError> {
        self.check()?;
        if self.cursor >= self.vec.size() {
            return Err(ChunkedVecError::NoSuchElement);
        }
        let idx = self.cursor;
        let item = self.vec.get(idx)?;
        self.cursor += 1;
        self.last_returned = Some(idx);
        Ok(item)
    }

    /// Returns the previous element and retreats the cursor.
    pub fn previous(&mut self) -> Result<&T, ChunkedVecError> {
        self.check()?;
        if self.cursor == 0 {
            return Err(ChunkedVecError::NoSuchElement);
        }
        self.cursor -= 1;
        let idx = self.cursor;
        let item = self.vec.get(idx)?;
        self.last_returned = Some(idx);
        Ok(item)
    }

    /// Removes the last element returned by `next`/`previous`.
    pub fn remove(&mut self) -> Result<T, ChunkedVecError> {
        self.check()?;
        let idx = self.last_returned.ok_or(ChunkedVecError::IllegalState(
            "remove called without a preceding next/previous",
        ))?;
        let value = self.vec.remove(idx)?;
        if idx < self.cursor {
            self.cursor -= 1;
        }
        self.last_returned = None;
        self.mod_count = self.vec.mod_count;
        Ok(value)
    }

    /// Overwrites the last element returned by `next`/`previous`.
    ///
    /// Does not rebind the `mod_count` snapshot: this is an element
    /// mutation, not a structural one.
    pub fn set(&mut self, value: T) -> Result<T, ChunkedVecError> {
        self.check()?;
        let idx = self.last_returned.ok_or(ChunkedVecError::IllegalState(
            "set called without a preceding next/previous",
        ))?;
        self.vec.set(idx, value)
    }

    /// Inserts `value` immediately before the next `next()` position.
    pub fn add(&mut self, value: T) -> Result<(), ChunkedVecError> {
        self.check()?;
        self.vec.insert(self.cursor, value)?;
        self.cursor += 1;
        self.last_returned = None;
        self.mod_count = self.vec.mod_count;
        Ok(())
    }
}

/// A mutable, positionally-scoped view over a contiguous range of a parent
/// `ChunkedVec`.
///
/// Holds `&mut ChunkedVec<T>`, so bypassing the sub-view to structurally
/// mutate the parent while it is alive is a compile error, not undefined
/// behavior.
pub struct SubView<'a, T> {
    parent: &'a mut ChunkedVec<T>,
    offset: usize,
    size: usize,
}

impl<'a, T> SubView<'a, T> {
    /// Number of elements visible through this view.
    pub fn len(&self) -> usize {
        self.size
    }

    /// `true` if the view is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn check(&self, i: usize, bound: usize) -> Result<(), ChunkedVecError> {
        if i >= bound {
            return Err(ChunkedVecError::IndexOutOfBounds { index: i, len: bound });
        }
        Ok(())
    }

    /// Returns a reference to the element at local index `i`.
    pub fn get(&self, i: usize) -> Result<&T, ChunkedVecError> {
        self.check(i, self.size)?;
        self.parent.get(self.offset + i)
    }

    /// Replaces the element at local index `i`.
    pub fn set(&mut self, i: usize, value: T) -> Result<T, ChunkedVecError> {
        self.check(i, self.size)?;
        self.parent.set(self.offset + i, value)
    }

    /// Inserts `value` at local index `i`, extending the view by one.
    pub fn insert(&mut self, i: usize, value: T) -> Result<(), ChunkedVecError> {
        self.check(i, self.size + 1)?;
        self.parent.insert(self.offset + i, value)?;
        self.size += 1;
        Ok(())
    }

    /// Removes the element at local index `i`, shrinking the view by one.
    pub fn remove(&mut self, i: usize) -> Result<T, ChunkedVecError> {
        self.check(i, self.size)?;
        let value = self.parent.remove(self.offset + i)?;
        self.size -= 1;
        Ok(value)
    }

    /// Appends `value` to the end of the view.
    pub fn append(&mut self, value: T) -> Result<(), ChunkedVecError> {
        self.parent.insert(self.offset + self.size, value)?;
        self.size += 1;
        Ok(())
    }
}
