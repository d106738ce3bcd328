use chunked_seq::{ChunkedVec, ChunkedVecError};

fn tuned(base_chunk: usize, split_threshold: usize, step: usize) -> ChunkedVec<i64> {
    ChunkedVec::with_tuning(1, base_chunk, split_threshold, step)
}

#[test]
fn append_only_ten_thousand_matches_indices() {
    let mut v = ChunkedVec::new();
    for i in 0..10_000i64 {
        v.append(i);
    }
    assert_eq!(v.size(), 10_000);
    for i in (0..10_000).step_by(137) {
        assert_eq!(*v.get(i).unwrap(), i as i64);
    }
    assert_eq!(*v.get(9_999).unwrap(), 9_999);
    assert!(v.get(10_000).is_err());
}

#[test]
fn append_then_middle_insert_triggers_split_and_stays_consistent() {
    let mut v = tuned(8, 16, 8);
    for i in 0..200i64 {
        v.append(i);
    }
    let before_chunks = v.chunk_count();

    for i in 0..64i64 {
        v.insert(100, 1_000 + i).unwrap();
    }

    assert!(v.chunk_count() >= before_chunks);
    assert_eq!(v.size(), 264);

    // everything inserted at index 100 repeatedly ends up in reverse order
    // right after index 100's original neighborhood.
    let collected: Vec<i64> = v.iter().copied().collect();
    assert_eq!(collected.len(), 264);
    assert_eq!(collected[0], 0);
    assert_eq!(collected[99], 99);
    assert_eq!(*collected.last().unwrap(), 199);
}

#[test]
fn remove_if_drops_matching_elements_in_order() {
    let mut v = tuned(8, 16, 8);
    for i in 0..97i64 {
        v.append(i);
    }
    let removed = v.remove_if(|x| x % 3 == 0).unwrap();
    assert_eq!(removed, (0..97).filter(|x| x % 3 == 0).count());
    let collected: Vec<i64> = v.iter().copied().collect();
    assert!(collected.iter().all(|x| x % 3 != 0));
    assert_eq!(collected.len(), 97 - removed);
    for pair in collected.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn sort_orders_in_place_without_losing_elements() {
    let mut v = tuned(8, 16, 8);
    for x in [42, -1, 17, 3, 3, 100, -50, 0] {
        v.append(x);
    }
    let mut expected: Vec<i64> = v.iter().copied().collect();
    expected.sort();
    v.sort_by(|a, b| a.cmp(b));
    let collected: Vec<i64> = v.iter().copied().collect();
    assert_eq!(collected, expected);
}

#[test]
fn list_iterator_walks_forward_and_backward() {
    let mut v = tuned(8, 16, 8);
    for i in 0..10i64 {
        v.append(i);
    }
    let mut it = v.list_iterator();
    assert_eq!(*it.next().unwrap(), 0);
    assert_eq!(*it.next().unwrap(), 1);
    assert_eq!(*it.previous().unwrap(), 1);
    assert_eq!(*it.previous().unwrap(), 0);
    assert!(it.previous().is_err());
}

#[test]
fn sub_view_insert_is_visible_through_the_parent() {
    let mut v = ChunkedVec::new();
    for i in 0..100i64 {
        v.append(i);
    }
    {
        let mut view = v.sub_view(10, 20).unwrap();
        view.insert(0, 999).unwrap();
        assert_eq!(view.len(), 11);
    }
    assert_eq!(*v.get(10).unwrap(), 999);
    assert_eq!(v.size(), 101);
}

#[test]
fn out_of_range_operations_return_index_out_of_bounds() {
    let mut v: ChunkedVec<i64> = ChunkedVec::new();
    v.append(1);
    assert!(matches!(
        v.get(5),
        Err(ChunkedVecError::IndexOutOfBounds { index: 5, len: 1 })
    ));
    assert!(matches!(
        v.insert(5, 0),
        Err(ChunkedVecError::IndexOutOfBounds { index: 5, len: 1 })
    ));
    assert!(v.remove(5).is_err());
}

#[test]
fn sub_view_rejects_inverted_or_out_of_range_bounds() {
    let mut v = ChunkedVec::new();
    for i in 0..10i64 {
        v.append(i);
    }
    assert!(matches!(
        v.sub_view(5, 2),
        Err(ChunkedVecError::IllegalArgument(_))
    ));
    assert!(matches!(
        v.sub_view(0, 11),
        Err(ChunkedVecError::IllegalArgument(_))
    ));
}
