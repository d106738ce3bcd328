//! Property tests checking `ChunkedVec<i64>` against a `Vec<i64>` reference
//! model over arbitrary sequences of operations (spec properties P1–P8:
//! index/order preservation, append/insert/remove consistency, split and
//! normalize never losing or duplicating elements, sort/remove_if correctness).

use chunked_seq::ChunkedVec;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Append(i64),
    Insert(usize, i64),
    Remove(usize),
    Set(usize, i64),
    SortAsc,
    RemoveEven,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i64>().prop_map(Op::Append),
        (0usize..200, any::<i64>()).prop_map(|(i, v)| Op::Insert(i, v)),
        (0usize..200).prop_map(Op::Remove),
        (0usize..200, any::<i64>()).prop_map(|(i, v)| Op::Set(i, v)),
        Just(Op::SortAsc),
        Just(Op::RemoveEven),
    ]
}

fn apply(model: &mut Vec<i64>, chunked: &mut ChunkedVec<i64>, op: &Op) {
    match *op {
        Op::Append(v) => {
            model.push(v);
            chunked.append(v);
        }
        Op::Insert(i, v) => {
            let i = if model.is_empty() { 0 } else { i % (model.len() + 1) };
            model.insert(i, v);
            chunked.insert(i, v).unwrap();
        }
        Op::Remove(i) => {
            if model.is_empty() {
                return;
            }
            let i = i % model.len();
            let expected = model.remove(i);
            let actual = chunked.remove(i).unwrap();
            assert_eq!(expected, actual);
        }
        Op::Set(i, v) => {
            if model.is_empty() {
                return;
            }
            let i = i % model.len();
            let expected = model[i];
            model[i] = v;
            let actual = chunked.set(i, v).unwrap();
            assert_eq!(expected, actual);
        }
        Op::SortAsc => {
            model.sort();
            chunked.sort_by(|a, b| a.cmp(b));
        }
        Op::RemoveEven => {
            model.retain(|x| x % 2 != 0);
            chunked.remove_if(|x| x % 2 == 0).unwrap();
        }
    }
    assert_eq!(model.len(), chunked.size());
}

fn assert_matches_model(model: &[i64], chunked: &ChunkedVec<i64>) {
    assert_eq!(model.len(), chunked.size());
    for (i, expected) in model.iter().enumerate() {
        assert_eq!(*expected, *chunked.get(i).unwrap());
    }
    let collected: Vec<i64> = chunked.iter().copied().collect();
    assert_eq!(collected, model);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn matches_vec_reference_model(ops in prop::collection::vec(op_strategy(), 0..300)) {
        // small tuning constants force split/normalize/fast-map repair to
        // trigger constantly even for modestly sized operation sequences.
        let mut chunked = ChunkedVec::with_tuning(1, 4, 8, 4);
        let mut model: Vec<i64> = Vec::new();
        for op in &ops {
            apply(&mut model, &mut chunked, op);
            assert_matches_model(&model, &chunked);
        }
    }

    #[test]
    fn default_tuning_matches_model_for_smaller_sequences(
        ops in prop::collection::vec(op_strategy(), 0..120)
    ) {
        let mut chunked = ChunkedVec::new();
        let mut model: Vec<i64> = Vec::new();
        for op in &ops {
            apply(&mut model, &mut chunked, op);
        }
        assert_matches_model(&model, &chunked);
    }

    #[test]
    fn clear_always_empties_regardless_of_history(
        ops in prop::collection::vec(op_strategy(), 0..100)
    ) {
        let mut chunked = ChunkedVec::with_tuning(1, 4, 8, 4);
        let mut model: Vec<i64> = Vec::new();
        for op in &ops {
            apply(&mut model, &mut chunked, op);
        }
        chunked.clear();
        prop_assert_eq!(chunked.size(), 0);
        prop_assert!(chunked.is_empty());
        prop_assert!(chunked.get(0).is_err());
    }
}
