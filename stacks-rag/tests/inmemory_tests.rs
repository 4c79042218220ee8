//! Property tests for in-memory index search ordering.

use std::collections::HashMap;

use proptest::prelude::*;
use stacks_rag::{InMemoryIndex, Passage, VectorIndex};

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate a passage with a normalized embedding.
fn arb_passage(dim: usize) -> impl Strategy<Value = Passage> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(id, text, embedding)| Passage { id, text, embedding },
    )
}

mod prop_inmemory_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any set of stored passages, a query returns results ordered by
        /// descending cosine score, bounded by top_k, with no threshold
        /// applied at the index level.
        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            passages in proptest::collection::vec(arb_passage(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (results, unique_count) = rt.block_on(async {
                let store = InMemoryIndex::new();
                store.ensure_index("test", DIM).await.unwrap();

                // Deduplicate passages by id to avoid upsert overwriting
                let mut deduped: HashMap<String, Passage> = HashMap::new();
                for passage in &passages {
                    deduped.entry(passage.id.clone()).or_insert_with(|| passage.clone());
                }
                let unique: Vec<Passage> = deduped.into_values().collect();
                let count = unique.len();

                store.upsert("test", &unique).await.unwrap();
                let results = store.query("test", &query, top_k).await.unwrap();
                (results, count)
            });

            // Result count is at most top_k and at most the number stored
            prop_assert!(results.len() <= top_k);
            prop_assert!(results.len() <= unique_count);

            // Results are ordered by descending score
            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}
