mod helpers;

use std::sync::Arc;

use helpers::{hash_store, store_with, CountingProvider, TEST_DIMS};
use promptpilot::embedding::hash::HashEmbeddingProvider;
use promptpilot::memory::MemoryStore;

#[test]
fn capital_cities_scenario() {
    let (_tmp, store) = hash_store();
    let mut memory = store.open("p1").unwrap();

    memory.add("Paris is the capital of France.").unwrap();
    memory.add("Tokyo is the capital of Japan.").unwrap();

    let top = memory.search("What is the capital of France?", 1).unwrap();
    assert_eq!(top, vec!["Paris is the capital of France."]);

    let both = memory.search("capital", 5).unwrap();
    assert_eq!(both.len(), 2);
}

#[test]
fn reopen_restores_texts_and_order() {
    let tmp = tempfile::TempDir::new().unwrap();
    let provider = Arc::new(HashEmbeddingProvider::new(TEST_DIMS).unwrap());
    let texts = [
        "the quick brown fox",
        "rust ownership rules",
        "sourdough needs a starter",
    ];

    {
        let mut memory = MemoryStore::new(tmp.path(), provider.clone())
            .open("p1")
            .unwrap();
        for t in texts {
            memory.add(t).unwrap();
        }
    }

    let memory = MemoryStore::new(tmp.path(), provider).open("p1").unwrap();
    assert_eq!(memory.len(), 3);
    assert_eq!(memory.texts(), texts);

    for (id, text) in texts.iter().enumerate() {
        let hits = memory.search_scored(text, 1).unwrap();
        assert_eq!(hits[0].id, id);
        assert_eq!(hits[0].text, *text);
    }
}

#[test]
fn add_after_reopen_survives_another_reopen() {
    let tmp = tempfile::TempDir::new().unwrap();
    let provider = Arc::new(HashEmbeddingProvider::new(TEST_DIMS).unwrap());
    let open = || {
        MemoryStore::new(tmp.path(), provider.clone())
            .open("p1")
            .unwrap()
    };

    let mut memory = open();
    memory.add("green tea").unwrap();
    memory.add("black coffee").unwrap();
    drop(memory);

    let mut memory = open();
    memory.add("hot chocolate").unwrap();
    drop(memory);

    let memory = open();
    assert_eq!(memory.texts(), ["green tea", "black coffee", "hot chocolate"]);
    let hits = memory.search_scored("hot chocolate", 1).unwrap();
    assert_eq!(hits[0].id, 2);
    assert_eq!(hits[0].text, "hot chocolate");
    assert_eq!(memory.search_scored("green tea", 1).unwrap()[0].id, 0);
}

#[test]
fn search_on_empty_memory_skips_provider() {
    let provider = Arc::new(CountingProvider::new(TEST_DIMS));
    let (_tmp, store) = store_with(provider.clone());
    let memory = store.open("p1").unwrap();
    let after_open = provider.calls();

    for _ in 0..3 {
        assert!(memory.search("anything", 5).unwrap().is_empty());
    }
    assert_eq!(provider.calls(), after_open);
}

#[test]
fn zero_k_skips_provider() {
    let provider = Arc::new(CountingProvider::new(TEST_DIMS));
    let (_tmp, store) = store_with(provider.clone());
    let mut memory = store.open("p1").unwrap();
    memory.add("something stored").unwrap();
    let before = provider.calls();

    assert!(memory.search("something", 0).unwrap().is_empty());
    assert_eq!(provider.calls(), before);
}

#[test]
fn k_larger_than_memory_is_clamped() {
    let (_tmp, store) = hash_store();
    let mut memory = store.open("p1").unwrap();
    memory.add("alpha").unwrap();
    memory.add("beta").unwrap();
    memory.add("gamma").unwrap();

    assert_eq!(memory.search("alpha", 100).unwrap().len(), 3);
}

#[test]
fn results_are_nearest_first() {
    let (_tmp, store) = hash_store();
    let mut memory = store.open("p1").unwrap();
    memory.add("cats purr").unwrap();
    memory.add("dogs bark loudly at night").unwrap();
    memory.add("dogs bark").unwrap();

    let hits = memory.search_scored("dogs bark", 3).unwrap();
    assert_eq!(hits[0].text, "dogs bark");
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[test]
fn projects_are_isolated() {
    let (_tmp, store) = hash_store();
    let mut a = store.open("a").unwrap();
    let b = store.open("b").unwrap();
    a.add("only in a").unwrap();

    assert_eq!(a.len(), 1);
    assert!(b.search("only in a", 5).unwrap().is_empty());
    assert_eq!(store.list_projects().unwrap(), vec!["a", "b"]);
}
