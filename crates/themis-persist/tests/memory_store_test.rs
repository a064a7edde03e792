use std::sync::Arc;

use themis_persist::{
    InMemoryPersistenceClient, MemoryLimits, MemoryStore, PersistenceClient, UserIdentity,
};

fn store() -> (Arc<InMemoryPersistenceClient>, MemoryStore) {
    let persist = Arc::new(InMemoryPersistenceClient::new());
    let memory = MemoryStore::new(persist.clone(), MemoryLimits::default());
    (persist, memory)
}

#[tokio::test]
async fn test_summary_stays_under_cap() {
    let (_, memory) = store();
    let owner = UserIdentity::new("u1", "ana@firm.co");
    let long = "x".repeat(1_000);

    let mut meta = None;
    for _ in 0..60 {
        meta = Some(
            memory
                .record_exchange(&owner, "t1", "jurisprudence", &long, &long)
                .await
                .unwrap(),
        );
    }

    let meta = meta.unwrap();
    assert!(meta.summary.chars().count() <= 100_000);
    assert_eq!(meta.message_count, 120);
    assert_eq!(meta.short_history.len(), 12);
}

#[tokio::test]
async fn test_user_memory_tracks_ten_threads() {
    let (_, memory) = store();
    let owner = UserIdentity::new("u1", "Ana@Firm.co");

    for i in 0..11 {
        memory
            .record_exchange(&owner, &format!("t{}", i), "general", "hola", "respuesta")
            .await
            .unwrap();
    }

    let user = memory.user_memory("ana@firm.co").await.unwrap();
    assert_eq!(user.recent_threads.len(), 10);
    assert_eq!(user.recent_threads[0].thread_id, "t10");
    assert!(user.recent_threads.iter().all(|t| t.thread_id != "t0"));
}

#[tokio::test]
async fn test_reset_keeps_owner_row() {
    let (persist, memory) = store();
    let owner = UserIdentity::new("u1", "ana@firm.co");
    memory
        .record_exchange(&owner, "t1", "general", "hola", "respuesta")
        .await
        .unwrap();

    memory.reset_thread("t1").await.unwrap();

    let meta = persist.latest_thread_meta("t1").await.unwrap().unwrap();
    assert!(meta.summary.is_empty());
    assert_eq!(meta.message_count, 0);
    assert_eq!(meta.owner(), owner.fingerprint());
}

#[tokio::test]
async fn test_forget_thread_drops_recall_entry() {
    let (persist, memory) = store();
    let owner = UserIdentity::new("u1", "ana@firm.co");
    memory
        .record_exchange(&owner, "t1", "general", "hola", "respuesta")
        .await
        .unwrap();

    memory.forget_thread(&owner, "t1").await.unwrap();

    assert!(persist.latest_thread_meta("t1").await.unwrap().is_none());
    let user = memory.user_memory("ana@firm.co").await.unwrap();
    assert!(user.recent_threads.is_empty());
}

#[tokio::test]
async fn test_remember_fact_persists() {
    let (_, memory) = store();
    let owner = UserIdentity::new("u1", "ana@firm.co");

    memory.remember_fact(&owner, "Litiga en Medellín").await.unwrap();
    memory.remember_fact(&owner, "litiga en medellín").await.unwrap();

    let user = memory.user_memory("ana@firm.co").await.unwrap();
    assert_eq!(user.facts.len(), 1);
}
