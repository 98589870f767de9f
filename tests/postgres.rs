//! Runs against a real database only when TEST_DATABASE_URL is set. The table is
//! truncated, so point it at a scratch database.
//!
//! Schema idempotence, ILIKE `ESCAPE` handling and SERIAL id ordering are only
//! covered here; without TEST_DATABASE_URL they go untested.

use sqlx::postgres::PgPoolOptions;

use emr_records::import::{import_if_empty, ImportOutcome};
use emr_records::{ensure_records_table, AppError, ListParams, PgRecordStore, RecordInput, RecordStore};

async fn store() -> Option<PgRecordStore> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            return None;
        }
    };
    let pool = PgPoolOptions::new().max_connections(4).connect(&url).await.unwrap();
    ensure_records_table(&pool).await.unwrap();
    // Second run must be a no-op.
    ensure_records_table(&pool).await.unwrap();
    sqlx::query("TRUNCATE healthcare_records RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();
    Some(PgRecordStore::new(pool))
}

fn named(name: &str, doctor: &str) -> RecordInput {
    RecordInput {
        name: Some(name.into()),
        doctor: Some(doctor.into()),
        gender: Some("Female".into()),
        medical_condition: Some("Asthma".into()),
        billing_amount: Some(1234.567),
        ..Default::default()
    }
}

#[tokio::test]
async fn postgres_store_end_to_end() {
    let Some(store) = store().await else { return };

    let missing = std::path::Path::new("/nonexistent/healthcare.csv");
    assert_eq!(
        import_if_empty(&store, missing).await.unwrap(),
        ImportOutcome::Sampled { inserted: 2 }
    );
    assert_eq!(
        import_if_empty(&store, missing).await.unwrap(),
        ImportOutcome::Skipped { existing: 2 }
    );

    let created = store.create(&named("Ada", "Dr. 100%_Sure")).await.unwrap();
    assert_eq!(created.billing_amount, Some(1234.57));
    assert_eq!(created.created_at, created.updated_at);

    let fetched = store.get(created.id).await.unwrap();
    assert_eq!(fetched, created);

    // Wildcards in the search term match literally.
    let page = store.list(&ListParams::new(1, 10, Some("100%_"))).await.unwrap();
    assert_eq!(page.total, 1);
    let page = store.list(&ListParams::new(1, 10, Some("%"))).await.unwrap();
    assert_eq!(page.total, 1);
    let page = store.list(&ListParams::new(1, 10, Some("ada"))).await.unwrap();
    assert_eq!(page.records[0].id, created.id);

    let updated = store
        .update(created.id, &RecordInput { name: Some("Ada King".into()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(updated.name, "Ada King");
    assert_eq!(updated.doctor, None);
    assert!(updated.updated_at >= created.updated_at);

    for i in 0..20 {
        store.create(&named(&format!("P{i}"), "Dr. Who")).await.unwrap();
    }
    let first = store.list(&ListParams::new(1, 10, None)).await.unwrap();
    assert_eq!(first.total, 23);
    assert_eq!(first.records.len(), 10);
    assert_eq!(first.records[0].name, "P19");
    let last = store.list(&ListParams::new(3, 10, None)).await.unwrap();
    assert_eq!(last.records.len(), 3);

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_records, 23);
    assert_eq!(stats.top_conditions[0].medical_condition.as_deref(), Some("Asthma"));
    assert_eq!(stats.top_conditions[0].count, 20);

    store.delete(created.id).await.unwrap();
    assert!(matches!(store.get(created.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(store.delete(created.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(store.create(&RecordInput::default()).await, Err(AppError::Db(_))));

    store.close().await;
}
