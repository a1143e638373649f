//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    trackem_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in ["user", "group", "invite", "activity", "contribution"] {
        assert!(info_str.contains(table), "missing {table} table");
    }
    assert!(info_str.contains("member_of"), "missing member_of edge");
}

#[tokio::test]
async fn schema_migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    trackem_db::run_migrations(&db).await.unwrap();
    trackem_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let applied: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(applied.len(), 1, "each migration is recorded once");
}

#[tokio::test]
async fn contribution_amount_must_be_positive() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    trackem_db::run_migrations(&db).await.unwrap();

    let response = db
        .query(
            "CREATE contribution SET user_id = 'u', activity_id = 'a', \
             contribution_type = 'Money', amount = 0, currency = 'USD', \
             description = '', date = time::now()",
        )
        .await
        .unwrap();
    assert!(response.check().is_err(), "zero amount should be rejected");
}
