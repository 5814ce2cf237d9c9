//! Tests contra un PostgreSQL real.
//!
//! Usan las variables `DB_*` (o sus defaults) y están marcados `#[ignore]`:
//! `cargo test -- --ignored` con el servidor levantado.

use rand::Rng;
use user_database_manager::{
    users_table, Condition, Database, DatabaseConfig, DbError, NewUser, SqlValue, TableSpec, User,
};

async fn create_test_db() -> Database {
    dotenvy::dotenv().ok();
    let config = DatabaseConfig::from_env().expect("invalid DB_* configuration");
    let mut db = Database::new(config);
    db.create_tables(&[users_table()]).await.expect("create users table");
    db
}

// Ids aleatorios para que los tests no choquen entre sí
fn random_user_id() -> i64 {
    rand::thread_rng().gen_range(1_000_000..i64::MAX / 2)
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_create_tables_is_idempotent() {
    let mut db = create_test_db().await;
    db.create_tables(&[users_table()]).await.unwrap();
    db.create_tables(&[users_table()]).await.unwrap();
    assert!(!db.is_connected());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_add_user_then_read_back() {
    let mut db = create_test_db().await;
    let id = random_user_id();
    let mut users = db.users();

    users.add_user(id, 9, 16).await.unwrap();

    assert!(users.user_exists(id).await.unwrap());
    assert_eq!(users.get_user_class(id).await.unwrap(), Some(9));
    assert_eq!(users.get_user_age(id).await.unwrap(), Some(16));
    assert_eq!(users.get_user_nationality(id).await.unwrap(), None);

    users.delete_user(id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_update_age_keeps_other_fields() {
    let mut db = create_test_db().await;
    let id = random_user_id();
    let mut users = db.users();

    users.add_user(id, 7, 14).await.unwrap();
    users.update_user_nationality(id, "UK").await.unwrap();
    assert_eq!(users.update_user_age(id, 15).await.unwrap(), 1);

    assert_eq!(users.get_user_age(id).await.unwrap(), Some(15));
    assert_eq!(users.get_user_class(id).await.unwrap(), Some(7));
    assert_eq!(users.get_user_nationality(id).await.unwrap().as_deref(), Some("UK"));

    users.delete_user(id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_delete_value_removes_user() {
    let mut db = create_test_db().await;
    let id = random_user_id();

    db.users().add_user(id, 9, 16).await.unwrap();
    let deleted = db.delete_value("users", "id_user", id).await.unwrap();

    assert_eq!(deleted, 1);
    assert!(!db.users().user_exists(id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_missing_user_is_not_found() {
    let mut db = create_test_db().await;
    let id = random_user_id();

    let err = db.users().get_user_class(id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
    assert!(db.users().get_user(id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_scenario_user_100() {
    let mut db = create_test_db().await;
    db.delete_value("users", "id_user", 100_i64).await.unwrap();

    let user = db
        .persistent(|db| {
            Box::pin(async move {
                let mut users = db.users();
                users.add_new_user(&NewUser::new(100)).await?;
                users.update_user_nationality(100, "USA").await?;
                users.update_user_age(100, 17).await?;
                users.get_user(100).await
            })
        })
        .await
        .unwrap()
        .unwrap();

    assert!(!db.is_connected());
    assert_eq!(user.class_, Some(9));
    assert_eq!(user.age, Some(17));
    assert_eq!(user.nationality.as_deref(), Some("USA"));

    db.users().delete_user(100).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_fill_table_in_batches() {
    let mut db = create_test_db().await;
    let config = DatabaseConfig {
        insert_batch_size: 3,
        ..db.config().clone()
    };
    let mut small_batches = Database::new(config);

    let base = random_user_id();
    let rows: Vec<Vec<SqlValue>> = (0..10)
        .map(|i| vec![SqlValue::BigInt(base + i), SqlValue::SmallInt(5), SqlValue::Null])
        .collect();

    let inserted = small_batches
        .fill_table("users", &["id_user", "class_", "nationality"], &rows)
        .await
        .unwrap();
    assert_eq!(inserted, 10);

    let found = db
        .get_table_data(
            "users",
            Some(&["id_user"][..]),
            &[Condition::eq("class_", 5_i16), Condition::eq("nationality", SqlValue::Null)],
        )
        .await
        .unwrap();
    assert!(found.len() >= 10);

    for i in 0..10 {
        db.delete_value("users", "id_user", base + i).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_values_are_not_interpolated() {
    let mut db = create_test_db().await;
    let id = random_user_id();
    let hostile = "x'; DROP TABLE users; --";

    db.users().add_user(id, 1, 1).await.unwrap();
    db.users().update_user_nationality(id, hostile).await.unwrap();

    assert_eq!(db.users().get_user_nationality(id).await.unwrap().as_deref(), Some(hostile));
    db.users().delete_user(id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_failed_statement_closes_ad_hoc_connection() {
    let mut db = create_test_db().await;
    let id = random_user_id();

    db.users().add_user(id, 1, 1).await.unwrap();
    let err = db.users().add_user(id, 1, 1).await.unwrap_err();
    assert!(err.is_database());
    assert!(!db.is_connected());

    let rows = db.fetch("SELECT 1 AS one; ").await.unwrap();
    assert_eq!(rows.len(), 1);
    db.users().delete_user(id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_execute_query_runs_raw_batches() {
    let mut db = create_test_db().await;
    let table = TableSpec::new("scratch_notes").column("id", "BIGINT").column("note", "TEXT");

    db.connect().await.unwrap();
    db.execute_query("DROP TABLE IF EXISTS scratch_notes").await.unwrap();
    db.create_tables(&[table]).await.unwrap();
    assert!(db.is_connected());

    db.execute_query(
        "INSERT INTO scratch_notes VALUES (1, 'a'); INSERT INTO scratch_notes VALUES (2, 'b');",
    )
    .await
    .unwrap();
    let rows = db.get_table_data::<&str>("scratch_notes", None, &[]).await.unwrap();
    assert_eq!(rows.len(), 2);

    db.execute_query("DROP TABLE scratch_notes").await.unwrap();
    db.close().await.unwrap();
    assert!(!db.is_connected());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_id_only_row_reads_back_as_none() {
    let mut db = create_test_db().await;
    let id = random_user_id();

    db.fill_table("users", &["id_user"], &[vec![SqlValue::BigInt(id)]])
        .await
        .unwrap();

    let mut users = db.users();
    assert!(users.user_exists(id).await.unwrap());
    assert_eq!(users.get_user_class(id).await.unwrap(), None);
    assert_eq!(users.get_user_age(id).await.unwrap(), None);
    assert_eq!(users.get_user_nationality(id).await.unwrap(), None);

    let user = users.get_user(id).await.unwrap().unwrap();
    assert_eq!(
        user,
        User {
            id_user: id,
            class_: None,
            age: None,
            nationality: None,
        }
    );

    users.delete_user(id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_lease_follows_session_state() {
    let mut db = create_test_db().await;

    let lease = db.lease().await.unwrap();
    assert!(lease.is_ad_hoc());
    lease.finish(Ok(())).await.unwrap();
    assert!(!db.is_connected());

    db.connect().await.unwrap();
    let lease = db.lease().await.unwrap();
    assert!(!lease.is_ad_hoc());
    lease.finish(Ok(())).await.unwrap();
    assert!(db.is_connected());

    db.close().await.unwrap();
}
