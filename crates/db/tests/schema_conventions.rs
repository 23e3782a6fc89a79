use sqlx::PgPool;

/// Every entity `id` column must be bigint.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_pks_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "Table {table}.id should be bigint");
    }
}

/// Unique constraints must be named `uq_*` so the API can map them to 409.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unique_constraints_use_uq_prefix(pool: PgPool) {
    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT conname::TEXT FROM pg_constraint c
         JOIN pg_namespace n ON n.oid = c.connamespace
         WHERE n.nspname = 'public' AND c.contype = 'u'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!names.is_empty());
    for (name,) in &names {
        assert!(name.starts_with("uq_"), "Unique constraint {name} should start with uq_");
    }
}

/// Foreign keys must be named `fk_<table>_<column>`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_keys_use_fk_prefix(pool: PgPool) {
    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT conname::TEXT FROM pg_constraint c
         JOIN pg_namespace n ON n.oid = c.connamespace
         WHERE n.nspname = 'public' AND c.contype = 'f'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (name,) in &names {
        assert!(name.starts_with("fk_"), "Foreign key {name} should start with fk_");
    }
}

/// Every table with an `updated_at` column must carry the shared trigger.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_updated_at_columns_have_triggers(pool: PgPool) {
    let missing: Vec<(String,)> = sqlx::query_as(
        "SELECT c.table_name::TEXT
         FROM information_schema.columns c
         WHERE c.table_schema = 'public'
           AND c.column_name = 'updated_at'
           AND NOT EXISTS (
               SELECT 1 FROM information_schema.triggers t
               WHERE t.event_object_table = c.table_name
                 AND t.trigger_name = 'trg_' || c.table_name || '_updated_at')",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(missing.is_empty(), "Tables without updated_at trigger: {missing:?}");
}

/// The seed data provides the admin role and a permission for every menu.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seed_roles_and_permissions(pool: PgPool) {
    let (admin_permissions,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM role_permissions rp
         JOIN roles r ON r.id = rp.role_id WHERE r.name = 'admin'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let (permissions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM permissions")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert!(permissions > 0);
    assert_eq!(admin_permissions, permissions);
}
