#![allow(dead_code)]

use oxide_compat::{EntityDescriptor, SchemaModel};
use oxide_compat_sqlx::SqliteExecutor;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub async fn create_test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool")
}

/// A pool with a `users` table holding `count` rows named `user01`, ...
/// and unique indexes on `email` and on `(tenant, handle)`.
pub async fn seeded_executor(count: u32) -> SqliteExecutor {
    let pool = create_test_pool().await;
    for sql in [
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            tenant INTEGER NOT NULL,
            handle TEXT NOT NULL
        )",
        "CREATE UNIQUE INDEX ix_users_email ON users (email)",
        "CREATE UNIQUE INDEX ix_users_tenant_handle ON users (tenant, handle)",
    ] {
        sqlx::query(sql).execute(&pool).await.unwrap();
    }

    for i in 1..=count {
        sqlx::query("INSERT INTO users (name, email, tenant, handle) VALUES (?, ?, ?, ?)")
            .bind(format!("user{i:02}"))
            .bind(format!("user{i}@example.com"))
            .bind(i64::from(i % 2))
            .bind(format!("h{i}"))
            .execute(&pool)
            .await
            .unwrap();
    }
    SqliteExecutor::new(pool)
}

/// Logical metadata for the `users` table.
pub fn user_schema() -> SchemaModel {
    SchemaModel::new().entity(
        EntityDescriptor::new("User", "users")
            .column("email", "Email")
            .column("tenant", "TenantId")
            .column("handle", "Handle")
            .unique_index("ix_users_email", &["email"])
            .unique_index("ix_users_tenant_handle", &["tenant", "handle"]),
    )
}
