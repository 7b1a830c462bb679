//! Returning-style DELETE and UPDATE on SQLite.

use oxide_compat::returning::{plan_delete, plan_update, ReturningMode, ReturningPlan};
use oxide_compat::{Dialect, RawQuery};
use sqlx::sqlite::SqliteRow;
use tracing::debug;

use crate::error::Result;
use crate::executor::{bind_all, SqliteExecutor};

impl SqliteExecutor {
    /// Deletes the rows of `table` matching `predicate` and returns them.
    ///
    /// With [`ReturningMode::Emulated`] the rows are selected and deleted in
    /// one transaction, which is rolled back if either statement fails.
    pub async fn delete_returning(
        &self,
        table: &str,
        predicate: Option<&RawQuery>,
        mode: ReturningMode,
    ) -> Result<Vec<SqliteRow>> {
        match plan_delete(Dialect::Sqlite, table, predicate, mode) {
            ReturningPlan::Native(query) => self.fetch_all(&query).await,
            ReturningPlan::Emulated { select, mutate } => {
                let mut tx = self.pool().begin().await?;

                debug!(sql = %select.sql, "Selecting rows before delete");
                let rows = bind_all(sqlx::query(&select.sql), &select.params)
                    .fetch_all(&mut *tx)
                    .await?;

                debug!(sql = %mutate.sql, "Deleting selected rows");
                let deleted = bind_all(sqlx::query(&mutate.sql), &mutate.params)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                tx.commit().await?;
                debug!(selected = rows.len(), deleted, "Emulated delete committed");
                Ok(rows)
            }
        }
    }

    /// Applies `assignments` to the rows of `table` matching `predicate`
    /// and returns the updated rows.
    pub async fn update_returning(
        &self,
        table: &str,
        assignments: &RawQuery,
        predicate: Option<&RawQuery>,
    ) -> Result<Vec<SqliteRow>> {
        let query = plan_update(Dialect::Sqlite, table, assignments, predicate);
        self.fetch_all(&query).await
    }

    async fn fetch_all(&self, query: &RawQuery) -> Result<Vec<SqliteRow>> {
        debug!(sql = %query.sql, "Executing returning statement");
        Ok(bind_all(sqlx::query(&query.sql), &query.params)
            .fetch_all(self.pool())
            .await?)
    }
}
