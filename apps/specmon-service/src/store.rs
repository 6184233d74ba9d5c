//! SQLite-backed record store.

use std::collections::HashSet;

use specmon_core::{Folder, SpecRecord};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info, warn};

use crate::mailer::Notify;

pub struct SpecStore {
    pool: SqlitePool,
}

impl SpecStore {
    /// Open (or create) the database and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        // One connection is all the single-writer loop needs, and it keeps
        // in-memory databases coherent in tests.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS spec_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                revision TEXT NOT NULL,
                date TEXT NOT NULL,
                area TEXT NOT NULL,
                purpose TEXT NOT NULL,
                description TEXT NOT NULL,
                file_name TEXT NOT NULL,
                folder TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_spec_records_folder ON spec_records(folder)",
        )
        .execute(&pool)
        .await?;

        info!("database schema ready");
        Ok(Self { pool })
    }

    /// Base filenames already accepted for `folder`.
    pub async fn list_file_names(&self, folder: Folder) -> Result<HashSet<String>, sqlx::Error> {
        let rows = sqlx::query("SELECT file_name FROM spec_records WHERE folder = ?")
            .bind(folder.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| row.get::<String, _>("file_name"))
            .collect())
    }

    /// Every stored record for `folder`, in insertion order.
    pub async fn list_records(&self, folder: Folder) -> Result<Vec<SpecRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, revision, date, area, purpose, description,
                   file_name, folder
            FROM spec_records
            WHERE folder = ?
            ORDER BY id
            "#,
        )
        .bind(folder.as_str())
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        for record in &records {
            debug!(id = ?record.id, file = %record.file_name, title = %record.title, "stored record");
        }
        Ok(records)
    }

    /// Insert every complete record; incomplete ones are skipped and the
    /// admin is signaled instead. Persistence re-validates because it can be
    /// invoked outside the intake pipeline.
    pub async fn save_all<N: Notify + ?Sized>(
        &self,
        records: &[SpecRecord],
        notify: &N,
    ) -> Result<(), sqlx::Error> {
        for record in records {
            if !record.is_complete() {
                warn!(file = %record.file_name, "skipping record with missing information");
                if let Some(folder) = record.folder {
                    let issue = format!(
                        "There was an issue retrieving some information from spec {} in the {} \
                         folder. Please review to ensure the spec is formatted correctly and \
                         fully complete, then update the file.",
                        record.file_name, folder
                    );
                    notify.notify_admin(&issue, folder).await;
                }
                continue;
            }

            sqlx::query(
                r#"
                INSERT INTO spec_records
                    (title, author, revision, date, area, purpose, description, file_name, folder)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.title)
            .bind(&record.author)
            .bind(&record.revision)
            .bind(&record.date)
            .bind(&record.area)
            .bind(&record.purpose)
            .bind(&record.description)
            .bind(&record.file_name)
            .bind(record.folder.map(|folder| folder.as_str()).unwrap_or_default())
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

fn record_from_row(row: &SqliteRow) -> Result<SpecRecord, sqlx::Error> {
    let folder: String = row.get("folder");
    let folder = folder
        .parse::<Folder>()
        .map_err(|err| sqlx::Error::ColumnDecode {
            index: "folder".to_string(),
            source: Box::new(err),
        })?;

    Ok(SpecRecord {
        id: Some(row.get("id")),
        title: row.get("title"),
        author: row.get("author"),
        revision: row.get("revision"),
        date: row.get("date"),
        area: row.get("area"),
        purpose: row.get("purpose"),
        description: row.get("description"),
        file_name: row.get("file_name"),
        folder: Some(folder),
    })
}
