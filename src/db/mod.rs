use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::oneshot;

mod migrations;

use crate::models::{DocStatus, SourceRecord};
use migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| anyhow!("invalid datetime '{value}': {err}"))
}

fn status_from_str(value: &str) -> Result<DocStatus> {
    match value {
        "Pending" => Ok(DocStatus::Pending),
        "Done" => Ok(DocStatus::Done),
        _ => Err(anyhow!("unknown document status '{value}'")),
    }
}

/// Status columns that `update_status_field` may touch. Anything else is
/// rejected so the targeted-update contract cannot widen by accident.
fn status_column(field: &str) -> Result<&'static str> {
    match field {
        "atp_status" => Ok("atp_status"),
        "bast_status" => Ok("bast_status"),
        _ => Err(anyhow!("'{field}' is not an updatable status field")),
    }
}

fn row_to_record(row: &Row) -> Result<SourceRecord> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let atp_status: String = row.get("atp_status")?;
    let bast_status: String = row.get("bast_status")?;

    Ok(SourceRecord {
        id: row.get("id")?,
        site_id: row.get("site_id")?,
        site_name: row.get("site_name")?,
        address: row.get("address")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        install_date: row.get("install_date")?,
        rectifier_type: row.get("rectifier_type")?,
        rectifier_capacity: row.get("rectifier_capacity")?,
        battery_capacity: row.get("battery_capacity")?,
        atp_status: status_from_str(&atp_status)?,
        bast_status: status_from_str(&bast_status)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("sitedocs-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    error!("Failed to enable foreign keys: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }

    pub async fn insert_record(&self, record: &SourceRecord) -> Result<()> {
        let record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO records (id, site_id, site_name, address, latitude, longitude,
                                      install_date, rectifier_type, rectifier_capacity,
                                      battery_capacity, atp_status, bast_status,
                                      created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    record.id,
                    record.site_id,
                    record.site_name,
                    record.address,
                    record.latitude,
                    record.longitude,
                    record.install_date,
                    record.rectifier_type,
                    record.rectifier_capacity,
                    record.battery_capacity,
                    record.atp_status.as_str(),
                    record.bast_status.as_str(),
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert record")?;
            Ok(())
        })
        .await
    }

    pub async fn get_record(&self, record_id: &str) -> Result<Option<SourceRecord>> {
        let record_id = record_id.to_string();
        self.execute(move |conn| {
            let record = conn
                .query_row(
                    "SELECT * FROM records WHERE id = ?1",
                    params![record_id],
                    |row| Ok(row_to_record(row)),
                )
                .optional()?
                .transpose()?;
            Ok(record)
        })
        .await
    }

    /// The only read the pipeline issues: records whose document status for
    /// the given field still matches `status`.
    pub async fn fetch_candidates(
        &self,
        field: &str,
        status: DocStatus,
    ) -> Result<Vec<SourceRecord>> {
        let column = status_column(field)?;
        let query =
            format!("SELECT * FROM records WHERE {column} = ?1 ORDER BY site_id ASC");
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&query)?;
            let mut rows = stmt.query(params![status.as_str()])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }
            Ok(records)
        })
        .await
    }

    /// The only write the pipeline issues: a targeted single-field status
    /// update against a whitelisted column.
    pub async fn update_status_field(
        &self,
        record_id: &str,
        field: &str,
        value: DocStatus,
    ) -> Result<()> {
        let column = status_column(field)?;
        let record_id = record_id.to_string();
        let updated_at = Utc::now();
        let statement =
            format!("UPDATE records SET {column} = ?1, updated_at = ?2 WHERE id = ?3");
        self.execute(move |conn| {
            let changed = conn
                .execute(
                    &statement,
                    params![value.as_str(), updated_at.to_rfc3339(), record_id],
                )
                .with_context(|| "failed to update record status")?;
            if changed == 0 {
                return Err(anyhow!("record '{record_id}' not found"));
            }
            Ok(())
        })
        .await
    }
}
