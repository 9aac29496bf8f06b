use crate::task::{STATUS_CATALOG, Task, TaskStatus};
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;

/// Handle to the SQLite store.
///
/// One connection behind a mutex, injected explicitly into everything that
/// needs storage. SQLite serializes each statement, and concurrent
/// reconciliation passes racing on the same row are benign because the status
/// they write is a pure function of the stored fields and the clock.
pub struct Database {
    conn: Mutex<Connection>,
}

/// Raw data extracted from a task row before conversion to Task
struct TaskRow {
    id: i64,
    short_name: String,
    description: Option<String>,
    start_time: String,
    duration_hours: i64,
    location: Option<String>,
    date: String,
    status_name: String,
}

const TASK_COLUMNS: &str =
    "t.uid, t.short_name, t.description, t.start_time, t.duration_hours, t.location, t.date, s.name";

impl TaskRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            short_name: row.get(1)?,
            description: row.get(2)?,
            start_time: row.get(3)?,
            duration_hours: row.get(4)?,
            location: row.get(5)?,
            date: row.get(6)?,
            status_name: row.get(7)?,
        })
    }

    fn into_task(self) -> Result<Task> {
        let status = self
            .status_name
            .parse::<TaskStatus>()
            .map_err(|e| anyhow!(e))?;

        Ok(Task {
            id: self.id,
            short_name: self.short_name,
            description: self.description,
            date: self.date,
            start_time: self.start_time,
            duration_hours: self.duration_hours,
            location: self.location,
            status,
        })
    }
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {path:?}"))?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create the schema and seed the status catalog on first use. Reopening
    /// an existing store never re-seeds.
    fn init(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS status (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                uid INTEGER PRIMARY KEY AUTOINCREMENT,
                short_name TEXT NOT NULL,
                description TEXT,
                start_time TEXT NOT NULL,
                duration_hours INTEGER NOT NULL,
                location TEXT,
                date TEXT NOT NULL,
                status_id INTEGER NOT NULL REFERENCES status(id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_status_id ON tasks(status_id)",
            [],
        )?;

        let seeded: i64 = conn.query_row("SELECT COUNT(*) FROM status", [], |row| row.get(0))?;
        if seeded == 0 {
            // Seed order matters: it fixes the catalog row ids for good.
            for status in STATUS_CATALOG {
                conn.execute(
                    "INSERT INTO status (name) VALUES (?1)",
                    params![status.as_str()],
                )?;
            }
        }

        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned mutex means another thread panicked mid-call; the
        // connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert_task(&self, task: &Task) -> Result<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO tasks (short_name, description, start_time, duration_hours, location, date, status_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, (SELECT id FROM status WHERE name = ?7))",
            params![
                task.short_name,
                task.description,
                task.start_time,
                task.duration_hours,
                task.location,
                task.date,
                task.status.as_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_all_tasks(&self) -> Result<Vec<Task>> {
        self.query_tasks("")
    }

    /// Every task that is not completed. The reconciliation pass scans these;
    /// excluding completed rows at query level is cheaper than re-checking the
    /// absorbing state per task.
    pub fn list_uncompleted_tasks(&self) -> Result<Vec<Task>> {
        self.query_tasks("WHERE s.name != 'completed'")
    }

    /// The external read surface only exposes recorded tasks.
    pub fn list_recorded_tasks(&self) -> Result<Vec<Task>> {
        self.query_tasks("WHERE s.name = 'recorded'")
    }

    fn query_tasks(&self, where_clause: &str) -> Result<Vec<Task>> {
        let conn = self.lock();
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks t JOIN status s ON s.id = t.status_id {where_clause} ORDER BY t.uid ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], TaskRow::from_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?.into_task()?);
        }
        Ok(result)
    }

    pub fn get_task_by_id(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.lock();
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks t JOIN status s ON s.id = t.status_id WHERE t.uid = ?1"
        );
        let row = conn
            .query_row(&sql, params![id], TaskRow::from_row)
            .optional()?;
        row.map(TaskRow::into_task).transpose()
    }

    pub fn update_task(&self, task: &Task) -> Result<()> {
        let conn = self.lock();
        let updated = conn.execute(
            "UPDATE tasks SET short_name = ?1, description = ?2, start_time = ?3,
                duration_hours = ?4, location = ?5, date = ?6,
                status_id = (SELECT id FROM status WHERE name = ?7)
             WHERE uid = ?8",
            params![
                task.short_name,
                task.description,
                task.start_time,
                task.duration_hours,
                task.location,
                task.date,
                task.status.as_str(),
                task.id,
            ],
        )?;
        if updated == 0 {
            return Err(anyhow!("No task with id {}", task.id));
        }
        Ok(())
    }

    /// Unconditional delete. Returns the number of rows removed (0 or 1).
    pub fn delete_task_by_id(&self, id: i64) -> Result<usize> {
        let conn = self.lock();
        Ok(conn.execute("DELETE FROM tasks WHERE uid = ?1", params![id])?)
    }

    pub fn status_id_by_name(&self, name: &str) -> Result<i64> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id FROM status WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .with_context(|| format!("No status named {name:?}"))
    }

    pub fn status_name_by_id(&self, id: i64) -> Result<String> {
        let conn = self.lock();
        conn.query_row(
            "SELECT name FROM status WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .with_context(|| format!("No status with id {id}"))
    }
}
