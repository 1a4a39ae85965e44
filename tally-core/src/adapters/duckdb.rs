//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::types::Type;
use duckdb::{params, Connection, Row};
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{Expense, Group, GroupId, Person, PersonId, Transfer};
use crate::ports::Repository;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of attempts when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
}

/// DuckDB repository implementation
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) the database file at `db_path`
    ///
    /// Another process holding the file (e.g. a second `tally` invocation)
    /// makes the open fail with a lock error, so those errors are retried
    /// with exponential backoff before giving up.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut attempt = 0;
        loop {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) if attempt + 1 < MAX_RETRIES && is_retryable_error(&e.to_string()) => {
                    let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                    warn!(
                        path = %db_path.display(),
                        attempt = attempt + 1,
                        max_attempts = MAX_RETRIES,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "database busy, retrying"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Open a throwaway database that lives in memory
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading is never needed and breaks on signed macOS builds
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Path of the database file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run pending schema migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure the schema exists and is up to date
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }
}

fn next_id(conn: &Connection, sequence: &str) -> Result<i64> {
    let id = conn.query_row(&format!("SELECT nextval('{}')", sequence), [], |row| row.get(0))?;
    Ok(id)
}

/// Read an RFC 3339 text column as a UTC timestamp
fn get_timestamp(row: &Row<'_>, idx: usize) -> duckdb::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| duckdb::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_person(row: &Row<'_>) -> duckdb::Result<Person> {
    Ok(Person {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: get_timestamp(row, 3)?,
    })
}

fn row_to_expense(row: &Row<'_>) -> duckdb::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        group_id: row.get(1)?,
        payer_id: row.get(2)?,
        amount_cents: row.get(3)?,
        description: row.get(4)?,
        created_at: get_timestamp(row, 5)?,
    })
}

fn row_to_transfer(row: &Row<'_>) -> duckdb::Result<Transfer> {
    Ok(Transfer {
        id: row.get(0)?,
        group_id: row.get(1)?,
        sender_id: row.get(2)?,
        receiver_id: row.get(3)?,
        amount_cents: row.get(4)?,
        created_at: get_timestamp(row, 5)?,
    })
}

fn query_person(conn: &Connection, sql: &str, key: &dyn duckdb::ToSql) -> Result<Option<Person>> {
    match conn.query_row(sql, &[key], row_to_person) {
        Ok(person) => Ok(Some(person)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn member_ids(conn: &Connection, group_id: GroupId) -> Result<Vec<PersonId>> {
    let mut stmt = conn.prepare(
        "SELECT person_id FROM sys_group_members WHERE group_id = ? ORDER BY person_id",
    )?;
    let ids = stmt
        .query_map([group_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<PersonId>, _>>()?;
    Ok(ids)
}

/// Load a group row and attach its members
fn load_group(conn: &Connection, group_id: GroupId) -> Result<Option<Group>> {
    let row = conn.query_row(
        "SELECT group_id, name, owner_id, invitation_code, created_at
         FROM sys_groups WHERE group_id = ?",
        [group_id],
        |row| {
            Ok((
                row.get::<_, GroupId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, PersonId>(2)?,
                row.get::<_, String>(3)?,
                get_timestamp(row, 4)?,
            ))
        },
    );

    let (id, name, owner_id, invitation_code, created_at) = match row {
        Ok(row) => row,
        Err(duckdb::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    Ok(Some(Group {
        id,
        name,
        owner_id,
        member_ids: member_ids(conn, id)?,
        invitation_code,
        created_at,
    }))
}

#[async_trait]
impl Repository for DuckDbRepository {
    // === Persons ===

    async fn create_person(&self, name: &str, email: &str) -> Result<Person> {
        let conn = self.conn()?;
        let id = next_id(&conn, "seq_person_id")?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO sys_persons (person_id, name, email, created_at) VALUES (?, ?, ?, ?)",
            params![id, name, email, created_at.to_rfc3339()],
        )?;
        debug!(person_id = id, "person created");

        Ok(Person {
            id,
            name: name.to_string(),
            email: email.to_string(),
            created_at,
        })
    }

    async fn get_person_by_id(&self, id: PersonId) -> Result<Option<Person>> {
        let conn = self.conn()?;
        query_person(
            &conn,
            "SELECT person_id, name, email, created_at FROM sys_persons WHERE person_id = ?",
            &id,
        )
    }

    async fn get_person_by_email(&self, email: &str) -> Result<Option<Person>> {
        let conn = self.conn()?;
        query_person(
            &conn,
            "SELECT person_id, name, email, created_at FROM sys_persons WHERE email = ?",
            &email,
        )
    }

    async fn get_persons(&self) -> Result<Vec<Person>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT person_id, name, email, created_at FROM sys_persons ORDER BY person_id",
        )?;
        let persons = stmt
            .query_map([], row_to_person)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(persons)
    }

    // === Groups ===

    async fn create_group(
        &self,
        name: &str,
        owner_id: PersonId,
        invitation_code: &str,
    ) -> Result<Group> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let id = next_id(&tx, "seq_group_id")?;
        let created_at = Utc::now();
        let stamp = created_at.to_rfc3339();

        tx.execute(
            "INSERT INTO sys_groups (group_id, name, owner_id, invitation_code, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![id, name, owner_id, invitation_code, stamp],
        )?;
        tx.execute(
            "INSERT INTO sys_group_members (group_id, person_id, joined_at) VALUES (?, ?, ?)",
            params![id, owner_id, stamp],
        )?;
        tx.commit()?;
        debug!(group_id = id, owner_id, "group created");

        Ok(Group {
            id,
            name: name.to_string(),
            owner_id,
            member_ids: vec![owner_id],
            invitation_code: invitation_code.to_string(),
            created_at,
        })
    }

    async fn get_group_by_id(&self, id: GroupId) -> Result<Option<Group>> {
        let conn = self.conn()?;
        load_group(&conn, id)
    }

    async fn get_groups_by_member(&self, person_id: PersonId) -> Result<Vec<Group>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT group_id FROM sys_group_members WHERE person_id = ? ORDER BY group_id",
        )?;
        let group_ids = stmt
            .query_map([person_id], |row| row.get::<_, GroupId>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut groups = Vec::with_capacity(group_ids.len());
        for group_id in group_ids {
            if let Some(group) = load_group(&conn, group_id)? {
                groups.push(group);
            }
        }
        Ok(groups)
    }

    async fn add_person_to_group(&self, group_id: GroupId, person_id: PersonId) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sys_group_members (group_id, person_id, joined_at) VALUES (?, ?, ?)",
            params![group_id, person_id, Utc::now().to_rfc3339()],
        )?;
        debug!(group_id, person_id, "member added");
        Ok(())
    }

    async fn get_group_member_ids(&self, group_id: GroupId) -> Result<Vec<PersonId>> {
        let conn = self.conn()?;
        member_ids(&conn, group_id)
    }

    async fn is_person_in_group(&self, group_id: GroupId, person_id: PersonId) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_group_members WHERE group_id = ? AND person_id = ?",
            params![group_id, person_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // === Expenses ===

    async fn create_expense(&self, expense: &Expense) -> Result<Expense> {
        let conn = self.conn()?;
        let id = next_id(&conn, "seq_expense_id")?;

        conn.execute(
            "INSERT INTO sys_expenses (expense_id, group_id, person_id, amount_in_cents, description, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                id,
                expense.group_id,
                expense.payer_id,
                expense.amount_cents,
                expense.description,
                expense.created_at.to_rfc3339(),
            ],
        )?;

        Ok(Expense {
            id,
            ..expense.clone()
        })
    }

    async fn get_expenses_by_group(&self, group_id: GroupId) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT expense_id, group_id, person_id, amount_in_cents, description, created_at
             FROM sys_expenses WHERE group_id = ? ORDER BY expense_id",
        )?;
        let expenses = stmt
            .query_map([group_id], row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }

    // === Transfers ===

    async fn create_transfer(&self, transfer: &Transfer) -> Result<Transfer> {
        let conn = self.conn()?;
        let id = next_id(&conn, "seq_transfer_id")?;

        conn.execute(
            "INSERT INTO sys_transfers (transfer_id, group_id, sender_id, receiver_id, amount_in_cents, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                id,
                transfer.group_id,
                transfer.sender_id,
                transfer.receiver_id,
                transfer.amount_cents,
                transfer.created_at.to_rfc3339(),
            ],
        )?;

        Ok(Transfer {
            id,
            ..transfer.clone()
        })
    }

    async fn get_transfers_by_group(&self, group_id: GroupId) -> Result<Vec<Transfer>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT transfer_id, group_id, sender_id, receiver_id, amount_in_cents, created_at
             FROM sys_transfers WHERE group_id = ? ORDER BY transfer_id",
        )?;
        let transfers = stmt
            .query_map([group_id], row_to_transfer)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transfers)
    }
}
