use std::time::Duration;

use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Result};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::plant::{CareAction, PlantRecord};

pub const CURRENT_SCHEMA_VERSION: i64 = 1;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: [Migration; 1] = [Migration {
    version: 1,
    name: "baseline_plant_cache_v1",
    sql: r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS plant (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    plant_type TEXT NOT NULL,
    planting_date TEXT NOT NULL,
    watering_frequency TEXT NOT NULL,
    fertilizing_frequency TEXT NOT NULL,
    last_watered_date TEXT NOT NULL,
    last_fertilized_date TEXT NOT NULL,
    image BLOB
);

CREATE INDEX IF NOT EXISTS idx_plant_user_id ON plant(user_id);
CREATE INDEX IF NOT EXISTS idx_plant_user_type ON plant(user_id, plant_type);
"#,
}];

pub fn open_connection(path: &str) -> Result<Connection> {
    let mut conn = Connection::open(path)?;
    configure_for_speed(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

fn configure_for_speed(conn: &Connection) -> Result<()> {
    conn.pragma_update(None::<DatabaseName>, "journal_mode", "WAL")?;
    conn.pragma_update(None::<DatabaseName>, "synchronous", "NORMAL")?;
    conn.pragma_update(None::<DatabaseName>, "foreign_keys", "ON")?;
    conn.pragma_update(None::<DatabaseName>, "temp_store", "MEMORY")?;
    conn.pragma_update(None::<DatabaseName>, "busy_timeout", 5000i64)?;
    conn.busy_timeout(Duration::from_millis(5000))?;
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
);
"#,
    )?;

    for migration in MIGRATIONS {
        let already_applied: Option<i64> = tx
            .query_row(
                "SELECT version FROM schema_migrations WHERE version = ?1",
                params![migration.version],
                |row| row.get(0),
            )
            .optional()?;

        if already_applied.is_some() {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            params![migration.version, migration.name, now_utc_rfc3339()],
        )?;
    }

    tx.execute(
        r#"
INSERT INTO meta (key, value)
VALUES ('schema_version', ?1)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;

    tx.commit()
}

pub fn now_utc_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("RFC3339 formatting for UTC timestamp should never fail")
}

const PLANT_COLUMNS: &str = "id, user_id, name, plant_type, planting_date, \
     watering_frequency, fertilizing_frequency, \
     last_watered_date, last_fertilized_date, image";

pub fn insert_plant(conn: &Connection, record: &PlantRecord) -> Result<()> {
    conn.execute(
        r#"
INSERT INTO plant (
    id, user_id, name, plant_type, planting_date,
    watering_frequency, fertilizing_frequency,
    last_watered_date, last_fertilized_date, image
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
ON CONFLICT(id) DO UPDATE SET
    user_id = excluded.user_id,
    name = excluded.name,
    plant_type = excluded.plant_type,
    planting_date = excluded.planting_date,
    watering_frequency = excluded.watering_frequency,
    fertilizing_frequency = excluded.fertilizing_frequency,
    last_watered_date = excluded.last_watered_date,
    last_fertilized_date = excluded.last_fertilized_date,
    image = excluded.image
"#,
        params![
            record.id,
            record.user_id,
            record.name,
            record.plant_type,
            record.planting_date,
            record.watering_frequency,
            record.fertilizing_frequency,
            record.last_watered_date,
            record.last_fertilized_date,
            record.image,
        ],
    )?;
    Ok(())
}

fn record_from_row(row: &rusqlite::Row<'_>) -> Result<PlantRecord> {
    Ok(PlantRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        plant_type: row.get(3)?,
        planting_date: row.get(4)?,
        watering_frequency: row.get(5)?,
        fertilizing_frequency: row.get(6)?,
        last_watered_date: row.get(7)?,
        last_fertilized_date: row.get(8)?,
        image: row.get(9)?,
    })
}

pub fn get_plant(conn: &Connection, id: &str) -> Result<Option<PlantRecord>> {
    conn.query_row(
        &format!("SELECT {PLANT_COLUMNS} FROM plant WHERE id = ?1"),
        params![id],
        record_from_row,
    )
    .optional()
}

pub fn list_user_plants(conn: &Connection, user_id: &str) -> Result<Vec<PlantRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLANT_COLUMNS} FROM plant WHERE user_id = ?1 ORDER BY id ASC"
    ))?;
    let mut rows = stmt.query(params![user_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(record_from_row(row)?);
    }
    Ok(result)
}

pub fn delete_plant(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM plant WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn delete_user_plants(conn: &Connection, user_id: &str) -> Result<usize> {
    conn.execute("DELETE FROM plant WHERE user_id = ?1", params![user_id])
}

pub fn update_last_action(
    conn: &Connection,
    id: &str,
    action: CareAction,
    date: &str,
) -> Result<()> {
    let sql = match action {
        CareAction::Water => "UPDATE plant SET last_watered_date = ?2 WHERE id = ?1",
        CareAction::Fertilize => "UPDATE plant SET last_fertilized_date = ?2 WHERE id = ?1",
    };
    conn.execute(sql, params![id, date])?;
    Ok(())
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TypeCount {
    pub plant_type: String,
    pub count: i64,
}

pub fn count_by_type(conn: &Connection, user_id: &str) -> Result<Vec<TypeCount>> {
    let mut stmt = conn.prepare(
        r#"
SELECT plant_type, COUNT(*)
FROM plant
WHERE user_id = ?1
GROUP BY plant_type
ORDER BY plant_type ASC
"#,
    )?;
    let mut rows = stmt.query(params![user_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(TypeCount {
            plant_type: row.get(0)?,
            count: row.get(1)?,
        });
    }
    Ok(result)
}

pub fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        r#"
INSERT INTO meta (key, value)
VALUES (?1, ?2)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests;
