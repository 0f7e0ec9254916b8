use chrono::Local;
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// Append-only score history, keyed by (player count, round count). One row
/// per finished session; the highscore is the maximum ever recorded for a
/// key.
#[derive(Debug)]
pub struct ScoreDb {
    conn: Connection,
}

impl ScoreDb {
    /// Open the store at its default location, creating it if needed.
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("kreis_scores.db"));
        Self::open_at(&db_path)
    }

    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        Ok(ScoreDb { conn })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(ScoreDb { conn })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                players INTEGER NOT NULL,
                rounds INTEGER NOT NULL,
                score INTEGER NOT NULL,
                played_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scores_key ON scores(players, rounds)",
            [],
        )?;
        Ok(())
    }

    /// Record one finished session. Rows are never updated or deleted.
    pub fn append(&self, players: u32, rounds: u32, score: u32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO scores (players, rounds, score, played_at) VALUES (?1, ?2, ?3, ?4)",
            params![players, rounds, score, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Best score ever recorded for the key. An empty store is a highscore
    /// of 0, and malformed rows are skipped, never an error.
    pub fn max_score(&self, players: u32, rounds: u32) -> u32 {
        let mut stmt = match self
            .conn
            .prepare("SELECT score FROM scores WHERE players = ?1 AND rounds = ?2")
        {
            Ok(stmt) => stmt,
            Err(e) => {
                tracing::warn!(error = %e, "score query failed, treating highscore as 0");
                return 0;
            }
        };
        let rows = match stmt.query_map(params![players, rounds], |row| row.get::<_, i64>(0)) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "score query failed, treating highscore as 0");
                return 0;
            }
        };
        let mut best = 0u32;
        for row in rows {
            match row {
                Ok(score) if score >= 0 => best = best.max(score as u32),
                Ok(score) => tracing::warn!(score, "skipping negative score record"),
                Err(e) => tracing::warn!(error = %e, "skipping malformed score record"),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_reports_zero() {
        let db = ScoreDb::open_in_memory().unwrap();
        assert_eq!(db.max_score(4, 10), 0);
    }

    #[test]
    fn highscore_is_the_maximum_appended_for_the_key() {
        let db = ScoreDb::open_in_memory().unwrap();
        db.append(1, 2, 120).unwrap();
        assert_eq!(db.max_score(1, 2), 120);
        db.append(1, 2, 80).unwrap();
        assert_eq!(db.max_score(1, 2), 120);
        db.append(1, 2, 200).unwrap();
        assert_eq!(db.max_score(1, 2), 200);
    }

    #[test]
    fn keys_are_independent() {
        let db = ScoreDb::open_in_memory().unwrap();
        db.append(1, 2, 120).unwrap();
        db.append(4, 10, 55).unwrap();
        assert_eq!(db.max_score(1, 2), 120);
        assert_eq!(db.max_score(4, 10), 55);
        assert_eq!(db.max_score(2, 2), 0);
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let db = ScoreDb::open_in_memory().unwrap();
        db.append(1, 2, 90).unwrap();
        // sqlite's dynamic typing lets a stray writer store text in the
        // score column; aggregation must survive it
        db.conn
            .execute(
                "INSERT INTO scores (players, rounds, score, played_at) VALUES (1, 2, 'oops', 'x')",
                [],
            )
            .unwrap();
        db.conn
            .execute(
                "INSERT INTO scores (players, rounds, score, played_at) VALUES (1, 2, -7, 'x')",
                [],
            )
            .unwrap();
        assert_eq!(db.max_score(1, 2), 90);
    }

    #[test]
    fn on_disk_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("scores.db");
        {
            let db = ScoreDb::open_at(&path).unwrap();
            db.append(2, 5, 310).unwrap();
        }
        let db = ScoreDb::open_at(&path).unwrap();
        assert_eq!(db.max_score(2, 5), 310);
    }
}
