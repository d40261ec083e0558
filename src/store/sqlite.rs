use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{LudexError, Result};
use crate::domain::{BookmarkRecord, User};
use crate::store::Store;

const BOOKMARK_COLUMNS: &str = "item_id, owner_id, title, cover_image_url, rating, critic_score,
     release_date, playtime_hours, age_rating_name, description, website_url,
     platforms_json, genres_json, developers_json, publishers_json, bookmarked_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| LudexError::Storage(format!("migration failed: {}", e)))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(LudexError::poisoned)
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn user_from_row(row: &Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            password: row.get(3)?,
            created_at: row
                .get::<_, String>(4)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
        })
    }

    fn bookmark_from_row(row: &Row) -> rusqlite::Result<BookmarkRecord> {
        Ok(BookmarkRecord {
            item_id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            cover_image_url: row.get(3)?,
            rating: row.get(4)?,
            critic_score: row.get(5)?,
            release_date: row.get(6)?,
            playtime_hours: row.get(7)?,
            age_rating_name: row.get(8)?,
            description: row.get(9)?,
            website_url: row.get(10)?,
            platforms_json: row.get(11)?,
            genres_json: row.get(12)?,
            developers_json: row.get(13)?,
            publishers_json: row.get(14)?,
            bookmarked_at: row
                .get::<_, String>(15)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
        })
    }

    fn insert_bookmark(conn: &Connection, record: &BookmarkRecord) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO bookmarks ({}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                BOOKMARK_COLUMNS
            ),
            params![
                record.item_id,
                record.owner_id,
                record.title,
                record.cover_image_url,
                record.rating,
                record.critic_score,
                record.release_date,
                record.playtime_hours,
                record.age_rating_name,
                record.description,
                record.website_url,
                record.platforms_json,
                record.genres_json,
                record.developers_json,
                record.publishers_json,
                record.bookmarked_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn add_user(&self, user: &User) -> Result<Option<i64>> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (name, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.name,
                user.email,
                user.password,
                user.created_at.to_rfc3339()
            ],
        )?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(conn.last_insert_rowid()))
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT id, name, email, password, created_at FROM users WHERE id = ?1",
                params![id],
                Self::user_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn find_user(&self, email: &str, password: &str) -> Result<Option<User>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT id, name, email, password, created_at FROM users
                 WHERE email = ?1 AND password = ?2 LIMIT 1",
                params![email, password],
                Self::user_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn get_bookmark(&self, item_id: i64, owner_id: i64) -> Result<Option<BookmarkRecord>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!(
                    "SELECT {} FROM bookmarks WHERE item_id = ?1 AND owner_id = ?2 LIMIT 1",
                    BOOKMARK_COLUMNS
                ),
                params![item_id, owner_id],
                Self::bookmark_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn put_bookmark(&self, record: &BookmarkRecord) -> Result<()> {
        let conn = self.conn()?;
        Self::insert_bookmark(&conn, record)
    }

    fn delete_bookmark(&self, item_id: i64, owner_id: i64) -> Result<bool> {
        let conn = self.conn()?;

        let deleted = conn.execute(
            "DELETE FROM bookmarks WHERE item_id = ?1 AND owner_id = ?2",
            params![item_id, owner_id],
        )?;

        Ok(deleted > 0)
    }

    fn bookmark_exists(&self, item_id: i64, owner_id: i64) -> Result<bool> {
        let conn = self.conn()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE item_id = ?1 AND owner_id = ?2)",
            params![item_id, owner_id],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    fn bookmarks_for_owner(&self, owner_id: i64) -> Result<Vec<BookmarkRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bookmarks WHERE owner_id = ?1 ORDER BY bookmarked_at DESC, item_id",
            BOOKMARK_COLUMNS
        ))?;

        let records = stmt
            .query_map(params![owner_id], Self::bookmark_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn toggle_bookmark(&self, record: &BookmarkRecord) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE item_id = ?1 AND owner_id = ?2)",
            params![record.item_id, record.owner_id],
            |row| row.get(0),
        )?;

        if exists {
            tx.execute(
                "DELETE FROM bookmarks WHERE item_id = ?1 AND owner_id = ?2",
                params![record.item_id, record.owner_id],
            )?;
        } else {
            Self::insert_bookmark(&tx, record)?;
        }

        tx.commit()?;
        Ok(!exists)
    }
}
