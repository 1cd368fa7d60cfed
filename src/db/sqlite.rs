use log::{ debug, info, warn };
use rusqlite::{ params, Connection, OptionalExtension };
use std::path::Path;
use crate::model::{ Artist, Song, SongRef, Songplay, TimeRow, User };
use super::{ Database, DbError, Op, Statements, TABLES };

/// One connection held for the whole run, plus the statements it executes.
pub struct SqliteDatabase {
    conn: Connection,
    statements: Statements,
}

impl SqliteDatabase {
    pub fn open<P: AsRef<Path>>(path: P, statements: Statements) -> Result<Self, DbError> {
        let path = path.as_ref();
        info!("Opening database {}", path.display());
        let conn = Connection::open(path).map_err(|e| {
            format!("Could not open database '{}': {}", path.display(), e)
        })?;
        Self::from_connection(conn, statements)
    }

    pub fn open_in_memory(statements: Statements) -> Result<Self, DbError> {
        Self::from_connection(Connection::open_in_memory()?, statements)
    }

    fn from_connection(conn: Connection, statements: Statements) -> Result<Self, DbError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(SqliteDatabase { conn, statements })
    }

    pub fn create_tables(&self) -> Result<(), DbError> {
        for sql in self.statements.create_tables() {
            self.conn.execute(sql, [])?;
        }
        Ok(())
    }

    pub fn drop_tables(&self) -> Result<(), DbError> {
        for sql in self.statements.drop_tables() {
            self.conn.execute(sql, [])?;
        }
        Ok(())
    }

    pub fn reset(&self) -> Result<(), DbError> {
        info!("Dropping and recreating all tables");
        self.drop_tables()?;
        self.create_tables()
    }

    /// Runs `work` inside a transaction that covers exactly one input file.
    ///
    /// The transaction commits only when `work` succeeds; any error, including a
    /// deferred foreign key violation detected at commit, leaves no rows behind.
    pub fn with_file_transaction<T, F>(&mut self, work: F) -> Result<T, DbError>
        where F: FnOnce(&dyn Database) -> Result<T, DbError>
    {
        let tx = self.conn.transaction()?;
        let result = {
            let scope = FileScope { conn: &tx, statements: &self.statements };
            work(&scope)
        };
        match result {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!("Rollback failed after '{}': {}", e, rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Row count of one of the schema's tables; any other name is refused.
    pub fn count_rows(&self, table: &str) -> Result<usize, DbError> {
        if !TABLES.contains(&table) {
            return Err(format!("Unknown table '{}'", table).into());
        }
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table),
            [],
            |row| row.get(0)
        )?;
        Ok(count as usize)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

struct FileScope<'a> {
    conn: &'a Connection,
    statements: &'a Statements,
}

impl FileScope<'_> {
    fn execute<P: rusqlite::Params>(&self, op: Op, params: P) -> Result<usize, DbError> {
        let mut stmt = self.conn.prepare_cached(self.statements.get(op))?;
        Ok(stmt.execute(params)?)
    }
}

impl Database for FileScope<'_> {
    fn insert_song(&self, song: &Song) -> Result<(), DbError> {
        let inserted = self.execute(
            Op::SongInsert,
            params![song.song_id, song.title, song.artist_id, song.year, song.duration]
        )?;
        if inserted == 0 {
            debug!("Song {} already present, skipped", song.song_id);
        }
        Ok(())
    }

    fn insert_artist(&self, artist: &Artist) -> Result<(), DbError> {
        let inserted = self.execute(
            Op::ArtistInsert,
            params![artist.artist_id, artist.name, artist.location, artist.latitude, artist.longitude]
        )?;
        if inserted == 0 {
            debug!("Artist {} already present, skipped", artist.artist_id);
        }
        Ok(())
    }

    fn insert_time(&self, time: &TimeRow) -> Result<(), DbError> {
        self.execute(
            Op::TimeInsert,
            params![
                time.start_time,
                time.hour,
                time.day,
                time.week,
                time.month,
                time.year,
                time.weekday
            ]
        )?;
        Ok(())
    }

    fn upsert_user(&self, user: &User) -> Result<(), DbError> {
        self.execute(
            Op::UserUpsert,
            params![user.user_id, user.first_name, user.last_name, user.gender, user.level]
        )?;
        Ok(())
    }

    fn insert_songplay(&self, songplay: &Songplay) -> Result<(), DbError> {
        let (song_id, artist_id) = match &songplay.song {
            Some(song) => (Some(song.song_id.as_str()), Some(song.artist_id.as_str())),
            None => (None, None),
        };
        self.execute(
            Op::SongplayInsert,
            params![
                songplay.start_time,
                songplay.user_id,
                songplay.level,
                song_id,
                artist_id,
                songplay.session_id,
                songplay.location,
                songplay.user_agent
            ]
        )?;
        Ok(())
    }

    fn find_song(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64
    ) -> Result<Option<SongRef>, DbError> {
        let mut stmt = self.conn.prepare_cached(self.statements.get(Op::SongSelect))?;
        let found = stmt
            .query_row(params![title, artist_name, duration], |row| {
                Ok(SongRef {
                    song_id: row.get(0)?,
                    artist_id: row.get(1)?,
                })
            })
            .optional()?;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> SqliteDatabase {
        let db = SqliteDatabase::open_in_memory(Statements::new()).unwrap();
        db.create_tables().unwrap();
        db
    }

    fn user(level: &str, first_name: &str) -> User {
        User {
            user_id: 10,
            first_name: Some(first_name.to_string()),
            last_name: Some("L".to_string()),
            gender: Some("M".to_string()),
            level: level.to_string(),
        }
    }

    #[test]
    fn create_tables_is_idempotent() {
        let db = database();
        db.create_tables().unwrap();
        assert_eq!(db.count_rows("songplays").unwrap(), 0);
    }

    #[test]
    fn count_rows_refuses_unknown_tables() {
        let db = database();
        for table in TABLES {
            assert_eq!(db.count_rows(table).unwrap(), 0);
        }
        let err = db.count_rows("users; DROP TABLE songs").unwrap_err();
        assert!(err.to_string().contains("Unknown table"));
        assert_eq!(db.count_rows("songs").unwrap(), 0);
    }

    #[test]
    fn user_upsert_only_overwrites_level() {
        let mut db = database();
        db.with_file_transaction(|tx| tx.upsert_user(&user("free", "First"))).unwrap();
        db.with_file_transaction(|tx| tx.upsert_user(&user("paid", "Second"))).unwrap();

        let (first_name, level): (String, String) = db
            .connection()
            .query_row("SELECT first_name, level FROM users WHERE user_id = 10", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(first_name, "First");
        assert_eq!(level, "paid");
        assert_eq!(db.count_rows("users").unwrap(), 1);
    }

    #[test]
    fn failed_work_rolls_back_the_file() {
        let mut db = database();
        let result: Result<(), DbError> = db.with_file_transaction(|tx| {
            tx.upsert_user(&user("free", "F"))?;
            Err("malformed record".into())
        });
        assert!(result.is_err());
        assert_eq!(db.count_rows("users").unwrap(), 0);
    }

    #[test]
    fn song_without_artist_is_rejected_at_commit() {
        let mut db = database();
        let song = Song {
            song_id: "S1".to_string(),
            title: "T".to_string(),
            artist_id: "MISSING".to_string(),
            year: 2000,
            duration: 200.5,
        };
        assert!(db.with_file_transaction(|tx| tx.insert_song(&song)).is_err());
        assert_eq!(db.count_rows("songs").unwrap(), 0);
    }

    #[test]
    fn find_song_requires_exact_duration() {
        let mut db = database();
        db.with_file_transaction(|tx| {
            tx.insert_song(&Song {
                song_id: "S1".to_string(),
                title: "T".to_string(),
                artist_id: "A1".to_string(),
                year: 2000,
                duration: 200.5,
            })?;
            tx.insert_artist(&Artist {
                artist_id: "A1".to_string(),
                name: "N".to_string(),
                location: None,
                latitude: None,
                longitude: None,
            })
        }).unwrap();

        let hit = db.with_file_transaction(|tx| tx.find_song("T", "N", 200.5)).unwrap();
        assert_eq!(
            hit,
            Some(SongRef { song_id: "S1".to_string(), artist_id: "A1".to_string() })
        );
        let miss = db.with_file_transaction(|tx| tx.find_song("T", "N", 200.4)).unwrap();
        assert_eq!(miss, None);
    }
}
