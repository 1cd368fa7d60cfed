pub mod sqlite;
pub mod statements;
pub use sqlite::SqliteDatabase;
pub use statements::{ Op, Statements, TABLES };
use crate::model::{ Artist, Song, SongRef, Songplay, TimeRow, User };
use std::error::Error;
pub type DbError = Box<dyn Error + Send + Sync>;

/// Write side of the schema, as seen by the transformers.
///
/// Conflict handling belongs to the implementation: songs, artists and time rows
/// are insert-or-skip, users overwrite only their level, songplays always append.
pub trait Database {
    fn insert_song(&self, song: &Song) -> Result<(), DbError>;

    fn insert_artist(&self, artist: &Artist) -> Result<(), DbError>;

    fn insert_time(&self, time: &TimeRow) -> Result<(), DbError>;

    fn upsert_user(&self, user: &User) -> Result<(), DbError>;

    fn insert_songplay(&self, songplay: &Songplay) -> Result<(), DbError>;

    /// Exact match on title, artist name and duration. `None` is a normal outcome.
    fn find_song(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64
    ) -> Result<Option<SongRef>, DbError>;
}
