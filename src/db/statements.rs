/// Every table the schema creates.
pub const TABLES: [&str; 5] = ["songs", "artists", "users", "time", "songplays"];

/// Operations the loader issues against the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    SongInsert,
    ArtistInsert,
    TimeInsert,
    UserUpsert,
    SongplayInsert,
    SongSelect,
}

/// Registry of every statement the loader runs.
///
/// Built once at startup and owned by the database handle, so no statement
/// text lives in shared global state.
#[derive(Debug, Clone)]
pub struct Statements {
    song_insert: &'static str,
    artist_insert: &'static str,
    time_insert: &'static str,
    user_upsert: &'static str,
    songplay_insert: &'static str,
    song_select: &'static str,
    create_tables: Vec<&'static str>,
    drop_tables: Vec<&'static str>,
}

impl Statements {
    pub fn new() -> Self {
        Statements {
            song_insert: "INSERT INTO songs (song_id, title, artist_id, year, duration)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (song_id) DO NOTHING",
            artist_insert: "INSERT INTO artists (artist_id, name, location, latitude, longitude)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (artist_id) DO NOTHING",
            time_insert: "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT (start_time) DO NOTHING",
            // a user's subscription tier changes over time, name and gender do not
            user_upsert: "INSERT INTO users (user_id, first_name, last_name, gender, level)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (user_id) DO UPDATE SET level = excluded.level",
            songplay_insert: "INSERT INTO songplays (
                    start_time, user_id, level, song_id, artist_id, session_id, location, user_agent
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            song_select: "SELECT songs.song_id, songs.artist_id
                FROM songs JOIN artists ON songs.artist_id = artists.artist_id
                WHERE songs.title = ?1 AND artists.name = ?2 AND songs.duration = ?3
                LIMIT 1",
            // dimension tables first, the fact table last
            create_tables: vec![
                "CREATE TABLE IF NOT EXISTS artists (
                    artist_id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    location TEXT,
                    latitude REAL,
                    longitude REAL
                )",
                "CREATE TABLE IF NOT EXISTS songs (
                    song_id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    artist_id TEXT NOT NULL
                        REFERENCES artists(artist_id) DEFERRABLE INITIALLY DEFERRED,
                    year INTEGER,
                    duration REAL NOT NULL
                )",
                "CREATE TABLE IF NOT EXISTS users (
                    user_id INTEGER PRIMARY KEY,
                    first_name TEXT,
                    last_name TEXT,
                    gender TEXT,
                    level TEXT NOT NULL
                )",
                "CREATE TABLE IF NOT EXISTS time (
                    start_time TEXT PRIMARY KEY,
                    hour INTEGER NOT NULL,
                    day INTEGER NOT NULL,
                    week INTEGER NOT NULL,
                    month INTEGER NOT NULL,
                    year INTEGER NOT NULL,
                    weekday TEXT NOT NULL
                )",
                "CREATE TABLE IF NOT EXISTS songplays (
                    songplay_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    start_time TEXT NOT NULL
                        REFERENCES time(start_time) DEFERRABLE INITIALLY DEFERRED,
                    user_id INTEGER NOT NULL
                        REFERENCES users(user_id) DEFERRABLE INITIALLY DEFERRED,
                    level TEXT NOT NULL,
                    song_id TEXT
                        REFERENCES songs(song_id) DEFERRABLE INITIALLY DEFERRED,
                    artist_id TEXT
                        REFERENCES artists(artist_id) DEFERRABLE INITIALLY DEFERRED,
                    session_id INTEGER NOT NULL,
                    location TEXT,
                    user_agent TEXT
                )",
                "CREATE INDEX IF NOT EXISTS songs_title_duration ON songs (title, duration)",
            ],
            drop_tables: vec![
                "DROP TABLE IF EXISTS songplays",
                "DROP TABLE IF EXISTS time",
                "DROP TABLE IF EXISTS users",
                "DROP TABLE IF EXISTS songs",
                "DROP TABLE IF EXISTS artists",
            ],
        }
    }

    pub fn get(&self, op: Op) -> &'static str {
        match op {
            Op::SongInsert => self.song_insert,
            Op::ArtistInsert => self.artist_insert,
            Op::TimeInsert => self.time_insert,
            Op::UserUpsert => self.user_upsert,
            Op::SongplayInsert => self.songplay_insert,
            Op::SongSelect => self.song_select,
        }
    }

    pub fn create_tables(&self) -> &[&'static str] {
        &self.create_tables
    }

    pub fn drop_tables(&self) -> &[&'static str] {
        &self.drop_tables
    }
}

impl Default for Statements {
    fn default() -> Self {
        Statements::new()
    }
}
