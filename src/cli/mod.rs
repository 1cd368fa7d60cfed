use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Root directory holding the song metadata files
    #[arg(short = 's', long, env = "SONG_DATA", default_value = "data/song_data")]
    pub song_data: String,

    /// Root directory holding the user activity log files
    #[arg(short = 'l', long, env = "LOG_DATA", default_value = "data/log_data")]
    pub log_data: String,

    /// Path of the SQLite database file to load into
    #[arg(short = 'd', long, env = "DATABASE", default_value = "sparkify.db")]
    pub database: String,

    /// File extension collected from both data roots
    #[arg(short = 'e', long, env = "DATA_EXTENSION", default_value = "json")]
    pub extension: String,

    /// Drop every table before loading.
    /// Without this, tables are created only when missing and rows already
    /// present are kept (songs, artists and time are never overwritten).
    #[arg(long, default_value = "false")]
    pub reset: bool,

    /// Enable debug mode to log every parsed record
    #[arg(long, default_value = "false")]
    pub debug: bool,
}
