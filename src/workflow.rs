use crate::db::{ DbError, SqliteDatabase };
use crate::parser::{ process_file, LogFileTransformer, SongFileTransformer, Transformer };
use log::{ debug, info };
use std::path::{ Path, PathBuf };
use std::time::Instant;
use walkdir::WalkDir;

pub struct PhaseStats {
    pub files_found: usize,
    pub files_processed: usize,
    pub records: usize,
}

pub struct LoadStats {
    pub songs: PhaseStats,
    pub logs: PhaseStats,
    pub elapsed_seconds: f64,
}

/// Absolute paths of every file under `root` whose extension is `extension`.
pub fn collect_files<P: AsRef<Path>>(root: P, extension: &str) -> Result<Vec<PathBuf>, DbError> {
    let root = root.as_ref();
    let root = root.canonicalize().map_err(|e| {
        format!("Data directory '{}' is not readable: {}", root.display(), e)
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) == Some(extension) {
            files.push(entry.into_path());
        }
    }
    debug!("Collected {} '{}' files under {}", files.len(), extension, root.display());
    Ok(files)
}

/// Loads every matching file under `root`, one transaction per file.
pub fn process_data<P: AsRef<Path>>(
    db: &mut SqliteDatabase,
    root: P,
    extension: &str,
    transformer: &dyn Transformer
) -> Result<PhaseStats, DbError> {
    let root = root.as_ref();
    let files = collect_files(root, extension)?;
    let files_found = files.len();
    println!("{} files found in {}", files_found, root.display());

    let mut files_processed = 0;
    let mut records = 0;
    for path in &files {
        records += db.with_file_transaction(|tx| process_file(tx, path, transformer))?;
        files_processed += 1;
        println!("{}/{} files processed.", files_processed, files_found);
    }
    info!("Loaded {} {} records from {} files", records, transformer.name(), files_found);

    Ok(PhaseStats {
        files_found,
        files_processed,
        records,
    })
}

/// Song files first, since play events resolve against the songs and artists
/// they populate.
pub fn run<S: AsRef<Path>, L: AsRef<Path>>(
    db: &mut SqliteDatabase,
    song_root: S,
    log_root: L,
    extension: &str
) -> Result<LoadStats, DbError> {
    let start_time = Instant::now();
    let songs = process_data(db, song_root, extension, &SongFileTransformer)?;
    let logs = process_data(db, log_root, extension, &LogFileTransformer)?;

    Ok(LoadStats {
        songs,
        logs,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}
