use clap::Parser;
use dotenvy::dotenv;
use log::{ error, info };
use sparkify_etl::cli::Args;
use sparkify_etl::db::{ DbError, SqliteDatabase, Statements };
use sparkify_etl::util::init_logging;
use sparkify_etl::workflow::run;

fn main() -> Result<(), DbError> {
    dotenv().ok();
    let args = Args::parse();
    init_logging(args.debug);

    let mut database = SqliteDatabase::open(&args.database, Statements::new())?;
    if args.reset {
        database.reset()?;
    } else {
        database.create_tables()?;
    }

    match run(&mut database, &args.song_data, &args.log_data, &args.extension) {
        Ok(stats) => {
            info!(
                "Load successful: {} song files and {} log files ({} play events) in {:.2} seconds",
                stats.songs.files_processed,
                stats.logs.files_processed,
                stats.logs.records,
                stats.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            error!("Load failed: {}", e);
            Err(e)
        }
    }
}
