use std::fs;
use std::io::{ Cursor, Read, Result as IoResult };
use std::path::Path;
use encoding_rs::UTF_16LE;
use encoding_rs_io::DecodeReaderBytesBuilder;
use log::debug;

/// Reads a whole data file as text. UTF-16LE files are recognised by their BOM,
/// everything else must be UTF-8. A leading BOM never reaches the caller.
pub fn read_file_content<P: AsRef<Path>>(file_path: P) -> IoResult<String> {
    debug!("Reading file: {}", file_path.as_ref().display());
    let raw = fs::read(&file_path)?;
    if raw.starts_with(&[0xff, 0xfe]) {
        let mut decoder = DecodeReaderBytesBuilder::new()
            .encoding(Some(UTF_16LE))
            .bom_override(true)
            .build(Cursor::new(raw));

        let mut content = String::new();
        decoder.read_to_string(&mut content)?;
        match content.strip_prefix('\u{feff}') {
            Some(rest) => Ok(rest.to_string()),
            None => Ok(content),
        }
    } else {
        let raw = raw.strip_prefix(&[0xef, 0xbb, 0xbf]).map(<[u8]>::to_vec).unwrap_or(raw);
        String::from_utf8(raw).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

pub fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn")
    );
    if debug {
        builder.filter_module("sparkify_etl", log::LevelFilter::Debug);
    }
    builder.init();
}
