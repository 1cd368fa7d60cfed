use crate::db::{ Database, DbError };
use crate::model::{ Artist, Song };
use super::{ json_lines, Transformer };
use log::{ debug, warn };
use serde::{ de, Deserialize, Deserializer };

/// One song metadata record, as found in the song data files.
#[derive(Debug, Clone, Deserialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    #[serde(deserialize_with = "deserialize_year")]
    pub year: i32,
    pub duration: f64,
    pub artist_name: String,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

// some exports write the year as a float, e.g. 2000.0
fn deserialize_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Integer(i64),
        Float(f64),
    }

    let year = match RawYear::deserialize(deserializer)? {
        RawYear::Integer(year) => year,
        RawYear::Float(year) if year.fract() == 0.0 && year.is_finite() => year as i64,
        RawYear::Float(year) => {
            return Err(de::Error::custom(format!("year {} is not a whole number", year)));
        }
    };
    i32::try_from(year).map_err(|_| de::Error::custom(format!("year {} is out of range", year)))
}

impl SongRecord {
    pub fn song(&self) -> Song {
        Song {
            song_id: self.song_id.clone(),
            title: self.title.clone(),
            artist_id: self.artist_id.clone(),
            year: self.year,
            duration: self.duration,
        }
    }

    pub fn artist(&self) -> Artist {
        Artist {
            artist_id: self.artist_id.clone(),
            name: self.artist_name.clone(),
            location: self.artist_location.clone(),
            latitude: self.artist_latitude,
            longitude: self.artist_longitude,
        }
    }
}

pub struct SongFileTransformer;

impl Transformer for SongFileTransformer {
    fn name(&self) -> &'static str {
        "song"
    }

    fn transform(&self, db: &dyn Database, content: &str) -> Result<usize, DbError> {
        let mut records = json_lines::<SongRecord>(content);
        let (_, record) = records.next().ok_or("no song record found")??;
        if records.next().is_some() {
            warn!("Song file holds more than one record, only '{}' is loaded", record.song_id);
        }
        debug!("Song record: {:?}", record);

        db.insert_song(&record.song())?;
        db.insert_artist(&record.artist())?;
        Ok(1)
    }
}
