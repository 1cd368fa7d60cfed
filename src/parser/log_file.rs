use crate::db::{ Database, DbError };
use crate::model::{ Songplay, TimeRow, User };
use super::{ json_lines, Transformer };
use chrono::{ DateTime, Utc };
use log::debug;
use serde::{ de, Deserialize, Deserializer };
use serde_json::Value;

/// Page value of the events that represent a song being played.
pub const PLAY_PAGE: &str = "NextSong";

/// A user activity event that played a song.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayEvent {
    /// Epoch milliseconds.
    pub ts: i64,
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: String,
    pub song: String,
    pub artist: String,
    pub length: f64,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

// userId shows up both as a number and as a numeric string
fn deserialize_user_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawUserId {
        Number(i64),
        Text(String),
    }

    match RawUserId::deserialize(deserializer)? {
        RawUserId::Number(id) => Ok(id),
        RawUserId::Text(text) =>
            text
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid userId '{}'", text))),
    }
}

impl PlayEvent {
    pub fn played_at(&self) -> Result<DateTime<Utc>, DbError> {
        DateTime::from_timestamp_millis(self.ts).ok_or_else(|| {
            format!("timestamp {} is out of range", self.ts).into()
        })
    }

    pub fn user(&self) -> User {
        User {
            user_id: self.user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender.clone(),
            level: self.level.clone(),
        }
    }
}

/// Keeps the play events of one log file, in file order.
pub fn play_events(content: &str) -> Result<Vec<PlayEvent>, DbError> {
    let mut events = Vec::new();
    for record in json_lines::<Value>(content) {
        let (line, value) = record?;
        if value.get("page").and_then(Value::as_str) != Some(PLAY_PAGE) {
            continue;
        }
        let event: PlayEvent = serde_json
            ::from_value(value)
            .map_err(|e| format!("line {}: {}", line, e))?;
        debug!("Play event: {:?}", event);
        events.push(event);
    }
    Ok(events)
}

pub struct LogFileTransformer;

impl Transformer for LogFileTransformer {
    fn name(&self) -> &'static str {
        "log"
    }

    fn transform(&self, db: &dyn Database, content: &str) -> Result<usize, DbError> {
        let events = play_events(content)?;
        let mut times = Vec::with_capacity(events.len());
        for event in &events {
            times.push(TimeRow::from_datetime(&event.played_at()?));
        }

        for time in &times {
            db.insert_time(time)?;
        }

        for event in &events {
            db.upsert_user(&event.user())?;
        }

        for (event, time) in events.iter().zip(&times) {
            let song = db.find_song(&event.song, &event.artist, event.length)?;
            if song.is_none() {
                debug!("No catalogued song for '{}' by '{}' ({})", event.song, event.artist, event.length);
            }
            db.insert_songplay(
                &(Songplay {
                    start_time: time.start_time.clone(),
                    user_id: event.user_id,
                    level: event.level.clone(),
                    song,
                    session_id: event.session_id,
                    location: event.location.clone(),
                    user_agent: event.user_agent.clone(),
                })
            )?;
        }
        Ok(events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = r#"{"artist":null,"auth":"Logged In","firstName":"Walter","gender":"M","itemInSession":0,"lastName":"Frye","length":null,"level":"free","location":"San Francisco-Oakland-Hayward, CA","method":"GET","page":"Home","registration":1540919166796.0,"sessionId":38,"song":null,"status":200,"ts":1541105830796,"userAgent":"Mozilla\/5.0","userId":"39"}
{"artist":"Des'ree","auth":"Logged In","firstName":"Kaylee","gender":"F","itemInSession":1,"lastName":"Summers","length":246.30812,"level":"free","location":"Phoenix-Mesa-Scottsdale, AZ","method":"PUT","page":"NextSong","registration":1540344794796.0,"sessionId":139,"song":"You Gotta Be","status":200,"ts":1541106106796,"userAgent":"Mozilla\/5.0","userId":"8"}
{"artist":null,"auth":"Logged Out","firstName":null,"gender":null,"itemInSession":2,"lastName":null,"length":null,"level":"free","location":null,"method":"GET","page":"Login","registration":null,"sessionId":139,"song":null,"status":200,"ts":1541106132796,"userAgent":null,"userId":""}
{"artist":"Mr Oizo","auth":"Logged In","firstName":"Kaylee","gender":"F","itemInSession":3,"lastName":"Summers","length":144.03873,"level":"free","location":"Phoenix-Mesa-Scottsdale, AZ","method":"PUT","page":"NextSong","registration":1540344794796.0,"sessionId":139,"song":"Flat 55","status":200,"ts":1541106352796,"userAgent":"Mozilla\/5.0","userId":8}"#;

    #[test]
    fn keeps_only_play_events() {
        let events = play_events(LOG).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].song, "You Gotta Be");
        assert_eq!(events[1].artist, "Mr Oizo");
    }

    #[test]
    fn user_id_accepts_string_and_number() {
        let events = play_events(LOG).unwrap();
        assert_eq!(events[0].user_id, 8);
        assert_eq!(events[1].user_id, 8);
    }

    #[test]
    fn non_numeric_user_id_fails() {
        let line = r#"{"page":"NextSong","ts":1,"userId":"abc","level":"free","song":"T","artist":"N","length":1.0,"sessionId":1}"#;
        let err = play_events(line).unwrap_err();
        assert!(err.to_string().contains("invalid userId"));
    }

    #[test]
    fn play_event_missing_song_fails_with_line() {
        let content = "{\"page\":\"Home\"}\n{\"page\":\"NextSong\",\"ts\":1,\"userId\":1,\"level\":\"free\"}";
        let err = play_events(content).unwrap_err();
        assert!(err.to_string().starts_with("line 2:"));
    }
}
