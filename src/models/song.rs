use serde::{Deserialize, Serialize};

use super::{ValidationError, optional_text, required_text};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_ARTIST_LEN: usize = 200;
pub const MAX_GENRE_LEN: usize = 50;
pub const MIN_YEAR: i32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: i32,
    pub owner_id: i32,
    /// Username of the owner.
    pub owner: String,
    pub title: String,
    pub artist: String,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub play_count: i32,
    pub last_played_at: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl std::fmt::Display for Song {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} by {}", self.title, self.artist)?;
        if let Some(year) = self.year {
            write!(f, " ({year})")?;
        }
        if let Some(genre) = &self.genre {
            write!(f, " [{genre}]")?;
        }
        Ok(())
    }
}

/// Missing fields deserialize as empty and fail validation as a 400.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

impl NewSong {
    pub fn normalized(self, current_year: i32) -> Result<Self, ValidationError> {
        Ok(Self {
            title: required_text("Title", &self.title, MAX_TITLE_LEN)?,
            artist: required_text("Artist", &self.artist, MAX_ARTIST_LEN)?,
            genre: optional_text("Genre", self.genre, MAX_GENRE_LEN)?,
            year: self
                .year
                .map(|y| validate_year(y, current_year))
                .transpose()?,
        })
    }
}

/// Partial update; `None` leaves the stored value untouched.
///
/// `genre` distinguishes an absent field (`None`) from a clear request
/// (`Some(None)`), which is what a JSON `null` or a blank string becomes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongChanges {
    pub title: Option<String>,
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub genre: Option<Option<String>>,
    pub year: Option<i32>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl SongChanges {
    pub fn normalized(self, current_year: i32) -> Result<Self, ValidationError> {
        let changes = Self {
            title: self
                .title
                .map(|t| required_text("Title", &t, MAX_TITLE_LEN))
                .transpose()?,
            artist: self
                .artist
                .map(|a| required_text("Artist", &a, MAX_ARTIST_LEN))
                .transpose()?,
            genre: self
                .genre
                .map(|g| optional_text("Genre", g, MAX_GENRE_LEN))
                .transpose()?,
            year: self
                .year
                .map(|y| validate_year(y, current_year))
                .transpose()?,
        };

        if changes.is_empty() {
            return Err(ValidationError::new("No updates provided"));
        }
        Ok(changes)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.genre.is_none() && self.year.is_none()
    }
}

pub fn validate_year(year: i32, current_year: i32) -> Result<i32, ValidationError> {
    if year > current_year {
        return Err(ValidationError::new(format!(
            "Year cannot be in the future (current year: {current_year})"
        )));
    }
    if year < MIN_YEAR {
        return Err(ValidationError::new(format!(
            "Year must be {MIN_YEAR} or later"
        )));
    }
    Ok(year)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatBucket {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SongStats {
    pub user: String,
    pub total_songs: usize,
    pub genres: Vec<StatBucket>,
    pub years: Vec<StatBucket>,
    pub artists: Vec<StatBucket>,
}

impl SongStats {
    #[must_use]
    pub fn from_songs(user: &str, songs: &[Song]) -> Self {
        Self {
            user: user.to_string(),
            total_songs: songs.len(),
            genres: tally(songs.iter().map(|s| {
                s.genre.clone().unwrap_or_else(|| "Unknown".to_string())
            })),
            years: tally(
                songs
                    .iter()
                    .map(|s| s.year.map_or_else(|| "Unknown".to_string(), |y| y.to_string())),
            ),
            artists: tally(songs.iter().map(|s| s.artist.clone())),
        }
    }
}

/// Counts occurrences, most frequent first, ties broken by name.
fn tally(names: impl Iterator<Item = String>) -> Vec<StatBucket> {
    let mut counts = std::collections::HashMap::<String, u64>::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }

    let mut buckets: Vec<StatBucket> = counts
        .into_iter()
        .map(|(name, count)| StatBucket { name, count })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str, artist: &str, genre: Option<&str>, year: Option<i32>) -> Song {
        Song {
            id: 1,
            owner_id: 1,
            owner: "alice".to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            genre: genre.map(ToString::to_string),
            year,
            play_count: 0,
            last_played_at: None,
            created_at: String::new(),
            updated_at: None,
        }
    }

    #[test]
    fn test_new_song_trims_and_drops_blank_genre() {
        let input = NewSong {
            title: "  Bohemian Rhapsody ".to_string(),
            artist: "Queen".to_string(),
            genre: Some("   ".to_string()),
            year: Some(1975),
        };
        let song = input.normalized(2025).unwrap();
        assert_eq!(song.title, "Bohemian Rhapsody");
        assert_eq!(song.genre, None);
        assert_eq!(song.year, Some(1975));
    }

    #[test]
    fn test_new_song_rejects_empty_title() {
        let input = NewSong {
            title: "   ".to_string(),
            artist: "Queen".to_string(),
            ..Default::default()
        };
        let err = input.normalized(2025).unwrap_err();
        assert!(err.0.contains("Title"));
    }

    #[test]
    fn test_year_bounds() {
        assert!(validate_year(2025, 2025).is_ok());
        assert!(validate_year(2026, 2025).is_err());
        assert!(validate_year(999, 2025).is_err());
    }

    #[test]
    fn test_changes_require_a_field() {
        let err = SongChanges::default().normalized(2025).unwrap_err();
        assert_eq!(err.0, "No updates provided");

    }

    #[test]
    fn test_blank_genre_clears() {
        let changes = SongChanges {
            genre: Some(Some(" ".to_string())),
            ..Default::default()
        };
        assert_eq!(changes.normalized(2025).unwrap().genre, Some(None));

        let changes: SongChanges = serde_json::from_str(r#"{"genre": null}"#).unwrap();
        assert_eq!(changes.genre, Some(None));

        let changes: SongChanges = serde_json::from_str(r#"{"year": 1999}"#).unwrap();
        assert_eq!(changes.genre, None);
    }

    #[test]
    fn test_changes_reject_blank_artist() {
        let changes = SongChanges {
            artist: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(changes.normalized(2025).is_err());
    }

    #[test]
    fn test_stats_ordering() {
        let songs = vec![
            song("A", "Queen", Some("Rock"), Some(1975)),
            song("B", "Queen", Some("Rock"), Some(1977)),
            song("C", "Eagles", None, Some(1976)),
        ];
        let stats = SongStats::from_songs("alice", &songs);

        assert_eq!(stats.total_songs, 3);
        assert_eq!(
            stats.artists[0],
            StatBucket {
                name: "Queen".to_string(),
                count: 2
            }
        );
        assert_eq!(stats.genres[0].name, "Rock");
        assert_eq!(stats.genres[1].name, "Unknown");
        assert_eq!(stats.years.len(), 3);
        assert_eq!(stats.years[0].name, "1975");
    }

    #[test]
    fn test_display() {
        let s = song("Hotel California", "Eagles", Some("Rock"), Some(1976));
        assert_eq!(s.to_string(), "Hotel California by Eagles (1976) [Rock]");
    }
}
