use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// admin listing never shows more than this many entries
pub const LIST_LIMIT: usize = 50;

const DEFAULT_MOVIES: [(&str, &str); 3] = [
    ("A123", "Бойцовский клуб"),
    ("B415", "Начало"),
    ("C777", "Матрица"),
];

/// trimmed, uppercased, non-empty movie code
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieCode(String);

impl MovieCode {
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            None
        } else {
            Some(Self(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type MovieMap = BTreeMap<MovieCode, String>;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
            StoreError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json(err)
    }
}

/// code -> title mapping backed by a JSON snapshot that is rewritten on every mutation.
///
/// The mutex covers both the in-memory map and the snapshot write, so readers never see
/// a half-applied mutation and two writers never interleave on disk.
pub struct MovieStore {
    path: PathBuf,
    movies: Mutex<MovieMap>,
}

impl MovieStore {
    /// loads the snapshot at `path`, falling back to the built-in movies
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let movies = Self::load(&path).await;
        info!(
            "Movie store ready with {} entries ({})",
            movies.len(),
            path.display()
        );
        Self {
            path,
            movies: Mutex::new(movies),
        }
    }

    pub fn default_movies() -> MovieMap {
        DEFAULT_MOVIES
            .iter()
            .filter_map(|(code, title)| MovieCode::parse(code).map(|code| (code, title.to_string())))
            .collect()
    }

    /// reads the snapshot; any failure yields the default movies, never a partial map
    pub async fn load(path: &Path) -> MovieMap {
        match Self::read_snapshot(path).await {
            Ok(Some(movies)) => movies,
            Ok(None) => {
                info!(
                    "No movie snapshot at {}, using default movies",
                    path.display()
                );
                Self::default_movies()
            }
            Err(e) => {
                warn!(
                    "Failed to load movie snapshot {}: {}, using default movies",
                    path.display(),
                    e
                );
                Self::default_movies()
            }
        }
    }

    async fn read_snapshot(path: &Path) -> Result<Option<MovieMap>, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let raw: BTreeMap<String, String> = serde_json::from_str(&content)?;
        let movies = raw
            .into_iter()
            .filter_map(|(code, title)| MovieCode::parse(&code).map(|code| (code, title)))
            .collect();
        Ok(Some(movies))
    }

    /// writes the whole map next to the snapshot and renames it into place
    async fn write_snapshot(path: &Path, movies: &MovieMap) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(movies)?;

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }

    /// persistence failures are logged; the in-memory map stays authoritative
    async fn save(&self, movies: &MovieMap) {
        if let Err(e) = Self::write_snapshot(&self.path, movies).await {
            warn!(
                "Failed to save movie snapshot {}: {}",
                self.path.display(),
                e
            );
        }
    }

    pub async fn get(&self, code: &str) -> Option<String> {
        let code = MovieCode::parse(code)?;
        let movies = self.movies.lock().await;
        movies.get(&code).cloned()
    }

    pub async fn put(&self, code: MovieCode, title: String) {
        let mut movies = self.movies.lock().await;
        info!("Storing movie {} -> {}", code, title);
        movies.insert(code, title);
        self.save(&movies).await;
    }

    pub async fn delete(&self, code: &str) -> Option<String> {
        let code = MovieCode::parse(code)?;
        let mut movies = self.movies.lock().await;
        let removed = movies.remove(&code);
        if let Some(title) = &removed {
            info!("Deleted movie {} ({})", code, title);
            self.save(&movies).await;
        }
        removed
    }

    /// first `limit` entries in code order
    pub async fn list_all(&self, limit: usize) -> Vec<(MovieCode, String)> {
        let movies = self.movies.lock().await;
        movies
            .iter()
            .take(limit)
            .map(|(code, title)| (code.clone(), title.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.movies.lock().await.len()
    }
}
