use crate::models::ResponseEntry;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Append-only record of assistant replies, mirrored to a JSON-lines file.
pub struct ResponseLog {
    path: PathBuf,
    entries: Mutex<Vec<ResponseEntry>>,
}

impl ResponseLog {
    /// Load any entries already on disk. A missing file starts an empty log.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path).await {
            Ok(contents) => parse_lines(&path, &contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                error!("Failed to read response log {}: {}", path.display(), e);
                Vec::new()
            }
        };

        if !entries.is_empty() {
            info!("📚 Loaded {} stored responses from {}", entries.len(), path.display());
        }

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub async fn record(&self, prompt: &str, response: &str, kind: &str) -> ResponseEntry {
        let now = Local::now();
        let mut entries = self.entries.lock().await;

        // Lines skipped on load can leave gaps, so continue past the highest id.
        let id = entries.iter().map(|entry| entry.id).max().unwrap_or(0) + 1;

        let entry = ResponseEntry {
            id,
            timestamp: now.to_rfc3339(),
            prompt: prompt.to_string(),
            response: response.to_string(),
            kind: kind.to_string(),
            session: now.format("%Y-%m-%d").to_string(),
        };

        if let Err(e) = self.append_line(&entry).await {
            error!("Failed to save response to file: {}", e);
        }

        entries.push(entry.clone());
        entry
    }

    async fn append_line(&self, entry: &ResponseEntry) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    pub async fn all(&self) -> Vec<ResponseEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn for_session(&self, date: NaiveDate) -> Vec<ResponseEntry> {
        let session = date.format("%Y-%m-%d").to_string();
        self.entries
            .lock()
            .await
            .iter()
            .filter(|entry| entry.session == session)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring match over prompt and response.
    pub async fn search(&self, query: &str) -> Vec<ResponseEntry> {
        let needle = query.to_lowercase();
        self.entries
            .lock()
            .await
            .iter()
            .filter(|entry| {
                entry.prompt.to_lowercase().contains(&needle)
                    || entry.response.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.clear();
        if let Err(e) = fs::write(&self.path, b"").await {
            error!("Failed to clear response file: {}", e);
        }
    }
}

fn parse_lines(path: &Path, contents: &str) -> Vec<ResponseEntry> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<ResponseEntry>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed line in {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sequential_entries_and_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.json");
        let log = ResponseLog::open(&path).await;

        let first = log.record("show portfolio", "📊 Portfolio Summary", "chat").await;
        let second = log.record("TCS price", "📈 Market Data Available", "chat").await;
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.session, Local::now().format("%Y-%m-%d").to_string());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        let parsed: ResponseEntry = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(parsed, first);
    }

    #[tokio::test]
    async fn reopening_restores_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.json");
        {
            let log = ResponseLog::open(&path).await;
            log.record("hello", "hi", "chat").await;
        }
        std::fs::write(&path, format!("{}not json\n", std::fs::read_to_string(&path).unwrap())).unwrap();

        let reopened = ResponseLog::open(&path).await;
        assert_eq!(reopened.all().await.len(), 1);
        assert_eq!(reopened.record("again", "hi", "chat").await.id, 2);
    }

    #[tokio::test]
    async fn corrupt_line_does_not_recycle_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.json");
        {
            let log = ResponseLog::open(&path).await;
            for prompt in ["one", "two", "three"] {
                log.record(prompt, "reply", "chat").await;
            }
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines: Vec<&str> = contents.lines().collect();
        lines[1] = "{broken";
        std::fs::write(&path, format!("{}\n", lines.join("\n"))).unwrap();

        let reopened = ResponseLog::open(&path).await;
        let next = reopened.record("four", "reply", "chat").await;
        assert_eq!(next.id, 4);

        let ids: Vec<usize> = reopened.all().await.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResponseLog::open(dir.path().join("responses.json")).await;
        log.record("RELIANCE price", "quotes available", "chat").await;
        log.record("portfolio", "Risk Level: High", "chat").await;

        assert_eq!(log.search("reliance").await.len(), 1);
        assert_eq!(log.search("risk level").await.len(), 1);
        assert_eq!(log.search("").await.len(), 2);
        assert!(log.search("nifty").await.is_empty());
    }

    #[tokio::test]
    async fn session_filter_uses_local_date() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResponseLog::open(dir.path().join("responses.json")).await;
        log.record("hi", "hello", "chat").await;

        assert_eq!(log.for_session(Local::now().date_naive()).await.len(), 1);
        let long_ago = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        assert!(log.for_session(long_ago).await.is_empty());
    }

    #[tokio::test]
    async fn clear_truncates_memory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.json");
        let log = ResponseLog::open(&path).await;
        log.record("hi", "hello", "chat").await;

        log.clear().await;
        assert!(log.all().await.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        assert_eq!(log.record("next", "reply", "chat").await.id, 1);
    }
}
