//! JSONL chat-export reader.
//!
//! One JSON object per line: `{"channel": "...", "timestamp": 1700000000,
//! "content": "..."}`. Messages are grouped into one source per channel,
//! preserving line order within each channel.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use lodestone_core::pipeline::{Message, StaticMessageSource};

#[derive(Debug, Deserialize)]
struct ExportRecord {
    channel: String,
    timestamp: u64,
    content: String,
}

/// Reads the export at `path` into one message source per channel.
///
/// Channels come back in lexicographic order so runs are reproducible.
pub fn load_export(path: impl AsRef<Path>) -> Result<Vec<StaticMessageSource>> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let mut channels: BTreeMap<String, Vec<Message>> = BTreeMap::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ExportRecord = serde_json::from_str(&line)
            .with_context(|| format!("line {}: malformed export record", lineno + 1))?;
        channels.entry(record.channel.clone()).or_default().push(Message {
            content: record.content,
            channel_id: record.channel,
            timestamp: record.timestamp,
        });
    }
    Ok(channels
        .into_iter()
        .map(|(channel, messages)| StaticMessageSource::new(channel, messages))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestone_core::pipeline::MessageSource;
    use std::io::Write;

    #[test]
    fn test_load_export_groups_by_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.jsonl");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"channel": "b", "timestamp": 2, "content": "second channel"}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"channel": "a", "timestamp": 1, "content": "first message"}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"channel": "a", "timestamp": 3, "content": "second message"}}"#
        )
        .unwrap();
        drop(file);

        let sources = load_export(&path).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].channel_id(), "a");
        assert_eq!(sources[0].remaining(), 2);
        assert_eq!(sources[1].channel_id(), "b");
        assert_eq!(sources[1].remaining(), 1);
    }

    #[test]
    fn test_malformed_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.jsonl");
        std::fs::write(&path, "not json\n").unwrap();
        assert!(load_export(&path).is_err());
    }
}
