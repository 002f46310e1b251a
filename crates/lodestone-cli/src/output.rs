//! Result formatting for the query loop.

use anyhow::Result;
use chrono::DateTime;
use serde::Serialize;

use lodestone_core::search::SearchHit;

/// Formats hits for terminal display: timestamp, channel, score, and the
/// top keyphrases per hit.
pub fn format_human(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No hits for {query:?}.");
    }
    let mut out = format!("Found {} hit(s):\n", hits.len());
    for hit in hits {
        let doc = &hit.document;
        let phrases: Vec<String> = doc
            .phrases
            .iter()
            .chain(doc.keywords.iter())
            .take(3)
            .map(|p| format!("\"{}\"", p.display()))
            .collect();
        out.push_str(&format!(
            "{}; #{} ({:.3}): {}\n",
            format_timestamp(doc.created_at),
            doc.channel_id,
            hit.score,
            phrases.join(", ")
        ));
    }
    out.pop();
    out
}

#[derive(Serialize)]
struct JsonHit<'a> {
    id: u32,
    score: f32,
    channel: &'a str,
    timestamp: u64,
    phrases: Vec<String>,
    keywords: Vec<String>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    query: &'a str,
    hits: Vec<JsonHit<'a>>,
}

/// Formats hits as a JSON document.
pub fn format_json(query: &str, hits: &[SearchHit]) -> Result<String> {
    let hits = hits
        .iter()
        .map(|hit| JsonHit {
            id: hit.id.as_u32(),
            score: hit.score,
            channel: &hit.document.channel_id,
            timestamp: hit.document.created_at,
            phrases: hit.document.phrases.iter().map(|p| p.display()).collect(),
            keywords: hit.document.keywords.iter().map(|p| p.display()).collect(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&JsonOutput { query, hits })?)
}

fn format_timestamp(secs: u64) -> String {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|dt| dt.format("%b %d '%y %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestone_core::keyphrase::ScoredPhrase;
    use lodestone_core::search::{DocId, Document};

    fn hit() -> SearchHit {
        SearchHit {
            id: DocId::from_u32(1),
            score: 0.987,
            document: Document {
                created_at: 1700000000,
                channel_id: "general".to_string(),
                content_length: 64,
                embedding: vec![1.0, 0.0],
                phrases: vec![ScoredPhrase {
                    tokens: vec!["rust".to_string(), "compiler".to_string()],
                    score: 0.5,
                }],
                keywords: vec![ScoredPhrase {
                    tokens: vec!["rust".to_string()],
                    score: 0.25,
                }],
            },
        }
    }

    #[test]
    fn test_format_human_mentions_channel_and_phrases() {
        let out = format_human("rust", &[hit()]);
        assert!(out.contains("#general"));
        assert!(out.contains("\"rust compiler\""));
    }

    #[test]
    fn test_format_human_empty() {
        assert!(format_human("nothing", &[]).contains("No hits"));
    }

    #[test]
    fn test_format_json_round_trips() {
        let out = format_json("rust", &[hit()]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["query"], "rust");
        assert_eq!(parsed["hits"][0]["channel"], "general");
        assert_eq!(parsed["hits"][0]["phrases"][0], "rust compiler");
    }
}
