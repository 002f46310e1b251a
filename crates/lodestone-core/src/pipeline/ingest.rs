//! Worker orchestration over the shared index.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::builder::{DocumentBuilder, PipelineConfig};
use super::progress::{ChannelReport, IngestProgress};
use super::source::MessageSource;
use crate::error::EmbedError;
use crate::keyphrase::StopWords;
use crate::search::SemanticIndex;

/// Aggregate outcome of one ingest run.
#[derive(Debug)]
pub struct IngestReport {
    /// Per-channel worker reports.
    pub channels: Vec<ChannelReport>,
}

impl IngestReport {
    /// Documents indexed across all channels.
    pub fn total_documents(&self) -> usize {
        self.channels.iter().map(|c| c.documents_indexed).sum()
    }

    /// Bytes consumed across all channels.
    pub fn total_bytes(&self) -> usize {
        self.channels.iter().map(|c| c.bytes_consumed).sum()
    }

    /// Channels whose worker aborted on a source error.
    pub fn failed_channels(&self) -> impl Iterator<Item = &ChannelReport> {
        self.channels.iter().filter(|c| c.error.is_some())
    }
}

/// Ingests every source into the shared index, one worker task per channel.
///
/// A counting semaphore caps simultaneously active workers at
/// `cfg.max_workers` to bound concurrent resource usage. Workers share
/// nothing but the index; a worker that errors aborts only itself, and the
/// run always returns a report for every channel.
pub async fn run_ingest(
    index: Arc<SemanticIndex>,
    sources: Vec<Box<dyn MessageSource>>,
    cfg: PipelineConfig,
) -> IngestReport {
    let semaphore = Arc::new(Semaphore::new(cfg.max_workers.max(1)));
    let mut workers = JoinSet::new();
    let channel_count = sources.len();
    for source in sources {
        let index = Arc::clone(&index);
        let cfg = cfg.clone();
        let semaphore = Arc::clone(&semaphore);
        workers.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("ingest semaphore closed");
            ingest_channel(index, cfg, source).await
        });
    }

    let mut channels = Vec::with_capacity(channel_count);
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(report) => channels.push(report),
            Err(err) => warn!(%err, "ingest worker panicked"),
        }
    }
    let report = IngestReport { channels };
    info!(
        channels = report.channels.len(),
        documents = report.total_documents(),
        bytes = report.total_bytes(),
        "ingest complete"
    );
    report
}

/// Drains one channel: repeatedly distills a window into a document and
/// inserts it, until the byte budget is exhausted or the source ends.
#[instrument(skip_all, fields(channel = %source.channel_id()))]
async fn ingest_channel(
    index: Arc<SemanticIndex>,
    cfg: PipelineConfig,
    mut source: Box<dyn MessageSource>,
) -> ChannelReport {
    let channel_id = source.channel_id().to_string();
    let mut report = ChannelReport {
        channel_id: channel_id.clone(),
        documents_indexed: 0,
        bytes_consumed: 0,
        exhausted: false,
        error: None,
    };
    let stops = StopWords::nltk();

    while report.bytes_consumed < cfg.byte_budget {
        let mut builder =
            DocumentBuilder::new(&cfg, index.store(), index.induction(), stops.clone());
        let mut timestamp = 0;

        while !builder.is_complete() {
            match source.next().await {
                Ok(Some(message)) => {
                    timestamp = message.timestamp;
                    builder.push_text(&message.content);
                }
                Ok(None) => {
                    // partial window at end-of-source is discarded
                    report.exhausted = true;
                    report.bytes_consumed += builder.bytes_consumed();
                    return report;
                }
                Err(err) => {
                    warn!(%err, "source failed; aborting this worker only");
                    report.error = Some(err);
                    report.bytes_consumed += builder.bytes_consumed();
                    return report;
                }
            }
        }

        report.bytes_consumed += builder.bytes_consumed();
        match builder.finalize(&channel_id, timestamp) {
            Ok(document) => match index.insert(document) {
                Ok(id) => {
                    report.documents_indexed += 1;
                    let progress = IngestProgress {
                        bytes_consumed: report.bytes_consumed,
                        byte_budget: cfg.byte_budget,
                        documents_indexed: report.documents_indexed,
                    };
                    debug!(
                        id = id.as_u32(),
                        percent = progress.percent_complete(),
                        "indexed document"
                    );
                }
                Err(err) => warn!(%err, "insert failed; document dropped"),
            },
            // a window with no in-vocabulary token has no vector to index
            Err(EmbedError::EmptyAccumulator) => {
                debug!("window produced no embedding; skipped");
            }
        }
    }
    report
}
