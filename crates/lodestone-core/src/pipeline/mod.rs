//! Concurrent ingestion: one worker per source channel, one shared index.
//!
//! Each worker owns its own lexer, cooccurrence graph, embedder, and
//! keyphrase extractor (no sharing, no contention) and repeatedly distills
//! one window's worth of tokens into a [`crate::search::Document`] until a
//! per-channel byte budget is exhausted or the source signals end-of-data.
//! Only the index's insert critical section is serialized.

mod builder;
mod ingest;
mod progress;
mod source;

pub use builder::{DocumentBuilder, PipelineConfig};
pub use ingest::{run_ingest, IngestReport};
pub use progress::{ChannelReport, IngestProgress};
pub use source::{Message, MessageSource, StaticMessageSource};
