//! Production configuration constants.
//!
//! These values define the default shape of the indexing pipeline and the
//! ANN index. They are referenced throughout the codebase and in tests to
//! keep the two in agreement.

// =============================================================================
// Windowing
// =============================================================================

/// Sliding context window width, in tokens.
///
/// This is the window that feeds cooccurrence accumulation, adjoint-triple
/// detection, and OOV induction. Counter increments are normalized by this
/// value (1/span per unigram, 1/(span-1) per succession pair).
pub const CONTEXT_SPAN: usize = 5;

/// Tokens consumed per document window.
///
/// The count-bounded lexer stops a document once this many sanitized tokens
/// have been accepted. One `Document` is finalized per completed window.
pub const DOC_SPAN: usize = 512;

/// Maximum tokens per keyphrase before the phrase buffer is forcibly closed.
pub const NGRAM_CAP: usize = 5;

// =============================================================================
// Centrality (power iteration)
// =============================================================================

/// Damping factor for the teleport blend. Clamped to [0, 1] at use.
pub const DAMPING: f64 = 0.15;

/// Convergence threshold on the sum of squared componentwise deltas.
pub const CONVERGENCE_EPSILON: f64 = 1e-3;

/// Safety cap on power-iteration rounds.
///
/// Convergence is the normal exit; the cap guarantees termination on
/// pathological affinity matrices.
pub const MAX_POWER_ITERATIONS: usize = 1000;

// =============================================================================
// ANN index
// =============================================================================

/// HNSW bidirectional links per node at layers > 0.
pub const HNSW_M: usize = 32;

/// HNSW links at layer 0. Standard practice is 2*M.
pub const HNSW_M0: usize = 64;

/// HNSW construction-time search width.
pub const EF_CONSTRUCTION: usize = 256;

/// HNSW query-time search width, capped by ledger size for small ledgers.
pub const EF_SEARCH: usize = 64;

/// Initial ledger capacity hint. Doubles whenever occupancy would reach
/// [`GROWTH_THRESHOLD`].
pub const INITIAL_CAPACITY: usize = 1024;

/// Occupancy fraction that triggers capacity doubling before an insert.
pub const GROWTH_THRESHOLD: f64 = 0.8;

// =============================================================================
// Ingestion
// =============================================================================

/// Maximum concurrently active ingest workers.
pub const MAX_WORKERS: usize = 32;
