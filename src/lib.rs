//! # qlacref-postcodes
//!
//! UK postcode reference data (postcode → OS grid coordinates + local
//! authority code) shipped as a set of small compressed files that can be
//! queried without a database server:
//! - Columnar partitions, one per leading postcode character
//! - MessagePack payloads under a single brotli pass
//! - Lazy loading: only the partitions a caller asks for are read
//! - Normalised prefix search over resident rows
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Bulk source extract (.zip)                   │
//! │                 └── NSPL_..._UK.csv                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   PartitionWriter                            │
//! │        (column mapping → group by first character)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  codec::encode
//!                       ▼
//!            postcodes_A.msgpack.br  postcodes_B.msgpack.br  ...
//!                       │  codec::decode (on demand)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   PostcodeStore                              │
//! │        (loaded keys + table, single loader / many readers)   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!                 query(prefix) → Vec<Record>
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use qlacref_postcodes::PostcodeStore;
//!
//! let store = PostcodeStore::open(None)?;
//! store.load(['A']);
//! for record in store.query("ab1 2") {
//!     println!("{} {:?}", record.postcode, record.local_authority_code);
//! }
//! # Ok::<(), qlacref_postcodes::PostcodeError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod schema;
pub mod codec;
pub mod writer;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{PostcodeError, Result};
pub use config::Config;
pub use schema::{normalize_postcode, Record};
pub use codec::ColumnBatch;
pub use writer::{PartitionManifest, PartitionWriter};
pub use store::{LoadReport, PartitionOutcome, PostcodeStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of qlacref-postcodes
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
