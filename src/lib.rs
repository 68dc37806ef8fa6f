//! `ipv4-cardinality` counts distinct IPv4 addresses in a large line-delimited source.
//!
//! Instead of a hash set whose memory grows with the number of distinct values, it keeps a
//! fixed 512 MiB presence bitmap covering the whole IPv4 address space and makes a single
//! pass over the input. Every insert is O(1) and the result is exact.
//!
//! ```no_run
//! use ipv4_cardinality::count_distinct;
//!
//! let report = count_distinct(&b"1.2.3.4\n1.2.3.4\n1.2.3.5\n"[..]).unwrap();
//! assert_eq!(report.distinct, 2);
//! ```
pub mod address;
pub mod address_set;
pub mod error;
pub mod lines;
pub mod pipeline;
mod popcount;
pub mod progress;
#[cfg(feature = "with_serde")]
mod serde;
pub mod source;

pub use address::{parse_address, AddressKey, MalformedAddress};
pub use address_set::AddressSet;
pub use error::{Error, Result};
pub use pipeline::{count_distinct, IngestConfig, IngestionPipeline, RunReport, RunStatistics};
pub use progress::{LogProgress, Progress, ProgressSink, Silent};
