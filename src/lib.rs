//! Orphan anchor and broken block-link detection for markdown vaults.
//!
//! A scan reads every document from a [`DocumentStore`], blanks out the parts
//! of the text where anchors and links must not be recognized, extracts
//! `^key` anchors and `[[Note#^key]]` / `[text](Note.md#^key)` references,
//! resolves each reference against the whole corpus and reports what is left
//! over on either side. All offsets in the [`Report`] point into the raw text
//! the store returned.

pub mod commands;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod extractor;
pub mod index;
pub mod info;
pub mod ranges;
pub mod reconciler;
pub mod report;
pub mod resolver;
pub mod sanitizer;
pub mod scan;
pub mod store;
pub mod structure;
pub mod types;
pub mod watch;

pub use config::Config;
pub use error::Error;
pub use report::{Defect, Location, Navigator, Report};
pub use scan::{ScanOptions, ScanState, Scanner, scan};
pub use store::{DocumentStore, FsStore, MemoryStore};
