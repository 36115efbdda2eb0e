//! # arbor-core
//!
//! Library core for a personal knowledge base in which a note may be placed
//! under multiple parents. Its centerpiece is **note-path resolution and
//! repair**: turning a possibly stale hierarchical path string into a
//! verified, currently live sequence of note identifiers, substituting a
//! canonical alternate path at the first broken link.
//!
//! ## Overview
//!
//! A note path is one concrete root-to-note walk through a specific chain of
//! parent-child branches. Because notes get moved and cloned, bookmarked
//! paths go stale while the notes themselves survive; [`paths::PathResolver`]
//! rebinds such a walk at the first point of divergence instead of failing
//! outright, using the canonical-path ranking (hoisted subtree first, then
//! paths free of saved-search and archived ancestors, then the shortest) as
//! the substitute.
//!
//! ## Architecture
//!
//! - **[`paths`]**: path resolution, repair, and canonical-path ranking
//! - **[`tree`]**: the in-memory note/branch graph ([`tree::TreeCache`]) and
//!   the [`tree::NoteSource`] read seam the resolver consumes
//! - **[`content`]**: note/attachment content services: uploads, downloads,
//!   partial-content streaming and the external-editor temp-file round trip
//! - **[`workspace`]**: note contexts, homepage opening, open-note handling
//! - **[`shell`]**: injected platform capability (browser no-op vs desktop)
//! - **[`event`]**: broadcast notification channel between components
//! - **[`config`]**: injected user options provider
//! - **[`meta`]**: static application/version metadata
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_core::paths::PathResolver;
//! use arbor_core::tree::{Branch, Note, TreeCache, ROOT_NOTE_ID};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let cache = TreeCache::with_root();
//!     cache.put_note(Note::new("book", "Book"));
//!     cache.put_branch(Branch::new("b1", ROOT_NOTE_ID, "book"));
//!
//!     let resolver = PathResolver::new(cache);
//!     let path = resolver.resolve_path("root/book", ROOT_NOTE_ID).await;
//!     assert_eq!(path.as_deref(), Some("root/book"));
//! }
//! ```
//!
//! ## Error Handling
//!
//! Resolution failures (missing notes, notes with no parents, malformed
//! input) are converted locally into `None` results plus best-effort
//! diagnostics; they never surface as faults. Service operations return
//! [`ArborError`], which maps onto HTTP status codes via
//! [`ArborError::status_code`] for the transport layer.
//!
//! ## Features
//!
//! - **default**: library with the no-op browser shell
//! - **desktop**: window raising and notify-backed temp-file watching

pub mod config;
pub mod content;
pub mod error;
pub mod event;
pub mod meta;
pub mod paths;
pub mod shell;
#[cfg(test)]
mod tests;
pub mod tree;
pub mod workspace;

pub use error::*;
