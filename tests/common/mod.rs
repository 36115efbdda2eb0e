//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use arbor_core::content::Attachment;
use arbor_core::tree::{Branch, Note, TreeCache};

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A small library: root → notes → report (a file note with content and one
/// attachment).
///
/// Returns the shared cache; branch ids follow `"{parent}_{child}"`.
#[allow(dead_code)]
pub fn create_test_library() -> TreeCache {
    init_logging();

    let cache = TreeCache::with_root();
    cache.put_note(Note::new("notes", "Notes"));
    cache.put_note(Note::new("report", "Quarterly Report").with_mime("text/markdown"));
    cache.put_branch(Branch::new("root_notes", "root", "notes"));
    cache.put_branch(Branch::new("notes_report", "notes", "report"));
    cache.put_attachment(Attachment::new(
        "att1",
        "report",
        "figures",
        "image/png",
    ));
    cache
}
