//! Shared test utilities for resolver testing.

use crate::tree::{Branch, Note, TreeCache};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Link `child` under `parent` with a branch id of `"{parent}_{child}"`.
pub fn link(cache: &TreeCache, parent: &str, child: &str) {
    cache.put_branch(Branch::new(
        &format!("{parent}_{child}"),
        parent,
        child,
    ));
}

/// A small live tree:
///
/// ```text
/// root
/// ├── book
/// │   └── chapter
/// │       └── section
/// └── scratch
///     └── chapter   (second placement)
/// ```
pub fn create_test_tree() -> TreeCache {
    init_logging();

    let cache = TreeCache::with_root();
    cache.put_note(Note::new("book", "Book"));
    cache.put_note(Note::new("chapter", "Chapter"));
    cache.put_note(Note::new("section", "Section"));
    cache.put_note(Note::new("scratch", "Scratch"));

    link(&cache, "root", "book");
    link(&cache, "root", "scratch");
    link(&cache, "book", "chapter");
    link(&cache, "scratch", "chapter");
    link(&cache, "chapter", "section");

    cache
}
