//! Tests for canonical-path selection, one tie-break level at a time.

use super::helpers::*;
use crate::{
    paths::PathResolver,
    tree::{Note, NoteFlag, NoteType, TreeCache, ROOT_NOTE_ID},
};

fn resolver_over(cache: &TreeCache) -> PathResolver<TreeCache> {
    PathResolver::new(cache.clone())
}

#[test_log::test]
fn hoisted_subtree_beats_shorter_outside_path() {
    init_logging();
    let cache = TreeCache::with_root();
    cache.put_note(Note::new("hoist", "Hoist"));
    cache.put_note(Note::new("a", "A"));
    cache.put_note(Note::new("b", "B"));
    cache.put_note(Note::new("n", "N"));
    link(&cache, "root", "hoist");
    link(&cache, "hoist", "a");
    link(&cache, "a", "n");
    link(&cache, "root", "b");
    link(&cache, "b", "n");

    let resolver = resolver_over(&cache);
    let note = cache.note("n").unwrap();

    // Hoisted at "hoist", the longer in-subtree path wins.
    assert_eq!(
        resolver.pick_canonical_path_segments(&note, "hoist"),
        vec!["root", "hoist", "a", "n"]
    );
    // Hoisted at root both qualify, so length decides.
    assert_eq!(
        resolver.pick_canonical_path_segments(&note, ROOT_NOTE_ID),
        vec!["root", "b", "n"]
    );
}

#[test_log::test]
fn paths_through_search_ancestors_lose() {
    init_logging();
    let cache = TreeCache::with_root();
    // Alphabetically first so the ranking, not insertion order, must demote it.
    cache.put_note(Note::new("a_search", "Saved Search").with_kind(NoteType::Search));
    cache.put_note(Note::new("c", "C"));
    cache.put_note(Note::new("n", "N"));
    link(&cache, "root", "a_search");
    link(&cache, "root", "c");
    link(&cache, "a_search", "n");
    link(&cache, "c", "n");

    let resolver = resolver_over(&cache);
    let note = cache.note("n").unwrap();
    assert_eq!(
        resolver.pick_canonical_path_segments(&note, ROOT_NOTE_ID),
        vec!["root", "c", "n"]
    );
}

#[test_log::test]
fn paths_through_archived_ancestors_lose() {
    init_logging();
    let cache = TreeCache::with_root();
    cache.put_note(Note::new("a_arch", "Archive").with_flag(NoteFlag::Archived));
    cache.put_note(Note::new("c", "C"));
    cache.put_note(Note::new("n", "N"));
    link(&cache, "root", "a_arch");
    link(&cache, "root", "c");
    link(&cache, "a_arch", "n");
    link(&cache, "c", "n");

    let resolver = resolver_over(&cache);
    let note = cache.note("n").unwrap();
    assert_eq!(
        resolver.pick_canonical_path_segments(&note, ROOT_NOTE_ID),
        vec!["root", "c", "n"]
    );
}

#[test_log::test]
fn archived_path_beats_search_path() {
    init_logging();
    let cache = TreeCache::with_root();
    cache.put_note(Note::new("a_search", "Saved Search").with_kind(NoteType::Search));
    cache.put_note(Note::new("b_arch", "Archive").with_flag(NoteFlag::Archived));
    cache.put_note(Note::new("n", "N"));
    link(&cache, "root", "a_search");
    link(&cache, "root", "b_arch");
    link(&cache, "a_search", "n");
    link(&cache, "b_arch", "n");

    // The search demerit sorts before the archived one, so with only those
    // two candidates the archived path wins.
    let resolver = resolver_over(&cache);
    let note = cache.note("n").unwrap();
    assert_eq!(
        resolver.pick_canonical_path_segments(&note, ROOT_NOTE_ID),
        vec!["root", "b_arch", "n"]
    );
}

#[test_log::test]
fn shortest_path_wins_among_equals() {
    init_logging();
    let cache = TreeCache::with_root();
    cache.put_note(Note::new("a_top", "Top"));
    cache.put_note(Note::new("a_mid", "Mid"));
    cache.put_note(Note::new("b", "B"));
    cache.put_note(Note::new("n", "N"));
    link(&cache, "root", "a_top");
    link(&cache, "a_top", "a_mid");
    link(&cache, "a_mid", "n");
    link(&cache, "root", "b");
    link(&cache, "b", "n");

    let resolver = resolver_over(&cache);
    let note = cache.note("n").unwrap();
    assert_eq!(
        resolver.pick_canonical_path_segments(&note, ROOT_NOTE_ID),
        vec!["root", "b", "n"]
    );
}

#[test_log::test]
fn root_note_has_empty_canonical_path() {
    let cache = create_test_tree();
    let resolver = resolver_over(&cache);
    let root = cache.note(ROOT_NOTE_ID).unwrap();

    assert!(resolver
        .pick_canonical_path_segments(&root, ROOT_NOTE_ID)
        .is_empty());
    assert_eq!(resolver.pick_canonical_path(&root, ROOT_NOTE_ID), "");
}

#[test_log::test]
fn orphan_note_has_empty_canonical_path() {
    let cache = create_test_tree();
    cache.put_note(Note::new("lost", "Lost"));

    let resolver = resolver_over(&cache);
    let note = cache.note("lost").unwrap();
    assert!(resolver
        .pick_canonical_path_segments(&note, ROOT_NOTE_ID)
        .is_empty());
}

#[test_log::test]
fn branch_cycles_do_not_hang_path_enumeration() {
    init_logging();
    let cache = TreeCache::with_root();
    cache.put_note(Note::new("a", "A"));
    cache.put_note(Note::new("b", "B"));
    link(&cache, "root", "a");
    link(&cache, "a", "b");
    // Corruption: b is also a parent of a.
    link(&cache, "b", "a");

    let resolver = resolver_over(&cache);
    let note = cache.note("b").unwrap();
    assert_eq!(
        resolver.pick_canonical_path_segments(&note, ROOT_NOTE_ID),
        vec!["root", "a", "b"]
    );
}

#[test_log::test]
fn canonical_path_joins_segments() {
    let cache = create_test_tree();
    let resolver = resolver_over(&cache);
    let note = cache.note("section").unwrap();
    assert_eq!(
        resolver.pick_canonical_path(&note, ROOT_NOTE_ID),
        "root/book/chapter/section"
    );
}
