use std::future::Future;

use super::{Branch, Note, NoteId};

/// Read seam between the path resolver and whatever owns the note graph.
///
/// The async accessors are suspend points: the graph may be mutated by
/// concurrent operations (sync, user edits) between two fetches inside one
/// resolution call, and implementations must serve each call from current
/// state rather than a resolution-wide snapshot.
pub trait NoteSource: Sync {
    /// Fresh snapshot of one note, or `None` when it no longer exists.
    fn get_note(&self, note_id: &str) -> impl Future<Output = Option<Note>> + Send;

    /// The note's current parents, re-derived and re-sorted on every call.
    fn sorted_parents(&self, note_id: &str) -> impl Future<Output = Vec<Note>> + Send;

    /// Synchronous best-effort lookup used only for diagnostics; may return
    /// `None` without that being an error.
    fn note_from_cache(&self, note_id: &str) -> Option<Note>;

    /// Every currently valid root-first path ending at the note, the note
    /// itself included as last element. The root note yields `[["root"]]`,
    /// an orphaned non-root note yields no paths.
    fn all_note_paths(&self, note_id: &str) -> Vec<Vec<NoteId>>;

    /// The live branch placing `child_note_id` under `parent_note_id`.
    fn parent_branch(&self, parent_note_id: &str, child_note_id: &str) -> Option<Branch>;

    /// Fire-and-forget diagnostic channel; never blocks or fails the caller.
    fn log_error(&self, message: String);
}
