//! TreeCache: the shared in-memory note store.
//!
//! Readers always see current state; nothing is snapshotted per operation.
//! The cache is `Arc`-shared and lock-guarded so that the resolver's
//! per-step re-fetch discipline observes concurrent mutation between its
//! suspend points.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    content::{Attachment, ContentRef, ContentStore},
    error::ArborError,
    meta::utc_date_time,
    tree::{Branch, BranchId, Note, NoteGraph, NoteId, NoteSource, ROOT_NOTE_ID},
};

/// One captured revision of a note's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRevision {
    pub note_id: NoteId,
    pub content: Vec<u8>,
    pub captured_at: String,
}

#[derive(Debug, Default)]
struct TreeCacheInner {
    notes: BTreeMap<NoteId, Note>,
    branches: BTreeMap<BranchId, Branch>,
    attachments: BTreeMap<String, Attachment>,
    relations: NoteGraph,
    note_contents: BTreeMap<NoteId, Vec<u8>>,
    attachment_contents: BTreeMap<String, Vec<u8>>,
    revisions: Vec<NoteRevision>,
}

/// Share-mutable note graph cache. Cloning shares the underlying store.
#[derive(Debug, Default, Clone)]
pub struct TreeCache {
    inner: Arc<RwLock<TreeCacheInner>>,
    errors: Arc<RwLock<Vec<String>>>,
}

impl fmt::Display for TreeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        write!(
            f,
            "TreeCache({} notes, {} branches)",
            inner.notes.len(),
            inner.branches.len()
        )
    }
}

impl TreeCache {
    /// A cache seeded with the root note, which always exists.
    pub fn with_root() -> Self {
        let cache = TreeCache::default();
        cache.put_note(Note::new(ROOT_NOTE_ID, "root"));
        cache
    }

    pub fn put_note(&self, note: Note) {
        let mut inner = self.inner.write();
        inner.notes.insert(note.note_id.clone(), note);
    }

    /// Register or replace one parent→child placement. Both endpoints gain
    /// graph nodes even when their note records arrive later.
    pub fn put_branch(&self, branch: Branch) {
        let mut inner = self.inner.write();
        // A rebound branch id may move to a different edge; drop the old one.
        if let Some(prior) = inner.branches.get(&branch.branch_id).cloned() {
            if prior.parent_note_id != branch.parent_note_id
                || prior.child_note_id != branch.child_note_id
            {
                inner
                    .relations
                    .unlink(&prior.child_note_id, &prior.parent_note_id);
            }
        }
        inner.relations.link(
            &branch.child_note_id,
            &branch.parent_note_id,
            &branch.branch_id,
        );
        inner.branches.insert(branch.branch_id.clone(), branch);
    }

    pub fn put_attachment(&self, attachment: Attachment) {
        let mut inner = self.inner.write();
        inner
            .attachments
            .insert(attachment.attachment_id.clone(), attachment);
    }

    pub fn remove_branch(&self, branch_id: &str) {
        let mut inner = self.inner.write();
        if let Some(branch) = inner.branches.remove(branch_id) {
            inner
                .relations
                .unlink(&branch.child_note_id, &branch.parent_note_id);
        }
    }

    /// Drop a note, its content, and every branch touching it.
    pub fn remove_note(&self, note_id: &str) {
        let mut inner = self.inner.write();
        inner.notes.remove(note_id);
        inner.note_contents.remove(note_id);
        inner.relations.remove_note(note_id);
        inner
            .branches
            .retain(|_, b| b.child_note_id != note_id && b.parent_note_id != note_id);
    }

    pub fn note(&self, note_id: &str) -> Option<Note> {
        self.inner.read().notes.get(note_id).cloned()
    }

    pub fn branch(&self, branch_id: &str) -> Option<Branch> {
        self.inner.read().branches.get(branch_id).cloned()
    }

    /// The branch id of the live `parent`→`child` placement.
    pub fn branch_id(&self, parent_note_id: &str, child_note_id: &str) -> Option<BranchId> {
        self.inner
            .read()
            .relations
            .branch_id(parent_note_id, child_note_id)
    }

    /// The note's current parents, sorted by branch position then branch id.
    /// Derived fresh on every call; never cached.
    pub fn sorted_parent_notes(&self, note_id: &str) -> Vec<Note> {
        let inner = self.inner.read();
        let mut placements: Vec<(i32, BranchId, NoteId)> = inner
            .relations
            .parents(note_id)
            .into_iter()
            .map(|(parent_id, branch_id)| {
                let position = inner
                    .branches
                    .get(&branch_id)
                    .map(|b| b.position)
                    .unwrap_or_default();
                (position, branch_id, parent_id)
            })
            .collect();
        placements.sort();
        placements
            .into_iter()
            .filter_map(|(_, _, parent_id)| inner.notes.get(&parent_id).cloned())
            .collect()
    }

    /// All live root-first paths ending at the note. See
    /// [`NoteSource::all_note_paths`] for the contract.
    pub fn note_paths(&self, note_id: &str) -> Vec<Vec<NoteId>> {
        let inner = self.inner.read();
        let mut encountered = BTreeSet::new();
        collect_paths(&inner, note_id, &mut encountered)
    }

    pub fn revisions(&self, note_id: &str) -> Vec<NoteRevision> {
        self.inner
            .read()
            .revisions
            .iter()
            .filter(|r| r.note_id == note_id)
            .cloned()
            .collect()
    }

    /// Accumulated operator-visible diagnostics.
    pub fn errors(&self) -> Vec<String> {
        self.errors.read().clone()
    }

    pub fn record_error(&self, message: String) {
        tracing::error!("{message}");
        self.errors.write().push(message);
    }
}

/// Recursive upward walk with an encountered set guarding against branch
/// cycles (the graph is acyclic in intent only).
fn collect_paths(
    inner: &TreeCacheInner,
    note_id: &str,
    encountered: &mut BTreeSet<NoteId>,
) -> Vec<Vec<NoteId>> {
    if note_id == ROOT_NOTE_ID {
        return vec![vec![ROOT_NOTE_ID.to_string()]];
    }
    if !encountered.insert(note_id.to_string()) {
        return Vec::new();
    }
    let mut parent_ids: Vec<NoteId> = inner
        .relations
        .parents(note_id)
        .into_iter()
        .map(|(parent_id, _)| parent_id)
        .collect();
    parent_ids.sort();
    let mut paths = Vec::new();
    for parent_id in parent_ids {
        for mut path in collect_paths(inner, &parent_id, encountered) {
            path.push(note_id.to_string());
            paths.push(path);
        }
    }
    encountered.remove(note_id);
    paths
}

impl NoteSource for TreeCache {
    async fn get_note(&self, note_id: &str) -> Option<Note> {
        self.note(note_id)
    }

    async fn sorted_parents(&self, note_id: &str) -> Vec<Note> {
        self.sorted_parent_notes(note_id)
    }

    fn note_from_cache(&self, note_id: &str) -> Option<Note> {
        self.note(note_id)
    }

    fn all_note_paths(&self, note_id: &str) -> Vec<Vec<NoteId>> {
        self.note_paths(note_id)
    }

    fn parent_branch(&self, parent_note_id: &str, child_note_id: &str) -> Option<Branch> {
        let branch_id = self.branch_id(parent_note_id, child_note_id)?;
        self.branch(&branch_id)
    }

    fn log_error(&self, message: String) {
        self.record_error(message);
    }
}

impl ContentStore for TreeCache {
    async fn note(&self, note_id: &str) -> Option<Note> {
        TreeCache::note(self, note_id)
    }

    async fn attachment(&self, attachment_id: &str) -> Option<Attachment> {
        self.inner.read().attachments.get(attachment_id).cloned()
    }

    async fn get_content(&self, entity: &ContentRef) -> Result<Vec<u8>, ArborError> {
        let inner = self.inner.read();
        match entity {
            ContentRef::Note(note_id) => {
                if !inner.notes.contains_key(note_id) {
                    return Err(ArborError::NotFound(format!(
                        "Note '{note_id}' doesn't exist."
                    )));
                }
                Ok(inner.note_contents.get(note_id).cloned().unwrap_or_default())
            }
            ContentRef::Attachment(attachment_id) => {
                if !inner.attachments.contains_key(attachment_id) {
                    return Err(ArborError::NotFound(format!(
                        "Attachment '{attachment_id}' doesn't exist."
                    )));
                }
                Ok(inner
                    .attachment_contents
                    .get(attachment_id)
                    .cloned()
                    .unwrap_or_default())
            }
        }
    }

    async fn set_content(&self, entity: &ContentRef, content: Vec<u8>) -> Result<(), ArborError> {
        let mut inner = self.inner.write();
        match entity {
            ContentRef::Note(note_id) => {
                if !inner.notes.contains_key(note_id) {
                    return Err(ArborError::NotFound(format!(
                        "Note '{note_id}' doesn't exist."
                    )));
                }
                inner.note_contents.insert(note_id.clone(), content);
            }
            ContentRef::Attachment(attachment_id) => {
                if !inner.attachments.contains_key(attachment_id) {
                    return Err(ArborError::NotFound(format!(
                        "Attachment '{attachment_id}' doesn't exist."
                    )));
                }
                inner
                    .attachment_contents
                    .insert(attachment_id.clone(), content);
            }
        }
        Ok(())
    }

    async fn set_mime(&self, entity: &ContentRef, mime: String) -> Result<(), ArborError> {
        let mut inner = self.inner.write();
        match entity {
            ContentRef::Note(note_id) => {
                let note = inner.notes.get_mut(note_id).ok_or_else(|| {
                    ArborError::NotFound(format!("Note '{note_id}' doesn't exist."))
                })?;
                note.mime = mime;
            }
            ContentRef::Attachment(attachment_id) => {
                let attachment = inner.attachments.get_mut(attachment_id).ok_or_else(|| {
                    ArborError::NotFound(format!("Attachment '{attachment_id}' doesn't exist."))
                })?;
                attachment.mime = mime;
            }
        }
        Ok(())
    }

    async fn set_note_label(
        &self,
        note_id: &str,
        name: &str,
        value: String,
    ) -> Result<(), ArborError> {
        let mut inner = self.inner.write();
        let note = inner
            .notes
            .get_mut(note_id)
            .ok_or_else(|| ArborError::NotFound(format!("Note '{note_id}' doesn't exist.")))?;
        note.labels.insert(name.to_string(), value);
        Ok(())
    }

    async fn snapshot_revision(&self, note_id: &str) -> Result<(), ArborError> {
        let mut inner = self.inner.write();
        if !inner.notes.contains_key(note_id) {
            return Err(ArborError::NotFound(format!(
                "Note '{note_id}' doesn't exist."
            )));
        }
        let content = inner.note_contents.get(note_id).cloned().unwrap_or_default();
        inner.revisions.push(NoteRevision {
            note_id: note_id.to_string(),
            content,
            captured_at: utc_date_time(),
        });
        Ok(())
    }
}
