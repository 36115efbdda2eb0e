//! Note-path resolution and repair.
//!
//! A note path is one concrete walk from the root note to a target note
//! through a specific chain of parent-child branches. Because notes can be
//! moved or placed under several parents, a previously valid bookmarked or
//! linked path can go stale without the note itself disappearing. The
//! resolver verifies each hop against the live graph and, at the first
//! broken link, rebinds the walk by substituting a currently valid
//! canonical path to the same note, keeping the already-verified segments
//! below the break.
//!
//! Resolution is read-only and lock-free from the resolver's perspective:
//! every parent/child fetch goes back to the [`NoteSource`] so concurrent
//! mutation between steps is observed (freshness per step, not path-wide
//! snapshot consistency).

use crate::tree::{Note, NoteId, NoteSource, NoteType, NO_PARENT_ID, ROOT_NOTE_ID};

/// Placeholder title for notes that cannot be fetched.
const NOT_FOUND_TITLE: &str = "[not found]";

/// Resolves raw path strings against a live note graph.
#[derive(Debug, Clone)]
pub struct PathResolver<S: NoteSource> {
    source: S,
}

impl<S: NoteSource> PathResolver<S> {
    pub fn new(source: S) -> Self {
        PathResolver { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve a possibly stale path to a verified, slash-joined path, or
    /// `None` when resolution failed. Thin wrapper over
    /// [`resolve_path_to_segments`](Self::resolve_path_to_segments).
    pub async fn resolve_path(&self, note_path: &str, hoisted_root: &str) -> Option<String> {
        let run_path = self
            .resolve_path_to_segments(note_path, hoisted_root, true)
            .await?;
        Some(run_path.join("/"))
    }

    /// Accepts a path which might or might not be valid and returns an
    /// existing path as close to the original as possible. Parts of the
    /// path can be invalid because of note moves (which change paths) or
    /// other corruption; in that case this substitutes some other valid
    /// path to the same note at the first point of divergence.
    ///
    /// Failures (missing note, note with no parents, empty input) yield
    /// `None` plus a best-effort diagnostic; they never propagate as faults.
    pub async fn resolve_path_to_segments(
        &self,
        note_path: &str,
        hoisted_root: &str,
        log_errors: bool,
    ) -> Option<Vec<NoteId>> {
        // The input may carry a tab-id suffix; everything from the first '-'
        // on is UI-only and ignored for lookups.
        let note_path = note_path.split('-').next().unwrap_or_default().trim();

        if note_path.is_empty() {
            return None;
        }

        let mut path: Vec<&str> = note_path.split('/').collect();
        path.reverse();

        if !path.iter().any(|segment| *segment == ROOT_NOTE_ID) {
            path.push(ROOT_NOTE_ID);
        }

        let mut effective_path: Vec<NoteId> = Vec::new();
        let mut child_note_id: Option<NoteId> = None;

        for parent_candidate in path {
            if let Some(child_id) = &child_note_id {
                let Some(child) = self.source.get_note(child_id).await else {
                    tracing::warn!("Can't find note {child_id}");
                    return None;
                };

                // Parent sets can change concurrently; re-derive and re-sort
                // fresh at every step instead of trusting an earlier view.
                let parents = self.source.sorted_parents(child_id).await;

                if parents.is_empty() {
                    if log_errors {
                        self.source.log_error(format!(
                            "No parents found for {child_id} ({}) for path {note_path}",
                            child.title
                        ));
                    }
                    return None;
                }

                if !parents.iter().any(|p| p.note_id == parent_candidate) {
                    if log_errors {
                        let parent_title = self
                            .source
                            .note_from_cache(parent_candidate)
                            .map(|p| p.title)
                            .unwrap_or_else(|| "n/a".to_string());
                        let available = parents
                            .iter()
                            .map(|p| format!("{} ({})", p.note_id, p.title))
                            .collect::<Vec<_>>()
                            .join(", ");
                        tracing::info!(
                            "Did not find parent {parent_candidate} ({parent_title}) for \
                             child {child_id} ({}), available parents: {available}",
                            child.title
                        );
                    }

                    let substitute = self.pick_canonical_path_segments(&child, hoisted_root);

                    // In case the child is root the substitute may be empty.
                    if !substitute.is_empty() {
                        // The substitute ends with the child itself, which is
                        // already accounted for; append the rest root-ward.
                        for note_id in substitute.iter().rev().skip(1) {
                            effective_path.push(note_id.clone());
                        }
                    }

                    // The substitute, if any, already reaches the root, so
                    // further original segments are discarded unvalidated.
                    break;
                }
            }

            effective_path.push(parent_candidate.to_string());
            child_note_id = Some(parent_candidate.to_string());
        }

        effective_path.reverse();
        Some(effective_path)
    }

    /// Select the single preferred root-first path to a note among all its
    /// currently valid placements:
    ///
    /// 1. paths inside the hoisted subtree win over paths outside it,
    /// 2. then paths free of saved-search ancestors,
    /// 3. then paths free of archived ancestors,
    /// 4. then the shortest path.
    ///
    /// The root note legitimately has an empty canonical path. A note with
    /// no live root-path (orphaned or trapped in a branch cycle) also yields
    /// an empty sequence.
    pub fn pick_canonical_path_segments(&self, note: &Note, hoisted_root: &str) -> Vec<NoteId> {
        if note.note_id == ROOT_NOTE_ID {
            return Vec::new();
        }

        struct Candidate {
            path: Vec<NoteId>,
            in_hoisted_subtree: bool,
            is_search: bool,
            is_archived: bool,
        }

        let mut candidates: Vec<Candidate> = self
            .source
            .all_note_paths(&note.note_id)
            .into_iter()
            .map(|path| {
                let in_hoisted_subtree = path.iter().any(|id| id == hoisted_root);
                let is_search = path.iter().any(|id| {
                    self.source
                        .note_from_cache(id)
                        .map(|n| n.kind == NoteType::Search)
                        .unwrap_or(false)
                });
                let is_archived = path.iter().any(|id| {
                    self.source
                        .note_from_cache(id)
                        .map(|n| n.is_archived())
                        .unwrap_or(false)
                });
                Candidate {
                    path,
                    in_hoisted_subtree,
                    is_search,
                    is_archived,
                }
            })
            .collect();

        candidates.sort_by_key(|c| {
            (
                !c.in_hoisted_subtree,
                c.is_search,
                c.is_archived,
                c.path.len(),
            )
        });

        candidates
            .into_iter()
            .next()
            .map(|c| c.path)
            .unwrap_or_default()
    }

    /// Slash-joined form of [`pick_canonical_path_segments`]. Empty string
    /// for the root note.
    ///
    /// [`pick_canonical_path_segments`]: Self::pick_canonical_path_segments
    pub fn pick_canonical_path(&self, note: &Note, hoisted_root: &str) -> String {
        self.pick_canonical_path_segments(note, hoisted_root).join("/")
    }

    /// Display title of a note, composed with the branch prefix of its
    /// placement under `parent_note_id` when one is set.
    pub async fn note_title(&self, note_id: &str, parent_note_id: Option<&str>) -> String {
        let Some(note) = self.source.get_note(note_id).await else {
            return NOT_FOUND_TITLE.to_string();
        };
        let mut title = note.title;
        if let Some(parent_id) = parent_note_id {
            if let Some(branch) = self.source.parent_branch(parent_id, note_id) {
                if let Some(prefix) = branch.prefix.filter(|p| !p.is_empty()) {
                    title = format!("{prefix} - {title}");
                }
            }
        }
        title
    }

    /// Per-segment display titles along a path, branch prefixes included.
    pub async fn note_path_title_components(&self, note_path: &str) -> Vec<String> {
        let mut note_path = note_path;
        if let Some(stripped) = note_path.strip_prefix("root/") {
            note_path = stripped;
        }

        let mut title_components = Vec::new();

        // Special case when we want just root's title.
        if note_path == ROOT_NOTE_ID {
            title_components.push(self.note_title(note_path, None).await);
        } else {
            let mut parent_note_id = ROOT_NOTE_ID.to_string();
            for note_id in note_path.split('/') {
                title_components
                    .push(self.note_title(note_id, Some(&parent_note_id)).await);
                parent_note_id = note_id.to_string();
            }
        }

        title_components
    }

    /// Breadcrumb title of a whole path, components joined with `" / "`.
    pub async fn note_path_title(&self, note_path: &str) -> String {
        self.note_path_title_components(note_path).await.join(" / ")
    }

    /// The branch id of the path's leaf placement, if that edge is live.
    pub async fn branch_id_from_path(&self, note_path: &str) -> Option<String> {
        let (note_id, parent_note_id) = note_id_and_parent_id(note_path);
        self.source
            .parent_branch(&parent_note_id, &note_id)
            .map(|branch| branch.branch_id)
    }
}

/// Leaf note id of a path, tab-id suffix stripped.
pub fn note_id_from_path(note_path: &str) -> Option<NoteId> {
    if note_path.is_empty() {
        return None;
    }
    let last_segment = note_path.split('/').next_back()?;
    Some(
        last_segment
            .split('-')
            .next()
            .unwrap_or_default()
            .to_string(),
    )
}

/// Leaf note id plus its recorded parent id. The root note reports the
/// literal parent `none`; a single-segment path reports parent `root`.
pub fn note_id_and_parent_id(note_path: &str) -> (NoteId, NoteId) {
    if note_path == ROOT_NOTE_ID {
        return (ROOT_NOTE_ID.to_string(), NO_PARENT_ID.to_string());
    }

    let mut parent_note_id = ROOT_NOTE_ID.to_string();
    let mut note_id = String::new();

    if !note_path.is_empty() {
        let segments: Vec<&str> = note_path.split('/').collect();
        if let Some(last_segment) = segments.last() {
            // The path could also carry a tab-id suffix.
            note_id = last_segment.split('-').next().unwrap_or_default().to_string();
        }
        if segments.len() > 1 {
            parent_note_id = segments[segments.len() - 2].to_string();
        }
    }

    (note_id, parent_note_id)
}

/// Split a path into note ids, prepending `root` when absent.
pub fn parse_note_path(note_path: &str) -> Vec<NoteId> {
    let mut note_ids: Vec<NoteId> = note_path.split('/').map(str::to_string).collect();
    if note_ids.first().map(String::as_str) != Some(ROOT_NOTE_ID) {
        note_ids.insert(0, ROOT_NOTE_ID.to_string());
    }
    note_ids
}
