//! In-memory note tree: the note/branch model, the parent-link relation
//! graph, and the [`TreeCache`] snapshot store the path resolver reads from.
//!
//! # Module Organization
//!
//! - [`note`]: `Note` and `Branch` records plus their type/flag enums
//! - [`graph`]: `NoteGraph`, the child-to-parent relation graph
//! - [`cache`]: `TreeCache`, the shared mutable store
//! - [`source`]: `NoteSource`, the read seam consumed by the resolver

mod cache;
mod graph;
mod note;
mod source;

pub use cache::{NoteRevision, TreeCache};
pub use graph::NoteGraph;
pub use note::{Branch, Note, NoteFlag, NoteType};
pub use source::NoteSource;

/// Fixed identifier of the root note. Every resolved path either starts with
/// it or is the single-element path `root` itself.
pub const ROOT_NOTE_ID: &str = "root";

/// Literal parent identifier reported for the root note, which has none.
pub const NO_PARENT_ID: &str = "none";

/// Opaque note identifier, unique per note.
pub type NoteId = String;

/// Opaque identifier of one parent-child placement edge. A note linked under
/// several parents has one branch per placement.
pub type BranchId = String;
