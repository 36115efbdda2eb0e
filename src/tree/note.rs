use std::collections::BTreeMap;

use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

use super::{BranchId, NoteId};

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum NoteType {
    #[default]
    Text,
    Code,
    File,
    Image,
    Book,
    /// Saved-search note. Paths routed through one are deprioritized by the
    /// canonical-path ranking.
    Search,
}

#[derive(Debug, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumSetType)]
#[enumset(serialize_repr = "list")]
pub enum NoteFlag {
    Archived,
    Protected,
}

/// One content node in the hierarchy. A note may be placed under multiple
/// parents; each placement is a separate [`Branch`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub note_id: NoteId,
    pub title: String,
    pub kind: NoteType,
    pub mime: String,
    pub flags: EnumSet<NoteFlag>,
    /// Free-form name/value annotations, e.g. `originalFileName` recorded on
    /// upload.
    pub labels: BTreeMap<String, String>,
}

impl Note {
    pub fn new(note_id: &str, title: &str) -> Self {
        Note {
            note_id: note_id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: NoteType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_flag(mut self, flag: NoteFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    pub fn with_mime(mut self, mime: &str) -> Self {
        self.mime = mime.to_string();
        self
    }

    pub fn is_protected(&self) -> bool {
        self.flags.contains(NoteFlag::Protected)
    }

    pub fn is_archived(&self) -> bool {
        self.flags.contains(NoteFlag::Archived)
    }
}

/// One parent-child placement edge, optionally carrying a display prefix
/// shown before the note title under that parent.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub branch_id: BranchId,
    pub parent_note_id: NoteId,
    pub child_note_id: NoteId,
    pub prefix: Option<String>,
    pub position: i32,
    pub is_expanded: bool,
}

impl Branch {
    pub fn new(branch_id: &str, parent_note_id: &str, child_note_id: &str) -> Self {
        Branch {
            branch_id: branch_id.to_string(),
            parent_note_id: parent_note_id.to_string(),
            child_note_id: child_note_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_flags_serialize_as_list() {
        let note = Note::new("n1", "N").with_flag(NoteFlag::Archived);
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["flags"], serde_json::json!(["Archived"]));

        let back: Note = serde_json::from_value(json).unwrap();
        assert!(back.is_archived());
        assert!(!back.is_protected());
    }
}
