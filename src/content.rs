//! Note and attachment binary content: the tagged [`ContentHolder`] union,
//! the [`ContentStore`] collaborator seam, and [`FileService`] operations for
//! upload, download, partial-content streaming and the external-editor
//! temp-file round trip.
//!
//! HTTP concerns (multipart parsing, range header parsing, response writing)
//! stay with the transport layer; this module only produces the payloads.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::ArborError,
    event::EventBus,
    shell::PlatformShell,
    tree::{Note, NoteId},
};

/// Label recorded on a note when file content is uploaded over it.
pub const LABEL_ORIGINAL_FILE_NAME: &str = "originalFileName";

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// A file attached to a note. Protection is inherited from the owning note
/// at creation time.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub attachment_id: String,
    pub owning_note_id: NoteId,
    pub title: String,
    pub mime: String,
    pub is_protected: bool,
}

impl Attachment {
    pub fn new(attachment_id: &str, owning_note_id: &str, title: &str, mime: &str) -> Self {
        Attachment {
            attachment_id: attachment_id.to_string(),
            owning_note_id: owning_note_id.to_string(),
            title: title.to_string(),
            mime: mime.to_string(),
            is_protected: false,
        }
    }
}

/// Id-level reference to a content-carrying entity, used in events and
/// service calls.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentRef {
    Note(NoteId),
    Attachment(String),
}

impl Display for ContentRef {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            ContentRef::Note(id) => write!(f, "note '{id}'"),
            ContentRef::Attachment(id) => write!(f, "attachment '{id}'"),
        }
    }
}

/// Tagged union over the two content-carrying entities, with the shared
/// capability surface the file operations need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentHolder {
    Note(Note),
    Attachment(Attachment),
}

impl ContentHolder {
    pub fn mime(&self) -> &str {
        match self {
            ContentHolder::Note(note) => &note.mime,
            ContentHolder::Attachment(attachment) => &attachment.mime,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ContentHolder::Note(note) => &note.title,
            ContentHolder::Attachment(attachment) => &attachment.title,
        }
    }

    pub fn is_protected(&self) -> bool {
        match self {
            ContentHolder::Note(note) => note.is_protected(),
            ContentHolder::Attachment(attachment) => attachment.is_protected,
        }
    }

    /// Note whose revision history covers this entity's content.
    pub fn owning_note_id(&self) -> &str {
        match self {
            ContentHolder::Note(note) => &note.note_id,
            ContentHolder::Attachment(attachment) => &attachment.owning_note_id,
        }
    }

    pub fn content_ref(&self) -> ContentRef {
        match self {
            ContentHolder::Note(note) => ContentRef::Note(note.note_id.clone()),
            ContentHolder::Attachment(attachment) => {
                ContentRef::Attachment(attachment.attachment_id.clone())
            }
        }
    }

    /// Download/export file name: sanitized title plus an extension inferred
    /// from the mime type when the title lacks one.
    pub fn file_name(&self) -> String {
        format_file_name(self.title(), self.mime())
    }
}

const UNSAFE_FILE_NAME_CHARS: &[char] =
    &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>', '\0'];

pub fn format_file_name(title: &str, mime: &str) -> String {
    let mut name: String = title
        .trim()
        .chars()
        .map(|c| {
            if UNSAFE_FILE_NAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    if name.is_empty() {
        name = "untitled".to_string();
    }
    if let Some(ext) = default_extension(mime) {
        if !name.to_lowercase().ends_with(&format!(".{ext}")) {
            name.push('.');
            name.push_str(ext);
        }
    }
    name
}

fn default_extension(mime: &str) -> Option<&'static str> {
    match mime.to_lowercase().as_str() {
        "text/html" => Some("html"),
        "text/plain" => Some("txt"),
        "text/markdown" => Some("md"),
        "application/json" => Some("json"),
        "application/pdf" => Some("pdf"),
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/svg+xml" => Some("svg"),
        "application/zip" => Some("zip"),
        _ => None,
    }
}

/// Storage collaborator the file service reads and writes through. Revision
/// bookkeeping is the store's problem; the service only says when to
/// snapshot.
pub trait ContentStore: Sync {
    fn note(&self, note_id: &str) -> impl Future<Output = Option<Note>> + Send;

    fn attachment(&self, attachment_id: &str) -> impl Future<Output = Option<Attachment>> + Send;

    fn get_content(
        &self,
        entity: &ContentRef,
    ) -> impl Future<Output = Result<Vec<u8>, ArborError>> + Send;

    fn set_content(
        &self,
        entity: &ContentRef,
        content: Vec<u8>,
    ) -> impl Future<Output = Result<(), ArborError>> + Send;

    fn set_mime(
        &self,
        entity: &ContentRef,
        mime: String,
    ) -> impl Future<Output = Result<(), ArborError>> + Send;

    fn set_note_label(
        &self,
        note_id: &str,
        name: &str,
        value: String,
    ) -> impl Future<Output = Result<(), ArborError>> + Send;

    /// Snapshot the note's current content into its revision history before
    /// an overwrite.
    fn snapshot_revision(
        &self,
        note_id: &str,
    ) -> impl Future<Output = Result<(), ArborError>> + Send;
}

/// Response payload for a full-content download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPayload {
    pub mime: String,
    pub content: Vec<u8>,
    pub cache_control: &'static str,
    /// `Some` when the caller asked for a content-disposition header.
    pub disposition_file_name: Option<String>,
}

/// Content prepared for a streaming (possibly partial) response. Range
/// *parsing* belongs to the HTTP layer; this only slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamedContent {
    pub file_name: String,
    pub total_size: u64,
    pub mime_type: String,
    content: Vec<u8>,
}

impl StreamedContent {
    pub fn new(file_name: String, mime_type: String, content: Vec<u8>) -> Self {
        StreamedContent {
            file_name,
            total_size: content.len() as u64,
            mime_type,
            content,
        }
    }

    /// Bytes for the requested inclusive range, or the whole content when no
    /// range was requested. Out-of-bounds ends are clamped; an empty or
    /// inverted range yields no bytes.
    pub fn bytes(&self, range: Option<(u64, u64)>) -> &[u8] {
        let Some((start, end)) = range else {
            return &self.content;
        };
        let len = self.content.len() as u64;
        if start >= len || end < start {
            return &[];
        }
        let end = end.min(len.saturating_sub(1));
        &self.content[start as usize..=end as usize]
    }
}

/// Operations for round-tripping note and attachment content through files:
/// uploads, downloads, streaming, and the save-to-tmp / upload-modified
/// external-editor workflow.
pub struct FileService<S: ContentStore> {
    store: S,
}

impl<S: ContentStore> FileService<S> {
    pub fn new(store: S) -> Self {
        FileService { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn holder(&self, entity: &ContentRef) -> Result<ContentHolder, ArborError> {
        match entity {
            ContentRef::Note(note_id) => self
                .store
                .note(note_id)
                .await
                .map(ContentHolder::Note)
                .ok_or_else(|| ArborError::NotFound(format!("Note '{note_id}' doesn't exist."))),
            ContentRef::Attachment(attachment_id) => self
                .store
                .attachment(attachment_id)
                .await
                .map(ContentHolder::Attachment)
                .ok_or_else(|| {
                    ArborError::NotFound(format!("Attachment '{attachment_id}' doesn't exist."))
                }),
        }
    }

    /// Replace a note's content with an uploaded file, snapshotting the
    /// previous content and remembering the original file name as a label.
    pub async fn update_note_file(
        &self,
        note_id: &str,
        original_file_name: &str,
        mime: &str,
        content: Vec<u8>,
    ) -> Result<(), ArborError> {
        let entity = ContentRef::Note(note_id.to_string());
        self.holder(&entity).await?;
        self.store.snapshot_revision(note_id).await?;
        self.store.set_mime(&entity, mime.to_lowercase()).await?;
        self.store.set_content(&entity, content).await?;
        self.store
            .set_note_label(
                note_id,
                LABEL_ORIGINAL_FILE_NAME,
                original_file_name.to_string(),
            )
            .await?;
        Ok(())
    }

    /// Replace an attachment's content, snapshotting the owning note's
    /// revision first.
    pub async fn update_attachment_file(
        &self,
        attachment_id: &str,
        mime: &str,
        content: Vec<u8>,
    ) -> Result<(), ArborError> {
        let entity = ContentRef::Attachment(attachment_id.to_string());
        let holder = self.holder(&entity).await?;
        self.store
            .snapshot_revision(holder.owning_note_id())
            .await?;
        self.store.set_mime(&entity, mime.to_lowercase()).await?;
        self.store.set_content(&entity, content).await?;
        Ok(())
    }

    /// Full-content download. Protected content without an available
    /// protected session is refused; the session flag is supplied by the
    /// auth layer, which is outside this crate.
    pub async fn download(
        &self,
        entity: &ContentRef,
        with_disposition: bool,
        protected_session_available: bool,
    ) -> Result<DownloadPayload, ArborError> {
        let holder = self.holder(entity).await?;
        if holder.is_protected() && !protected_session_available {
            return Err(ArborError::PermissionDenied);
        }
        let content = self.store.get_content(entity).await?;
        Ok(DownloadPayload {
            mime: holder.mime().to_string(),
            content,
            cache_control: NO_CACHE,
            disposition_file_name: with_disposition.then(|| holder.file_name()),
        })
    }

    /// Prepare content for streaming, including partial-content slicing.
    pub async fn stream_content(
        &self,
        entity: &ContentRef,
    ) -> Result<StreamedContent, ArborError> {
        let holder = self.holder(entity).await?;
        let content = self.store.get_content(entity).await?;
        Ok(StreamedContent::new(
            holder.file_name(),
            holder.mime().to_string(),
            content,
        ))
    }

    /// Write the entity's content to a kept temp file named after the entity
    /// and ask the platform shell to watch it for external edits. The
    /// watcher publishes [`Event::OpenedFileUpdated`] on change.
    ///
    /// [`Event::OpenedFileUpdated`]: crate::event::Event::OpenedFileUpdated
    pub async fn save_to_tmp_dir(
        &self,
        entity: &ContentRef,
        shell: &dyn PlatformShell,
        bus: &EventBus,
    ) -> Result<PathBuf, ArborError> {
        let holder = self.holder(entity).await?;
        let content = self.store.get_content(entity).await?;
        let file_name = holder.file_name();

        let mut tmp = tempfile::Builder::new()
            .suffix(&format!("-{file_name}"))
            .tempfile()?;
        tmp.write_all(&content)?;
        let (_file, path) = tmp
            .keep()
            .map_err(|err| ArborError::Io(format!("Could not keep temporary file: {err}")))?;

        tracing::info!("Saved temporary file {}", path.display());
        shell.watch_file(&path, holder.content_ref(), bus)?;
        Ok(path)
    }

    /// Read an externally edited temp file back over the entity's content.
    pub async fn upload_modified_file(
        &self,
        entity: &ContentRef,
        file_path: &Path,
    ) -> Result<(), ArborError> {
        let holder = self.holder(entity).await?;
        tracing::info!(
            "Updating {entity} with content from '{}'",
            file_path.display()
        );
        let content = tokio::fs::read(file_path).await?;
        if content.is_empty() {
            return Err(ArborError::Validation(format!(
                "File '{}' is empty",
                file_path.display()
            )));
        }
        self.store
            .snapshot_revision(holder.owning_note_id())
            .await?;
        self.store.set_content(entity, content).await?;
        Ok(())
    }
}
