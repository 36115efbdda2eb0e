//! Note contexts and homepage handling.
//!
//! A [`NoteContext`] is one tab-like navigation slot holding a resolved
//! note path and its hoisted root. The [`Workspace`] owns the contexts, a
//! [`PathResolver`], and a bus subscription taken at construction, and
//! reacts to [`Event::OpenNote`] requests by activating or opening the
//! matching context.

use tokio::sync::broadcast::{error::RecvError, Receiver};
use uuid::Uuid;

use crate::{
    config::OptionsProvider,
    error::ArborError,
    event::{Event, EventBus},
    paths::{note_id_from_path, PathResolver},
    shell::PlatformShell,
    tree::{NoteId, NoteSource, ROOT_NOTE_ID},
};

/// One open navigation slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteContext {
    pub ntx_id: String,
    /// Resolved, verified note path (root-first, slash-joined).
    pub note_path: String,
    pub hoisted_root: NoteId,
}

impl NoteContext {
    /// Leaf note id of the context's path.
    pub fn note_id(&self) -> Option<NoteId> {
        note_id_from_path(&self.note_path)
    }
}

pub struct Workspace<S: NoteSource, O: OptionsProvider, P: PlatformShell> {
    resolver: PathResolver<S>,
    options: O,
    shell: P,
    contexts: Vec<NoteContext>,
    active_ntx_id: Option<String>,
    homepage_opened: bool,
    receiver: Option<Receiver<Event>>,
}

impl<S: NoteSource, O: OptionsProvider, P: PlatformShell> Workspace<S, O, P> {
    /// Build a workspace and register its bus subscription. The
    /// subscription is deregistered when the workspace (or its drained
    /// receiver) is dropped.
    pub fn new(source: S, options: O, shell: P, bus: &EventBus) -> Self {
        Workspace {
            resolver: PathResolver::new(source),
            options,
            shell,
            contexts: Vec::new(),
            active_ntx_id: None,
            homepage_opened: false,
            receiver: Some(bus.subscribe()),
        }
    }

    pub fn resolver(&self) -> &PathResolver<S> {
        &self.resolver
    }

    pub fn contexts(&self) -> &[NoteContext] {
        &self.contexts
    }

    pub fn active_context(&self) -> Option<&NoteContext> {
        let active = self.active_ntx_id.as_ref()?;
        self.contexts.iter().find(|c| &c.ntx_id == active)
    }

    /// Resolve a path and register a context for it. The context is not
    /// activated; see [`activate`](Self::activate).
    pub async fn open_tab_with_note(
        &mut self,
        note_path: &str,
        hoisted_root: &str,
    ) -> Result<NoteContext, ArborError> {
        let resolved = self
            .resolver
            .resolve_path(note_path, hoisted_root)
            .await
            .ok_or_else(|| {
                ArborError::NotFound(format!("Could not resolve note path '{note_path}'"))
            })?;
        let context = NoteContext {
            ntx_id: Uuid::new_v4().simple().to_string(),
            note_path: resolved,
            hoisted_root: hoisted_root.to_string(),
        };
        self.contexts.push(context.clone());
        Ok(context)
    }

    pub fn activate(&mut self, ntx_id: &str) -> Result<(), ArborError> {
        if !self.contexts.iter().any(|c| c.ntx_id == ntx_id) {
            return Err(ArborError::NotFound(format!(
                "No note context '{ntx_id}'"
            )));
        }
        self.active_ntx_id = Some(ntx_id.to_string());
        Ok(())
    }

    /// Activate the context already showing the note, or open a new one on
    /// the note's canonical path.
    pub async fn activate_or_open_note(
        &mut self,
        note_id: &str,
    ) -> Result<NoteContext, ArborError> {
        if let Some(context) = self
            .contexts
            .iter()
            .find(|c| c.note_id().as_deref() == Some(note_id))
            .cloned()
        {
            self.activate(&context.ntx_id)?;
            return Ok(context);
        }

        let note = self
            .resolver
            .source()
            .get_note(note_id)
            .await
            .ok_or_else(|| ArborError::NotFound(format!("Note '{note_id}' doesn't exist.")))?;
        let note_path = if note_id == ROOT_NOTE_ID {
            ROOT_NOTE_ID.to_string()
        } else {
            let path = self.resolver.pick_canonical_path(&note, ROOT_NOTE_ID);
            if path.is_empty() {
                return Err(ArborError::NotFound(format!(
                    "No valid path to note '{note_id}'"
                )));
            }
            path
        };
        let context = self.open_tab_with_note(&note_path, ROOT_NOTE_ID).await?;
        self.activate(&context.ntx_id)?;
        Ok(context)
    }

    /// Open the configured homepage note, once per workspace lifetime.
    ///
    /// Activates an existing context already showing the homepage note, or
    /// opens a new context hoisted at the homepage note. Returns `None` on
    /// every invocation after the first.
    pub async fn open_homepage(&mut self) -> Result<Option<NoteContext>, ArborError> {
        if self.homepage_opened {
            return Ok(None);
        }
        self.homepage_opened = true;

        let target_note_path = self.options.homepage_note_path()?;
        let target_note_id = note_id_from_path(&target_note_path)
            .unwrap_or_else(|| ROOT_NOTE_ID.to_string());

        if let Some(context) = self
            .contexts
            .iter()
            .find(|c| c.note_id().as_deref() == Some(target_note_id.as_str()))
            .cloned()
        {
            self.activate(&context.ntx_id)?;
            return Ok(Some(context));
        }

        let context = self
            .open_tab_with_note(&target_note_path, &target_note_id)
            .await?;
        self.activate(&context.ntx_id)?;
        Ok(Some(context))
    }

    pub async fn handle_event(&mut self, event: &Event) -> Result<(), ArborError> {
        match event {
            Event::OpenNote { note_id } => {
                self.activate_or_open_note(note_id).await?;
                self.shell.bring_to_front();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Drain the bus subscription until it closes. Event handling failures
    /// are logged, never fatal to the loop.
    pub async fn run(&mut self) -> Result<(), ArborError> {
        let mut receiver = self.receiver.take().ok_or_else(|| {
            ArborError::Custom("Workspace event loop is already running".to_string())
        })?;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(err) = self.handle_event(&event).await {
                        tracing::error!("Failed to handle {event}: {err}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Workspace event receiver lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => break,
            }
        }
        Ok(())
    }
}
