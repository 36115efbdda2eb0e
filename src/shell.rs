//! Platform capability seam.
//!
//! The shell variant is selected once at process start and injected; call
//! sites never branch on platform names inline. [`BrowserShell`] is the
//! no-op variant for browser/service deployments; [`DesktopShell`] (behind
//! the `desktop` feature) can raise the application window and watch
//! temp files handed to external editors.

use std::path::Path;

use crate::{
    content::ContentRef,
    error::ArborError,
    event::EventBus,
};

pub trait PlatformShell: Send + Sync {
    /// Bring the application window to the foreground, where the platform
    /// supports it.
    fn bring_to_front(&self);

    /// Watch a file for modification, publishing
    /// [`Event::OpenedFileUpdated`](crate::event::Event::OpenedFileUpdated)
    /// on the bus when it changes.
    fn watch_file(
        &self,
        path: &Path,
        entity: ContentRef,
        bus: &EventBus,
    ) -> Result<(), ArborError>;
}

/// Browser deployments cannot raise windows or watch the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserShell;

impl PlatformShell for BrowserShell {
    fn bring_to_front(&self) {}

    fn watch_file(
        &self,
        path: &Path,
        entity: ContentRef,
        _bus: &EventBus,
    ) -> Result<(), ArborError> {
        tracing::debug!(
            "Browser shell cannot watch {} for {entity}",
            path.display()
        );
        Ok(())
    }
}

#[cfg(feature = "desktop")]
pub use desktop::DesktopShell;

#[cfg(feature = "desktop")]
mod desktop {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, UNIX_EPOCH};

    use notify_debouncer_full::{
        new_debouncer,
        notify::{RecommendedWatcher, RecursiveMode, Watcher},
        DebounceEventResult, Debouncer, FileIdMap,
    };
    use parking_lot::Mutex;

    use crate::{
        content::ContentRef,
        error::ArborError,
        event::{Event, EventBus},
        shell::PlatformShell,
    };

    const DEBOUNCE_TIMEOUT: Duration = Duration::from_millis(300);

    type TmpWatcherMap = HashMap<PathBuf, Debouncer<RecommendedWatcher, FileIdMap>>;

    /// Desktop runtime shell. Window raising is delegated to a hook injected
    /// by the embedding application; temp files are watched with debounced
    /// filesystem notifications, one debouncer per watched path.
    pub struct DesktopShell {
        raise_window: Box<dyn Fn() + Send + Sync>,
        watchers: Mutex<TmpWatcherMap>,
    }

    impl std::fmt::Debug for DesktopShell {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DesktopShell")
                .field("watched", &self.watchers.lock().len())
                .finish()
        }
    }

    impl DesktopShell {
        pub fn new(raise_window: impl Fn() + Send + Sync + 'static) -> Self {
            DesktopShell {
                raise_window: Box::new(raise_window),
                watchers: Mutex::new(HashMap::new()),
            }
        }

        pub fn unwatch_file(&self, path: &Path) {
            self.watchers.lock().remove(path);
        }
    }

    impl PlatformShell for DesktopShell {
        fn bring_to_front(&self) {
            (self.raise_window)();
        }

        fn watch_file(
            &self,
            path: &Path,
            entity: ContentRef,
            bus: &EventBus,
        ) -> Result<(), ArborError> {
            let bus = bus.clone();
            let watched_path = path.to_path_buf();
            let event_path = watched_path.clone();

            let mut debouncer = new_debouncer(
                DEBOUNCE_TIMEOUT,
                None,
                move |result: DebounceEventResult| match result {
                    Ok(events) => {
                        if !events.iter().any(|e| e.kind.is_modify()) {
                            return;
                        }
                        let last_modified_ms = std::fs::metadata(&event_path)
                            .and_then(|m| m.modified())
                            .ok()
                            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                            .map(|d| d.as_millis() as i64)
                            .unwrap_or_default();
                        bus.publish(Event::OpenedFileUpdated {
                            entity: entity.clone(),
                            last_modified_ms,
                            file_path: event_path.clone(),
                        });
                    }
                    Err(errors) => {
                        tracing::error!("Notify debouncer returned errors: {errors:?}");
                    }
                },
            )?;
            debouncer
                .watcher()
                .watch(&watched_path, RecursiveMode::NonRecursive)?;

            // Replacing an entry for the same path drops its old debouncer.
            self.watchers.lock().insert(watched_path, debouncer);
            Ok(())
        }
    }
}
