//! Integration tests for the file content service: uploads, downloads,
//! streaming slices, and the external-editor temp-file round trip.

mod common;

use arbor_core::{
    content::{ContentRef, ContentStore, FileService},
    error::ArborError,
    event::EventBus,
    shell::BrowserShell,
    tree::{Note, NoteFlag},
};
use common::create_test_library;

#[tokio::test]
async fn update_note_file_records_mime_label_and_revision() {
    let cache = create_test_library();
    let service = FileService::new(cache.clone());
    let entity = ContentRef::Note("report".to_string());

    service
        .store()
        .set_content(&entity, b"draft".to_vec())
        .await
        .unwrap();

    service
        .update_note_file("report", "Report.PDF", "Application/PDF", b"final".to_vec())
        .await
        .unwrap();

    let note = cache.note("report").unwrap();
    assert_eq!(note.mime, "application/pdf");
    assert_eq!(
        note.labels.get("originalFileName").map(String::as_str),
        Some("Report.PDF")
    );
    assert_eq!(
        service.store().get_content(&entity).await.unwrap(),
        b"final".to_vec()
    );

    // The pre-upload content was snapshotted.
    let revisions = cache.revisions("report");
    assert_eq!(revisions.len(), 1);
    assert_eq!(revisions[0].content, b"draft".to_vec());
}

#[tokio::test]
async fn update_attachment_file_snapshots_owning_note() {
    let cache = create_test_library();
    let service = FileService::new(cache.clone());

    service
        .update_attachment_file("att1", "Image/PNG", vec![1, 2, 3])
        .await
        .unwrap();

    let attachment = ContentStore::attachment(&cache, "att1").await.unwrap();
    assert_eq!(attachment.mime, "image/png");
    assert_eq!(cache.revisions("report").len(), 1);
}

#[tokio::test]
async fn update_missing_entities_report_not_found() {
    let service = FileService::new(create_test_library());

    let err = service
        .update_note_file("ghost", "f", "text/plain", vec![1])
        .await
        .unwrap_err();
    assert_eq!(err, ArborError::NotFound("Note 'ghost' doesn't exist.".to_string()));
    assert_eq!(err.status_code(), http::StatusCode::NOT_FOUND);

    let err = service
        .update_attachment_file("ghost", "text/plain", vec![1])
        .await
        .unwrap_err();
    assert!(matches!(err, ArborError::NotFound(_)));
}

#[tokio::test]
async fn download_carries_mime_disposition_and_no_cache() {
    let cache = create_test_library();
    let service = FileService::new(cache);
    let entity = ContentRef::Note("report".to_string());
    service
        .store()
        .set_content(&entity, b"# Q3".to_vec())
        .await
        .unwrap();

    let payload = service.download(&entity, true, false).await.unwrap();
    assert_eq!(payload.mime, "text/markdown");
    assert_eq!(payload.content, b"# Q3".to_vec());
    assert_eq!(payload.cache_control, "no-cache, no-store, must-revalidate");
    assert_eq!(
        payload.disposition_file_name.as_deref(),
        Some("Quarterly Report.md")
    );

    let inline = service.download(&entity, false, false).await.unwrap();
    assert_eq!(inline.disposition_file_name, None);
}

#[tokio::test]
async fn protected_download_requires_protected_session() {
    let cache = create_test_library();
    cache.put_note(
        Note::new("secret", "Secret")
            .with_mime("text/plain")
            .with_flag(NoteFlag::Protected),
    );
    let service = FileService::new(cache);
    let entity = ContentRef::Note("secret".to_string());

    let err = service.download(&entity, true, false).await.unwrap_err();
    assert_eq!(err, ArborError::PermissionDenied);
    assert_eq!(err.status_code(), http::StatusCode::UNAUTHORIZED);

    assert!(service.download(&entity, true, true).await.is_ok());
}

#[tokio::test]
async fn stream_content_slices_inclusive_ranges() {
    let cache = create_test_library();
    let service = FileService::new(cache);
    let entity = ContentRef::Note("report".to_string());
    service
        .store()
        .set_content(&entity, b"0123456789".to_vec())
        .await
        .unwrap();

    let streamed = service.stream_content(&entity).await.unwrap();
    assert_eq!(streamed.total_size, 10);
    assert_eq!(streamed.mime_type, "text/markdown");
    assert_eq!(streamed.file_name, "Quarterly Report.md");

    assert_eq!(streamed.bytes(None), b"0123456789");
    assert_eq!(streamed.bytes(Some((2, 4))), b"234");
    // End past the content is clamped; inverted/out-of-range is empty.
    assert_eq!(streamed.bytes(Some((8, 100))), b"89");
    assert_eq!(streamed.bytes(Some((20, 30))), b"");
    assert_eq!(streamed.bytes(Some((4, 2))), b"");
}

#[tokio::test]
async fn tmp_file_round_trip_updates_content() {
    let cache = create_test_library();
    let service = FileService::new(cache.clone());
    let bus = EventBus::new();
    let entity = ContentRef::Note("report".to_string());
    service
        .store()
        .set_content(&entity, b"original".to_vec())
        .await
        .unwrap();

    let tmp_path = service
        .save_to_tmp_dir(&entity, &BrowserShell, &bus)
        .await
        .unwrap();
    assert!(tmp_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .ends_with("Quarterly Report.md"));
    assert_eq!(std::fs::read(&tmp_path).unwrap(), b"original".to_vec());

    // Simulate the external editor.
    std::fs::write(&tmp_path, b"edited").unwrap();
    service
        .upload_modified_file(&entity, &tmp_path)
        .await
        .unwrap();

    assert_eq!(
        service.store().get_content(&entity).await.unwrap(),
        b"edited".to_vec()
    );
    let revisions = cache.revisions("report");
    assert_eq!(revisions.len(), 1);
    assert_eq!(revisions[0].content, b"original".to_vec());

    std::fs::remove_file(&tmp_path).ok();
}

#[tokio::test]
async fn uploading_an_empty_tmp_file_is_a_validation_error() {
    let cache = create_test_library();
    let service = FileService::new(cache.clone());
    let entity = ContentRef::Note("report".to_string());

    let tmp = tempfile::NamedTempFile::new().unwrap();
    let err = service
        .upload_modified_file(&entity, tmp.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ArborError::Validation(_)));
    assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    // Nothing was snapshotted or replaced.
    assert!(cache.revisions("report").is_empty());
}

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::Duration;

    use arbor_core::{
        content::{ContentRef, ContentStore, FileService},
        event::{Event, EventBus},
        shell::{DesktopShell, PlatformShell},
    };

    use super::common::create_test_library;

    #[test]
    fn bring_to_front_invokes_injected_hook() {
        let raised = Arc::new(AtomicUsize::new(0));
        let counter = raised.clone();
        let shell = DesktopShell::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        shell.bring_to_front();
        shell.bring_to_front();
        assert_eq!(raised.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn external_edit_publishes_opened_file_updated() {
        let service = FileService::new(create_test_library());
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let shell = DesktopShell::new(|| {});
        let entity = ContentRef::Note("report".to_string());
        service
            .store()
            .set_content(&entity, b"original".to_vec())
            .await
            .unwrap();

        let tmp_path = service
            .save_to_tmp_dir(&entity, &shell, &bus)
            .await
            .unwrap();

        // Give the platform watcher time to arm before the edit lands.
        tokio::time::sleep(Duration::from_millis(250)).await;
        std::fs::write(&tmp_path, b"edited externally").unwrap();

        // Covers the debounce window plus filesystem notification latency.
        let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("no file event before timeout")
            .unwrap();
        match event {
            Event::OpenedFileUpdated {
                entity: updated,
                last_modified_ms,
                file_path,
            } => {
                assert_eq!(updated, entity);
                assert_eq!(file_path, tmp_path);
                assert!(last_modified_ms > 0);
            }
            other => panic!("unexpected event: {other}"),
        }

        // After unwatching, further edits stay silent.
        tokio::time::sleep(Duration::from_millis(600)).await;
        while rx.try_recv().is_ok() {}
        shell.unwatch_file(&tmp_path);
        std::fs::write(&tmp_path, b"edited again").unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());

        std::fs::remove_file(&tmp_path).ok();
    }
}
