//! Integration tests for fetch crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use protoloc_errors::FetchError;
    use protoloc_events::{channel, AppEvent, EventReceiver, FetchEvent};
    use protoloc_fetch::*;
    use protoloc_types::{Coordinate, CoordinateKey, ResolutionDepth};
    use sha2::{Digest, Sha256};
    use std::time::Duration;
    use tempfile::tempdir;
    use url::Url;

    const ARTIFACT_PATH: &str =
        "/com/google/protobuf/protoc/3.25.1/protoc-3.25.1-linux-x86_64.exe";

    fn key() -> CoordinateKey {
        Coordinate::new("com.google.protobuf", "protoc", "3.25.1").key("linux-x86_64")
    }

    fn fast_client() -> NetClient {
        NetClient::new(NetConfig {
            retry_count: 2,
            retry_delay: Duration::from_millis(1),
            ..NetConfig::default()
        })
        .unwrap()
    }

    fn drain(rx: &mut EventReceiver) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Fetch(event) = message.event {
                events.push(event);
            }
        }
        events
    }

    #[tokio::test]
    async fn test_local_repository_hit() {
        let temp = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let local = LocalRepository::new(temp.path()).with_event_sender(tx);

        let expected = local.path_for(&key());
        tokio::fs::create_dir_all(expected.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&expected, b"protoc").await.unwrap();

        let request = FetchRequest::new(key(), Some(ResolutionDepth::Direct));
        let path = local.fetch(&request).await.unwrap();
        assert_eq!(path, expected);

        let events = drain(&mut rx);
        assert!(matches!(
            &events[0],
            FetchEvent::Requested { resolution_depth: Some(depth), .. } if depth == "direct"
        ));
        assert!(matches!(&events[1], FetchEvent::LocalHit { .. }));
    }

    #[tokio::test]
    async fn test_local_repository_missing() {
        let temp = tempdir().unwrap();
        let local = LocalRepository::new(temp.path());

        let err = local
            .fetch(&FetchRequest::new(key(), None))
            .await
            .unwrap_err();
        match err {
            FetchError::ArtifactMissing { artifact, searched } => {
                assert_eq!(artifact, "com.google.protobuf:protoc:exe:linux-x86_64:3.25.1");
                assert!(searched.contains("local repository"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remote_download_with_checksum() {
        let server = MockServer::start();
        let content = b"\x7fELF protoc binary";
        let digest = hex::encode(Sha256::digest(content));

        let artifact_mock = server.mock(|when, then| {
            when.method(GET).path(ARTIFACT_PATH);
            then.status(200)
                .header("content-length", content.len().to_string())
                .body(content);
        });
        let checksum_mock = server.mock(|when, then| {
            when.method(GET).path(format!("{ARTIFACT_PATH}.sha256"));
            then.status(200)
                .body(format!("{digest}  protoc-3.25.1-linux-x86_64.exe\n"));
        });

        let temp = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let remote = RemoteRepository::new(
            LocalRepository::new(temp.path()),
            vec![Url::parse(&server.base_url()).unwrap()],
            fast_client(),
        )
        .with_event_sender(tx);

        let request = FetchRequest::new(key(), None);
        let path = remote.fetch(&request).await.unwrap();
        assert_eq!(path, remote.local().path_for(&key()));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), content);

        // Second fetch is served from the local repository
        let again = remote.fetch(&request).await.unwrap();
        assert_eq!(again, path);
        artifact_mock.assert_hits(1);
        checksum_mock.assert_hits(1);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            FetchEvent::DownloadCompleted {
                checksum_verified: true,
                ..
            }
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, FetchEvent::LocalHit { .. })));

        // No partial files left behind
        let mut entries = tokio::fs::read_dir(path.parent().unwrap()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name());
        }
        assert_eq!(names, vec!["protoc-3.25.1-linux-x86_64.exe"]);
    }

    #[tokio::test]
    async fn test_checksum_mismatch_discards_download() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(ARTIFACT_PATH);
            then.status(200).body("tampered");
        });
        server.mock(|when, then| {
            when.method(GET).path(format!("{ARTIFACT_PATH}.sha256"));
            then.status(200).body("0".repeat(64));
        });

        let temp = tempdir().unwrap();
        let remote = RemoteRepository::new(
            LocalRepository::new(temp.path()),
            vec![Url::parse(&server.base_url()).unwrap()],
            fast_client(),
        );

        let err = remote
            .fetch(&FetchRequest::new(key(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ChecksumMismatch { .. }));

        let destination = remote.local().path_for(&key());
        assert!(!destination.exists());
        let leftovers = std::fs::read_dir(destination.parent().unwrap())
            .unwrap()
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_missing_checksum_is_reported_not_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(ARTIFACT_PATH);
            then.status(200).body("protoc");
        });
        server.mock(|when, then| {
            when.method(GET).path(format!("{ARTIFACT_PATH}.sha256"));
            then.status(404);
        });

        let temp = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let remote = RemoteRepository::new(
            LocalRepository::new(temp.path()),
            vec![Url::parse(&server.base_url()).unwrap()],
            fast_client(),
        )
        .with_event_sender(tx);

        remote.fetch(&FetchRequest::new(key(), None)).await.unwrap();

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, FetchEvent::ChecksumUnavailable { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            FetchEvent::DownloadCompleted {
                checksum_verified: false,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_falls_through_to_next_remote() {
        let empty = MockServer::start();
        let missing = empty.mock(|when, then| {
            when.method(GET).path(ARTIFACT_PATH);
            then.status(404);
        });
        let mirror = MockServer::start();
        mirror.mock(|when, then| {
            when.method(GET).path(format!("/maven2{ARTIFACT_PATH}"));
            then.status(200).body("protoc");
        });

        let temp = tempdir().unwrap();
        let remote = RemoteRepository::new(
            LocalRepository::new(temp.path()),
            vec![
                Url::parse(&empty.base_url()).unwrap(),
                Url::parse(&mirror.url("/maven2")).unwrap(),
            ],
            fast_client(),
        );

        let path = remote
            .fetch(&FetchRequest::new(key(), None))
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"protoc");
        missing.assert_hits(1);
    }

    #[tokio::test]
    async fn test_forbidden_remote_is_skipped_with_warning() {
        let forbidden = MockServer::start();
        let denied = forbidden.mock(|when, then| {
            when.method(GET).path(ARTIFACT_PATH);
            then.status(403);
        });
        let mirror = MockServer::start();
        mirror.mock(|when, then| {
            when.method(GET).path(ARTIFACT_PATH);
            then.status(200).body("protoc");
        });

        let temp = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let remote = RemoteRepository::new(
            LocalRepository::new(temp.path()),
            vec![
                Url::parse(&forbidden.base_url()).unwrap(),
                Url::parse(&mirror.base_url()).unwrap(),
            ],
            fast_client(),
        )
        .with_event_sender(tx);

        let path = remote
            .fetch(&FetchRequest::new(key(), None))
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"protoc");
        denied.assert_hits(1);

        let events = drain(&mut rx);
        let skipped: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                FetchEvent::RemoteSkipped { url, failure, .. } => Some((url, failure)),
                _ => None,
            })
            .collect();
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].0.starts_with(&forbidden.base_url()));
        assert!(!skipped[0].1.retryable);
        assert!(events
            .iter()
            .any(|e| matches!(e, FetchEvent::DownloadCompleted { .. })));
    }

    #[tokio::test]
    async fn test_absent_everywhere() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(ARTIFACT_PATH);
            then.status(404);
        });

        let temp = tempdir().unwrap();
        let remote = RemoteRepository::new(
            LocalRepository::new(temp.path()),
            vec![Url::parse(&server.base_url()).unwrap()],
            fast_client(),
        );

        let err = remote
            .fetch(&FetchRequest::new(key(), None))
            .await
            .unwrap_err();
        match err {
            FetchError::ArtifactMissing { searched, .. } => {
                assert!(searched.contains(&server.base_url()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start();
        let failing = server.mock(|when, then| {
            when.method(GET).path(ARTIFACT_PATH);
            then.status(503);
        });

        let temp = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let client = fast_client().with_event_sender(tx);
        let remote = RemoteRepository::new(
            LocalRepository::new(temp.path()),
            vec![Url::parse(&server.base_url()).unwrap()],
            client,
        );

        let err = remote
            .fetch(&FetchRequest::new(key(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::HttpError { status: 503, .. }));
        failing.assert_hits(3);

        let retries = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, FetchEvent::DownloadRetrying { .. }))
            .count();
        assert_eq!(retries, 2);
    }

    #[tokio::test]
    async fn test_offline_never_contacts_remotes() {
        let server = MockServer::start();
        let never = server.mock(|when, then| {
            when.method(GET);
            then.status(200).body("protoc");
        });

        let temp = tempdir().unwrap();
        let remote = RemoteRepository::new(
            LocalRepository::new(temp.path()),
            vec![Url::parse(&server.base_url()).unwrap()],
            fast_client(),
        )
        .with_offline(true);

        let err = remote
            .fetch(&FetchRequest::new(key(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Offline { .. }));
        never.assert_hits(0);
    }
}
