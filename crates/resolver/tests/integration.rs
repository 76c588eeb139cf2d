//! Integration tests for resolver crate

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use protoloc_errors::{FetchError, PlatformError, ResolutionError};
    use protoloc_events::{channel, AppEvent, EventReceiver, ResolutionEvent};
    use protoloc_fetch::{ArtifactFetchService, FetchRequest};
    use protoloc_platform::{
        FileMetadata, FilesystemOperations, HostPlatform, Platform, PlatformEnvironment,
    };
    use protoloc_resolver::*;
    use protoloc_types::{
        CompilerDescriptor, Coordinate, ExecutableSpecification, PluginDescriptor,
        ResolutionDepth, ResolutionStrategy, ToolchainDescriptors,
    };
    use std::collections::BTreeMap;
    use std::ffi::OsString;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Debug, Clone, Copy)]
    enum Node {
        Dir,
        /// A directory whose listing fails with permission denied
        Unreadable,
        File(u32),
        /// A symlink pointing nowhere
        Dangling,
    }

    /// In-memory filesystem with injectable listing failures
    #[derive(Default)]
    struct MemoryFilesystem {
        nodes: Mutex<BTreeMap<PathBuf, Node>>,
    }

    impl MemoryFilesystem {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn insert(&self, path: &str, node: Node) {
            let path = PathBuf::from(path);
            let mut nodes = self.nodes.lock().unwrap();
            for ancestor in path.ancestors().skip(1) {
                nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
            }
            nodes.insert(path, node);
        }

        fn dir(&self, path: &str) {
            self.insert(path, Node::Dir);
        }

        fn file(&self, path: &str, mode: u32) {
            self.insert(path, Node::File(mode));
        }

        fn mode(&self, path: &str) -> Option<u32> {
            match self.nodes.lock().unwrap().get(Path::new(path)) {
                Some(Node::File(mode)) => Some(*mode),
                _ => None,
            }
        }
    }

    #[async_trait]
    impl FilesystemOperations for MemoryFilesystem {
        async fn metadata(&self, path: &Path) -> Result<Option<FileMetadata>, PlatformError> {
            Ok(match self.nodes.lock().unwrap().get(path) {
                Some(Node::Dir | Node::Unreadable) => Some(FileMetadata::directory()),
                Some(Node::File(mode)) => Some(FileMetadata::file(Some(*mode))),
                Some(Node::Dangling) | None => None,
            })
        }

        async fn read_dir(&self, path: &Path) -> Result<Vec<OsString>, PlatformError> {
            let nodes = self.nodes.lock().unwrap();
            match nodes.get(path) {
                Some(Node::Dir) => Ok(nodes
                    .keys()
                    .filter(|candidate| candidate.parent() == Some(path))
                    .filter_map(|candidate| candidate.file_name().map(OsString::from))
                    .collect()),
                Some(Node::Unreadable) => Err(PlatformError::filesystem(
                    "read_dir",
                    path,
                    &std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                )),
                _ => Err(PlatformError::filesystem(
                    "read_dir",
                    path,
                    &std::io::Error::from(std::io::ErrorKind::NotFound),
                )),
            }
        }

        async fn set_mode(&self, path: &Path, mode: u32) -> Result<(), PlatformError> {
            let mut nodes = self.nodes.lock().unwrap();
            match nodes.get_mut(path) {
                Some(Node::File(current)) => {
                    *current = mode;
                    Ok(())
                }
                _ => Err(PlatformError::filesystem(
                    "set_permissions",
                    path,
                    &std::io::Error::from(std::io::ErrorKind::NotFound),
                )),
            }
        }
    }

    /// Places every requested artifact under `/repo` and counts calls
    struct CountingFetcher {
        filesystem: Arc<MemoryFilesystem>,
        calls: AtomicUsize,
        failures_left: AtomicUsize,
        delay: Duration,
        mode: u32,
        requests: Mutex<Vec<FetchRequest>>,
    }

    impl CountingFetcher {
        fn new(filesystem: Arc<MemoryFilesystem>) -> Self {
            Self {
                filesystem,
                calls: AtomicUsize::new(0),
                failures_left: AtomicUsize::new(0),
                delay: Duration::ZERO,
                mode: 0o644,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing_first(self, failures: usize) -> Self {
            self.failures_left.store(failures, Ordering::SeqCst);
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ArtifactFetchService for CountingFetcher {
        async fn fetch(&self, request: &FetchRequest) -> Result<PathBuf, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let remaining = self.failures_left.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_left.store(remaining - 1, Ordering::SeqCst);
                return Err(FetchError::ConnectionFailed("connection reset".to_string()));
            }

            let path = format!("/repo/{}", request.key.file_name());
            self.filesystem.file(&path, self.mode);
            Ok(PathBuf::from(path))
        }
    }

    fn linux_host() -> HostPlatform {
        HostPlatform::new("linux", "x86_64")
    }

    fn engine_with(
        filesystem: Arc<MemoryFilesystem>,
        environment: PlatformEnvironment,
        fetcher: Arc<dyn ArtifactFetchService>,
    ) -> ResolutionEngine {
        let platform = Platform::new(environment, linux_host(), filesystem);
        ResolutionEngine::new(platform, fetcher)
    }

    fn path_engine(
        filesystem: &Arc<MemoryFilesystem>,
        environment: PlatformEnvironment,
    ) -> ResolutionEngine {
        let fetcher = Arc::new(CountingFetcher::new(Arc::clone(filesystem)));
        engine_with(Arc::clone(filesystem), environment, fetcher)
    }

    fn protoc() -> ExecutableSpecification {
        ExecutableSpecification::path_search("protoc")
    }

    fn protoc_coordinate() -> Coordinate {
        Coordinate::new("com.google.protobuf", "protoc", "3.25.1")
    }

    fn drain(rx: &mut EventReceiver) -> Vec<ResolutionEvent> {
        let mut events = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Resolution(event) = message.event {
                events.push(event);
            }
        }
        events
    }

    // Path search

    #[tokio::test]
    async fn test_empty_search_path_is_not_found_on_both_platforms() {
        let fs = MemoryFilesystem::new();
        for environment in [
            PlatformEnvironment::posix(Vec::<PathBuf>::new()),
            PlatformEnvironment::windows(Vec::<PathBuf>::new(), [".exe"]),
        ] {
            let err = path_engine(&fs, environment)
                .resolve(&protoc())
                .await
                .unwrap_err();
            match err {
                ResolutionError::NotFound { name, searched } => {
                    assert_eq!(name, "protoc");
                    assert!(searched.contains("0 directories"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_missing_directories_are_ignored() {
        let fs = MemoryFilesystem::new();
        fs.file("/opt/tools/protoc", 0o600);

        let environment = PlatformEnvironment::posix(["/does/not/exist", "/opt/tools/protoc"]);
        let err = path_engine(&fs, environment)
            .resolve(&protoc())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_posix_skips_non_executable_match() {
        let fs = MemoryFilesystem::new();
        fs.file("/first/protoc", 0o644);
        fs.file("/second/protoc", 0o750);

        let resolved = path_engine(&fs, PlatformEnvironment::posix(["/first", "/second"]))
            .resolve(&protoc())
            .await
            .unwrap();
        assert_eq!(resolved.path(), Path::new("/second/protoc"));
        assert_eq!(resolved.source_strategy(), ResolutionStrategy::PathSearch);
        assert_eq!(resolved.cache_hit(), None);
    }

    #[tokio::test]
    async fn test_posix_names_are_case_sensitive() {
        let fs = MemoryFilesystem::new();
        fs.file("/bin/PROTOC", 0o755);
        fs.file("/bin/Protoc", 0o755);
        fs.file("/bin/protoc.exe", 0o755);

        let err = path_engine(&fs, PlatformEnvironment::posix(["/bin"]))
            .resolve(&protoc())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_windows_matches_name_and_extension_ignoring_case() {
        let fs = MemoryFilesystem::new();
        fs.file("/tools/pROTOC.eXe", 0o644);

        let environment =
            PlatformEnvironment::windows(["/tools"], [".aaa", ".bbb", ".ccc", ".exe"]);
        let resolved = path_engine(&fs, environment)
            .resolve(&protoc())
            .await
            .unwrap();
        assert_eq!(resolved.path(), Path::new("/tools/pROTOC.eXe"));
    }

    #[tokio::test]
    async fn test_windows_requires_a_listed_extension() {
        let fs = MemoryFilesystem::new();
        fs.file("/tools/protoc", 0o755);

        let environment = PlatformEnvironment::windows(["/tools"], [".aaa", ".bbb", ".ccc"]);
        let err = path_engine(&fs, environment)
            .resolve(&protoc())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_first_directory_with_a_match_wins() {
        let fs = MemoryFilesystem::new();
        fs.file("/a/protoc", 0o755);
        fs.file("/b/protoc", 0o755);

        let resolved = path_engine(&fs, PlatformEnvironment::posix(["/b", "/a"]))
            .resolve(&protoc())
            .await
            .unwrap();
        assert_eq!(resolved.path(), Path::new("/b/protoc"));
    }

    #[tokio::test]
    async fn test_empty_directory_before_match() {
        let fs = MemoryFilesystem::new();
        fs.dir("/foo/bar/existent");
        fs.file("/foo/qux/protoc", 0o755);

        let resolved = path_engine(
            &fs,
            PlatformEnvironment::posix(["/foo/bar/existent", "/foo/qux"]),
        )
        .resolve(&protoc())
        .await
        .unwrap();
        assert_eq!(resolved.path(), Path::new("/foo/qux/protoc"));
    }

    #[tokio::test]
    async fn test_exe_suffix_is_not_found_on_posix() {
        let fs = MemoryFilesystem::new();
        fs.file("/foo/bar/protoc.exe", 0o755);

        let err = path_engine(&fs, PlatformEnvironment::posix(["/foo/bar"]))
            .resolve(&protoc())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unreadable_directory_aborts_search() {
        let fs = MemoryFilesystem::new();
        fs.insert("/foo/bar/existent", Node::Unreadable);
        fs.file("/foo/qux/protoc", 0o755);

        let err = path_engine(
            &fs,
            PlatformEnvironment::posix(["/foo/bar/existent", "/foo/qux"]),
        )
        .resolve(&protoc())
        .await
        .unwrap_err();
        match err {
            ResolutionError::FileSystem {
                operation,
                path,
                kind,
                ..
            } => {
                assert_eq!(operation, "read_dir");
                assert_eq!(path, PathBuf::from("/foo/bar/existent"));
                assert_eq!(kind, std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dangling_candidate_and_file_on_path_are_skipped() {
        let fs = MemoryFilesystem::new();
        fs.file("/opt/notadir", 0o755);
        fs.insert("/first/protoc", Node::Dangling);
        fs.file("/second/protoc", 0o755);

        let (tx, mut rx) = channel();
        let resolved = path_engine(
            &fs,
            PlatformEnvironment::posix(["/opt/notadir", "/first", "/second"]),
        )
        .with_event_sender(tx)
        .resolve(&protoc())
        .await
        .unwrap();
        assert_eq!(resolved.path(), Path::new("/second/protoc"));

        let skipped: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|event| match event {
                ResolutionEvent::DirectorySkipped { directory, .. } => Some(directory),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec![PathBuf::from("/opt/notadir")]);
    }

    // Explicit paths

    #[tokio::test]
    async fn test_explicit_path_round_trips() {
        let fs = MemoryFilesystem::new();
        fs.file("/usr/local/bin/protoc", 0o755);

        let spec = ExecutableSpecification::explicit("/usr/local/bin/protoc");
        let resolved = path_engine(&fs, PlatformEnvironment::posix(Vec::<PathBuf>::new()))
            .resolve(&spec)
            .await
            .unwrap();
        assert_eq!(resolved.path(), Path::new("/usr/local/bin/protoc"));
        assert_eq!(resolved.source_strategy(), ResolutionStrategy::Explicit);
    }

    #[tokio::test]
    async fn test_explicit_path_failures() {
        let fs = MemoryFilesystem::new();
        fs.file("/usr/local/bin/protoc", 0o644);
        fs.dir("/usr/local/include");
        let engine = path_engine(&fs, PlatformEnvironment::posix(Vec::<PathBuf>::new()));

        let missing = engine
            .resolve(&ExecutableSpecification::explicit("/nowhere/protoc"))
            .await
            .unwrap_err();
        assert!(matches!(missing, ResolutionError::NotFound { .. }));

        let not_executable = engine
            .resolve(&ExecutableSpecification::explicit("/usr/local/bin/protoc"))
            .await
            .unwrap_err();
        assert!(matches!(not_executable, ResolutionError::NotExecutable { .. }));

        let directory = engine
            .resolve(&ExecutableSpecification::explicit("/usr/local/include"))
            .await
            .unwrap_err();
        assert!(matches!(directory, ResolutionError::NotExecutable { .. }));
    }

    #[tokio::test]
    async fn test_explicit_path_on_windows_needs_known_extension() {
        let fs = MemoryFilesystem::new();
        fs.file("/tools/protoc.EXE", 0o644);
        fs.file("/tools/protoc.txt", 0o644);
        let engine = path_engine(
            &fs,
            PlatformEnvironment::windows(Vec::<PathBuf>::new(), [".exe", ".bat"]),
        );

        let resolved = engine
            .resolve(&ExecutableSpecification::explicit("/tools/protoc.EXE"))
            .await
            .unwrap();
        assert_eq!(resolved.path(), Path::new("/tools/protoc.EXE"));

        let err = engine
            .resolve(&ExecutableSpecification::explicit("/tools/protoc.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::NotExecutable { .. }));
    }

    // Coordinates

    #[tokio::test]
    async fn test_same_coordinate_is_fetched_once() {
        let fs = MemoryFilesystem::new();
        let fetcher = Arc::new(CountingFetcher::new(Arc::clone(&fs)));
        let engine = engine_with(
            Arc::clone(&fs),
            PlatformEnvironment::posix(Vec::<PathBuf>::new()),
            fetcher.clone(),
        );
        let spec = ExecutableSpecification::coordinate(protoc_coordinate());

        let first = engine.resolve(&spec).await.unwrap();
        let second = engine.resolve(&spec).await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(first.cache_hit(), Some(false));
        assert_eq!(second.cache_hit(), Some(true));
        assert_eq!(first.path(), second.path());
        assert_eq!(
            first.path(),
            Path::new("/repo/protoc-3.25.1-linux-x86_64.exe")
        );
        assert_eq!(engine.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let fs = MemoryFilesystem::new();
        let fetcher = Arc::new(
            CountingFetcher::new(Arc::clone(&fs)).with_delay(Duration::from_millis(50)),
        );
        let engine = engine_with(
            Arc::clone(&fs),
            PlatformEnvironment::posix(Vec::<PathBuf>::new()),
            fetcher.clone(),
        );
        let spec = ExecutableSpecification::coordinate(protoc_coordinate());

        let (a, b) = tokio::join!(engine.resolve(&spec), engine.resolve(&spec));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(a.path(), b.path());
        let mut hits = [a.cache_hit(), b.cache_hit()];
        hits.sort();
        assert_eq!(hits, [Some(false), Some(true)]);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let fs = MemoryFilesystem::new();
        let fetcher = Arc::new(CountingFetcher::new(Arc::clone(&fs)).failing_first(1));
        let engine = engine_with(
            Arc::clone(&fs),
            PlatformEnvironment::posix(Vec::<PathBuf>::new()),
            fetcher.clone(),
        );
        let spec = ExecutableSpecification::coordinate(protoc_coordinate());

        let err = engine.resolve(&spec).await.unwrap_err();
        match &err {
            ResolutionError::FetchFailure { coordinate, cause } => {
                assert_eq!(coordinate, "com.google.protobuf:protoc:exe:linux-x86_64:3.25.1");
                assert!(matches!(cause, FetchError::ConnectionFailed(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(engine.cache().is_empty());

        let resolved = engine.resolve(&spec).await.unwrap();
        assert_eq!(resolved.cache_hit(), Some(false));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_fetched_artifact_is_made_executable() {
        let fs = MemoryFilesystem::new();
        let fetcher = Arc::new(CountingFetcher::new(Arc::clone(&fs)));
        let (tx, mut rx) = channel();
        let engine = engine_with(
            Arc::clone(&fs),
            PlatformEnvironment::posix(Vec::<PathBuf>::new()),
            fetcher,
        )
        .with_event_sender(tx);

        let resolved = engine
            .resolve(&ExecutableSpecification::coordinate(protoc_coordinate()))
            .await
            .unwrap();
        let path = resolved.path().to_str().unwrap().to_string();
        assert_eq!(fs.mode(&path), Some(0o755));

        let events = drain(&mut rx);
        assert!(events.iter().any(|event| matches!(
            event,
            ResolutionEvent::PermissionsNormalized {
                mode_before: 0o644,
                mode_after: 0o755,
                ..
            }
        )));
        assert!(matches!(events.first(), Some(ResolutionEvent::Started { .. })));
        assert!(matches!(
            events.last(),
            Some(ResolutionEvent::Completed {
                cache_hit: Some(false),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_windows_environment_leaves_permissions_alone() {
        let fs = MemoryFilesystem::new();
        let fetcher = Arc::new(CountingFetcher::new(Arc::clone(&fs)));
        let engine = engine_with(
            Arc::clone(&fs),
            PlatformEnvironment::windows(Vec::<PathBuf>::new(), [".exe"]),
            fetcher,
        );

        let resolved = engine
            .resolve(&ExecutableSpecification::coordinate(protoc_coordinate()))
            .await
            .unwrap();
        let path = resolved.path().to_str().unwrap().to_string();
        assert_eq!(fs.mode(&path), Some(0o644));
    }

    #[tokio::test]
    async fn test_archive_artifact_is_rejected() {
        let fs = MemoryFilesystem::new();
        let fetcher = Arc::new(CountingFetcher::new(Arc::clone(&fs)));
        let engine = engine_with(
            Arc::clone(&fs),
            PlatformEnvironment::posix(Vec::<PathBuf>::new()),
            fetcher,
        );
        let zipped = protoc_coordinate().with_extension("zip");

        let err = engine
            .resolve(&ExecutableSpecification::coordinate(zipped))
            .await
            .unwrap_err();
        match err {
            ResolutionError::UnexpectedArtifactLayout { path, .. } => {
                assert_eq!(path, PathBuf::from("/repo/protoc-3.25.1-linux-x86_64.zip"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(engine.cache().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_platform_needs_classifier() {
        let fs = MemoryFilesystem::new();
        let fetcher = Arc::new(CountingFetcher::new(Arc::clone(&fs)));
        let platform = Platform::new(
            PlatformEnvironment::posix(Vec::<PathBuf>::new()),
            HostPlatform::new("solaris", "sparc64"),
            fs.clone(),
        );
        let engine = ResolutionEngine::new(platform, fetcher.clone());

        let err = engine
            .resolve(&ExecutableSpecification::coordinate(protoc_coordinate()))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::UnsupportedPlatform { .. }));
        assert_eq!(fetcher.calls(), 0);

        let pinned = protoc_coordinate().with_classifier("linux-x86_64");
        engine
            .resolve(&ExecutableSpecification::coordinate(pinned))
            .await
            .unwrap();
        assert_eq!(fetcher.calls(), 1);
    }

    // Toolchains

    #[tokio::test]
    async fn test_toolchain_forwards_plugin_depth_and_keeps_every_outcome() {
        let fs = MemoryFilesystem::new();
        fs.file("/plugins/protoc-gen-go", 0o755);
        let fetcher = Arc::new(CountingFetcher::new(Arc::clone(&fs)));
        let engine = engine_with(
            Arc::clone(&fs),
            PlatformEnvironment::posix(["/plugins"]),
            fetcher.clone(),
        )
        .with_concurrency(2);

        let descriptors = ToolchainDescriptors::new(CompilerDescriptor::from_version("3.25.1"))
            .with_plugin(PluginDescriptor::with_libraries(
                "grpc-java",
                Coordinate::new("io.grpc", "protoc-gen-grpc-java", "1.62.2"),
                Some(ResolutionDepth::Transitive),
            ))
            .with_plugin(PluginDescriptor::binary(
                "go",
                ExecutableSpecification::path_search("protoc-gen-go"),
            ))
            .with_plugin(PluginDescriptor::binary(
                "missing",
                ExecutableSpecification::explicit("/nowhere/protoc-gen-missing"),
            ));

        let toolchain = engine.resolve_toolchain(&descriptors).await.unwrap();
        assert_eq!(toolchain.compiler.name, "protoc");
        assert!(toolchain.compiler.is_ok());
        let names: Vec<_> = toolchain.plugins.iter().map(|tool| tool.name.as_str()).collect();
        assert_eq!(names, vec!["grpc-java", "go", "missing"]);
        assert_eq!(toolchain.succeeded(), 3);
        assert_eq!(toolchain.failed(), 1);

        let depths: Vec<_> = fetcher
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| (request.key.artifact.clone(), request.resolution_depth))
            .collect();
        assert!(depths.contains(&("protoc".to_string(), None)));
        assert!(depths.contains(&(
            "protoc-gen-grpc-java".to_string(),
            Some(ResolutionDepth::Transitive)
        )));

        let err = toolchain.into_result().unwrap_err();
        assert!(matches!(err, ResolutionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_toolchain_into_result_preserves_order() {
        let fs = MemoryFilesystem::new();
        fs.file("/bin/protoc", 0o755);
        fs.file("/bin/protoc-gen-go", 0o755);
        fs.file("/bin/protoc-gen-ts", 0o755);
        let engine = path_engine(&fs, PlatformEnvironment::posix(["/bin"])).with_concurrency(1);

        let (tx, mut rx) = channel();
        let engine = engine.with_event_sender(tx);
        let descriptors = ToolchainDescriptors::new(CompilerDescriptor::from_version("PATH"))
            .with_plugin(PluginDescriptor::binary(
                "ts",
                ExecutableSpecification::path_search("protoc-gen-ts"),
            ))
            .with_plugin(PluginDescriptor::binary(
                "go",
                ExecutableSpecification::path_search("protoc-gen-go"),
            ));

        let (compiler, plugins) = engine
            .resolve_toolchain(&descriptors)
            .await
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(compiler.path(), Path::new("/bin/protoc"));
        assert_eq!(plugins[0].0, "ts");
        assert_eq!(plugins[0].1.path(), Path::new("/bin/protoc-gen-ts"));
        assert_eq!(plugins[1].0, "go");

        let events = drain(&mut rx);
        assert!(matches!(
            events.first(),
            Some(ResolutionEvent::ToolchainStarted {
                plugins: 2,
                concurrency: 1
            })
        ));
        assert!(matches!(
            events.last(),
            Some(ResolutionEvent::ToolchainCompleted {
                succeeded: 3,
                failed: 0,
                ..
            })
        ));
    }

    // Native filesystem

    #[cfg(unix)]
    #[tokio::test]
    async fn test_local_repository_artifact_on_disk() {
        use protoloc_fetch::LocalRepository;
        use protoloc_platform::NativeFilesystem;
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let local = LocalRepository::new(temp.path());
        let key = protoc_coordinate().key("linux-x86_64");
        let artifact = local.path_for(&key);
        std::fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        std::fs::write(&artifact, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&artifact, std::fs::Permissions::from_mode(0o644)).unwrap();

        let platform = Platform::new(
            PlatformEnvironment::posix(Vec::<PathBuf>::new()),
            linux_host(),
            Arc::new(NativeFilesystem::new()),
        );
        let engine = ResolutionEngine::new(platform, Arc::new(local));
        let spec = ExecutableSpecification::coordinate(protoc_coordinate());

        let resolved = engine.resolve(&spec).await.unwrap();
        assert_eq!(resolved.path(), artifact.as_path());
        let mode = std::fs::metadata(&artifact).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);

        let again = engine.resolve(&spec).await.unwrap();
        assert_eq!(again.cache_hit(), Some(true));
    }
}
