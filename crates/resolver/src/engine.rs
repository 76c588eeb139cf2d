//! Dispatch of executable specifications to their strategy

use futures::future::join_all;
use protoloc_config::{acquire_semaphore_permit, create_semaphore};
use protoloc_errors::{Error, ResolutionError};
use protoloc_events::{AppEvent, EventEmitter, EventSender, FailureContext, ResolutionEvent};
use protoloc_fetch::ArtifactFetchService;
use protoloc_platform::{satisfies_executability, Platform};
use protoloc_types::{
    ExecutableSpecification, ResolvedExecutable, ToolchainDescriptors, PROTOC_EXECUTABLE,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::cache::ResolutionCache;
use crate::coordinate::CoordinateResolver;
use crate::path_search::PathSearchResolver;
use crate::toolchain::{ResolvedToolchain, ToolOutcome};

const DEFAULT_CONCURRENCY: usize = 4;

/// Resolves executable specifications for one build invocation
///
/// The engine owns the coordinate cache, so every coordinate is fetched at
/// most once per engine no matter how many descriptors name it.
pub struct ResolutionEngine {
    platform: Platform,
    fetcher: Arc<dyn ArtifactFetchService>,
    cache: ResolutionCache,
    path_search: PathSearchResolver,
    coordinates: CoordinateResolver,
    concurrency: usize,
    event_sender: Option<EventSender>,
}

impl ResolutionEngine {
    #[must_use]
    pub fn new(platform: Platform, fetcher: Arc<dyn ArtifactFetchService>) -> Self {
        let path_search = PathSearchResolver::new(platform.filesystem_handle());
        let coordinates =
            CoordinateResolver::new(platform.filesystem_handle(), platform.host().clone());
        Self {
            platform,
            fetcher,
            cache: ResolutionCache::new(),
            path_search,
            coordinates,
            concurrency: DEFAULT_CONCURRENCY,
            event_sender: None,
        }
    }

    /// Upper bound on resolutions running at once in [`Self::resolve_toolchain`]
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.path_search = self.path_search.with_event_sender(sender.clone());
        self.coordinates = self.coordinates.with_event_sender(sender.clone());
        self.event_sender = Some(sender);
        self
    }

    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    #[must_use]
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Resolve a single specification
    ///
    /// # Errors
    ///
    /// Returns the strategy's `ResolutionError`; nothing is retried and no
    /// other strategy is attempted.
    pub async fn resolve(
        &self,
        specification: &ExecutableSpecification,
    ) -> Result<ResolvedExecutable, ResolutionError> {
        self.resolve_observed(specification, None).await
    }

    /// Resolve the compiler and every plugin, at most `concurrency` at a time
    ///
    /// Each descriptor gets its own outcome; one failure does not cancel the
    /// others.
    ///
    /// # Errors
    ///
    /// Returns an error only when the concurrency limiter itself fails.
    pub async fn resolve_toolchain(
        &self,
        descriptors: &ToolchainDescriptors,
    ) -> Result<ResolvedToolchain, Error> {
        let start = Instant::now();
        self.emit(AppEvent::Resolution(ResolutionEvent::ToolchainStarted {
            plugins: descriptors.plugins.len(),
            concurrency: self.concurrency,
        }));

        let semaphore = create_semaphore(self.concurrency);
        let jobs = std::iter::once((PROTOC_EXECUTABLE, descriptors.compiler.specification()))
            .chain(
                descriptors
                    .plugins
                    .iter()
                    .map(|plugin| (plugin.name(), plugin.specification())),
            )
            .map(|(name, specification)| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    let _permit = acquire_semaphore_permit(semaphore, name).await?;
                    let outcome = self.resolve_observed(specification, Some(name)).await;
                    Ok::<_, Error>(ToolOutcome {
                        name: name.to_string(),
                        outcome,
                    })
                }
            });

        let mut outcomes = join_all(jobs)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter();
        let compiler = outcomes
            .next()
            .ok_or_else(|| Error::internal("toolchain resolution produced no compiler outcome"))?;
        let toolchain = ResolvedToolchain {
            compiler,
            plugins: outcomes.collect(),
        };

        self.emit(AppEvent::Resolution(ResolutionEvent::ToolchainCompleted {
            succeeded: toolchain.succeeded(),
            failed: toolchain.failed(),
            duration_ms: elapsed_ms(start),
        }));
        Ok(toolchain)
    }

    async fn resolve_observed(
        &self,
        specification: &ExecutableSpecification,
        correlation: Option<&str>,
    ) -> Result<ResolvedExecutable, ResolutionError> {
        let start = Instant::now();
        let strategy = specification.strategy();
        self.emit_for(
            correlation,
            AppEvent::Resolution(ResolutionEvent::Started {
                specification: specification.to_string(),
                strategy,
            }),
        );

        let outcome = self.dispatch(specification).await;
        match &outcome {
            Ok(resolved) => self.emit_for(
                correlation,
                AppEvent::Resolution(ResolutionEvent::Completed {
                    specification: specification.to_string(),
                    strategy,
                    path: resolved.path().to_path_buf(),
                    cache_hit: resolved.cache_hit(),
                    duration_ms: elapsed_ms(start),
                }),
            ),
            Err(e) => self.emit_for(
                correlation,
                AppEvent::Resolution(ResolutionEvent::Failed {
                    specification: specification.to_string(),
                    strategy,
                    failure: FailureContext::from_error(e),
                }),
            ),
        }
        outcome
    }

    async fn dispatch(
        &self,
        specification: &ExecutableSpecification,
    ) -> Result<ResolvedExecutable, ResolutionError> {
        let environment = self.platform.environment();
        match specification {
            ExecutableSpecification::Explicit { path } => self.resolve_explicit(path).await,
            ExecutableSpecification::PathSearch { name } => {
                self.path_search.resolve(name, environment).await
            }
            ExecutableSpecification::Coordinate(coordinate) => {
                self.coordinates
                    .resolve(coordinate, environment, self.fetcher.as_ref(), &self.cache)
                    .await
            }
        }
    }

    /// Verify a configured path without searching or rewriting it
    async fn resolve_explicit(&self, path: &Path) -> Result<ResolvedExecutable, ResolutionError> {
        let environment = self.platform.environment();
        let Some(metadata) = self.platform.filesystem().metadata(path).await? else {
            return Err(ResolutionError::explicit_path_missing(path));
        };

        let extension_allowed = !environment.is_windows()
            || path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| environment.name_extensions().split(name).is_some());

        if extension_allowed && satisfies_executability(environment, &metadata) {
            Ok(ResolvedExecutable::explicit(path))
        } else {
            Err(ResolutionError::NotExecutable {
                path: path.to_path_buf(),
            })
        }
    }

    fn emit_for(&self, correlation: Option<&str>, event: AppEvent) {
        match correlation {
            Some(id) => self.emit_correlated(id, event),
            None => self.emit(event),
        }
    }
}

impl EventEmitter for ResolutionEngine {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
