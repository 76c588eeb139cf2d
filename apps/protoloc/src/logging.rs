//! Structured logging integration for events
//!
//! Library crates report through `AppEvent`s; this module turns each one
//! into a tracing record with structured fields so that `--debug` JSON logs
//! carry the full resolution history.

use protoloc_events::{AppEvent, EventMessage, FetchEvent, ResolutionEvent};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    match &message.event {
        AppEvent::Resolution(event) => log_resolution(message, event),
        AppEvent::Fetch(event) => log_fetch(message, event),
    }
}

fn log_resolution(message: &EventMessage, event: &ResolutionEvent) {
    let meta = &message.meta;
    match event {
        ResolutionEvent::Started {
            specification,
            strategy,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                specification = %specification,
                strategy = ?strategy,
                "Resolution started"
            );
        }
        ResolutionEvent::DirectorySkipped { directory, reason } => {
            debug!(
                source = meta.source.as_str(),
                directory = %directory.display(),
                reason = %reason,
                "Search directory skipped"
            );
        }
        ResolutionEvent::CacheHit { coordinate, path } => {
            debug!(
                source = meta.source.as_str(),
                correlation = ?meta.correlation_id,
                coordinate = %coordinate,
                path = %path.display(),
                "Coordinate served from cache"
            );
        }
        ResolutionEvent::PermissionsNormalized {
            path,
            mode_before,
            mode_after,
        } => {
            info!(
                source = meta.source.as_str(),
                path = %path.display(),
                mode_before = format_args!("{mode_before:o}"),
                mode_after = format_args!("{mode_after:o}"),
                "Execute permissions added"
            );
        }
        ResolutionEvent::Completed {
            specification,
            strategy,
            path,
            cache_hit,
            duration_ms,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                specification = %specification,
                strategy = ?strategy,
                path = %path.display(),
                cache_hit = ?cache_hit,
                duration_ms = duration_ms,
                "Resolution completed"
            );
        }
        ResolutionEvent::Failed {
            specification,
            strategy,
            failure,
        } => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                specification = %specification,
                strategy = ?strategy,
                retryable = failure.retryable,
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                "Resolution failed"
            );
        }
        ResolutionEvent::ToolchainStarted {
            plugins,
            concurrency,
        } => {
            info!(
                source = meta.source.as_str(),
                plugins = plugins,
                concurrency = concurrency,
                "Toolchain resolution started"
            );
        }
        ResolutionEvent::ToolchainCompleted {
            succeeded,
            failed,
            duration_ms,
        } => {
            info!(
                source = meta.source.as_str(),
                succeeded = succeeded,
                failed = failed,
                duration_ms = duration_ms,
                "Toolchain resolution completed"
            );
        }
    }
}

fn log_fetch(message: &EventMessage, event: &FetchEvent) {
    let meta = &message.meta;
    match event {
        FetchEvent::Requested {
            artifact,
            resolution_depth,
        } => {
            debug!(
                source = meta.source.as_str(),
                artifact = %artifact,
                resolution_depth = ?resolution_depth,
                "Artifact requested"
            );
        }
        FetchEvent::LocalHit { artifact, path } => {
            debug!(
                source = meta.source.as_str(),
                artifact = %artifact,
                path = %path.display(),
                "Artifact found in local repository"
            );
        }
        FetchEvent::DownloadStarted {
            artifact,
            url,
            total_size,
        } => {
            info!(
                source = meta.source.as_str(),
                artifact = %artifact,
                url = %url,
                total_size = ?total_size,
                "Download started"
            );
        }
        FetchEvent::DownloadRetrying {
            url,
            attempt,
            max_attempts,
            reason,
        } => {
            warn!(
                source = meta.source.as_str(),
                url = %url,
                attempt = attempt,
                max_attempts = max_attempts,
                reason = %reason,
                "Download retrying"
            );
        }
        FetchEvent::RemoteSkipped {
            artifact,
            url,
            failure,
        } => {
            warn!(
                source = meta.source.as_str(),
                artifact = %artifact,
                url = %url,
                code = ?failure.code,
                message = %failure.message,
                "Remote repository skipped"
            );
        }
        FetchEvent::DownloadCompleted {
            artifact,
            url,
            path,
            bytes,
            checksum_verified,
        } => {
            info!(
                source = meta.source.as_str(),
                artifact = %artifact,
                url = %url,
                path = %path.display(),
                bytes = bytes,
                checksum_verified = checksum_verified,
                "Download completed"
            );
        }
        FetchEvent::ChecksumUnavailable { artifact, url } => {
            warn!(
                source = meta.source.as_str(),
                artifact = %artifact,
                url = %url,
                "Repository publishes no checksum"
            );
        }
        FetchEvent::Failed { artifact, failure } => {
            error!(
                source = meta.source.as_str(),
                artifact = %artifact,
                retryable = failure.retryable,
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                "Fetch failed"
            );
        }
    }
}
