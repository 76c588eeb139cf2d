//! URL, response and checksum validation for downloads

use protoloc_errors::FetchError;
use url::Url;

/// Validate URL and check for supported protocols
///
/// # Errors
///
/// Returns `FetchError::InvalidUrl` for malformed URLs and for schemes other
/// than `http` and `https`.
pub fn validate_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::InvalidUrl(format!(
            "unsupported protocol {scheme} in {url}"
        ))),
    }
}

/// Validate HTTP response for download
pub(crate) fn validate_response(response: &reqwest::Response) -> Result<(), FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::HttpError {
            status: status.as_u16(),
            message: status.to_string(),
        })
    }
}

/// Extract the digest from a `.sha256` sidecar
///
/// Accepts a bare digest or `sha256sum` output (`<digest>  <file>`).
/// Returns the lowercase digest, or `None` when the body holds no valid one.
#[must_use]
pub fn parse_checksum(body: &str) -> Option<String> {
    let token = body.split_whitespace().next()?;
    let valid = token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit());
    valid.then(|| token.to_ascii_lowercase())
}

/// Compare the digest of downloaded bytes against the published one
pub(crate) fn verify_checksum(
    artifact: &str,
    expected: &str,
    actual: &str,
) -> Result<(), FetchError> {
    if expected.eq_ignore_ascii_case(actual) {
        Ok(())
    } else {
        Err(FetchError::ChecksumMismatch {
            artifact: artifact.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}
