//! Credential decoding and authenticated URL composition.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::domain::error::ProvisionError;

/// The only scheme accepted for repository URLs.
pub const HTTPS_PREFIX: &str = "https://";

/// Placeholder written wherever the secret would otherwise appear.
pub const REDACTED: &str = "***";

/// A decoded credential.
///
/// Lives only for one provisioning run. `Debug` is redacted and there is no
/// `Display` or `Serialize`, so the value cannot reach logs or results by
/// accident; [`Secret::expose`] is the single way out.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Replace every occurrence of the secret in `text`.
    ///
    /// Used on tool diagnostics, which may echo the URL they were given.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        if self.0.is_empty() {
            return text.to_owned();
        }
        text.replace(&self.0, REDACTED)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Decode a base64 credential into a [`Secret`].
///
/// Surrounding whitespace is ignored. An empty decoded value is rejected.
///
/// # Errors
///
/// Returns [`ProvisionError::InvalidCredentialEncoding`] if the input is not
/// base64 or does not decode to UTF-8.
pub fn decode_credential(encoded: &str) -> Result<Secret, ProvisionError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| ProvisionError::InvalidCredentialEncoding)?;
    let text = String::from_utf8(bytes).map_err(|_| ProvisionError::InvalidCredentialEncoding)?;
    if text.is_empty() {
        return Err(ProvisionError::InvalidCredentialEncoding);
    }
    Ok(Secret(text))
}

/// Check that `url` is scheme-qualified HTTPS and has something after the scheme.
///
/// # Errors
///
/// Returns [`ProvisionError::InvalidRepositoryUrl`] otherwise.
pub fn validate_repository_url(url: &str) -> Result<&str, ProvisionError> {
    let Some(remainder) = url.strip_prefix(HTTPS_PREFIX) else {
        return Err(ProvisionError::InvalidRepositoryUrl {
            url: url.to_owned(),
            reason: format!("must start with {HTTPS_PREFIX}"),
        });
    };
    if remainder.is_empty() || remainder.starts_with('/') {
        return Err(ProvisionError::InvalidRepositoryUrl {
            url: url.to_owned(),
            reason: "missing host".to_owned(),
        });
    }
    let authority = remainder.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.contains('@') {
        return Err(ProvisionError::InvalidRepositoryUrl {
            url: url.to_owned(),
            reason: "must not embed credentials".to_owned(),
        });
    }
    Ok(remainder)
}

/// Compose `https://<secret>@<remainder>` from a repository URL.
///
/// # Errors
///
/// Returns [`ProvisionError::InvalidRepositoryUrl`] if the URL is not HTTPS.
pub fn authenticated_url(secret: &Secret, url: &str) -> Result<String, ProvisionError> {
    let remainder = validate_repository_url(url)?;
    Ok(format!("{HTTPS_PREFIX}{}@{remainder}", secret.expose()))
}
