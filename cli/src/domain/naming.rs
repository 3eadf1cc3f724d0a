//! Subdomain labels and full domains.

/// Length of a generated subdomain label.
pub const LABEL_LEN: usize = 8;

/// Alphabet labels are drawn from.
pub const LABEL_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// An allocated domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub subdomain: String,
    /// `{subdomain}.{base_domain}`.
    pub full: String,
}

impl Domain {
    #[must_use]
    pub fn new(subdomain: &str, base_domain: &str) -> Self {
        Self {
            subdomain: subdomain.to_owned(),
            full: format!("{subdomain}.{base_domain}"),
        }
    }

    /// Browsable URL for the domain.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.full)
    }
}

/// Check that `label` is [`LABEL_LEN`] characters from [`LABEL_ALPHABET`].
#[must_use]
pub fn is_valid_label(label: &str) -> bool {
    label.len() == LABEL_LEN && label.bytes().all(|b| LABEL_ALPHABET.contains(&b))
}

/// Check that `domain` is a dotted name of lowercase DNS labels.
#[must_use]
pub fn is_valid_base_domain(domain: &str) -> bool {
    domain.contains('.')
        && domain.split('.').all(|part| {
            !part.is_empty()
                && part.len() <= 63
                && !part.starts_with('-')
                && !part.ends_with('-')
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        })
}
