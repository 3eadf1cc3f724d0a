//! Hosts-file parsing.

/// Address every provisioned domain resolves to.
pub const LOOPBACK: &str = "127.0.0.1";

/// The line appended for `full_domain`, including the trailing newline.
#[must_use]
pub fn entry_line(full_domain: &str) -> String {
    format!("{LOOPBACK} {full_domain}\n")
}

/// Whether any non-comment line of `contents` maps a name equal to `full_domain`.
///
/// Matches on whole hostnames, so `ab.ipless.local` does not match
/// `xab.ipless.local`. Trailing `#` comments are ignored.
#[must_use]
pub fn has_entry(contents: &str, full_domain: &str) -> bool {
    contents.lines().any(|line| {
        let line = line.split('#').next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        // First field is the address.
        fields.next().is_some() && fields.any(|name| name.eq_ignore_ascii_case(full_domain))
    })
}

/// Text to append so `contents` gains the entry on its own line.
///
/// Prepends a newline when the file does not already end with one.
#[must_use]
pub fn append_text(contents: &str, full_domain: &str) -> String {
    if contents.is_empty() || contents.ends_with('\n') {
        entry_line(full_domain)
    } else {
        format!("\n{}", entry_line(full_domain))
    }
}
