//! Session cookie extraction.
//!
//! The sign-in endpoint issues credentials as `Set-Cookie` values such as
//! `sid=abc123; Path=/; HttpOnly`. Only the leading `name=value` pair is
//! replayed on later requests.

/// Cookie attribute names that only appear in issuance headers.
const ISSUANCE_ATTRIBUTES: [&str; 9] = [
    "path",
    "domain",
    "expires",
    "max-age",
    "secure",
    "httponly",
    "samesite",
    "partitioned",
    "priority",
];

/// Extract replayable `name=value` pairs from raw issuance header values.
///
/// Each value contributes the pair before its first `;`. Multiple pairs are
/// joined with `"; "`. Malformed values (no `=`, empty name) are skipped.
/// Returns `None` when nothing usable remains.
///
/// # Examples
///
/// ```
/// use shopcheck_auth::cookie::extract_credential_value;
///
/// assert_eq!(
///     extract_credential_value(["sid=abc123; Path=/; HttpOnly"]),
///     Some("sid=abc123".to_string())
/// );
/// assert_eq!(
///     extract_credential_value(["sid=a; Path=/", "other=b; Secure"]),
///     Some("sid=a; other=b".to_string())
/// );
/// assert_eq!(extract_credential_value([""]), None);
/// ```
#[must_use]
pub fn extract_credential_value<I, S>(raw_values: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pairs: Vec<String> = raw_values
        .into_iter()
        .filter_map(|raw| leading_pair(raw.as_ref()))
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// `true` if `token` still carries issuance attributes (`Path`, `HttpOnly`, …)
/// rather than being a clean `name=value` list.
#[must_use]
pub fn is_raw_issuance(token: &str) -> bool {
    token.split(';').skip(1).any(|segment| {
        let name = segment.split('=').next().unwrap_or_default().trim();
        ISSUANCE_ATTRIBUTES
            .iter()
            .any(|attribute| name.eq_ignore_ascii_case(attribute))
    })
}

/// Clean a stored token before it is attached as a `Cookie` header.
///
/// Clean tokens pass through trimmed; tokens that look like raw issuance
/// headers are re-extracted. Returns `None` for blank or unusable tokens.
#[must_use]
pub fn normalize_credential(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if is_raw_issuance(token) {
        extract_credential_value([token])
    } else {
        Some(token.to_string())
    }
}

fn leading_pair(raw: &str) -> Option<String> {
    let pair = raw.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(format!("{name}={}", value.trim()))
}
