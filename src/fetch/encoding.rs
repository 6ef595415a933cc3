use encoding_rs::{Encoding, GBK};

/// Hosts that still serve GBK pages, usually without a usable charset header
pub const DEFAULT_LEGACY_HOSTS: &[&str] = &["jonahome.net"];

/// Codec for legacy hosts
pub fn legacy_encoding() -> &'static Encoding {
    GBK
}

/// True when `host` is one of `legacy_hosts` or a subdomain of one
pub fn is_legacy_host(host: &str, legacy_hosts: &[String]) -> bool {
    let host = host.trim_end_matches('.');
    legacy_hosts.iter().any(|legacy| {
        host == legacy.as_str()
            || host
                .strip_suffix(legacy.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Decode a response body for the host it came from.
///
/// A wrong guess never errors; it produces mojibake, which is why the legacy
/// path is keyed on the hostname instead of on decode failures.
pub fn decode_for_host(host: &str, bytes: &[u8], legacy_hosts: &[String]) -> String {
    if is_legacy_host(host, legacy_hosts) {
        let encoding = legacy_encoding();
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            tracing::warn!("{} body had bytes invalid in {}", host, encoding.name());
        }
        text.into_owned()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
