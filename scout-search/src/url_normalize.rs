//! Result link resolution.
//!
//! Search engines rarely link straight to the destination page. Google
//! wraps links in `/url?q=`, DuckDuckGo in `/l/?uddg=`, and Bing in
//! `/ck/a?u=a1<base64>`. This module unwraps those redirects and rejects
//! links that point back into the engine itself.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use url::Url;

/// Google's relative redirect prefix.
const GOOGLE_REDIRECT_PREFIX: &str = "/url?q=";

/// Resolve a result link's `href` to the absolute destination URL.
///
/// Returns `None` for links that cannot be a search result: empty values,
/// in-engine links (`/search…`, `#…`), and anything that is not an
/// absolute `http`/`https` URL after unwrapping.
///
/// A Google `/url?q=` target is everything between `q=` and the next `&`,
/// percent-decoded once. Google form-encodes that value, so `%3F` and `%3D`
/// in it are the target's own `?` and `=`; taking the raw text would leave
/// `https%3A%2F%2F…` targets unparseable.
///
/// # Examples
///
/// ```
/// use scout_search::url_normalize::resolve_result_url;
///
/// assert_eq!(
///     resolve_result_url("/url?q=https://example.com/&sa=U&ved=2ah").as_deref(),
///     Some("https://example.com/"),
/// );
/// assert_eq!(resolve_result_url("/search?q=more"), None);
/// ```
pub fn resolve_result_url(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("/search") || href.starts_with('#') {
        return None;
    }

    let candidate = if let Some(rest) = href.strip_prefix(GOOGLE_REDIRECT_PREFIX) {
        let target = rest.split('&').next().unwrap_or_default();
        percent_decode(target)
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        href.to_owned()
    };

    let parsed = Url::parse(&candidate).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    match unwrap_engine_redirect(&parsed) {
        Redirect::Target(target) => {
            let target_url = Url::parse(&target).ok()?;
            matches!(target_url.scheme(), "http" | "https").then_some(target)
        }
        Redirect::Internal => None,
        Redirect::None => Some(candidate),
    }
}

/// Host component of an absolute URL, or an empty string.
pub fn domain_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .unwrap_or_default()
}

enum Redirect {
    /// The link wraps this destination.
    Target(String),
    /// The link stays inside the engine (pagination, related searches).
    Internal,
    /// The link is not an engine link.
    None,
}

fn unwrap_engine_redirect(parsed: &Url) -> Redirect {
    let Some(host) = parsed.host_str() else {
        return Redirect::None;
    };
    let path = parsed.path();

    if is_engine_host(host, "google") {
        if path == "/url" {
            return query_value(parsed, &["q", "url"]).map_or(Redirect::Internal, Redirect::Target);
        }
        if path.starts_with("/search") {
            return Redirect::Internal;
        }
    }

    if (host == "duckduckgo.com" || host.ends_with(".duckduckgo.com")) && path.starts_with("/l/") {
        return query_value(parsed, &["uddg"]).map_or(Redirect::Internal, Redirect::Target);
    }

    if (host == "bing.com" || host.ends_with(".bing.com")) && path == "/ck/a" {
        return query_value(parsed, &["u"])
            .and_then(|encoded| decode_bing_target(&encoded))
            .map_or(Redirect::None, Redirect::Target);
    }

    Redirect::None
}

/// Whether `host` is one of Google's country domains, e.g. `www.google.co.uk`.
fn is_engine_host(host: &str, name: &str) -> bool {
    host.split('.').any(|label| label == name)
        && host
            .split('.')
            .skip_while(|label| *label != name)
            .nth(1)
            .is_some()
}

fn query_value(parsed: &Url, keys: &[&str]) -> Option<String> {
    parsed
        .query_pairs()
        .find(|(key, value)| keys.contains(&key.as_ref()) && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Bing encodes the destination as `a1` followed by unpadded URL-safe base64.
fn decode_bing_target(encoded: &str) -> Option<String> {
    let payload = encoded.strip_prefix("a1")?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    String::from_utf8(bytes).ok()
}

fn percent_decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_owned())
}
