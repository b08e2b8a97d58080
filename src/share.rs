//! Turning encoded scenarios into links and links back into query pairs.

use axum::http::Uri;

use crate::core::ShareParams;
use crate::error::RoiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

// Wildcard bind addresses are not reachable by whoever receives the link.
const UNROUTABLE_HOSTS: [&str; 3] = ["[::]", "::", "0.0.0.0"];

/// Extracts the query pairs from a full link, a path with a query, or a bare query
/// string (with or without the leading `?`). Fragments are ignored.
///
/// Pairs are read as form-urlencoded text, so raw spaces and URLs inside values are
/// accepted the same way a browser's `URLSearchParams` would take them.
pub fn query_pairs(link: &str) -> Result<Vec<(String, String)>, RoiError> {
    let invalid = |reason: String| RoiError::InvalidLink {
        link: link.to_string(),
        reason,
    };

    let without_fragment = link.trim().split('#').next().unwrap_or_default();
    let (head, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));
    let query = if has_scheme(head) || head.starts_with('/') {
        head.parse::<Uri>().map_err(|e| invalid(e.to_string()))?;
        query
    } else {
        without_fragment.trim_start_matches('?')
    };

    serde_urlencoded::from_str::<Vec<(String, String)>>(query).map_err(|e| invalid(e.to_string()))
}

// `scheme://` where the scheme is a letter followed by letters, digits, `+`, `-` or `.`.
fn has_scheme(text: &str) -> bool {
    let Some((scheme, _)) = text.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Builds a shareable link on `base_url`, replacing any query or fragment it had.
pub fn share_link(base_url: &str, params: &ShareParams) -> Result<String, RoiError> {
    let invalid = |reason: &str| RoiError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: reason.to_string(),
    };

    let uri = base_url
        .trim()
        .split('#')
        .next()
        .unwrap_or_default()
        .parse::<Uri>()
        .map_err(|e| invalid(&e.to_string()))?;
    let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
        return Err(invalid("expected an absolute URL such as http://localhost:8080/"));
    };

    let host = if UNROUTABLE_HOSTS.contains(&authority.host()) {
        "localhost"
    } else {
        authority.host()
    };
    let port = authority
        .port_u16()
        .map(|port| format!(":{port}"))
        .unwrap_or_default();
    let path = match uri.path() {
        "" => "/",
        path => path,
    };

    let mut link = format!("{scheme}://{host}{port}{path}");
    if !params.is_empty() {
        link.push('?');
        link.push_str(&params.to_query_string());
    }
    Ok(link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InputState, decode, encode};
    use pretty_assertions::assert_eq;

    fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn query_pairs_accepts_links_and_bare_queries() {
        let expected = owned(&[("s", "30000"), ("o", "c"), ("t", "60000")]);
        for link in [
            "https://example.com/roi/?s=30000&o=c&t=60000",
            "https://example.com/roi/?s=30000&o=c&t=60000#results",
            "/roi?s=30000&o=c&t=60000",
            "?s=30000&o=c&t=60000",
            "s=30000&o=c&t=60000",
        ] {
            assert_eq!(query_pairs(link).expect("valid link"), expected, "{link}");
        }
    }

    #[test]
    fn query_pairs_of_link_without_query_is_empty() {
        assert!(query_pairs("https://example.com/").expect("valid").is_empty());
        assert!(query_pairs("").expect("valid").is_empty());
    }

    #[test]
    fn query_pairs_keeps_urls_inside_bare_query_values() {
        assert_eq!(
            query_pairs("o=c&t=60000&ref=https://x.y").expect("bare query"),
            owned(&[("o", "c"), ("t", "60000"), ("ref", "https://x.y")])
        );
        assert_eq!(
            query_pairs("https://roi.example.org/?o=c&ref=https://x.y/?a=1").expect("link"),
            owned(&[("o", "c"), ("ref", "https://x.y/?a=1")])
        );
    }

    #[test]
    fn query_pairs_accepts_raw_spaces_and_plus_signs() {
        assert_eq!(
            query_pairs("s=30 000&p=a").expect("raw space"),
            owned(&[("s", "30 000"), ("p", "a")])
        );
        assert_eq!(
            query_pairs("https://example.com/?s=30+000&t=5%200").expect("encoded space"),
            owned(&[("s", "30 000"), ("t", "5 0")])
        );
    }

    #[test]
    fn query_pairs_rejects_malformed_links() {
        let err = query_pairs("http://exa mple.com/?s=1").expect_err("space in host");
        assert!(matches!(err, RoiError::InvalidLink { .. }));
    }

    #[test]
    fn share_link_rewrites_wildcard_hosts() {
        let params = encode(&InputState::default());
        assert_eq!(
            share_link("http://0.0.0.0:8080/", &params).expect("valid base"),
            "http://localhost:8080/?o=t&m=9&p=m&k=9"
        );
        assert_eq!(
            share_link("http://[::]:3000/calc", &params).expect("valid base"),
            "http://localhost:3000/calc?o=t&m=9&p=m&k=9"
        );
    }

    #[test]
    fn share_link_replaces_existing_query_and_fragment() {
        let params = encode(&InputState::default());
        assert_eq!(
            share_link("https://roi.example.org/?s=1#top", &params).expect("valid base"),
            "https://roi.example.org/?o=t&m=9&p=m&k=9"
        );
    }

    #[test]
    fn share_link_requires_absolute_base() {
        let err = share_link("/relative", &ShareParams::default()).expect_err("relative");
        assert!(matches!(err, RoiError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn link_round_trips_through_decode() {
        let mut state = InputState::default();
        state.current_salary_annual = Some(41_000.0);
        state.other_costs_annual = 300.0;
        state.usd_to_gbp_rate = 0.77;

        let link = share_link(DEFAULT_BASE_URL, &encode(&state)).expect("valid base");
        let pairs = query_pairs(&link).expect("valid link");
        assert_eq!(decode(&pairs), Some(state));
    }
}
