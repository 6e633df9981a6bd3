use url::Url;

/// Closed list of tracking query parameters stripped during normalization.
const TRACKING_PARAMS: [&str; 20] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "utm_id",
    "fbclid",
    "gclid",
    "yclid",
    "msclkid",
    "twclid",
    "_ga",
    "_gl",
    "ref",
    "ref_src",
    "mc_cid",
    "mc_eid",
    "igshid",
    "cmpid",
    "ocid",
];

/// Canonical form for URL-level deduplication.
///
/// Lowercases scheme and host, strips a leading `www.`, drops the fragment,
/// removes tracking parameters, sorts what remains by key then value, and
/// trims the trailing slash. Unparseable input comes back trimmed but
/// otherwise untouched. Idempotent.
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw.trim()) else {
        return raw.trim().to_string();
    };

    if let Some(host) = url.host_str()
        && let Some(bare) = host.strip_prefix("www.")
    {
        let bare = bare.to_string();
        let _ = url.set_host(Some(&bare));
    }

    url.set_fragment(None);

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.as_str()))
        .collect();
    params.sort();
    if params.is_empty() {
        url.set_query(None);
    } else {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        url.set_query(Some(&query));
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    url.to_string()
}
