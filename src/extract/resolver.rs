use std::time::Duration;

use tracing::debug;
use url::Url;

/// Host whose article links wrap the publisher URL behind a redirect page.
const INDIRECT_HOST: &str = "news.google.com";
const DECODER_ENDPOINT: &str = "https://news.google.com/_/DotsSplashUi/data/batchexecute";
const SUB_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Unwraps aggregator-redirect URLs to the publisher URL.
///
/// Resolution never fails: every error path falls back to the input URL.
#[derive(Clone)]
pub struct UrlResolver {
    client: reqwest::Client,
}

impl UrlResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn resolve(&self, raw: &str) -> String {
        if !is_indirect(raw) {
            return raw.to_string();
        }
        // An HTTP redirect chain often lands on the publisher directly.
        if let Some(terminal) = self.follow_redirects(raw).await
            && !is_indirect(&terminal)
        {
            debug!(from = raw, to = %terminal, "resolved via redirect");
            return terminal;
        }
        // Otherwise ask the aggregator's decoder endpoint.
        if let Some(decoded) = self.decoded_lookup(raw).await {
            debug!(from = raw, to = %decoded, "resolved via decoder");
            return decoded;
        }
        raw.to_string()
    }

    async fn follow_redirects(&self, raw: &str) -> Option<String> {
        let response = self
            .client
            .get(raw)
            .timeout(SUB_CALL_TIMEOUT)
            .send()
            .await
            .ok()?;
        Some(response.url().to_string())
    }

    /// Fetch the redirect page, lift its signature + timestamp tokens, and
    /// POST them with the article id to the decoder endpoint. Any protocol
    /// change surfaces as a parse miss and falls through to the caller.
    async fn decoded_lookup(&self, raw: &str) -> Option<String> {
        let id = article_id(raw)?;
        let page = self
            .client
            .get(format!("https://{INDIRECT_HOST}/rss/articles/{id}"))
            .timeout(SUB_CALL_TIMEOUT)
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?
            .text()
            .await
            .ok()?;
        let (signature, timestamp) = decode_tokens(&page)?;

        let inner = format!("[\"garturlreq\",[[\"X\",\"X\",[\"en-US\",\"IN\"],null,null,1,1,\"IN:en\",null,null,null,null,null,null,null,1],\"IN\",\"en\",1,[2,4,8],1,1,null,0,0,null,0],\"{id}\",{timestamp},\"{signature}\"]");
        let envelope = serde_json::json!([[["Fbv4je", inner, null, "generic"]]]);
        let body = format!("f.req={}", urlencoding::encode(&envelope.to_string()));

        let response = self
            .client
            .post(DECODER_ENDPOINT)
            .header("content-type", "application/x-www-form-urlencoded;charset=UTF-8")
            .body(body)
            .timeout(SUB_CALL_TIMEOUT)
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?
            .text()
            .await
            .ok()?;
        decoded_url_from_envelope(&response)
    }
}

fn is_indirect(raw: &str) -> bool {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(INDIRECT_HOST)))
        .unwrap_or(false)
}

/// The opaque article id is the last path segment of the indirect URL.
fn article_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .map(|s| s.to_string())
}

/// The redirect page carries the decoder tokens as data attributes.
fn decode_tokens(html: &str) -> Option<(String, String)> {
    let doc = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("[data-n-a-sg][data-n-a-ts]").ok()?;
    let element = doc.select(&selector).next()?;
    let signature = element.value().attr("data-n-a-sg")?.to_string();
    let timestamp = element.value().attr("data-n-a-ts")?.to_string();
    Some((signature, timestamp))
}

/// The decoder answers with an anti-XSSI guard line followed by framed JSON
/// rows; the publisher URL sits inside a doubly-encoded payload.
fn decoded_url_from_envelope(body: &str) -> Option<String> {
    for line in body.lines() {
        let line = line.trim();
        if !line.starts_with('[') {
            continue;
        }
        let Ok(outer) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };
        let Some(payload) = outer
            .get(0)
            .and_then(|row| row.get(2))
            .and_then(|p| p.as_str())
        else {
            continue;
        };
        let Ok(inner) = serde_json::from_str::<serde_json::Value>(payload) else {
            continue;
        };
        if inner.get(0).and_then(|t| t.as_str()) == Some("garturlres")
            && let Some(url) = inner.get(1).and_then(|u| u.as_str())
            && url.starts_with("http")
        {
            return Some(url.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_urls_are_not_indirect() {
        assert!(!is_indirect("https://www.thehindu.com/news/article123.ece"));
        assert!(!is_indirect("not a url"));
        assert!(is_indirect("https://news.google.com/rss/articles/CBMiabc?oc=5"));
        assert!(is_indirect("https://NEWS.GOOGLE.COM/rss/articles/CBMiabc"));
    }

    #[tokio::test]
    async fn resolve_passes_direct_urls_through_untouched() {
        let resolver = UrlResolver::new(reqwest::Client::new());
        let direct = "https://www.thehindu.com/news/article123.ece";
        assert_eq!(resolver.resolve(direct).await, direct);
    }

    #[test]
    fn article_id_is_the_last_path_segment() {
        assert_eq!(
            article_id("https://news.google.com/rss/articles/CBMiabc123?oc=5").as_deref(),
            Some("CBMiabc123")
        );
        assert_eq!(
            article_id("https://news.google.com/articles/XYZ/").as_deref(),
            Some("XYZ")
        );
        assert!(article_id("https://news.google.com").is_none());
    }

    #[test]
    fn decode_tokens_reads_data_attributes() {
        let html = r#"<html><body>
            <c-wiz><div jscontroller="x" data-n-a-sg="SIG123" data-n-a-ts="99887766"></div></c-wiz>
        </body></html>"#;
        let (sg, ts) = decode_tokens(html).unwrap();
        assert_eq!(sg, "SIG123");
        assert_eq!(ts, "99887766");
        assert!(decode_tokens("<html><body><p>nothing</p></body></html>").is_none());
    }

    #[test]
    fn decoder_envelope_yields_the_publisher_url() {
        let body = concat!(
            ")]}'\n",
            "\n",
            "147\n",
            "[[\"wrb.fr\",\"Fbv4je\",\"[\\\"garturlres\\\",\\\"https://www.thehindu.com/news/heatwave.ece\\\",12345]\",null,null,null,\"generic\"]]\n",
            "25\n",
            "[[\"di\",59],[\"af.httprm\",59]]\n",
        );
        assert_eq!(
            decoded_url_from_envelope(body).as_deref(),
            Some("https://www.thehindu.com/news/heatwave.ece")
        );
    }

    #[test]
    fn malformed_envelope_falls_through() {
        assert!(decoded_url_from_envelope(")]}'\ngarbage").is_none());
        assert!(decoded_url_from_envelope("[[\"wrb.fr\",\"Fbv4je\",\"not json\"]]").is_none());
    }
}
