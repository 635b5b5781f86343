//! tonapi.io v2 REST client.
//!
//! Thin fetch layer over reqwest. Every failure — transport, TLS,
//! non-2xx status, bad JSON — is logged and collapsed to `None`, so
//! callers treat a missing response as "skip this unit of work". The
//! only place that escalates a `None` is the initial collection fetch
//! in `main`.

use crate::config::TonApiConfig;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

/// Collection listing wire shape. Only `items[].address` matters here;
/// everything else tonapi sends is ignored.
#[derive(Debug, Deserialize)]
struct CollectionPage {
    #[serde(default)]
    items: Vec<CollectionItem>,
}

#[derive(Debug, Deserialize)]
struct CollectionItem {
    #[serde(default)]
    address: String,
}

pub struct TonApiClient {
    base_url: String,
    accept_language: String,
    client: reqwest::Client,
}

impl TonApiClient {
    pub fn new(config: &TonApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            accept_language: config.accept_language.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// GET a tonapi endpoint and return the parsed JSON body, or `None`
    /// on any failure. Never propagates an error to the caller.
    async fn fetch_json(&self, url: &str, history_headers: bool) -> Option<Value> {
        let mut request = self.client.get(url);
        if history_headers {
            request = request
                .header("accept", "application/json")
                .header("Accept-Language", &self.accept_language);
        }

        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(url = %url, error = %e, "request failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(url = %url, status = %status, body = %body, "tonapi error response");
            return None;
        }

        match resp.json::<Value>().await {
            Ok(value) => {
                debug!(url = %url, body = %value, "fetched");
                Some(value)
            }
            Err(e) => {
                error!(url = %url, error = %e, "response body was not JSON");
                None
            }
        }
    }

    /// Fetch the item listing for a collection. No extra headers on this
    /// endpoint.
    pub async fn fetch_collection_items(&self, collection: &str) -> Option<Value> {
        let url = format!("{}/v2/nfts/collections/{}/items", self.base_url, collection);
        self.fetch_json(&url, false).await
    }

    /// Fetch the NFT history of one account (here: one collection item).
    pub async fn fetch_account_history(&self, account: &str) -> Option<Value> {
        let url = format!("{}/v2/accounts/{}/nfts/history", self.base_url, account);
        self.fetch_json(&url, true).await
    }
}

/// Pull the ordered item address sequence out of a collection listing.
///
/// A response without an `items` field yields an empty vec. Source order
/// and duplicates are preserved; an item missing its `address` becomes an
/// empty string so the listing length is kept intact (its history fetch
/// will fail and the item gets skipped like any other fetch failure).
pub fn extract_item_addresses(listing: &Value) -> Vec<String> {
    let page: CollectionPage = match serde_json::from_value(listing.clone()) {
        Ok(page) => page,
        Err(e) => {
            error!(error = %e, "unexpected collection listing shape");
            return Vec::new();
        }
    };
    page.items.into_iter().map(|item| item.address).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_addresses_in_source_order() {
        let listing = json!({
            "items": [
                {"address": "0:aa", "index": 1},
                {"address": "0:bb"},
                {"address": "0:aa"},
            ]
        });
        assert_eq!(
            extract_item_addresses(&listing),
            vec!["0:aa", "0:bb", "0:aa"]
        );
    }

    #[test]
    fn missing_items_field_is_empty_not_an_error() {
        let listing = json!({"next_from": 0});
        assert!(extract_item_addresses(&listing).is_empty());
    }

    #[test]
    fn item_without_address_keeps_its_slot() {
        let listing = json!({
            "items": [
                {"address": "0:aa"},
                {"index": 7},
                {"address": "0:bb"},
            ]
        });
        assert_eq!(extract_item_addresses(&listing), vec!["0:aa", "", "0:bb"]);
    }
}
