use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use std::time::Duration;
use tracing::debug;

use crate::core::FundError;

/// Referer the ranking endpoint expects; it rejects requests without it.
pub const RANK_REFERER: &str = "http://fund.eastmoney.com/data/fundranking.html";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// HTTP access to fund.eastmoney.com shared by the collectors.
#[derive(Debug, Clone)]
pub struct EastmoneyClient {
    base_url: String,
    client: reqwest::Client,
}

impl EastmoneyClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        EastmoneyClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn rank_url(&self) -> String {
        format!("{}/data/rankhandler.aspx", self.base_url)
    }

    pub fn fund_list_url(&self) -> String {
        format!("{}/js/fundcode_search.js", self.base_url)
    }

    pub fn detail_url(&self, code: &str) -> String {
        format!("{}/f10/{}.html", self.base_url, code)
    }

    pub fn risk_url(&self, code: &str) -> String {
        format!("{}/f10/tsdata_{}.html", self.base_url, code)
    }

    /// Queries the ranking endpoint. Failures are not retried.
    pub async fn fetch_rank_page(&self, query: &[(&str, String)]) -> Result<String, FundError> {
        let url = self.rank_url();
        debug!("Requesting rank page from {} with {:?}", url, query);

        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(RANK_REFERER));

        let transport = |source| FundError::Transport {
            url: url.clone(),
            source,
        };
        self.client
            .get(&url)
            .headers(headers)
            .query(query)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .text()
            .await
            .map_err(transport)
    }

    /// Fetches an HTML page, failing on non-2xx statuses.
    pub async fn fetch_page(&self, url: &str) -> Result<String, reqwest::Error> {
        debug!("Getting data from {}", url);
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_urls_are_built_from_base() {
        let client = EastmoneyClient::new("http://fund.eastmoney.com/").unwrap();
        assert_eq!(
            client.rank_url(),
            "http://fund.eastmoney.com/data/rankhandler.aspx"
        );
        assert_eq!(
            client.fund_list_url(),
            "http://fund.eastmoney.com/js/fundcode_search.js"
        );
        assert_eq!(
            client.detail_url("000001"),
            "http://fund.eastmoney.com/f10/000001.html"
        );
        assert_eq!(
            client.risk_url("000001"),
            "http://fund.eastmoney.com/f10/tsdata_000001.html"
        );
    }

    #[tokio::test]
    async fn test_rank_page_sends_referer_and_query() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/rankhandler.aspx"))
            .and(header("referer", RANK_REFERER))
            .and(query_param("pi", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = EastmoneyClient::new(&mock_server.uri()).unwrap();
        let body = client
            .fetch_rank_page(&[("pi", "2".to_string())])
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_rank_page_error_status_is_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = EastmoneyClient::new(&mock_server.uri()).unwrap();
        let err = client.fetch_rank_page(&[]).await.unwrap_err();
        assert!(matches!(err, FundError::Transport { .. }), "{err}");
    }
}
