//! The full fund code list published as a script by eastmoney.

use tracing::{debug, info, instrument};

use crate::core::FundError;
use crate::providers::eastmoney::EastmoneyClient;
use crate::providers::rank::locate_json_array;

/// Column titles of a fund list entry, in the order eastmoney publishes them.
pub const FUND_LIST_TITLES: [&str; 5] = ["code", "拼音缩写", "基金简称", "基金类型", "拼音全称"];

/// Extracts the entries of a `var r = [[...], ...];` script body.
pub fn parse_fund_list(body: &str) -> Result<Vec<Vec<String>>, FundError> {
    locate_json_array(body).ok_or_else(|| {
        let preview: String = body.chars().take(120).collect();
        FundError::MalformedResponse(format!("no fund list array in response: {preview:?}"))
    })
}

/// Downloads every listed fund in one request, regardless of category.
pub struct FundListCollector {
    client: EastmoneyClient,
}

impl FundListCollector {
    pub fn new(client: EastmoneyClient) -> Self {
        FundListCollector { client }
    }

    #[instrument(name = "FundListFetch", skip(self))]
    pub async fn collect(&self) -> Result<Vec<Vec<String>>, FundError> {
        let url = self.client.fund_list_url();
        info!("Getting fund list from {}", url);
        let body = self
            .client
            .fetch_page(&url)
            .await
            .map_err(|source| FundError::Transport {
                url: url.clone(),
                source,
            })?;

        let funds = parse_fund_list(&body)?;
        debug!("Fund list holds {} entries", funds.len());
        Ok(funds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FUND_LIST_JS: &str = r#"var r = [["000001","HXCZHH","华夏成长混合","混合型-偏股","HUAXIACHENGZHANGHUNHE"],["000003","ZHKZZZQA","中海可转债债券A","债券型-混合二级","ZHONGHAIKEZHUANZHAIZHAIQUANA"]];"#;

    #[test]
    fn test_script_body_is_parsed_into_rows() {
        let funds = parse_fund_list(FUND_LIST_JS).unwrap();
        assert_eq!(funds.len(), 2);
        assert_eq!(funds[0][0], "000001");
        assert_eq!(funds[1][2], "中海可转债债券A");
        assert_eq!(funds[1].len(), FUND_LIST_TITLES.len());
    }

    #[test]
    fn test_body_without_array_is_malformed() {
        let err = parse_fund_list("var r = null;").unwrap_err();
        assert!(matches!(err, FundError::MalformedResponse(_)), "{err}");
    }

    #[tokio::test]
    async fn test_collects_fund_list() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/js/fundcode_search.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FUND_LIST_JS))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = EastmoneyClient::new(&mock_server.uri()).unwrap();
        let funds = FundListCollector::new(client).collect().await.unwrap();
        let codes: Vec<&str> = funds.iter().map(|f| f[0].as_str()).collect();
        assert_eq!(codes, vec!["000001", "000003"]);
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = EastmoneyClient::new(&mock_server.uri()).unwrap();
        let err = FundListCollector::new(client).collect().await.unwrap_err();
        assert!(matches!(err, FundError::Transport { .. }), "{err}");
    }
}
