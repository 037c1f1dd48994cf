//! MediaWiki 链接查询客户端
//!
//! 通过 MediaWiki Action API 惰性地获取链接：
//! - 正向：`prop=links`，该页面上的所有链接
//! - 反向：`list=backlinks`，所有链接到该页面的页面
//!
//! 只查询命名空间 0（条目），分页通过响应中的 `continue` 对象透明处理。
//! 每一页请求之前都要从共享节流器获取许可。

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, warn};
use percent_encoding::percent_decode_str;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::WikiConfig;
use crate::core::{Direction, Hop, Node, SearchError, SearchResult};
use crate::source::{EdgeSource, HopStream, Throttle, TitleResolver};
use crate::utils::retry::{retry_with_backoff, RetryConfig};

/// MediaWiki 单次请求允许的最大结果数
pub const MAX_PAGE_LIMIT: u32 = 500;

type Params = Vec<(String, String)>;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(default)]
    query: Option<QueryBody>,
    #[serde(default, rename = "continue")]
    continuation: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<PageEntry>,
    #[serde(default)]
    backlinks: Vec<TitleEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    title: String,
    #[serde(default)]
    links: Vec<TitleEntry>,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
}

#[derive(Debug, Deserialize)]
struct TitleEntry {
    title: String,
}

/// 一页查询结果
#[derive(Debug, Default)]
struct LinkPage {
    hops: Vec<Hop>,
    /// 下一页需要附加的参数，`None` 表示没有更多结果
    continuation: Option<Params>,
}

/// MediaWiki API 客户端
///
/// 构造一次后以 `Arc` 共享给所有搜索任务，节流器随客户端共享。
#[derive(Debug)]
pub struct MediaWikiClient {
    http: reqwest::Client,
    api_url: String,
    page_limit: u32,
    throttle: Throttle,
    retry: RetryConfig,
}

impl MediaWikiClient {
    pub fn new(config: &WikiConfig) -> SearchResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SearchError::Config(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            page_limit: config.page_limit.clamp(1, MAX_PAGE_LIMIT),
            throttle: Throttle::new(config.requests_per_second),
            retry: config.retry_config(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn link_params(&self, node: &Node, direction: Direction) -> Params {
        let limit = self.page_limit.to_string();
        let mut params = base_params();
        match direction {
            Direction::Forward => {
                params.push(("prop".into(), "links".into()));
                params.push(("titles".into(), node.to_string()));
                params.push(("pllimit".into(), limit));
                params.push(("plnamespace".into(), "0".into()));
            }
            Direction::Backward => {
                params.push(("list".into(), "backlinks".into()));
                params.push(("bltitle".into(), node.to_string()));
                params.push(("bllimit".into(), limit));
                params.push(("blnamespace".into(), "0".into()));
            }
        }
        params
    }

    async fn fetch_link_page(
        &self,
        node: &Node,
        direction: Direction,
        continuation: &[(String, String)],
    ) -> SearchResult<LinkPage> {
        let mut params = self.link_params(node, direction);
        params.extend(continuation.iter().cloned());

        let response: ApiResponse = self.get_json(node.as_str(), &params).await?;
        parse_link_response(response, node, direction)
    }

    /// 发送一次 GET 请求，临时故障按退避策略重试，每次尝试都先获取节流许可
    async fn get_json<T: DeserializeOwned>(&self, subject: &str, params: &[(String, String)]) -> SearchResult<T> {
        retry_with_backoff(&self.retry, move |attempt| async move {
            self.throttle.acquire().await;
            if attempt > 0 {
                debug!("重新请求 {} (第 {} 次重试)", subject, attempt);
            }

            let response = self
                .http
                .get(&self.api_url)
                .query(params)
                .send()
                .await
                .map_err(|e| classify_request_error(subject, e))?;

            let status = response.status();
            if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                return Err(SearchError::transient(subject, format!("HTTP {}", status)));
            }
            if !status.is_success() {
                return Err(SearchError::remote(subject, format!("HTTP {}", status)));
            }

            response
                .json::<T>()
                .await
                .map_err(|e| SearchError::remote(subject, format!("响应格式错误: {}", e)))
        })
        .await
    }
}

impl EdgeSource for MediaWikiClient {
    fn query<'a>(&'a self, node: &'a Node, direction: Direction) -> HopStream<'a> {
        stream::try_unfold(Some(Params::new()), move |state| async move {
            let Some(continuation) = state else {
                return Ok::<_, SearchError>(None);
            };
            let page = self.fetch_link_page(node, direction, &continuation).await?;
            Ok(Some((page.hops, page.continuation)))
        })
        .map_ok(|hops| stream::iter(hops.into_iter().map(Ok::<Hop, SearchError>)))
        .try_flatten()
        .boxed()
    }
}

#[async_trait]
impl TitleResolver for MediaWikiClient {
    async fn resolve(&self, input: &str) -> SearchResult<Node> {
        let title = title_from_input(input).ok_or_else(|| SearchError::NotFound(input.to_string()))?;

        let mut params = base_params();
        params.push(("titles".into(), title.clone()));
        params.push(("redirects".into(), "1".into()));

        let response: ApiResponse = self.get_json(&title, &params).await?;
        parse_resolve_response(response, input)
    }
}

fn base_params() -> Params {
    vec![
        ("action".into(), "query".into()),
        ("format".into(), "json".into()),
        ("formatversion".into(), "2".into()),
    ]
}

fn classify_request_error(subject: &str, err: reqwest::Error) -> SearchError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        SearchError::transient(subject, err.to_string())
    } else {
        SearchError::remote(subject, err.to_string())
    }
}

fn check_api_error(response: &ApiResponse, subject: &str) -> SearchResult<()> {
    match &response.error {
        Some(error) => Err(SearchError::remote(
            subject,
            format!("API 错误 {}: {}", error.code, error.info),
        )),
        None => Ok(()),
    }
}

fn parse_link_response(response: ApiResponse, node: &Node, direction: Direction) -> SearchResult<LinkPage> {
    check_api_error(&response, node.as_str())?;

    let query = response
        .query
        .ok_or_else(|| SearchError::remote(node.as_str(), "响应缺少 query 字段"))?;

    let hops: Vec<Hop> = match direction {
        // 每个 page 对应请求中的一个标题，续页时部分 page 可能不含 links
        Direction::Forward => query
            .pages
            .into_iter()
            .flat_map(|page| {
                let from = Node::from(page.title);
                page.links
                    .into_iter()
                    .map(move |link| Hop::new(from.clone(), link.title))
            })
            .collect(),
        Direction::Backward => query
            .backlinks
            .into_iter()
            .map(|entry| Hop::new(entry.title, node.clone()))
            .collect(),
    };

    let hops = hops
        .into_iter()
        .filter(|hop| !direction.far(hop).is_marker())
        .collect();

    let continuation = response.continuation.map(|values| {
        values
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect()
    });

    Ok(LinkPage { hops, continuation })
}

fn parse_resolve_response(response: ApiResponse, input: &str) -> SearchResult<Node> {
    check_api_error(&response, input)?;

    let page = response
        .query
        .and_then(|query| query.pages.into_iter().next())
        .ok_or_else(|| SearchError::NotFound(input.to_string()))?;

    if page.missing || page.invalid {
        warn!("条目不存在: {}", input);
        return Err(SearchError::NotFound(input.to_string()));
    }

    Ok(Node::from(page.title))
}

/// 从条目标题或条目 URL 中提取标题
///
/// 支持 `https://en.wikipedia.org/wiki/Foo_Bar#Section` 和
/// `https://en.wikipedia.org/w/index.php?title=Foo_Bar` 两种形式
pub fn title_from_input(input: &str) -> Option<String> {
    let input = input.trim();

    let raw = match Url::parse(input) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            if let Some(path_title) = url.path().strip_prefix("/wiki/") {
                percent_decode_str(path_title).decode_utf8().ok()?.into_owned()
            } else {
                url.query_pairs()
                    .find(|(key, _)| key == "title")
                    .map(|(_, value)| value.into_owned())?
            }
        }
        _ => input.to_string(),
    };

    let title = raw.replace('_', " ").trim().to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ApiResponse {
        serde_json::from_value(value).expect("fixture should deserialize")
    }

    #[test]
    fn test_forward_page_with_continuation() {
        let response = parse(json!({
            "continue": { "plcontinue": "736|0|Banana", "continue": "||" },
            "query": {
                "pages": [
                    {
                        "pageid": 736,
                        "ns": 0,
                        "title": "Apple",
                        "links": [
                            { "ns": 0, "title": "Fruit" },
                            { "ns": 0, "title": "H:S" },
                            { "ns": 0, "title": "Malus" }
                        ]
                    }
                ]
            }
        }));

        let page = parse_link_response(response, &Node::from("Apple"), Direction::Forward)
            .expect("page should parse");
        assert_eq!(page.hops, vec![Hop::new("Apple", "Fruit"), Hop::new("Apple", "Malus")]);

        let mut continuation = page.continuation.expect("continuation should be present");
        continuation.sort();
        assert_eq!(
            continuation,
            vec![
                ("continue".to_string(), "||".to_string()),
                ("plcontinue".to_string(), "736|0|Banana".to_string()),
            ]
        );
    }

    #[test]
    fn test_forward_page_without_links() {
        let response = parse(json!({
            "batchcomplete": true,
            "query": { "pages": [ { "pageid": 1, "ns": 0, "title": "Stub" } ] }
        }));

        let page = parse_link_response(response, &Node::from("Stub"), Direction::Forward)
            .expect("page should parse");
        assert!(page.hops.is_empty());
        assert!(page.continuation.is_none());
    }

    #[test]
    fn test_backlinks_page() {
        let response = parse(json!({
            "query": {
                "backlinks": [
                    { "pageid": 10, "ns": 0, "title": "Orchard" },
                    { "pageid": 11, "ns": 0, "title": "H:L" },
                    { "pageid": 12, "ns": 0, "title": "Cider" }
                ]
            }
        }));

        let page = parse_link_response(response, &Node::from("Apple"), Direction::Backward)
            .expect("page should parse");
        assert_eq!(page.hops, vec![Hop::new("Orchard", "Apple"), Hop::new("Cider", "Apple")]);
    }

    #[test]
    fn test_api_error_is_remote_query_error() {
        let response = parse(json!({
            "error": { "code": "badvalue", "info": "Unrecognized value" }
        }));

        let result = parse_link_response(response, &Node::from("Apple"), Direction::Forward);
        match result {
            Err(SearchError::RemoteQuery { node, message, transient }) => {
                assert_eq!(node, "Apple");
                assert!(message.contains("badvalue"));
                assert!(!transient);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_query_is_malformed() {
        let response = parse(json!({ "batchcomplete": true }));
        let result = parse_link_response(response, &Node::from("Apple"), Direction::Backward);
        assert!(matches!(result, Err(SearchError::RemoteQuery { .. })));
    }

    #[test]
    fn test_resolve_follows_canonical_title() {
        let response = parse(json!({
            "query": {
                "redirects": [ { "from": "USA", "to": "United States" } ],
                "pages": [ { "pageid": 3434750, "ns": 0, "title": "United States" } ]
            }
        }));
        assert_eq!(
            parse_resolve_response(response, "USA").expect("should resolve"),
            Node::from("United States")
        );
    }

    #[test]
    fn test_resolve_missing_page() {
        let response = parse(json!({
            "query": { "pages": [ { "ns": 0, "title": "Xyzzy Plugh", "missing": true } ] }
        }));
        assert!(matches!(
            parse_resolve_response(response, "Xyzzy Plugh"),
            Err(SearchError::NotFound(_))
        ));
    }

    #[test]
    fn test_title_from_input() {
        assert_eq!(title_from_input("  Rust  ").as_deref(), Some("Rust"));
        assert_eq!(
            title_from_input("https://en.wikipedia.org/wiki/Rust_(programming_language)").as_deref(),
            Some("Rust (programming language)")
        );
        assert_eq!(
            title_from_input("https://en.wikipedia.org/wiki/C%2B%2B#History").as_deref(),
            Some("C++")
        );
        assert_eq!(
            title_from_input("https://en.wikipedia.org/w/index.php?title=Kevin_Bacon&oldid=1").as_deref(),
            Some("Kevin Bacon")
        );
        assert_eq!(
            title_from_input("https://de.wikipedia.org/wiki/M%C3%BCnchen").as_deref(),
            Some("München")
        );
        assert_eq!(
            title_from_input("https://en.wikipedia.org/wiki/100%+1").as_deref(),
            Some("100%+1")
        );
        assert_eq!(title_from_input("https://en.wikipedia.org/wiki/%FF"), None);
        assert_eq!(title_from_input("   "), None);
        assert_eq!(title_from_input("https://en.wikipedia.org/wiki/"), None);
    }

    #[test]
    fn test_link_params() {
        let client = MediaWikiClient::new(&WikiConfig::default()).expect("client should build");
        let params = client.link_params(&Node::from("Apple"), Direction::Backward);
        assert!(params.contains(&("list".to_string(), "backlinks".to_string())));
        assert!(params.contains(&("bltitle".to_string(), "Apple".to_string())));
        assert!(params.contains(&("bllimit".to_string(), "500".to_string())));
        assert!(params.contains(&("blnamespace".to_string(), "0".to_string())));

        let params = client.link_params(&Node::from("Apple"), Direction::Forward);
        assert!(params.contains(&("prop".to_string(), "links".to_string())));
        assert!(params.contains(&("plnamespace".to_string(), "0".to_string())));
    }
}
