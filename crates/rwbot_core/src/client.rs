use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::BotConfig;

/// One full-text search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub namespace: i32,
    pub page_id: i64,
    pub snippet: String,
}

/// Read-only wiki operations. Action plugins and previews are restricted
/// to this surface so proposal never mutates the wiki.
pub trait WikiReadApi {
    /// Full-text search against page text, following API continuation.
    fn search_text(&mut self, query: &str) -> Result<Vec<SearchHit>>;
    /// Current wikitext of a page. Missing pages read as empty text.
    fn get_page_text(&mut self, title: &str) -> Result<String>;
}

/// Write operations, gated behind the confirmation loop.
pub trait WikiWriteApi: WikiReadApi {
    fn login(&mut self, username: &str, password: &str) -> Result<()>;
    fn edit_page(&mut self, title: &str, text: &str, summary: &str) -> Result<()>;
}

pub struct MediaWikiClient {
    client: Client,
    api_url: String,
    user_agent: String,
    csrf_token: Option<String>,
}

impl MediaWikiClient {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .cookie_store(true)
            .build()
            .context("failed to build MediaWiki HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url(),
            user_agent: config.user_agent.clone(),
            csrf_token: None,
        })
    }

    fn request_json_get(&mut self, params: &[(&str, String)]) -> Result<Value> {
        let base_url = Url::parse(&self.api_url)
            .with_context(|| format!("invalid API URL: {}", self.api_url))?;

        let response = self
            .client
            .get(base_url)
            .header("User-Agent", self.user_agent.clone())
            .query(&shape_params(params))
            .send()
            .context("failed to call MediaWiki API")?;

        let status = response.status();
        if !status.is_success() {
            bail!("MediaWiki API request failed with HTTP {status}");
        }
        let payload: Value = response
            .json()
            .context("failed to decode MediaWiki API JSON response")?;
        check_api_error(&payload)?;
        Ok(payload)
    }

    fn request_json_post(&mut self, params: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .post(&self.api_url)
            .header("User-Agent", self.user_agent.clone())
            .form(&shape_params(params))
            .send()
            .context("failed to call MediaWiki API")?;

        let status = response.status();
        if !status.is_success() {
            bail!("MediaWiki API request failed with HTTP {status}");
        }
        let payload: Value = response
            .json()
            .context("failed to decode MediaWiki API JSON response")?;
        check_api_error(&payload)?;
        Ok(payload)
    }

    fn ensure_csrf_token(&mut self) -> Result<String> {
        if let Some(token) = &self.csrf_token {
            return Ok(token.clone());
        }
        let response = self.request_json_get(&[
            ("action", "query".to_string()),
            ("meta", "tokens".to_string()),
        ])?;
        let parsed: TokenQueryResponse =
            serde_json::from_value(response).context("failed to decode csrf token response")?;
        let token = parsed
            .query
            .tokens
            .as_ref()
            .and_then(|tokens| tokens.csrftoken.as_ref())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("failed to get MediaWiki csrf token"))?;
        self.csrf_token = Some(token.clone());
        Ok(token)
    }
}

impl WikiReadApi for MediaWikiClient {
    fn search_text(&mut self, query: &str) -> Result<Vec<SearchHit>> {
        let mut hits = Vec::new();
        let mut offset: Option<i64> = None;

        loop {
            let mut params = vec![
                ("action", "query".to_string()),
                ("list", "search".to_string()),
                ("srsearch", query.to_string()),
                ("srwhat", "text".to_string()),
                ("srlimit", "500".to_string()),
            ];
            if let Some(offset) = offset {
                params.push(("sroffset", offset.to_string()));
            }

            let response = self.request_json_get(&params)?;
            let parsed: QueryResponse = serde_json::from_value(response)
                .context("failed to decode search API response")?;

            for item in parsed.query.search {
                hits.push(SearchHit {
                    title: item.title,
                    namespace: item.ns,
                    page_id: item.pageid,
                    snippet: item.snippet.unwrap_or_default(),
                });
            }

            offset = parsed.continuation.and_then(|cont| cont.sroffset);
            if offset.is_none() {
                break;
            }
        }

        Ok(hits)
    }

    fn get_page_text(&mut self, title: &str) -> Result<String> {
        let response = self.request_json_get(&[
            ("action", "query".to_string()),
            ("titles", title.to_string()),
            ("prop", "revisions".to_string()),
            ("rvprop", "content".to_string()),
            ("rvslots", "main".to_string()),
        ])?;
        let parsed: QueryResponse = serde_json::from_value(response)
            .context("failed to decode page content API response")?;

        let page = match parsed.query.pages.first() {
            Some(page) => page,
            None => bail!("page query for {title} returned no pages"),
        };
        if page.missing.unwrap_or(false) {
            return Ok(String::new());
        }
        let content = page
            .revisions
            .first()
            .and_then(|revision| revision.slots.as_ref())
            .and_then(|slots| slots.main.as_ref())
            .map(|slot| slot.content.clone());
        Ok(content.unwrap_or_default())
    }
}

impl WikiWriteApi for MediaWikiClient {
    fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let token_response = self.request_json_get(&[
            ("action", "query".to_string()),
            ("meta", "tokens".to_string()),
            ("type", "login".to_string()),
        ])?;
        let token_payload: TokenQueryResponse = serde_json::from_value(token_response)
            .context("failed to decode login token response")?;
        let login_token = token_payload
            .query
            .tokens
            .as_ref()
            .and_then(|tokens| tokens.logintoken.as_ref())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("failed to get MediaWiki login token"))?;

        let login_response = self.request_json_post(&[
            ("action", "login".to_string()),
            ("lgname", username.to_string()),
            ("lgpassword", password.to_string()),
            ("lgtoken", login_token),
        ])?;
        let login_payload: LoginResponse =
            serde_json::from_value(login_response).context("failed to decode login response")?;
        match login_payload.login.result.as_deref() {
            Some("Success") => {
                self.csrf_token = None;
                Ok(())
            }
            other => bail!(
                "MediaWiki login failed: {}",
                login_payload
                    .login
                    .reason
                    .or_else(|| other.map(ToString::to_string))
                    .unwrap_or_else(|| "unknown error".to_string())
            ),
        }
    }

    fn edit_page(&mut self, title: &str, text: &str, summary: &str) -> Result<()> {
        let token = self.ensure_csrf_token()?;
        let response = self.request_json_post(&[
            ("action", "edit".to_string()),
            ("title", title.to_string()),
            ("text", text.to_string()),
            ("summary", summary.to_string()),
            ("bot", "1".to_string()),
            ("token", token),
        ])?;
        let edit_payload: EditResponse =
            serde_json::from_value(response).context("failed to decode edit response")?;
        let edit = edit_payload
            .edit
            .ok_or_else(|| anyhow::anyhow!("missing edit payload in API response"))?;
        if edit.result.as_deref() != Some("Success") {
            bail!(
                "MediaWiki edit failed for {}: {}",
                title,
                edit.result.unwrap_or_else(|| "unknown".to_string())
            );
        }
        Ok(())
    }
}

fn shape_params(params: &[(&str, String)]) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len() + 2);
    pairs.push(("format".to_string(), "json".to_string()));
    pairs.push(("formatversion".to_string(), "2".to_string()));
    for (key, value) in params {
        if !value.is_empty() {
            pairs.push(((*key).to_string(), value.clone()));
        }
    }
    pairs
}

fn check_api_error(payload: &Value) -> Result<()> {
    if let Some(error) = payload.get("error") {
        let code = error
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error");
        let info = error
            .get("info")
            .and_then(Value::as_str)
            .unwrap_or("unknown info");
        bail!("MediaWiki API error [{code}]: {info}");
    }
    Ok(())
}

#[derive(Debug, Deserialize, Default)]
struct QueryResponse {
    #[serde(default)]
    query: QueryPayload,
    #[serde(default, rename = "continue")]
    continuation: Option<ContinuationPayload>,
}

#[derive(Debug, Deserialize, Default)]
struct QueryPayload {
    #[serde(default)]
    pages: Vec<PageQueryItem>,
    #[serde(default)]
    search: Vec<SearchQueryItem>,
}

#[derive(Debug, Deserialize, Default)]
struct ContinuationPayload {
    sroffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PageQueryItem {
    missing: Option<bool>,
    #[serde(default)]
    revisions: Vec<RevisionQueryItem>,
}

#[derive(Debug, Deserialize)]
struct RevisionQueryItem {
    slots: Option<RevisionSlotContainer>,
}

#[derive(Debug, Deserialize)]
struct RevisionSlotContainer {
    main: Option<RevisionMainSlot>,
}

#[derive(Debug, Deserialize)]
struct RevisionMainSlot {
    content: String,
}

#[derive(Debug, Deserialize)]
struct SearchQueryItem {
    title: String,
    ns: i32,
    pageid: i64,
    snippet: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TokenQueryResponse {
    #[serde(default)]
    query: TokenQueryPayload,
}

#[derive(Debug, Deserialize, Default)]
struct TokenQueryPayload {
    tokens: Option<TokenPayload>,
}

#[derive(Debug, Deserialize, Default)]
struct TokenPayload {
    logintoken: Option<String>,
    csrftoken: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct LoginResponse {
    #[serde(default)]
    login: LoginPayload,
}

#[derive(Debug, Deserialize, Default)]
struct LoginPayload {
    result: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct EditResponse {
    edit: Option<EditPayload>,
}

#[derive(Debug, Deserialize, Default)]
struct EditPayload {
    result: Option<String>,
}
