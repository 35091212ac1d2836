use crate::HistoryGame;
use crate::history::GameHistoryResponse;
use log::{debug, warn};
use reqwest::{Client, Url};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const GAME_HISTORY_URL: &str = "https://mlb25.theshow.com/apis/game_history.json";

/// Knobs for [`ShowApi`]. Defaults match the public endpoint.
#[derive(Debug, Clone)]
pub struct ApiOptions {
    pub base_url: String,
    pub platform: String,
    pub timeout: Duration,
    /// Attempts per page before giving up on it.
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            base_url: GAME_HISTORY_URL.to_owned(),
            platform: "psn".to_owned(),
            timeout: Duration::from_secs(20),
            retries: 2,
            retry_delay: Duration::from_millis(400),
        }
    }
}

/// Game-history client for the MLB The Show public API.
#[derive(Debug, Clone)]
pub struct ShowApi {
    client: Client,
    options: ApiOptions,
}

impl Default for ShowApi {
    fn default() -> Self {
        Self::with_options(ApiOptions::default())
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ShowApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ApiOptions) -> Self {
        Self {
            client: Client::builder()
                .user_agent("peloteros/0.1 (league standings)")
                .build()
                .unwrap_or_default(),
            options,
        }
    }

    /// Fetch one page of a participant's history, retrying with a fixed delay.
    ///
    /// A page that keeps failing degrades to an empty list: one bad page must
    /// not sink the whole refresh.
    pub async fn fetch_page(&self, username: &str, page: u32) -> Vec<HistoryGame> {
        let attempts = self.options.retries.max(1);
        let mut last_error: Option<ApiError> = None;
        for attempt in 1..=attempts {
            match self.try_fetch_page(username, page).await {
                Ok(games) => return games,
                Err(e) => {
                    debug!("{username} p{page} attempt {attempt}/{attempts} failed: {e}");
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(self.options.retry_delay).await;
                    }
                }
            }
        }
        match last_error {
            Some(e) => warn!("{username} p{page} returned no data ({e})"),
            None => warn!("{username} p{page} returned no data"),
        }
        Vec::new()
    }

    /// All configured pages for one participant, in page order.
    pub async fn fetch_participant(&self, username: &str, pages: &[u32]) -> Vec<HistoryGame> {
        let mut games = Vec::new();
        for &page in pages {
            games.extend(self.fetch_page(username, page).await);
        }
        games
    }

    /// Single attempt, no retry.
    pub async fn try_fetch_page(&self, username: &str, page: u32) -> ApiResult<Vec<HistoryGame>> {
        let url = self.page_url(username, page)?;
        let raw: GameHistoryResponse = self.get(url).await?;
        Ok(raw
            .game_history
            .unwrap_or_default()
            .into_iter()
            .map(HistoryGame::from)
            .collect())
    }

    fn page_url(&self, username: &str, page: u32) -> ApiResult<Url> {
        let page = page.to_string();
        Url::parse_with_params(
            &self.options.base_url,
            [
                ("username", username),
                ("platform", self.options.platform.as_str()),
                ("page", page.as_str()),
            ],
        )
        .map_err(|e| ApiError::Other(format!("bad base url {}: {e}", self.options.base_url)))
    }

    async fn get<T: Default + serde::de::DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let label = url.to_string();
        let response = self
            .client
            .get(url)
            .timeout(self.options.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, label.clone()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, label)),
            Err(e) => Err(ApiError::Api(e, label)),
        }
    }
}
