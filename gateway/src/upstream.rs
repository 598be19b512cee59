use crate::types::{Region, RequestKind};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The provider answered with a non-success status. Its body is
    /// relayed to the client verbatim.
    #[error("upstream returned status {status}")]
    Api { status: u16, body: serde_json::Value },

    /// The request never produced a response.
    #[error("upstream transport error: {reason}")]
    Transport { reason: String },
}

impl UpstreamError {
    pub fn status(&self) -> u16 {
        match self {
            UpstreamError::Api { status, .. } => *status,
            UpstreamError::Transport { .. } => 502,
        }
    }

    pub fn body(&self) -> serde_json::Value {
        match self {
            UpstreamError::Api { body, .. } => body.clone(),
            UpstreamError::Transport { reason } => {
                json!({ "statusCode": 502, "error": reason })
            }
        }
    }
}

/// Client for the rate-limited game-data provider.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetches one entity. `key` is the path segment identifying it: a
    /// summoner name, a summoner id, an account id or a game id.
    async fn fetch(
        &self,
        kind: RequestKind,
        region: Region,
        key: &str,
    ) -> Result<serde_json::Value, UpstreamError>;
}

pub struct RiotClient {
    http: reqwest::Client,
    api_key: String,
    base_url: Option<Url>,
}

impl RiotClient {
    pub fn new(
        api_key: String,
        base_url: Option<Url>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(RiotClient {
            http,
            api_key,
            base_url,
        })
    }

    fn endpoint(&self, kind: RequestKind, region: Region, key: &str) -> String {
        let base = match &self.base_url {
            Some(url) => url.as_str().trim_end_matches('/').to_owned(),
            None => format!("https://{}.api.riotgames.com", region.platform()),
        };
        let path = match kind {
            RequestKind::Summoner => "/lol/summoner/v3/summoners/by-name/",
            RequestKind::Leagues => "/lol/league/v3/positions/by-summoner/",
            RequestKind::Matchlist => "/lol/match/v3/matchlists/by-account/",
            RequestKind::Match => "/lol/match/v3/matches/",
        };
        format!("{base}{path}{key}")
    }
}

#[async_trait]
impl UpstreamClient for RiotClient {
    async fn fetch(
        &self,
        kind: RequestKind,
        region: Region,
        key: &str,
    ) -> Result<serde_json::Value, UpstreamError> {
        let url = self.endpoint(kind, region, key);
        let response = self
            .http
            .get(&url)
            .header("X-Riot-Token", &self.api_key)
            .send()
            .await
            .map_err(|err| UpstreamError::Transport {
                reason: err.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<serde_json::Value>()
                .await
                .map_err(|err| UpstreamError::Transport {
                    reason: err.to_string(),
                })
        } else {
            // Error bodies are also json; if not, synthesize the envelope
            // the provider uses.
            let code = status.as_u16();
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or_else(|_| json!({ "statusCode": code }));
            Err(UpstreamError::Api { status: code, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: Option<&str>) -> RiotClient {
        RiotClient::new(
            "RGAPI-test".into(),
            base_url.map(|u| Url::parse(u).expect("base url")),
            Duration::from_secs(1),
        )
        .expect("client")
    }

    #[test]
    fn endpoints_use_per_region_platform_hosts() {
        let client = client(None);
        assert_eq!(
            client.endpoint(RequestKind::Summoner, Region::Na, "RiverShen"),
            "https://na1.api.riotgames.com/lol/summoner/v3/summoners/by-name/RiverShen"
        );
        assert_eq!(
            client.endpoint(RequestKind::Leagues, Region::Eune, "123"),
            "https://eun1.api.riotgames.com/lol/league/v3/positions/by-summoner/123"
        );
        assert_eq!(
            client.endpoint(RequestKind::Matchlist, Region::Las, "456"),
            "https://la2.api.riotgames.com/lol/match/v3/matchlists/by-account/456"
        );
        assert_eq!(
            client.endpoint(RequestKind::Match, Region::Kr, "789"),
            "https://kr.api.riotgames.com/lol/match/v3/matches/789"
        );
    }

    #[test]
    fn base_url_override_replaces_the_platform_host() {
        let client = client(Some("http://127.0.0.1:9999/"));
        assert_eq!(
            client.endpoint(RequestKind::Match, Region::Euw, "42"),
            "http://127.0.0.1:9999/lol/match/v3/matches/42"
        );
    }

    #[test]
    fn transport_errors_render_a_synthetic_envelope() {
        let err = UpstreamError::Transport {
            reason: "connection refused".into(),
        };
        assert_eq!(err.status(), 502);
        assert_eq!(err.body()["statusCode"], 502);
    }
}
