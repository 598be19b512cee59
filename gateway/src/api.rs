use crate::access_gate::{Authorization, UsageCounter};
use crate::counter;
use crate::metrics_defs::{
    GATE_BANNED, GATE_DENIED, GATE_STORE_DOWN, PERSISTENT_CACHE_HIT, PERSISTENT_CACHE_MISS,
    UPSTREAM_FETCH_FAILED, UPSTREAM_FETCH_OK,
};
use crate::minify;
use crate::state::AppState;
use crate::types::{self, Region, RequestKind, Tier, cache_key};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use serde_json::json;
use tracing::error;

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route(
            "/getSummonerByName/{region}/{name}/{key}",
            get(get_summoner),
        )
        .route(
            "/getLeaguesBySummonerId/{region}/{summoner_id}/{key}",
            get(get_leagues),
        )
        .route(
            "/getMatchlistByAccountId/{region}/{account_id}/{key}",
            get(get_matchlist),
        )
        .route("/getMatchByGameId/{region}/{game_id}/{key}", get(get_match))
        .route("/checkAccessToken/{key}", get(check_access_token))
        .route("/championData/{tier}/{key}", get(get_champion_data))
        .fallback(access_denied)
        .with_state(state)
}

/// Terminal gate outcomes. Rendered as HTTP 200 with a string status code
/// in the body; the codes are part of the client protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GateStatus {
    Denied,
    Banned,
    StoreDown,
}

impl GateStatus {
    fn code(self) -> &'static str {
        match self {
            GateStatus::Denied => "10403",
            GateStatus::Banned => "10777",
            GateStatus::StoreDown => "10666",
        }
    }
}

#[derive(Serialize)]
struct StatusEnvelope {
    #[serde(rename = "statusCode")]
    status_code: &'static str,
}

impl IntoResponse for GateStatus {
    fn into_response(self) -> Response {
        Json(StatusEnvelope {
            status_code: self.code(),
        })
        .into_response()
    }
}

/// Catch-all body for unknown routes and malformed parameters.
async fn access_denied() -> Response {
    Json("Access denied").into_response()
}

/// Responds with an already-serialized JSON document.
fn raw_json(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

enum Gated {
    Allowed(i64),
    Rejected(Response),
}

/// Runs the access gate over a prefixed URL token. Malformed tokens never
/// reach the store.
async fn authorize(state: &AppState, key: &str) -> Gated {
    let Some(token) = types::strip_token_prefix(key) else {
        return Gated::Rejected(access_denied().await);
    };
    match state.gate.authorize(token).await {
        Authorization::Allowed(account_id) => Gated::Allowed(account_id),
        Authorization::Denied => {
            counter!(GATE_DENIED).increment(1);
            Gated::Rejected(GateStatus::Denied.into_response())
        }
        Authorization::Banned => {
            counter!(GATE_BANNED).increment(1);
            Gated::Rejected(GateStatus::Banned.into_response())
        }
        Authorization::StoreUnavailable => {
            counter!(GATE_STORE_DOWN).increment(1);
            Gated::Rejected(GateStatus::StoreDown.into_response())
        }
    }
}

/// Serializes one upstream payload into its minified wire form.
fn minify_payload(kind: RequestKind, value: serde_json::Value) -> serde_json::Result<String> {
    match kind {
        RequestKind::Summoner => {
            let raw: minify::RawSummoner = serde_json::from_value(value)?;
            serde_json::to_string(&minify::minify_summoner(raw))
        }
        RequestKind::Leagues => {
            let raw: Vec<minify::RawLeaguePosition> = serde_json::from_value(value)?;
            match minify::minify_leagues(raw) {
                Some(rank) => serde_json::to_string(&rank),
                // Unranked summoners get an empty object.
                None => Ok("{}".to_owned()),
            }
        }
        RequestKind::Matchlist => {
            let raw: minify::RawMatchlist = serde_json::from_value(value)?;
            serde_json::to_string(&minify::minify_matchlist(raw))
        }
        RequestKind::Match => {
            let raw: minify::RawMatch = serde_json::from_value(value)?;
            serde_json::to_string(&minify::minify_match(raw))
        }
    }
}

fn upstream_error_response(err: crate::upstream::UpstreamError) -> Response {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(err.body())).into_response()
}

fn malformed_payload_response(kind: RequestKind, err: serde_json::Error) -> Response {
    error!("unexpected upstream {} payload: {err}", kind.as_str());
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "statusCode": 502 })),
    )
        .into_response()
}

/// Read-through lookup for the volatile-cached kinds.
async fn cached_lookup(
    state: &AppState,
    kind: RequestKind,
    region: &str,
    entity: &str,
    key: &str,
) -> Response {
    let Ok(region) = region.parse::<Region>() else {
        return access_denied().await;
    };
    let account_id = match authorize(state, key).await {
        Gated::Allowed(account_id) => account_id,
        Gated::Rejected(response) => return response,
    };

    let cache_key = cache_key(kind, region, entity);
    if let Some(hit) = state.volatile.get(&cache_key).await {
        state.gate.count(account_id, UsageCounter::VolatileCacheHits);
        return raw_json(hit);
    }

    // Every upstream attempt counts against the account, failed ones too.
    let fetched = state.upstream.fetch(kind, region, entity).await;
    state.gate.count(account_id, UsageCounter::UpstreamFetches);
    match fetched {
        Ok(value) => {
            counter!(UPSTREAM_FETCH_OK).increment(1);
            match minify_payload(kind, value) {
                Ok(body) => {
                    state
                        .volatile
                        .put(&cache_key, &body, state.ttl.for_kind(kind))
                        .await;
                    raw_json(body)
                }
                Err(err) => malformed_payload_response(kind, err),
            }
        }
        Err(err) => {
            counter!(UPSTREAM_FETCH_FAILED).increment(1);
            upstream_error_response(err)
        }
    }
}

async fn get_summoner(
    State(state): State<AppState>,
    Path((region, name, key)): Path<(String, String, String)>,
) -> Response {
    cached_lookup(&state, RequestKind::Summoner, &region, &name, &key).await
}

async fn get_leagues(
    State(state): State<AppState>,
    Path((region, summoner_id, key)): Path<(String, String, String)>,
) -> Response {
    cached_lookup(&state, RequestKind::Leagues, &region, &summoner_id, &key).await
}

async fn get_matchlist(
    State(state): State<AppState>,
    Path((region, account_id, key)): Path<(String, String, String)>,
) -> Response {
    cached_lookup(&state, RequestKind::Matchlist, &region, &account_id, &key).await
}

/// Match detail goes through the durable cache; finished matches never
/// change, so hits are served without expiry.
async fn get_match(
    State(state): State<AppState>,
    Path((region, game_id, key)): Path<(String, String, String)>,
) -> Response {
    let Ok(region) = region.parse::<Region>() else {
        return access_denied().await;
    };
    let Ok(game_id) = game_id.parse::<i64>() else {
        return access_denied().await;
    };
    let account_id = match authorize(&state, &key).await {
        Gated::Allowed(account_id) => account_id,
        Gated::Rejected(response) => return response,
    };

    if let Some(hit) = state.matches.get(region, game_id).await {
        counter!(PERSISTENT_CACHE_HIT).increment(1);
        state
            .gate
            .count(account_id, UsageCounter::PersistentCacheHits);
        return Json(hit).into_response();
    }
    counter!(PERSISTENT_CACHE_MISS).increment(1);

    let fetched = state
        .upstream
        .fetch(RequestKind::Match, region, &game_id.to_string())
        .await;
    state.gate.count(account_id, UsageCounter::UpstreamFetches);
    match fetched {
        Ok(value) => {
            counter!(UPSTREAM_FETCH_OK).increment(1);
            let raw: minify::RawMatch = match serde_json::from_value(value) {
                Ok(raw) => raw,
                Err(err) => return malformed_payload_response(RequestKind::Match, err),
            };
            let minified = match serde_json::to_value(minify::minify_match(raw)) {
                Ok(minified) => minified,
                Err(err) => return malformed_payload_response(RequestKind::Match, err),
            };
            state.matches.put(region, game_id, minified.clone());
            Json(minified).into_response()
        }
        Err(err) => {
            counter!(UPSTREAM_FETCH_FAILED).increment(1);
            upstream_error_response(err)
        }
    }
}

/// Bare token probe: `1` valid, `0` unknown, `-1` banned, sent as plain
/// text. A store outage answers `0`; clients retry, the outage is already
/// logged.
async fn check_access_token(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let Some(token) = types::strip_token_prefix(&key) else {
        return access_denied().await;
    };
    let answer = match state.gate.authorize(token).await {
        Authorization::Allowed(_) => "1",
        Authorization::Banned => "-1",
        Authorization::Denied => "0",
        Authorization::StoreUnavailable => {
            counter!(GATE_STORE_DOWN).increment(1);
            "0"
        }
    };
    answer.into_response()
}

async fn get_champion_data(
    State(state): State<AppState>,
    Path((tier, key)): Path<(String, String)>,
) -> Response {
    let Ok(tier) = tier.parse::<Tier>() else {
        return access_denied().await;
    };
    if let Gated::Rejected(response) = authorize(&state, &key).await {
        return response;
    }
    match state.champions.get(tier) {
        Some(dataset) => Json(dataset.as_ref()).into_response(),
        None => {
            error!("champion dataset for {tier} is not loaded");
            GateStatus::StoreDown.into_response()
        }
    }
}
