//! Response minification.
//!
//! Upstream payloads carry far more than the clients render. Each lookup
//! kind has a minified wire shape with single-letter keys; the shapes are
//! part of the client protocol and must not change.

use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSummoner {
    pub id: i64,
    pub name: String,
    pub account_id: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MinifiedSummoner {
    pub id: i64,
    pub n: String,
    #[serde(rename = "aId")]
    pub a_id: i64,
}

pub fn minify_summoner(raw: RawSummoner) -> MinifiedSummoner {
    MinifiedSummoner {
        id: raw.id,
        n: raw.name,
        a_id: raw.account_id,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLeaguePosition {
    pub queue_type: String,
    pub tier: String,
    pub rank: String,
    pub league_points: i64,
    pub wins: i64,
    pub losses: i64,
    pub mini_series: Option<RawMiniSeries>,
}

#[derive(Deserialize)]
pub struct RawMiniSeries {
    pub progress: String,
}

/// Solo-queue rank summary. `t` is "TIER DIVISION", except for the
/// apex tiers which have no division.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MinifiedRank {
    pub t: String,
    pub lp: i64,
    pub w: i64,
    pub l: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ms: Option<String>,
}

/// Picks the solo-queue entry out of the league positions. Unranked
/// summoners have none; the handler serializes that as an empty object.
pub fn minify_leagues(raw: Vec<RawLeaguePosition>) -> Option<MinifiedRank> {
    let entry = raw
        .into_iter()
        .find(|p| p.queue_type == "RANKED_SOLO_5x5")?;
    let t = match entry.tier.as_str() {
        "MASTER" | "CHALLENGER" => entry.tier,
        _ => format!("{} {}", entry.tier, entry.rank),
    };
    Some(MinifiedRank {
        t,
        lp: entry.league_points,
        w: entry.wins,
        l: entry.losses,
        ms: entry.mini_series.map(|s| s.progress),
    })
}

#[derive(Deserialize)]
pub struct RawMatchlist {
    pub matches: Vec<RawMatchRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatchRef {
    pub game_id: i64,
    pub timestamp: i64,
    pub lane: String,
    pub role: String,
    pub champion: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MinifiedMatchRef {
    pub id: i64,
    pub ts: i64,
    pub l: String,
    pub r: String,
    pub c: i64,
}

pub fn minify_matchlist(raw: RawMatchlist) -> Vec<MinifiedMatchRef> {
    raw.matches
        .into_iter()
        .map(|m| MinifiedMatchRef {
            id: m.game_id,
            ts: m.timestamp,
            l: m.lane,
            r: m.role,
            c: m.champion,
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatch {
    pub participant_identities: Vec<RawParticipantIdentity>,
    pub participants: Vec<RawParticipant>,
    pub game_duration: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParticipantIdentity {
    pub participant_id: i64,
    pub player: RawPlayer,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayer {
    pub account_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParticipant {
    pub participant_id: i64,
    pub champion_id: i64,
    pub stats: RawParticipantStats,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParticipantStats {
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub win: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MinifiedMatch {
    #[serde(rename = "pId")]
    pub p_id: Vec<MinifiedIdentity>,
    pub p: Vec<MinifiedParticipant>,
    pub g: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MinifiedIdentity {
    pub id: i64,
    pub p: MinifiedPlayer,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MinifiedPlayer {
    #[serde(rename = "aId")]
    pub a_id: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MinifiedParticipant {
    pub id: i64,
    #[serde(rename = "cId")]
    pub c_id: i64,
    pub s: MinifiedStats,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MinifiedStats {
    pub k: i64,
    pub d: i64,
    pub a: i64,
    /// Win flag as 0 or 1, not a bool.
    pub w: u8,
}

pub fn minify_match(raw: RawMatch) -> MinifiedMatch {
    MinifiedMatch {
        p_id: raw
            .participant_identities
            .into_iter()
            .map(|i| MinifiedIdentity {
                id: i.participant_id,
                p: MinifiedPlayer {
                    a_id: i.player.account_id,
                },
            })
            .collect(),
        p: raw
            .participants
            .into_iter()
            .map(|p| MinifiedParticipant {
                id: p.participant_id,
                c_id: p.champion_id,
                s: MinifiedStats {
                    k: p.stats.kills,
                    d: p.stats.deaths,
                    a: p.stats.assists,
                    w: if p.stats.win { 1 } else { 0 },
                },
            })
            .collect(),
        g: raw.game_duration,
    }
}

/// One champion of the dataset roster, used to resolve matchup opponents.
#[derive(Deserialize, Debug, Clone)]
pub struct RosterEntry {
    pub id: i64,
    pub name: String,
    pub key: String,
}

/// A matchup record from the aggregated dataset. The pair is unordered;
/// which side is "ours" depends on `champ1_id`.
#[derive(Deserialize, Debug, Clone)]
pub struct RawMatchup {
    pub champ1_id: i64,
    pub champ2_id: i64,
    pub count: i64,
    pub champ1: MatchupSide,
    pub champ2: MatchupSide,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MatchupSide {
    pub winrate: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WinrateInfo {
    pub winrate: f64,
    pub name: String,
    pub key: String,
}

/// Ranks a champion's matchups by its own winrate in each pairing.
///
/// Matchups at or below `min_count` games are too noisy and are dropped.
/// With `worst` set the order flips, so the two calls together give the
/// ten easiest and ten hardest opponents.
pub fn matchup_winrates(
    champion_id: i64,
    matchups: &[RawMatchup],
    roster: &[RosterEntry],
    min_count: i64,
    worst: bool,
) -> Vec<WinrateInfo> {
    let mut ranked: Vec<WinrateInfo> = matchups
        .iter()
        .filter(|m| m.count > min_count)
        .filter_map(|m| {
            let (winrate, opponent_id) = if m.champ1_id == champion_id {
                (m.champ1.winrate, m.champ2_id)
            } else {
                (m.champ2.winrate, m.champ1_id)
            };
            let opponent = roster.iter().find(|c| c.id == opponent_id)?;
            Some(WinrateInfo {
                winrate: truncate_pct(winrate),
                name: opponent.name.clone(),
                key: opponent.key.clone(),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.winrate
            .partial_cmp(&a.winrate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if worst {
        ranked.reverse();
    }
    ranked.truncate(10);
    ranked
}

/// Converts a winrate fraction to a percentage truncated to two decimals.
/// Truncated, not rounded: 0.33456 becomes 33.45.
pub fn truncate_pct(rate: f64) -> f64 {
    let value = rate * 100.0;
    let text = value.to_string();
    let truncated = match text.split_once('.') {
        Some((int, frac)) => format!("{int}.{}", &frac[..frac.len().min(2)]),
        None => text,
    };
    truncated.parse().unwrap_or(value)
}
