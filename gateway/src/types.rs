use std::fmt;
use std::str::FromStr;

/// Server regions accepted by the gateway.
///
/// The numeric ids are embedded in volatile cache keys and in the durable
/// match cache, so they must never be renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    Br,
    Eune,
    Euw,
    Jp,
    Kr,
    Lan,
    Las,
    Na,
    Oce,
    Tr,
    Ru,
}

impl Region {
    pub const ALL: [Region; 11] = [
        Region::Br,
        Region::Eune,
        Region::Euw,
        Region::Jp,
        Region::Kr,
        Region::Lan,
        Region::Las,
        Region::Na,
        Region::Oce,
        Region::Tr,
        Region::Ru,
    ];

    pub fn id(self) -> u8 {
        match self {
            Region::Br => 1,
            Region::Eune => 2,
            Region::Euw => 3,
            Region::Jp => 4,
            Region::Kr => 5,
            Region::Lan => 6,
            Region::Las => 7,
            Region::Na => 8,
            Region::Oce => 9,
            Region::Tr => 10,
            Region::Ru => 11,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Br => "br",
            Region::Eune => "eune",
            Region::Euw => "euw",
            Region::Jp => "jp",
            Region::Kr => "kr",
            Region::Lan => "lan",
            Region::Las => "las",
            Region::Na => "na",
            Region::Oce => "oce",
            Region::Tr => "tr",
            Region::Ru => "ru",
        }
    }

    /// Upstream platform host prefix for this region.
    pub fn platform(self) -> &'static str {
        match self {
            Region::Br => "br1",
            Region::Eune => "eun1",
            Region::Euw => "euw1",
            Region::Jp => "jp1",
            Region::Kr => "kr",
            Region::Lan => "la1",
            Region::Las => "la2",
            Region::Na => "na1",
            Region::Oce => "oc1",
            Region::Tr => "tr1",
            Region::Ru => "ru",
        }
    }
}

impl FromStr for Region {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|region| region.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Skill-tier buckets of the precomputed champion datasets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    PlatinumPlus,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Bronze, Tier::Silver, Tier::Gold, Tier::PlatinumPlus];

    /// Label used both in URLs and in the dataset file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::PlatinumPlus => "PLATINUMPLUS",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tier::Bronze => 0,
            Tier::Silver => 1,
            Tier::Gold => 2,
            Tier::PlatinumPlus => 3,
        }
    }
}

impl FromStr for Tier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four kinds of upstream lookups the gateway proxies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Summoner,
    Leagues,
    Matchlist,
    Match,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Summoner => "summoner",
            RequestKind::Leagues => "leagues",
            RequestKind::Matchlist => "matchlist",
            RequestKind::Match => "match",
        }
    }

    /// Numeric id embedded in volatile cache keys. Match detail goes to the
    /// durable match cache instead, so id 4 never appears in the volatile
    /// store; it is assigned anyway to keep the key space collision-free.
    pub fn cache_id(self) -> u8 {
        match self {
            RequestKind::Summoner => 1,
            RequestKind::Leagues => 2,
            RequestKind::Matchlist => 3,
            RequestKind::Match => 4,
        }
    }
}

/// Builds a volatile cache key. Kind and region ids are part of the key, so
/// keys cannot collide across request kinds or regions.
pub fn cache_key(kind: RequestKind, region: Region, entity: &str) -> String {
    format!("{}-{}-{}", kind.cache_id(), region.id(), entity)
}

/// Literal prefix carried by every access token on the wire.
pub const TOKEN_PREFIX: &str = "LOLQ-";

/// Strips the literal token prefix. The remainder is the opaque token that
/// is matched exactly against the account table; tokens without the prefix
/// are rejected before any store lookup happens.
pub fn strip_token_prefix(key: &str) -> Option<&str> {
    match key.strip_prefix(TOKEN_PREFIX) {
        Some(token) if !token.is_empty() => Some(token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_ids_are_stable() {
        assert_eq!(Region::Br.id(), 1);
        assert_eq!(Region::Euw.id(), 3);
        assert_eq!(Region::Ru.id(), 11);

        // No two regions may share an id.
        let mut ids: Vec<u8> = Region::ALL.iter().map(|r| r.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Region::ALL.len());
    }

    #[test]
    fn region_parses_lowercase_labels() {
        assert_eq!("euw".parse::<Region>(), Ok(Region::Euw));
        assert_eq!("lan".parse::<Region>(), Ok(Region::Lan));
        assert!("EUW".parse::<Region>().is_err());
        assert!("mars".parse::<Region>().is_err());
    }

    #[test]
    fn tier_parses_dataset_labels() {
        assert_eq!("PLATINUMPLUS".parse::<Tier>(), Ok(Tier::PlatinumPlus));
        assert_eq!("BRONZE".parse::<Tier>(), Ok(Tier::Bronze));
        assert!("platinumplus".parse::<Tier>().is_err());
        assert!("DIAMOND".parse::<Tier>().is_err());
    }

    #[test]
    fn cache_keys_embed_kind_and_region() {
        assert_eq!(
            cache_key(RequestKind::Summoner, Region::Na, "RiverShen"),
            "1-8-RiverShen"
        );
        assert_eq!(
            cache_key(RequestKind::Matchlist, Region::Kr, "12345"),
            "3-5-12345"
        );
        // Same entity id in a different kind or region is a different key.
        assert_ne!(
            cache_key(RequestKind::Summoner, Region::Na, "42"),
            cache_key(RequestKind::Leagues, Region::Na, "42")
        );
        assert_ne!(
            cache_key(RequestKind::Summoner, Region::Na, "42"),
            cache_key(RequestKind::Summoner, Region::Euw, "42")
        );
    }

    #[test]
    fn token_prefix_is_stripped_before_lookup() {
        assert_eq!(strip_token_prefix("LOLQ-T1"), Some("T1"));
        assert_eq!(
            strip_token_prefix("LOLQ-deadbeef-0000-1111-2222-333344445555"),
            Some("deadbeef-0000-1111-2222-333344445555")
        );
        assert_eq!(strip_token_prefix("LOLQ-"), None);
        assert_eq!(strip_token_prefix("lolq-T1"), None);
        assert_eq!(strip_token_prefix("T1"), None);
    }
}
