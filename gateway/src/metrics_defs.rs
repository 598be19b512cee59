//! Metrics definitions for the gateway.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

#[macro_export]
macro_rules! counter {
    ($def:expr) => {
        metrics::counter!($def.name)
    };
}

pub const VOLATILE_CACHE_HIT: MetricDef = MetricDef {
    name: "volatile_cache.hit",
    metric_type: MetricType::Counter,
    description: "Requests answered from the volatile cache",
};

pub const VOLATILE_CACHE_MISS: MetricDef = MetricDef {
    name: "volatile_cache.miss",
    metric_type: MetricType::Counter,
    description: "Volatile cache lookups that fell through to upstream",
};

pub const PERSISTENT_CACHE_HIT: MetricDef = MetricDef {
    name: "persistent_cache.hit",
    metric_type: MetricType::Counter,
    description: "Match requests answered from the durable cache",
};

pub const PERSISTENT_CACHE_MISS: MetricDef = MetricDef {
    name: "persistent_cache.miss",
    metric_type: MetricType::Counter,
    description: "Durable cache lookups that fell through to upstream",
};

pub const UPSTREAM_FETCH_OK: MetricDef = MetricDef {
    name: "upstream.fetch.ok",
    metric_type: MetricType::Counter,
    description: "Successful upstream fetches",
};

pub const UPSTREAM_FETCH_FAILED: MetricDef = MetricDef {
    name: "upstream.fetch.failed",
    metric_type: MetricType::Counter,
    description: "Upstream fetches that returned an error",
};

pub const GATE_DENIED: MetricDef = MetricDef {
    name: "gate.denied",
    metric_type: MetricType::Counter,
    description: "Requests denied because no account matched the token",
};

pub const GATE_BANNED: MetricDef = MetricDef {
    name: "gate.banned",
    metric_type: MetricType::Counter,
    description: "Requests rejected because the account is banned",
};

pub const GATE_STORE_DOWN: MetricDef = MetricDef {
    name: "gate.store_down",
    metric_type: MetricType::Counter,
    description: "Requests failed closed because the account store was unreachable",
};

pub const DATASET_RELOAD_OK: MetricDef = MetricDef {
    name: "champion_data.reload.ok",
    metric_type: MetricType::Counter,
    description: "Successful champion dataset reloads",
};

pub const DATASET_RELOAD_FAILED: MetricDef = MetricDef {
    name: "champion_data.reload.failed",
    metric_type: MetricType::Counter,
    description: "Champion dataset reloads that kept the previous snapshot",
};

// TODO: all metrics must be added here for now, this can be done dynamically with a macro in the future.
pub const ALL_METRICS: &[MetricDef] = &[
    VOLATILE_CACHE_HIT,
    VOLATILE_CACHE_MISS,
    PERSISTENT_CACHE_HIT,
    PERSISTENT_CACHE_MISS,
    UPSTREAM_FETCH_OK,
    UPSTREAM_FETCH_FAILED,
    GATE_DENIED,
    GATE_BANNED,
    GATE_STORE_DOWN,
    DATASET_RELOAD_OK,
    DATASET_RELOAD_FAILED,
];
