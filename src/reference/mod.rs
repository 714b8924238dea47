//! Read-only reference data consulted by the engine and the API.
//!
//! Every table sits behind [`ReferenceSource`] so a live data feed can stand in
//! for the fixed tables without touching callers.

pub mod calibration;
pub mod head_to_head;
pub mod momentum;
pub mod odds;
pub mod weather;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use head_to_head::{HeadToHeadStats, HeadToHeadTable};
pub use momentum::MomentumData;
pub use odds::{BookmakerOdds, OddsComparison, OddsTable};
pub use weather::{WeatherData, WeatherImpact};

/// Keyed lookup that every reference data source must implement.
///
/// `None` is the "no data" sentinel: callers treat it as "no adjustment
/// available", never as a failure.
pub trait ReferenceSource<K: ?Sized>: Send + Sync {
    type Record;

    fn lookup(&self, key: &K) -> Option<Self::Record>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Immutable string-keyed table.
#[derive(Debug, Clone)]
pub struct StaticTable<R> {
    name: String,
    records: HashMap<String, R>,
}

impl<R> StaticTable<R> {
    pub fn new(name: impl Into<String>, records: impl IntoIterator<Item = (String, R)>) -> Self {
        Self {
            name: name.into(),
            records: records.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.records.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl<R> ReferenceSource<str> for StaticTable<R>
where
    R: Clone + Send + Sync,
{
    type Record = R;

    fn lookup(&self, key: &str) -> Option<R> {
        self.records.get(key).cloned()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A home/away pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fixture {
    pub home: String,
    pub away: String,
}

impl Fixture {
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            home: self.away.clone(),
            away: self.home.clone(),
        }
    }
}

/// Records that can be re-read from the other side of a fixture.
pub trait Mirrored {
    fn mirrored(self) -> Self;
}

/// Fixture-keyed table storing each pairing once.
///
/// A lookup for the reverse fixture returns the stored record mirrored.
#[derive(Debug, Clone)]
pub struct FixtureTable<R> {
    name: String,
    records: HashMap<Fixture, R>,
}

impl<R> FixtureTable<R> {
    pub fn new(name: impl Into<String>, records: impl IntoIterator<Item = (Fixture, R)>) -> Self {
        Self {
            name: name.into(),
            records: records.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R> ReferenceSource<Fixture> for FixtureTable<R>
where
    R: Mirrored + Clone + Send + Sync,
{
    type Record = R;

    fn lookup(&self, fixture: &Fixture) -> Option<R> {
        if let Some(record) = self.records.get(fixture) {
            return Some(record.clone());
        }
        self.records
            .get(&fixture.reversed())
            .cloned()
            .map(Mirrored::mirrored)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
