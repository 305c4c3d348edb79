//! Nearby-city ranking and snapshot aggregation
//!
//! Pure ranking over the gazetteer, then a concurrent fan-out that attaches a
//! current snapshot to each ranked candidate. A failed fetch drops only its
//! own candidate.

use std::collections::HashSet;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::geo;
use crate::models::{Coordinate, GazetteerEntry, RankedCandidate};
use crate::weather::WeatherProvider;

/// Number of candidates in a full ranking
pub const NEARBY_LIMIT: usize = 6;

/// Radius within which a place counts as genuinely nearby, in kilometers
pub const NEARBY_RADIUS_KM: f64 = 150.0;

/// Rank gazetteer entries around an optional focus coordinate
///
/// With a focus, entries within [`NEARBY_RADIUS_KM`] come first, closest
/// first; when fewer than [`NEARBY_LIMIT`] qualify, the remaining slots are
/// filled with the closest entries beyond the radius so sparse regions still
/// get a full panel. Without a focus the gazetteer's leading entries are
/// returned unmeasured. Either way the result has exactly
/// `min(NEARBY_LIMIT, gazetteer.len())` entries, no duplicates.
#[must_use]
pub fn rank(focus: Option<Coordinate>, gazetteer: &[GazetteerEntry]) -> Vec<RankedCandidate> {
    let Some(focus) = focus else {
        return gazetteer
            .iter()
            .take(NEARBY_LIMIT)
            .map(|entry| RankedCandidate::new(entry.clone(), None))
            .collect();
    };

    let mut measured: Vec<(&GazetteerEntry, f64)> = gazetteer
        .iter()
        .map(|entry| (entry, geo::distance_km(&focus, &entry.coordinate)))
        .collect();
    // stable sort preserves gazetteer order between equal distances
    measured.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut selected: Vec<RankedCandidate> = measured
        .iter()
        .filter(|(_, distance)| *distance <= NEARBY_RADIUS_KM)
        .take(NEARBY_LIMIT)
        .map(|(entry, distance)| RankedCandidate::new((*entry).clone(), Some(*distance)))
        .collect();

    if selected.len() < NEARBY_LIMIT {
        debug!(
            "Only {} places within {} km, filling from the wider gazetteer",
            selected.len(),
            NEARBY_RADIUS_KM
        );
        let mut seen: HashSet<String> = selected
            .iter()
            .map(|candidate| candidate.entry.name.clone())
            .collect();
        for (entry, distance) in &measured {
            if selected.len() >= NEARBY_LIMIT {
                break;
            }
            if seen.insert(entry.name.clone()) {
                selected.push(RankedCandidate::new((*entry).clone(), Some(*distance)));
            }
        }
    }

    selected
}

/// Attach a current snapshot to each ranked candidate
///
/// All fetches run concurrently; relative order of the input is preserved. A
/// candidate whose fetch fails is logged and omitted, never failing the batch.
pub async fn fetch_all<W: WeatherProvider>(
    provider: &W,
    candidates: Vec<RankedCandidate>,
) -> Vec<RankedCandidate> {
    let fetches = candidates.into_iter().map(|mut candidate| async move {
        match provider
            .current(
                candidate.entry.coordinate,
                &candidate.entry.name,
                &candidate.entry.country_code,
            )
            .await
        {
            Ok(snapshot) => {
                candidate.snapshot = Some(snapshot);
                Some(candidate)
            }
            Err(err) => {
                warn!(
                    "Skipping nearby candidate {}: {}",
                    candidate.entry.name, err
                );
                None
            }
        }
    });

    join_all(fetches).await.into_iter().flatten().collect()
}
