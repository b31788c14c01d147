//! Merging stored and freshly fetched restrooms and ranking by distance.

use serde::Serialize;

use crate::domain::{distance_km, Coordinate, RestroomSummary};

/// Default number of results for the nearby endpoint.
pub const DEFAULT_NEARBY_LIMIT: usize = 10;

/// A restroom with its distance from the query point, in kilometres.
#[derive(Debug, Clone, Serialize)]
pub struct RankedRestroom {
    #[serde(flatten)]
    pub restroom: RestroomSummary,
    #[serde(rename = "distance")]
    pub distance_km: f64,
}

/// Merge two restroom lists, rank every entry by distance from `query`, and
/// keep the closest `limit`. Ties keep input order, stored entries first.
pub fn nearby(
    query: Coordinate,
    stored: Vec<RestroomSummary>,
    fetched: Vec<RestroomSummary>,
    limit: usize,
) -> Vec<RankedRestroom> {
    let mut ranked: Vec<RankedRestroom> = stored
        .into_iter()
        .chain(fetched)
        .map(|restroom| {
            let distance_km = distance_km(query, restroom.coordinate());
            RankedRestroom {
                restroom,
                distance_km,
            }
        })
        .collect();

    // Stable sort so equidistant entries keep their input order.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;

    use super::*;
    use crate::domain::ToiletSource;

    fn summary(id: &str, lat: f64, lon: f64) -> RestroomSummary {
        RestroomSummary {
            id: id.to_owned(),
            name: format!("{id} 화장실"),
            address: "서울시 어딘가".to_owned(),
            latitude: lat,
            longitude: lon,
            source: ToiletSource::Public,
            has_password: false,
            password_hint: None,
            rating: None,
            rating_count: 0,
            creator_name: None,
            created_at: Utc::now(),
        }
    }

    fn seoul_station() -> Coordinate {
        Coordinate::new(37.5547, 126.9706).unwrap()
    }

    #[test]
    fn results_are_sorted_ascending_and_truncated() {
        let query = seoul_station();
        let stored = vec![
            summary("far", 37.4979, 127.0276),
            summary("near", 37.5547, 126.9707),
        ];
        let fetched = vec![summary("mid", 37.5566, 126.9229)];

        let ranked = nearby(query, stored, fetched, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].restroom.id, "near");
        assert_eq!(ranked[1].restroom.id, "mid");
        assert!(ranked[0].distance_km <= ranked[1].distance_km);
    }

    #[test]
    fn limit_zero_yields_nothing() {
        let ranked = nearby(
            seoul_station(),
            vec![summary("a", 37.5, 127.0)],
            vec![],
            0,
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn equidistant_entries_keep_input_order_stored_first() {
        let query = seoul_station();
        let same = (37.5, 127.0);
        let stored = vec![summary("stored", same.0, same.1)];
        let fetched = vec![summary("fetched", same.0, same.1)];

        let ranked = nearby(query, stored, fetched, 10);
        assert_eq!(ranked[0].restroom.id, "stored");
        assert_eq!(ranked[1].restroom.id, "fetched");
    }

    #[test]
    fn serializes_with_flat_distance_field() {
        let ranked = nearby(
            seoul_station(),
            vec![summary("a", 37.5547, 126.9706)],
            vec![],
            10,
        );
        let value = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(value["id"], "a");
        assert!(value["distance"].is_number());
        assert!((value["distance"].as_f64().unwrap()).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn never_returns_more_than_limit(
            n_stored in 0usize..20,
            n_fetched in 0usize..20,
            limit in 0usize..15,
        ) {
            let stored: Vec<_> = (0..n_stored)
                .map(|i| summary(&format!("s{i}"), 37.4 + i as f64 * 0.001, 127.0))
                .collect();
            let fetched: Vec<_> = (0..n_fetched)
                .map(|i| summary(&format!("f{i}"), 37.6 + i as f64 * 0.001, 126.9))
                .collect();
            let ranked = nearby(seoul_station(), stored, fetched, limit);
            prop_assert!(ranked.len() <= limit);
            prop_assert!(ranked.len() <= n_stored + n_fetched);
        }

        #[test]
        fn output_is_always_sorted(
            lats in proptest::collection::vec(37.0f64..38.0, 0..25),
        ) {
            let stored: Vec<_> = lats
                .iter()
                .enumerate()
                .map(|(i, &lat)| summary(&format!("t{i}"), lat, 127.0))
                .collect();
            let ranked = nearby(seoul_station(), stored, vec![], DEFAULT_NEARBY_LIMIT);
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].distance_km <= pair[1].distance_km);
            }
        }
    }
}
