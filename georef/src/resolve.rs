//! Picking one gazetteer entry when a detection matched several.

use crate::{geo::BoundingBox, matcher::MatchCandidate};

/// Pick the candidate for a detection at `bbox`.
///
/// A lone candidate is returned as is. Otherwise we return the candidate
/// nearest to the centre of the detection's box. Exact ties go to the
/// candidate that comes first, which is the one earliest in the gazetteer.
/// That rule is arbitrary, but it is deterministic and it is what existing
/// accuracy figures were computed with.
///
/// Returns `None` only if there are no candidates.
pub fn resolve<'c, 'a>(
    candidates: &'c [MatchCandidate<'a>],
    bbox: &BoundingBox,
) -> Option<&'c MatchCandidate<'a>> {
    let (first, rest) = candidates.split_first()?;
    if rest.is_empty() {
        return Some(first);
    }

    let centroid = bbox.centroid();
    let mut best = first;
    let mut best_distance = centroid.distance(&first.entry.location);
    for candidate in rest {
        let distance = centroid.distance(&candidate.entry.location);
        if distance < best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{crs::Crs, gazetteer::GazetteerEntry, geo::GeoPoint};

    const CRS: Crs = Crs::UTM32N_ETRS89;

    fn entry(name: &str, x: f64, y: f64) -> GazetteerEntry {
        GazetteerEntry {
            name: name.to_owned(),
            location: GeoPoint::new(x, y, CRS),
        }
    }

    fn candidates(entries: &[GazetteerEntry]) -> Vec<MatchCandidate> {
        entries
            .iter()
            .map(|entry| MatchCandidate { entry, score: 0.9 })
            .collect()
    }

    /// A box centred on (10, 10).
    fn bbox() -> BoundingBox {
        BoundingBox::new(5.0, 15.0, 15.0, 5.0, CRS)
    }

    #[test]
    fn no_candidates() {
        assert!(resolve(&[], &bbox()).is_none());
    }

    #[test]
    fn single_candidate_is_returned_even_if_far_away() {
        let entries = [entry("far", 1e6, 1e6)];
        let list = candidates(&entries);
        assert_eq!("far", resolve(&list, &bbox()).unwrap().entry.name);
    }

    #[test]
    fn nearest_candidate_wins() {
        // Distances 5, 2 and 8 from the centroid.
        let entries = [
            entry("five", 15.0, 10.0),
            entry("two", 10.0, 8.0),
            entry("eight", 10.0, 18.0),
        ];
        let list = candidates(&entries);
        assert_eq!("two", resolve(&list, &bbox()).unwrap().entry.name);
    }

    #[test]
    fn ties_go_to_the_first_candidate() {
        let entries = [
            entry("far", 30.0, 10.0),
            entry("east", 13.0, 10.0),
            entry("west", 7.0, 10.0),
            entry("north", 10.0, 13.0),
        ];
        let list = candidates(&entries);
        assert_eq!("east", resolve(&list, &bbox()).unwrap().entry.name);
    }
}
