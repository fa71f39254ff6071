//! Merge algorithm and save-decision classifier.

use std::collections::BTreeMap;

use super::dayfile::{SaveDecision, Sample};

/// Builds a map keyed by time from `existing`, overlays `fresh` (equal
/// times are overwritten by `fresh`), and materializes back to a slice
/// sorted ascending by time. Lexicographic ordering of zero-padded `HH:MM`
/// strings equals chronological ordering, so a `BTreeMap<String, _>`
/// produces the required order for free.
///
/// Total, commutative over distinct times, and idempotent when
/// `fresh ⊆ existing`.
#[must_use]
pub fn merge(existing: &[Sample], fresh: &[Sample]) -> Vec<Sample> {
    let mut by_time: BTreeMap<String, rust_decimal::Decimal> = BTreeMap::new();
    for s in existing {
        by_time.insert(s.time_str().to_string(), s.price);
    }
    for s in fresh {
        by_time.insert(s.time_str().to_string(), s.price);
    }
    by_time
        .into_iter()
        .map(|(time, price)| Sample::new(&time, price))
        .collect()
}

/// Compares `fresh` against `existing` and returns the save outcome:
///
/// - `existing` empty → `Update`.
/// - Any fresh sample whose time exists in `existing` with a different
///   price (`PriceChange`) → `Update`.
/// - Else any fresh sample whose time is absent from `existing`
///   (`NewEntry`) → `Append`.
/// - Else → `Skip`.
#[must_use]
pub fn classify(existing: &[Sample], fresh: &[Sample]) -> SaveDecision {
    if existing.is_empty() {
        return SaveDecision::Update;
    }

    let existing_by_time: BTreeMap<&str, rust_decimal::Decimal> =
        existing.iter().map(|s| (s.time_str(), s.price)).collect();

    let mut any_new_entry = false;
    for s in fresh {
        match existing_by_time.get(s.time_str()) {
            None => any_new_entry = true,
            Some(price) if *price != s.price => return SaveDecision::Update,
            Some(_) => {}
        }
    }

    if any_new_entry {
        SaveDecision::Append
    } else {
        SaveDecision::Skip
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, merge};
    use crate::store::dayfile::{SaveDecision, Sample};
    use rust_decimal::Decimal;

    fn sample(time: &str, price: &str) -> Sample {
        Sample::new(time, price.parse::<Decimal>().unwrap())
    }

    #[test]
    fn merge_is_sorted_ascending_with_no_duplicates() {
        let existing = vec![sample("09:31", "100.5"), sample("09:30", "100.0")];
        let fresh = vec![sample("09:32", "101.0")];
        let merged = merge(&existing, &fresh);
        let times: Vec<&str> = merged.iter().map(Sample::time_str).collect();
        assert_eq!(times, vec!["09:30", "09:31", "09:32"]);
    }

    #[test]
    fn merge_is_idempotent() {
        let existing = vec![sample("09:30", "100.0")];
        let fresh = vec![sample("09:30", "100.0"), sample("09:31", "100.5")];
        let once = merge(&existing, &fresh);
        let twice = merge(&once, &fresh);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_is_associative_over_distinct_times() {
        let e = vec![sample("09:30", "100.0")];
        let f = vec![sample("09:31", "100.5")];
        let g = vec![sample("09:32", "101.0")];

        let left = merge(&merge(&e, &f), &g);
        let right = merge(&e, &merge(&f, &g));
        assert_eq!(left, right);
    }

    #[test]
    fn classify_skip_when_fresh_is_subset() {
        let existing = vec![sample("09:30", "100.0"), sample("09:31", "100.5")];
        let fresh = existing.clone();
        assert_eq!(classify(&existing, &fresh), SaveDecision::Skip);
    }

    #[test]
    fn classify_append_on_new_time() {
        let existing = vec![sample("09:30", "100.0"), sample("09:31", "100.5")];
        let mut fresh = existing.clone();
        fresh.push(sample("09:32", "101.0"));
        assert_eq!(classify(&existing, &fresh), SaveDecision::Append);
    }

    #[test]
    fn classify_update_on_price_change() {
        let existing = vec![sample("09:30", "100.0"), sample("09:31", "100.5")];
        let fresh = vec![sample("09:30", "100.2"), sample("09:31", "100.5")];
        assert_eq!(classify(&existing, &fresh), SaveDecision::Update);
    }

    #[test]
    fn classify_update_when_existing_is_empty() {
        let fresh = vec![sample("09:30", "100.0")];
        assert_eq!(classify(&[], &fresh), SaveDecision::Update);
    }
}
