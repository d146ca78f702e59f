//! Helpers over listings and bids: highest bid, search, bid history.

use crate::types::{Bid, Listing};

/// Highest numeric bid amount, 0 when there are none.
#[must_use]
pub fn highest_bid(bids: &[Bid]) -> f64 {
    bids.iter()
        .filter_map(|b| b.amount)
        .fold(0.0, f64::max)
}

/// Highest numeric bid placed by `name`, 0 when there are none.
#[must_use]
pub fn highest_bid_by(bids: &[Bid], name: &str) -> f64 {
    bids.iter()
        .filter(|b| b.bidder_name() == Some(name))
        .filter_map(|b| b.amount)
        .fold(0.0, f64::max)
}

/// Whether `name` has bid on the listing.
#[must_use]
pub fn has_bid_by(listing: &Listing, name: &str) -> bool {
    listing.bids.iter().any(|b| b.bidder_name() == Some(name))
}

/// Bids sorted newest first. Bids without a timestamp go last.
#[must_use]
pub fn bids_newest_first(bids: &[Bid]) -> Vec<&Bid> {
    let mut sorted: Vec<&Bid> = bids.iter().collect();
    sorted.sort_by(|a, b| b.created.cmp(&a.created));
    sorted
}

/// Case-insensitive search over title, description and seller name.
///
/// A blank term matches everything.
#[must_use]
pub fn search<'a>(listings: &'a [Listing], term: &str) -> Vec<&'a Listing> {
    let query = term.trim().to_lowercase();
    if query.is_empty() {
        return listings.iter().collect();
    }

    listings
        .iter()
        .filter(|listing| {
            let title = listing.title.to_lowercase();
            let description = listing.description.as_deref().unwrap_or("").to_lowercase();
            let seller = listing
                .seller
                .as_ref()
                .map(|s| s.name.to_lowercase())
                .unwrap_or_default();
            title.contains(&query) || description.contains(&query) || seller.contains(&query)
        })
        .collect()
}

/// Whether the named user is the listing's seller.
///
/// This only decides which controls to offer; the API enforces ownership.
#[must_use]
pub fn is_seller(listing: &Listing, user_name: &str) -> bool {
    !user_name.is_empty()
        && listing
            .seller
            .as_ref()
            .is_some_and(|s| !s.name.is_empty() && s.name == user_name)
}

/// A listing the user has bid on, with both highest bids.
#[derive(Debug, Clone, PartialEq)]
pub struct BidActivity {
    /// The listing.
    pub listing: Listing,
    /// Highest bid overall.
    pub highest: f64,
    /// The user's own highest bid.
    pub my_highest: f64,
}

/// Listings `name` has bid on, with overall and personal highest bids.
#[must_use]
pub fn bid_activity(listings: Vec<Listing>, name: &str) -> Vec<BidActivity> {
    listings
        .into_iter()
        .filter(|listing| has_bid_by(listing, name))
        .map(|listing| BidActivity {
            highest: highest_bid(&listing.bids),
            my_highest: highest_bid_by(&listing.bids, name),
            listing,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn listing(value: serde_json::Value) -> Listing {
        serde_json::from_value(value).unwrap()
    }

    fn bike() -> Listing {
        listing(json!({
            "id": "1",
            "title": "Blue Bike",
            "description": "Barely used",
            "seller": {"name": "kari"},
            "bids": [
                {"amount": 50, "bidder": {"name": "ola"}, "created": "2030-01-01T10:00:00.000Z"},
                {"amount": 120, "bidder": {"name": "nils"}, "created": "2030-01-01T12:00:00.000Z"},
                {"amount": 80, "bidderName": "ola", "created": "2030-01-01T11:00:00.000Z"},
                {"amount": "oops", "bidder": "ola"}
            ]
        }))
    }

    #[test]
    fn test_highest_bid() {
        let listing = bike();
        assert_eq!(highest_bid(&listing.bids), 120.0);
        assert_eq!(highest_bid(&[]), 0.0);
        assert_eq!(highest_bid_by(&listing.bids, "ola"), 80.0);
        assert_eq!(highest_bid_by(&listing.bids, "nobody"), 0.0);
    }

    #[test]
    fn test_bids_newest_first() {
        let listing = bike();
        let amounts: Vec<Option<f64>> = bids_newest_first(&listing.bids)
            .iter()
            .map(|b| b.amount)
            .collect();
        assert_eq!(amounts, vec![Some(120.0), Some(80.0), Some(50.0), None]);
    }

    #[test]
    fn test_search() {
        let listings = vec![
            bike(),
            listing(json!({"id": "2", "title": "Lamp", "seller": {"name": "ola"}})),
            listing(json!({"id": "3", "title": "Desk", "description": "Oak, with a bike rack"})),
        ];

        let ids = |found: Vec<&Listing>| found.iter().map(|l| l.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(search(&listings, "BIKE")), vec!["1", "3"]);
        assert_eq!(ids(search(&listings, "ola")), vec!["2"]);
        assert_eq!(search(&listings, "  ").len(), 3);
        assert!(search(&listings, "piano").is_empty());
    }

    #[test]
    fn test_is_seller() {
        let owned = bike();
        assert!(is_seller(&owned, "kari"));
        assert!(!is_seller(&owned, "ola"));
        assert!(!is_seller(&owned, ""));

        let anonymous = listing(json!({"id": "9"}));
        assert!(!is_seller(&anonymous, "kari"));
    }

    #[test]
    fn test_bid_activity() {
        let listings = vec![
            bike(),
            listing(json!({"id": "2", "title": "Lamp", "bids": [{"amount": 5, "bidder": {"name": "nils"}}]})),
        ];

        let activity = bid_activity(listings, "ola");
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].listing.id, "1");
        assert_eq!(activity[0].highest, 120.0);
        assert_eq!(activity[0].my_highest, 80.0);
    }
}
