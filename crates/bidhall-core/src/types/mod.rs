//! Typed views over the auction API's records.
//!
//! The API owns these shapes; fields the client does not use are ignored and
//! loosely-typed fields are normalized here rather than at each call site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// An image reference attached to a listing or profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    /// Image URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,

    /// Alt text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub alt: String,
}

impl Media {
    /// Create a media entry, trimming both fields.
    #[must_use]
    pub fn new(url: &str, alt: &str) -> Self {
        Self {
            url: url.trim().to_string(),
            alt: alt.trim().to_string(),
        }
    }
}

/// Profile avatar or banner.
///
/// Older records carry a bare URL string, newer ones a `{url, alt}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaRef {
    /// Plain URL string.
    Url(String),
    /// Structured media object.
    Media(Media),
}

impl MediaRef {
    /// The URL regardless of shape. Empty strings count as absent.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        let url = match self {
            Self::Url(url) => url.as_str(),
            Self::Media(media) => media.url.as_str(),
        };
        (!url.is_empty()).then_some(url)
    }

    /// Alt text, empty for plain URLs.
    #[must_use]
    pub fn alt(&self) -> &str {
        match self {
            Self::Url(_) => "",
            Self::Media(media) => &media.alt,
        }
    }
}

/// Resolve an optional media field to its URL, or `fallback`.
#[must_use]
pub fn media_url<'a>(value: Option<&'a MediaRef>, fallback: &'a str) -> &'a str {
    value.and_then(MediaRef::url).unwrap_or(fallback)
}

/// Minimal profile embedded in listings (seller) and bids (bidder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Profile name (the account handle).
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Email, when the API includes it.
    #[serde(default)]
    pub email: Option<String>,
}

/// The bidder on a bid: an embedded profile or a bare name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bidder {
    /// Embedded profile.
    Profile(ProfileSummary),
    /// Bare name.
    Name(String),
}

/// A bid on a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    /// Bid ID.
    #[serde(default)]
    pub id: Option<String>,

    /// Amount in credits; `None` when the API sent something non-numeric.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,

    /// Who placed the bid.
    #[serde(default)]
    pub bidder: Option<Bidder>,

    /// Flat bidder name used by some responses.
    #[serde(default)]
    pub bidder_name: Option<String>,

    /// When the bid was placed.
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl Bid {
    /// Resolve the bidder's name from whichever field carries it.
    #[must_use]
    pub fn bidder_name(&self) -> Option<&str> {
        let from_bidder = match &self.bidder {
            Some(Bidder::Profile(p)) => Some(p.name.as_str()),
            _ => None,
        };
        from_bidder
            .filter(|n| !n.is_empty())
            .or_else(|| self.bidder_name.as_deref().filter(|n| !n.is_empty()))
            .or_else(|| match &self.bidder {
                Some(Bidder::Name(n)) if !n.is_empty() => Some(n.as_str()),
                _ => None,
            })
    }
}

/// Relation counts on a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCount {
    /// Number of bids.
    #[serde(default)]
    pub bids: u64,
}

/// An auction listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Listing ID.
    pub id: String,

    /// Title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Description.
    #[serde(default)]
    pub description: Option<String>,

    /// Tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    /// Images, first one is the main image.
    #[serde(default, deserialize_with = "null_as_default")]
    pub media: Vec<Media>,

    /// Creation time.
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,

    /// Last update time.
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,

    /// Auction end time.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,

    /// Seller, present with `_seller=true`.
    #[serde(default)]
    pub seller: Option<ProfileSummary>,

    /// Bids, present with `_bids=true`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub bids: Vec<Bid>,

    /// Relation counts.
    #[serde(default, rename = "_count")]
    pub count: Option<ListingCount>,
}

impl Listing {
    /// Title, or a placeholder for untitled listings.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled listing"
        } else {
            &self.title
        }
    }

    /// Seller name, or a placeholder.
    #[must_use]
    pub fn seller_name(&self) -> &str {
        self.seller
            .as_ref()
            .map(|s| s.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown seller")
    }

    /// Number of bids, preferring the embedded list over `_count`.
    #[must_use]
    pub fn bid_count(&self) -> u64 {
        if self.bids.is_empty() {
            self.count.map_or(0, |c| c.bids)
        } else {
            self.bids.len() as u64
        }
    }
}

/// Relation counts on a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCount {
    /// Listings created.
    #[serde(default)]
    pub listings: u64,
    /// Auctions won.
    #[serde(default)]
    pub wins: u64,
}

/// An auction profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Profile name.
    pub name: String,

    /// Email.
    #[serde(default)]
    pub email: Option<String>,

    /// Bio.
    #[serde(default)]
    pub bio: Option<String>,

    /// Avatar image.
    #[serde(default)]
    pub avatar: Option<MediaRef>,

    /// Banner image.
    #[serde(default)]
    pub banner: Option<MediaRef>,

    /// Available credits, 0 when absent or non-numeric.
    #[serde(default, deserialize_with = "lenient_credits")]
    pub credits: i64,

    /// The profile's listings, present with `_listings=true`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub listings: Vec<Listing>,

    /// Relation counts.
    #[serde(default, rename = "_count")]
    pub count: Option<ProfileCount>,
}

/// Deserialize `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept any JSON value, keep it only if it is a number.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::Value::deserialize(deserializer)?.as_f64())
}

/// Deserialize credits from any JSON value, 0 when it is not a number.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
#[allow(clippy::cast_possible_truncation)]
pub fn lenient_credits<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_media_ref_string_and_object() {
        let plain: MediaRef = serde_json::from_value(json!("https://img.test/a.png")).unwrap();
        assert_eq!(plain.url(), Some("https://img.test/a.png"));
        assert_eq!(plain.alt(), "");

        let object: MediaRef =
            serde_json::from_value(json!({"url": "https://img.test/b.png", "alt": "Banner"}))
                .unwrap();
        assert_eq!(object.url(), Some("https://img.test/b.png"));
        assert_eq!(object.alt(), "Banner");

        let empty: MediaRef = serde_json::from_value(json!({"url": "", "alt": null})).unwrap();
        assert_eq!(media_url(Some(&empty), "fallback.png"), "fallback.png");
        assert_eq!(media_url(None, "fallback.png"), "fallback.png");
    }

    #[test]
    fn test_bidder_name_resolution() {
        let nested: Bid =
            serde_json::from_value(json!({"amount": 10, "bidder": {"name": "ola"}})).unwrap();
        assert_eq!(nested.bidder_name(), Some("ola"));

        let flat: Bid = serde_json::from_value(json!({"amount": 10, "bidderName": "kari"})).unwrap();
        assert_eq!(flat.bidder_name(), Some("kari"));

        let bare: Bid = serde_json::from_value(json!({"amount": 10, "bidder": "nils"})).unwrap();
        assert_eq!(bare.bidder_name(), Some("nils"));

        let none: Bid = serde_json::from_value(json!({"amount": 10})).unwrap();
        assert_eq!(none.bidder_name(), None);
    }

    #[test]
    fn test_non_numeric_amount_is_dropped() {
        let bid: Bid = serde_json::from_value(json!({"amount": "lots"})).unwrap();
        assert_eq!(bid.amount, None);
    }

    #[test]
    fn test_listing_tolerates_nulls_and_extra_fields() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "abc",
            "title": "Bike",
            "description": null,
            "tags": null,
            "media": null,
            "endsAt": "2030-01-01T12:00:00.000Z",
            "seller": {"name": "kari", "email": "kari@stud.noroff.no", "bio": "x"},
            "_count": {"bids": 3},
            "somethingNew": true
        }))
        .unwrap();

        assert_eq!(listing.title, "Bike");
        assert!(listing.tags.is_empty());
        assert!(listing.media.is_empty());
        assert_eq!(listing.seller_name(), "kari");
        assert_eq!(listing.bid_count(), 3);
        assert!(listing.ends_at.is_some());
    }

    #[test]
    fn test_listing_placeholders() {
        let listing: Listing = serde_json::from_value(json!({"id": "x"})).unwrap();
        assert_eq!(listing.display_title(), "Untitled listing");
        assert_eq!(listing.seller_name(), "Unknown seller");
    }

    #[test]
    fn test_profile_credits_default() {
        let profile: Profile =
            serde_json::from_value(json!({"name": "kari", "credits": "n/a"})).unwrap();
        assert_eq!(profile.credits, 0);

        let profile: Profile =
            serde_json::from_value(json!({"name": "kari", "credits": 1000})).unwrap();
        assert_eq!(profile.credits, 1000);
    }
}
