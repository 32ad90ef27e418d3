//! Wire types for the iTunes Search, Lookup, and customer-reviews APIs.

use serde::Deserialize;

/// Response envelope shared by the Search and Lookup endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<ItunesApp>,
}

/// One app as returned by `/search` or `/lookup`.
///
/// The two endpoints return the same shape; `/lookup` fills more fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItunesApp {
    pub track_id: Option<i64>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub average_user_rating: Option<f64>,
    pub user_rating_count: Option<u64>,
    pub price: Option<f64>,
    pub formatted_price: Option<String>,
    pub track_view_url: Option<String>,
    pub release_date: Option<String>,
    pub seller_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl ItunesApp {
    /// Whether the store flags this app as offering in-app purchases.
    pub(crate) fn offers_in_app_purchases(&self) -> bool {
        self.features.iter().any(|f| f == "iosUniversal")
    }
}

/// Envelope of the customer-reviews RSS feed (JSON rendering).
#[derive(Debug, Deserialize)]
pub(crate) struct ReviewFeedResponse {
    pub feed: Option<ReviewFeed>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewFeed {
    #[serde(default)]
    pub entry: Entries,
}

/// The feed renders a single review as a bare object and several as an
/// array; absent means no reviews.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Entries {
    Many(Vec<ReviewEntry>),
    One(Box<ReviewEntry>),
}

impl Default for Entries {
    fn default() -> Self {
        Entries::Many(Vec::new())
    }
}

impl Entries {
    pub(crate) fn into_vec(self) -> Vec<ReviewEntry> {
        match self {
            Entries::Many(entries) => entries,
            Entries::One(entry) => vec![*entry],
        }
    }
}

/// One review entry. The feed's first entry describes the app itself and
/// carries no `im:rating`; callers filter on that.
#[derive(Debug, Deserialize)]
pub(crate) struct ReviewEntry {
    pub author: Option<Author>,
    #[serde(rename = "im:rating")]
    pub rating: Option<Label>,
    pub title: Option<Label>,
    pub content: Option<Label>,
    #[serde(rename = "im:voteCount")]
    pub vote_count: Option<Label>,
    pub updated: Option<Label>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Author {
    pub name: Option<Label>,
}

/// The feed wraps every scalar in `{"label": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Label {
    pub label: String,
}
