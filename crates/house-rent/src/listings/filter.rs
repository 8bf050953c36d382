//! Conjunctive browse filters over an in-memory set of listings.

use serde::Deserialize;

use super::domain::Listing;

pub const DEFAULT_PRICE_MIN: u64 = 0;
pub const DEFAULT_PRICE_MAX: u64 = 50_000;

const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CityFilter {
    #[default]
    All,
    Only(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomFilter {
    #[default]
    All,
    Exactly(u32),
}

/// Browse query string: `?city=&price_min=&price_max=&rooms=&q=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub price_min: Option<u64>,
    #[serde(default)]
    pub price_max: Option<u64>,
    #[serde(default)]
    pub rooms: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("rooms must be 'all' or a whole number, found '{0}'")]
    InvalidRooms(String),
    #[error("price_min {min} exceeds price_max {max}")]
    InvertedPriceRange { min: u64, max: u64 },
}

/// One independent predicate. A listing passes the filter when it passes every criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    City(String),
    PriceRange { min: u64, max: u64 },
    Rooms(u32),
    Search(String),
}

impl Criterion {
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Criterion::City(city) => listing.city == *city,
            Criterion::PriceRange { min, max } => (*min..=*max).contains(&listing.price),
            Criterion::Rooms(rooms) => listing.rooms == *rooms,
            Criterion::Search(term) => {
                contains_folded(&listing.title, term)
                    || contains_folded(&listing.area, term)
                    || contains_folded(&listing.description, term)
            }
        }
    }
}

/// `term` must already be lowercased.
fn contains_folded(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(term)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFilter {
    pub city: CityFilter,
    pub price_min: u64,
    pub price_max: u64,
    pub rooms: RoomFilter,
    pub search_term: Option<String>,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            city: CityFilter::All,
            price_min: DEFAULT_PRICE_MIN,
            price_max: DEFAULT_PRICE_MAX,
            rooms: RoomFilter::All,
            search_term: None,
        }
    }
}

impl ListingFilter {
    pub fn from_query(query: &BrowseQuery) -> Result<Self, FilterError> {
        let city = match query.city.as_deref().map(str::trim) {
            None | Some("") => CityFilter::All,
            Some(value) if value.eq_ignore_ascii_case(ALL) => CityFilter::All,
            Some(value) => CityFilter::Only(value.to_string()),
        };

        let rooms = match query.rooms.as_deref().map(str::trim) {
            None | Some("") => RoomFilter::All,
            Some(value) if value.eq_ignore_ascii_case(ALL) => RoomFilter::All,
            Some(value) => RoomFilter::Exactly(
                value
                    .parse::<u32>()
                    .map_err(|_| FilterError::InvalidRooms(value.to_string()))?,
            ),
        };

        let price_min = query.price_min.unwrap_or(DEFAULT_PRICE_MIN);
        let price_max = query.price_max.unwrap_or(DEFAULT_PRICE_MAX);
        if price_min > price_max {
            return Err(FilterError::InvertedPriceRange {
                min: price_min,
                max: price_max,
            });
        }

        Ok(Self {
            city,
            price_min,
            price_max,
            rooms,
            search_term: query.q.clone(),
        })
    }

    /// Active criteria; `all` selections and blank search terms contribute nothing.
    pub fn criteria(&self) -> Vec<Criterion> {
        let mut criteria = Vec::with_capacity(4);
        if let CityFilter::Only(city) = &self.city {
            criteria.push(Criterion::City(city.clone()));
        }
        criteria.push(Criterion::PriceRange {
            min: self.price_min,
            max: self.price_max,
        });
        if let RoomFilter::Exactly(rooms) = self.rooms {
            criteria.push(Criterion::Rooms(rooms));
        }
        if let Some(term) = self
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        {
            criteria.push(Criterion::Search(term.to_lowercase()));
        }
        criteria
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.criteria()
            .iter()
            .all(|criterion| criterion.matches(listing))
    }

    pub fn apply<'a, I>(&self, listings: I) -> Vec<&'a Listing>
    where
        I: IntoIterator<Item = &'a Listing>,
    {
        let criteria = self.criteria();
        listings
            .into_iter()
            .filter(|listing| criteria.iter().all(|criterion| criterion.matches(listing)))
            .collect()
    }
}
