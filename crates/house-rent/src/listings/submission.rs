use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::domain::NewListing;
use super::lifecycle::{self, DEFAULT_AVAILABILITY_DAYS};
use crate::catalog::{self, EnvironmentTag};
use crate::session::Identity;

pub const MAX_IMAGES: usize = 5;

/// Availability windows an owner may pick, in days.
pub const AVAILABILITY_OPTIONS: [u32; 7] = [7, 14, 30, 60, 90, 180, 365];

/// Either a catalog city or free text for a city outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum CityChoice {
    Catalog(String),
    Custom(String),
}

/// Add-listing form as submitted by an owner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSubmission {
    pub title: String,
    pub city: CityChoice,
    pub area: String,
    pub price: u64,
    pub rooms: u32,
    pub max_people: u32,
    #[serde(default)]
    pub environment: BTreeSet<EnvironmentTag>,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub phone: String,
    #[serde(default)]
    pub availability_duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("unknown city '{0}'")]
    UnknownCity(String),
    #[error("at least one image is required")]
    NoImages,
    #[error("at most 5 images are allowed, got {0}")]
    TooManyImages(usize),
    #[error("availability must be one of 7, 14, 30, 60, 90, 180, or 365 days, got {0}")]
    InvalidDuration(u32),
}

fn required(value: &str, field: &'static str) -> Result<String, SubmissionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(SubmissionError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn positive<T: Default + PartialEq>(value: T, field: &'static str) -> Result<T, SubmissionError> {
    if value == T::default() {
        Err(SubmissionError::NotPositive(field))
    } else {
        Ok(value)
    }
}

impl ListingSubmission {
    pub fn resolved_city(&self) -> Result<String, SubmissionError> {
        match &self.city {
            CityChoice::Catalog(id) => {
                let id = required(id, "city")?;
                catalog::city_by_id(&id)
                    .map(|city| city.id.to_string())
                    .ok_or(SubmissionError::UnknownCity(id))
            }
            CityChoice::Custom(name) => required(name, "city"),
        }
    }

    pub fn availability_days(&self) -> Result<u32, SubmissionError> {
        let days = self
            .availability_duration
            .unwrap_or(DEFAULT_AVAILABILITY_DAYS);
        if AVAILABILITY_OPTIONS.contains(&days) {
            Ok(days)
        } else {
            Err(SubmissionError::InvalidDuration(days))
        }
    }

    /// Validates the form and stamps ownership, status, and expiry.
    pub fn into_new_listing(
        self,
        owner: &Identity,
        now: DateTime<Utc>,
    ) -> Result<NewListing, SubmissionError> {
        if self.images.is_empty() {
            return Err(SubmissionError::NoImages);
        }
        if self.images.len() > MAX_IMAGES {
            return Err(SubmissionError::TooManyImages(self.images.len()));
        }

        let title = required(&self.title, "title")?;
        let city = self.resolved_city()?;
        let area = required(&self.area, "area")?;
        let price = positive(self.price, "price")?;
        let rooms = positive(self.rooms, "rooms")?;
        let max_people = positive(self.max_people, "maxPeople")?;
        let owner_phone = required(&self.phone, "phone")?;
        let description = required(&self.description, "description")?;
        let availability_duration = self.availability_days()?;

        Ok(NewListing {
            title,
            city,
            area,
            price,
            rooms,
            max_people,
            environment: self.environment,
            description,
            images: self.images,
            owner_phone,
            owner_id: owner.uid.clone(),
            owner_name: Some(owner.public_name()),
            status: lifecycle::initial_status(),
            hidden: false,
            availability_duration,
            expiry_date: lifecycle::expiry_for(now, availability_duration),
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::domain::ListingStatus;
    use crate::session::UserId;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn owner() -> Identity {
        Identity {
            uid: UserId("owner-7".to_string()),
            email: "hana@example.et".to_string(),
            display_name: None,
            token: "t".to_string(),
        }
    }

    fn submission() -> ListingSubmission {
        serde_json::from_value(json!({
            "title": "Family House in Piassa",
            "city": { "mode": "catalog", "value": "gondar" },
            "area": "Piassa",
            "price": 9500,
            "rooms": 3,
            "maxPeople": 5,
            "environment": ["quiet", "nearSchool"],
            "description": "Walking distance to Fasil Ghebbi",
            "images": ["https://img.example/p1.jpg"],
            "phone": "+251918000000"
        }))
        .expect("valid payload")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 10, 15, 0, 0).unwrap()
    }

    #[test]
    fn valid_submission_becomes_pending_listing_with_expiry() {
        let listing = submission()
            .into_new_listing(&owner(), now())
            .expect("valid");
        assert_eq!(listing.status, ListingStatus::Pending);
        assert!(!listing.hidden);
        assert_eq!(listing.availability_duration, 30);
        assert_eq!(listing.expiry_date, now() + Duration::days(30));
        assert_eq!(listing.owner_name.as_deref(), Some("hana@example.et"));
        assert_eq!(listing.city, "gondar");
    }

    #[test]
    fn custom_city_is_kept_as_free_text() {
        let mut form = submission();
        form.city = CityChoice::Custom("  Arba Minch ".to_string());
        let listing = form.into_new_listing(&owner(), now()).expect("valid");
        assert_eq!(listing.city, "Arba Minch");
    }

    #[test]
    fn unknown_catalog_city_and_blank_fields_are_refused() {
        let mut form = submission();
        form.city = CityChoice::Catalog("atlantis".to_string());
        assert_eq!(
            form.into_new_listing(&owner(), now()),
            Err(SubmissionError::UnknownCity("atlantis".to_string()))
        );

        let mut form = submission();
        form.area = "  ".to_string();
        assert_eq!(
            form.into_new_listing(&owner(), now()),
            Err(SubmissionError::MissingField("area"))
        );

        let mut form = submission();
        form.rooms = 0;
        assert_eq!(
            form.into_new_listing(&owner(), now()),
            Err(SubmissionError::NotPositive("rooms"))
        );
    }

    #[test]
    fn image_count_must_be_between_one_and_five() {
        let mut form = submission();
        form.images.clear();
        assert_eq!(
            form.into_new_listing(&owner(), now()),
            Err(SubmissionError::NoImages)
        );

        let mut form = submission();
        form.images = (0..6).map(|i| format!("https://img.example/{i}.jpg")).collect();
        assert_eq!(
            form.into_new_listing(&owner(), now()),
            Err(SubmissionError::TooManyImages(6))
        );
    }

    #[test]
    fn availability_must_be_an_offered_option() {
        let mut form = submission();
        form.availability_duration = Some(365);
        let listing = form.clone().into_new_listing(&owner(), now()).expect("valid");
        assert_eq!(listing.expiry_date, now() + Duration::days(365));

        form.availability_duration = Some(45);
        assert_eq!(
            form.into_new_listing(&owner(), now()),
            Err(SubmissionError::InvalidDuration(45))
        );
    }
}
