//! Fixed reference data: the city catalog and the environment tag options.

use serde::{Deserialize, Serialize};

use crate::i18n::{self, Language, LocalizedText};

/// Entry in the fixed city catalog. `house_count` is display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: &'static str,
    pub name: LocalizedText,
    pub house_count: u32,
    pub image: &'static str,
}

impl City {
    pub fn display_name(&self, language: Language) -> &'static str {
        self.name.get(language)
    }
}

const fn city(
    id: &'static str,
    en: &'static str,
    am: &'static str,
    om: &'static str,
    house_count: u32,
    image: &'static str,
) -> City {
    City {
        id,
        name: LocalizedText { en, am, om },
        house_count,
        image,
    }
}

#[rustfmt::skip]
static CITIES: [City; 10] = [
    city("addis-ababa", "Addis Ababa", "አዲስ አበባ", "Finfinnee", 1250, "/cities/addis-ababa.jpg"),
    city("dire-dawa", "Dire Dawa", "ድሬ ዳዋ", "Dirree Dhawaa", 320, "/cities/dire-dawa.jpg"),
    city("mekelle", "Mekelle", "መቀሌ", "Maqalee", 280, "/cities/mekelle.jpg"),
    city("gondar", "Gondar", "ጎንደር", "Gondar", 195, "/cities/gondar.jpg"),
    city("hawassa", "Hawassa", "ሀዋሳ", "Hawaasaa", 410, "/cities/hawassa.jpg"),
    city("bahir-dar", "Bahir Dar", "ባህር ዳር", "Baahir Daar", 235, "/cities/bahir-dar.jpg"),
    city("jimma", "Jimma", "ጅማ", "Jimmaa", 175, "/cities/jimma.jpg"),
    city("adama", "Adama", "አዳማ", "Adaamaa", 290, "/cities/adama.jpg"),
    city("harar", "Harar", "ሐረር", "Harar", 120, "/cities/harar.jpg"),
    city("dessie", "Dessie", "ደሴ", "Dassee", 150, "/cities/dessie.jpg"),
];

pub fn cities() -> &'static [City] {
    &CITIES
}

pub fn city_by_id(id: &str) -> Option<&'static City> {
    CITIES.iter().find(|city| city.id == id)
}

/// Cities promoted on the landing page.
pub fn featured_cities() -> &'static [City] {
    &CITIES[..6]
}

pub fn total_house_count() -> u32 {
    CITIES.iter().map(|city| city.house_count).sum()
}

/// Display label for a listing's city: catalog name when known, the free text otherwise.
pub fn city_label(value: &str, language: Language) -> String {
    match city_by_id(value) {
        Some(city) => city.display_name(language).to_string(),
        None => value.to_string(),
    }
}

/// Neighborhood qualities an owner can attach to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnvironmentTag {
    Quiet,
    Safe,
    NearTransport,
    NearMarket,
    NearSchool,
}

impl EnvironmentTag {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Quiet,
            Self::Safe,
            Self::NearTransport,
            Self::NearMarket,
            Self::NearSchool,
        ]
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Safe => "safe",
            Self::NearTransport => "nearTransport",
            Self::NearMarket => "nearMarket",
            Self::NearSchool => "nearSchool",
        }
    }

    pub const fn label_key(self) -> &'static str {
        match self {
            Self::Quiet => "env.quiet",
            Self::Safe => "env.safe",
            Self::NearTransport => "env.nearTransport",
            Self::NearMarket => "env.nearMarket",
            Self::NearSchool => "env.nearSchool",
        }
    }

    pub fn label(self, language: Language) -> &'static str {
        i18n::resolve(self.label_key(), language)
    }
}

/// Serializable option row for pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvironmentOption {
    pub id: EnvironmentTag,
    pub label: &'static str,
}

pub fn environment_options(language: Language) -> Vec<EnvironmentOption> {
    EnvironmentTag::ordered()
        .into_iter()
        .map(|tag| EnvironmentOption {
            id: tag,
            label: tag.label(language),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup_and_featured_slice() {
        assert_eq!(cities().len(), 10);
        assert_eq!(featured_cities().len(), 6);
        let addis = city_by_id("addis-ababa").expect("addis present");
        assert_eq!(addis.display_name(Language::Om), "Finfinnee");
        assert!(city_by_id("nairobi").is_none());
    }

    #[test]
    fn total_house_count_sums_display_counts() {
        assert_eq!(total_house_count(), 3425);
    }

    #[test]
    fn custom_city_label_passes_through() {
        assert_eq!(city_label("Debre Birhan", Language::Am), "Debre Birhan");
        assert_eq!(city_label("harar", Language::Am), "ሐረር");
    }

    #[test]
    fn environment_tags_use_camel_case_ids_and_translated_labels() {
        let encoded = serde_json::to_string(&EnvironmentTag::NearTransport).expect("encodes");
        assert_eq!(encoded, "\"nearTransport\"");
        for tag in EnvironmentTag::ordered() {
            assert!(i18n::contains_key(tag.label_key()));
            assert_eq!(encoded.contains(tag.id()), tag == EnvironmentTag::NearTransport);
        }
        assert_eq!(EnvironmentTag::Safe.label(Language::Am), "ደህንነቱ የተጠበቀ");
    }
}
