//! Route table, role guard, and the role-dependent sidebar menu.

use serde::Serialize;

use crate::catalog;
use crate::i18n::Translator;
use crate::session::SessionSnapshot;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "kebab-case")]
pub enum Route {
    Home,
    Browse {
        #[serde(skip_serializing_if = "Option::is_none")]
        city: Option<String>,
    },
    Cities,
    AddListing,
    MyListings,
    Admin,
    Login,
    Register,
    NotFound,
}

/// Who may open a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Owner,
    Admin,
}

impl Route {
    /// Parses a path with an optional query string, e.g. `/browse?city=hawassa`.
    pub fn parse(target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        match path {
            "/" => Route::Home,
            "/browse" => Route::Browse {
                city: query_value(query, "city")
                    .filter(|city| !city.is_empty() && catalog::city_by_id(city).is_some()),
            },
            "/cities" => Route::Cities,
            "/add-listing" => Route::AddListing,
            "/my-listings" => Route::MyListings,
            "/admin" => Route::Admin,
            "/login" => Route::Login,
            "/register" => Route::Register,
            _ => Route::NotFound,
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::AddListing | Route::MyListings => Access::Owner,
            Route::Admin => Access::Admin,
            _ => Access::Public,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Browse { city: Some(city) } => format!("/browse?city={city}"),
            Route::Browse { city: None } => "/browse".to_string(),
            Route::Cities => "/cities".to_string(),
            Route::AddListing => "/add-listing".to_string(),
            Route::MyListings => "/my-listings".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::Register => "/register".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }
}

fn query_value(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum GuardOutcome {
    Granted,
    /// The session is still resolving its profile.
    Loading,
    Denied {
        #[serde(rename = "loginPath")]
        login_path: &'static str,
    },
}

pub fn guard(access: Access, session: &SessionSnapshot) -> GuardOutcome {
    match access {
        Access::Public => GuardOutcome::Granted,
        _ if session.loading => GuardOutcome::Loading,
        Access::Owner if session.is_logged_in() && session.is_owner() => GuardOutcome::Granted,
        Access::Admin if session.is_logged_in() && session.is_admin() => GuardOutcome::Granted,
        _ => GuardOutcome::Denied {
            login_path: LOGIN_PATH,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MenuEntry {
    Link {
        path: &'static str,
        #[serde(rename = "labelKey")]
        label_key: &'static str,
        label: String,
    },
    Divider,
}

fn link(path: &'static str, label_key: &'static str, translator: &Translator) -> MenuEntry {
    MenuEntry::Link {
        path,
        label_key,
        label: translator.t(label_key).to_string(),
    }
}

/// Sidebar entries for the given session, labelled in the translator's language.
pub fn menu(session: &SessionSnapshot, translator: &Translator) -> Vec<MenuEntry> {
    let mut entries = vec![
        link("/", "nav.home", translator),
        link("/browse", "nav.browse", translator),
        link("/cities", "nav.cities", translator),
    ];

    if session.is_logged_in() && session.is_owner() {
        entries.push(MenuEntry::Divider);
        entries.push(link("/add-listing", "nav.addListing", translator));
        entries.push(link("/my-listings", "nav.myListings", translator));
    }

    if session.is_admin() {
        entries.push(MenuEntry::Divider);
        entries.push(link("/admin", "nav.adminDashboard", translator));
    }

    entries
}
