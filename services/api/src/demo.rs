use crate::infra::Platform;
use chrono::{Duration, Utc};
use clap::Args;
use house_rent::config::AppConfig;
use house_rent::error::AppError;
use house_rent::i18n::{Language, Translator};
use house_rent::listings::{
    BrowseQuery, CityChoice, Listing, ListingCard, ListingFilter, ListingStatus, ListingSubmission,
    OwnerListingsView,
};
use house_rent::moderation::AdminDashboard;
use house_rent::navigation::{self, MenuEntry};
use house_rent::session::{Role, SessionSnapshot};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Display language for labels (en, am, om).
    #[arg(long, default_value = "en")]
    pub(crate) lang: Language,
    /// Catalog city id to browse, e.g. addis-ababa.
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Exact room count to browse, or "all".
    #[arg(long)]
    pub(crate) rooms: Option<String>,
    /// Ask the configured assistant to review the first pending listing.
    #[arg(long)]
    pub(crate) review: bool,
}

struct SampleHouse {
    title: &'static str,
    city: &'static str,
    area: &'static str,
    price: u64,
    rooms: u32,
    max_people: u32,
    environment: &'static [&'static str],
    description: &'static str,
    images: &'static [&'static str],
    phone: &'static str,
    approved: bool,
    age_days: i64,
}

const SAMPLE_HOUSES: [SampleHouse; 6] = [
    SampleHouse {
        title: "Modern 2BR Apartment in Bole",
        city: "addis-ababa",
        area: "Bole",
        price: 18_000,
        rooms: 2,
        max_people: 4,
        environment: &["quiet", "safe", "nearTransport"],
        description: "Bright apartment with city views, close to the airport and shopping centers. 24/7 security and parking.",
        images: &["/houses/house1.jpg", "/houses/house1-2.jpg"],
        phone: "+251911234567",
        approved: true,
        age_days: 14,
    },
    SampleHouse {
        title: "Cozy Studio near CMC",
        city: "addis-ababa",
        area: "CMC",
        price: 8_500,
        rooms: 1,
        max_people: 2,
        environment: &["quiet", "nearMarket"],
        description: "Compact studio for students or young professionals, walking distance to transport and local markets.",
        images: &["/houses/house2.jpg"],
        phone: "+251922345678",
        approved: true,
        age_days: 11,
    },
    SampleHouse {
        title: "Spacious 3BR Family House",
        city: "hawassa",
        area: "Tabor",
        price: 12_000,
        rooms: 3,
        max_people: 6,
        environment: &["quiet", "safe", "nearSchool"],
        description: "Family home near Lake Hawassa with a garden, three bedrooms and two bathrooms.",
        images: &["/houses/house3.jpg", "/houses/house3-2.jpg", "/houses/house3-3.jpg"],
        phone: "+251933456789",
        approved: true,
        age_days: 9,
    },
    SampleHouse {
        title: "Luxury Villa with Pool",
        city: "addis-ababa",
        area: "Old Airport",
        price: 45_000,
        rooms: 5,
        max_people: 10,
        environment: &["quiet", "safe"],
        description: "Villa with private pool and garden, five bedrooms, modern kitchen and servant quarters.",
        images: &["/houses/house4.jpg"],
        phone: "+251944567890",
        approved: true,
        age_days: 7,
    },
    SampleHouse {
        title: "Budget-Friendly Room in Piassa",
        city: "addis-ababa",
        area: "Piassa",
        price: 4_500,
        rooms: 1,
        max_people: 2,
        environment: &["nearTransport", "nearMarket"],
        description: "Affordable room in historic Piassa with a shared bathroom, right in the city center.",
        images: &["/houses/house5.jpg"],
        phone: "+251955678901",
        approved: false,
        age_days: 4,
    },
    SampleHouse {
        title: "Lake View Apartment",
        city: "bahir-dar",
        area: "Kebele 14",
        price: 15_000,
        rooms: 2,
        max_people: 4,
        environment: &["quiet", "safe"],
        description: "Apartment overlooking Lake Tana with a sunset balcony, two bedrooms and a modern kitchen.",
        images: &["/houses/house6.jpg"],
        phone: "+251966789012",
        approved: true,
        age_days: 1,
    },
];

fn submission(house: &SampleHouse) -> ListingSubmission {
    ListingSubmission {
        title: house.title.to_string(),
        city: CityChoice::Catalog(house.city.to_string()),
        area: house.area.to_string(),
        price: house.price,
        rooms: house.rooms,
        max_people: house.max_people,
        environment: house
            .environment
            .iter()
            .filter_map(|tag| serde_json::from_value(serde_json::Value::from(*tag)).ok())
            .collect(),
        description: house.description.to_string(),
        images: house.images.iter().map(|url| url.to_string()).collect(),
        phone: house.phone.to_string(),
        availability_duration: Some(90),
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        lang,
        city,
        rooms,
        review,
    } = args;

    let config = AppConfig::load()?;
    let platform = Platform::build(&config);
    let translator = Translator::new(lang);
    let now = Utc::now();

    println!("HouseRent Connect demo ({})", lang.native_name());

    let owner = match register(
        &platform,
        "abebe@houserent.et",
        "Abebe Kebede",
        Role::Owner,
    )
    .await
    {
        Some(session) => session,
        None => return Ok(()),
    };
    let admin = match register(
        &platform,
        "admin@houserent.et",
        "Marketplace Admin",
        Role::Admin,
    )
    .await
    {
        Some(session) => session,
        None => return Ok(()),
    };
    let Some(owner_identity) = owner.identity.clone() else {
        println!("  Owner session has no identity");
        return Ok(());
    };

    println!("\nSeeding sample listings");
    let mut seeded: Vec<Listing> = Vec::new();
    for house in &SAMPLE_HOUSES {
        let created_at = now - Duration::days(house.age_days);
        let listing = match platform
            .listings
            .submit(&owner_identity, submission(house), created_at)
            .await
        {
            Ok(listing) => listing,
            Err(err) => {
                println!("  Submission rejected for {}: {}", house.title, err);
                continue;
            }
        };

        let listing = if house.approved {
            match platform.moderation.approve(&listing.id, now).await {
                Ok(listing) => listing,
                Err(err) => {
                    println!("  Approval failed for {}: {}", listing.id, err);
                    listing
                }
            }
        } else {
            listing
        };
        println!(
            "- {} {} [{}]",
            listing.id,
            listing.title,
            translator.t(listing.status.label_key())
        );
        seeded.push(listing);
    }

    render_browse(&platform, &translator, city, rooms).await;

    match platform.listings.my_listings(&owner_identity.uid).await {
        Ok(subscription) => {
            let view = OwnerListingsView::build(&subscription.current(), now, &translator);
            println!(
                "\nMy listings for {}: {} total | {} pending | {} approved | {} rejected",
                owner_identity.public_name(),
                view.total,
                view.counts.pending,
                view.counts.approved,
                view.counts.rejected
            );
        }
        Err(err) => println!("\nMy listings unavailable: {}", err),
    }

    render_dashboard(&platform, &translator).await;

    println!("\nSidebar menus");
    for (label, session) in [
        ("anonymous", SessionSnapshot::anonymous()),
        ("owner", owner),
        ("admin", admin),
    ] {
        render_menu(label, &session, &translator);
    }

    if review {
        let pending = seeded
            .iter()
            .find(|listing| listing.status == ListingStatus::Pending);
        if let Some(listing) = pending {
            println!("\nAI review for {}", listing.title);
            match platform.moderation.review(&listing.id).await {
                Ok(text) => println!("{}", text),
                Err(err) => println!("  Review unavailable: {}", err),
            }
        }
    }

    Ok(())
}

async fn register(
    platform: &Platform,
    email: &str,
    name: &str,
    role: Role,
) -> Option<SessionSnapshot> {
    let context = platform.sessions.open();
    match context.register(email, "demo-password", name, role).await {
        Ok(snapshot) => {
            println!("- Registered {} as {}", email, role.label());
            Some(snapshot)
        }
        Err(err) => {
            println!("  Registration failed for {}: {}", email, err);
            None
        }
    }
}

async fn render_browse(
    platform: &Platform,
    translator: &Translator,
    city: Option<String>,
    rooms: Option<String>,
) {
    let query = BrowseQuery {
        city,
        rooms,
        ..BrowseQuery::default()
    };
    let filter = match ListingFilter::from_query(&query) {
        Ok(filter) => filter,
        Err(err) => {
            println!("\nBrowse filter rejected: {}", err);
            return;
        }
    };

    let now = Utc::now();
    match platform.listings.browse(&filter, now).await {
        Ok(listings) => {
            println!("\nBrowse ({} visible)", listings.len());
            for listing in &listings {
                let card = ListingCard::render(listing, now, translator);
                let tags: Vec<&str> = card.environment.iter().map(|option| option.label).collect();
                println!(
                    "- {} | {}, {} | {} ETB | {} rooms | {} | {} days left",
                    card.title,
                    card.area,
                    card.city_label,
                    card.price,
                    card.rooms,
                    tags.join(", "),
                    card.days_remaining.unwrap_or_default()
                );
            }
        }
        Err(err) => println!("\nBrowse unavailable: {}", err),
    }
}

async fn render_dashboard(platform: &Platform, translator: &Translator) {
    let listings = match platform.moderation.subscribe().await {
        Ok(subscription) => subscription.current(),
        Err(err) => {
            println!("\nAdmin dashboard unavailable: {}", err);
            return;
        }
    };
    let stats = match platform.moderation.stats(&listings).await {
        Ok(stats) => stats,
        Err(err) => {
            println!("\nAdmin dashboard unavailable: {}", err);
            return;
        }
    };

    let dashboard = AdminDashboard::build(&listings, stats, Utc::now(), translator);
    println!(
        "\nAdmin dashboard: {} listings | {} pending | {} approved | {} rejected | {} users",
        stats.total, stats.pending, stats.approved, stats.rejected, stats.users
    );
    println!("Pending review:");
    for card in &dashboard.pending_review {
        println!("  - {} ({}, {} ETB)", card.title, card.city_label, card.price);
    }
    println!(
        "Active listeners on the listings collection: {}",
        platform.store.active_listeners()
    );
}

fn render_menu(audience: &str, session: &SessionSnapshot, translator: &Translator) {
    let entries: Vec<String> = navigation::menu(session, translator)
        .into_iter()
        .filter_map(|entry| match entry {
            MenuEntry::Link { label, .. } => Some(label),
            MenuEntry::Divider => None,
        })
        .collect();
    println!("- {}: {}", audience, entries.join(" | "));
}
