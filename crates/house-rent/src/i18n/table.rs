use super::LocalizedText;

const fn text(en: &'static str, am: &'static str, om: &'static str) -> LocalizedText {
    LocalizedText { en, am, om }
}

pub(super) static TRANSLATIONS: &[(&str, LocalizedText)] = &[
    // navigation
    ("nav.home", text("Home", "መነሻ", "Mana")),
    ("nav.browse", text("Browse Houses", "ቤቶችን ፈልግ", "Manneen Barbaadi")),
    ("nav.cities", text("Cities", "ከተሞች", "Magaalota")),
    ("nav.addListing", text("Add Listing", "ዝርዝር ጨምር", "Galmeessi")),
    ("nav.myListings", text("My Listings", "የኔ ዝርዝሮች", "Galmeewwan Koo")),
    (
        "nav.adminDashboard",
        text("Admin Dashboard", "አስተዳዳሪ ዳሽቦርድ", "Daashboordii Bulchiinsaa"),
    ),
    ("nav.profile", text("Profile", "መገለጫ", "Eenyummaa")),
    ("nav.settings", text("Settings", "ቅንብሮች", "Qindaa'ina")),
    ("nav.login", text("Login", "ግባ", "Seeni")),
    ("nav.register", text("Register", "ተመዝገብ", "Galmaa'i")),
    ("nav.logout", text("Logout", "ውጣ", "Ba'i")),
    // hero
    (
        "hero.title",
        text(
            "Find Your Perfect Home in Ethiopia",
            "በኢትዮጵያ ውስጥ ፍጹም ቤትዎን ያግኙ",
            "Mana Kee Mudaa Itoophiyaa Keessatti Argadhu",
        ),
    ),
    (
        "hero.subtitle",
        text(
            "Connect directly with house owners. No brokers, no hidden fees.",
            "ከቤት ባለቤቶች ጋር በቀጥታ ይገናኙ። ደላላ የለም፣ የተደበቀ ክፍያ የለም።",
            "Abbaa manaa waliin kallattiin wal qunnamaa. Dallaalli hin jiru, kaffaltii dhokfamaa hin jiru.",
        ),
    ),
    (
        "hero.searchPlaceholder",
        text(
            "Search by city, neighborhood...",
            "በከተማ፣ በሰፈር ይፈልጉ...",
            "Magaalaa, ollaa barbaadi...",
        ),
    ),
    ("hero.search", text("Search", "ፈልግ", "Barbaadi")),
    // cities
    (
        "cities.title",
        text("Browse by City", "በከተማ ይፈልጉ", "Magaalaadhaan Barbaadi"),
    ),
    (
        "cities.viewAll",
        text("View All Cities", "ሁሉንም ከተሞች ይመልከቱ", "Magaalota Hunda Ilaali"),
    ),
    // houses
    (
        "houses.featured",
        text("Featured Houses", "ተለይተው የቀረቡ ቤቶች", "Manneen Addaa"),
    ),
    (
        "houses.recent",
        text("Recently Added", "በቅርብ የተጨመሩ", "Dhiyeenya Dabalaman"),
    ),
    ("houses.perMonth", text("/month", "/ወር", "/ji'a")),
    ("houses.rooms", text("Rooms", "ክፍሎች", "Kutaalee")),
    (
        "houses.viewDetails",
        text("View Details", "ዝርዝሮችን ይመልከቱ", "Bal'inaan Ilaali"),
    ),
    (
        "houses.contactOwner",
        text("Contact Owner", "ባለቤቱን ያግኙ", "Abbaa Manaa Quunnami"),
    ),
    // status
    ("status.pending", text("Pending", "በመጠባበቅ ላይ", "Eegamaa")),
    ("status.approved", text("Approved", "ጸድቋል", "Mirkanaa'e")),
    ("status.rejected", text("Rejected", "ተቀባይነት አላገኘም", "Dhiifame")),
    // actions
    ("action.improve", text("Improve with AI", "በ AI ያሻሽሉ", "AI'n Fooyyessi")),
    ("action.submit", text("Submit", "አስገባ", "Galchi")),
    ("action.cancel", text("Cancel", "ሰርዝ", "Haqi")),
    ("action.edit", text("Edit", "አርትዕ", "Gulaali")),
    ("action.delete", text("Delete", "ሰርዝ", "Haqi")),
    ("action.approve", text("Approve", "አጽድቅ", "Mirkaneessi")),
    ("action.reject", text("Reject", "አትቀበል", "Dhiisi")),
    (
        "action.report",
        text("Report Listing", "ዝርዝሩን ሪፖርት አድርግ", "Galmeessa Gabaasi"),
    ),
    // form labels
    ("form.title", text("Title", "ርዕስ", "Mata Duree")),
    ("form.city", text("City", "ከተማ", "Magaalaa")),
    (
        "form.area",
        text("Area / Neighborhood", "አካባቢ / ሰፈር", "Naannoo / Ollaa"),
    ),
    (
        "form.price",
        text("Monthly Price (ETB)", "ወርሃዊ ዋጋ (ብር)", "Gatii Ji'aa (ETB)"),
    ),
    (
        "form.rooms",
        text("Number of Rooms", "የክፍሎች ብዛት", "Lakkoofsa Kutaalee"),
    ),
    (
        "form.maxPeople",
        text("Max People", "ከፍተኛ ሰዎች", "Namoota Hanga Daangaa"),
    ),
    ("form.environment", text("Environment", "አካባቢ", "Haala Naannoo")),
    ("form.description", text("Description", "መግለጫ", "Ibsa")),
    (
        "form.phone",
        text("Phone Number", "ስልክ ቁጥር", "Lakkoofsa Bilbilaa"),
    ),
    (
        "form.images",
        text("Upload Images", "ምስሎችን ያስገቡ", "Suuraalee Galchi"),
    ),
    // environment options
    ("env.quiet", text("Quiet", "ጸጥ ያለ", "Callisaa")),
    ("env.safe", text("Safe", "ደህንነቱ የተጠበቀ", "Nageenya")),
    (
        "env.nearTransport",
        text("Near Transport", "ለትራንስፖርት ቅርብ", "Geejjiba Dhihoo"),
    ),
    ("env.nearMarket", text("Near Market", "ለገበያ ቅርብ", "Gabaa Dhihoo")),
    (
        "env.nearSchool",
        text("Near School", "ለትምህርት ቤት ቅርብ", "Mana Barumsaa Dhihoo"),
    ),
    // misc
    (
        "app.name",
        text("HouseRent Connect", "HouseRent Connect", "HouseRent Connect"),
    ),
    (
        "app.tagline",
        text(
            "Ethiopian House Rental Platform",
            "የኢትዮጵያ ቤት ኪራይ መድረክ",
            "Waltajjii Kireeffannaa Manaa Itoophiyaa",
        ),
    ),
    ("theme.light", text("Light", "ብርሃን", "Ifaa")),
    ("theme.dark", text("Dark", "ጨለማ", "Dukkana")),
    ("language", text("Language", "ቋንቋ", "Afaan")),
    (
        "filter.priceRange",
        text("Price Range", "የዋጋ ክልል", "Sadarkaa Gatii"),
    ),
    ("filter.minPrice", text("Min Price", "ዝቅተኛ ዋጋ", "Gatii Xiqqaa")),
    ("filter.maxPrice", text("Max Price", "ከፍተኛ ዋጋ", "Gatii Guddaa")),
];
