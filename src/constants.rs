/// Shared constants for the Eventim source and the local events API.

// Listing source
pub const EVENTIM_LISTING_URL: &str =
    "https://public-api.eventim.com/websearch/search/api/exploration/v2/productGroups";
pub const EVENTIM_WEB_ID: &str = "web__eventim-svn";
pub const EVENTIM_LANGUAGE: &str = "sl";
pub const EVENTIM_RETAIL_PARTNER: &str = "SIB";

// Local events API
pub const API_BASE_URL: &str = "http://localhost:3000";
pub const EVENTS_PATH: &str = "/dogodki";
pub const REGISTER_PATH: &str = "/users/register";
pub const LOGIN_PATH: &str = "/users/login";

// Persisted state, relative to the working directory
pub const PROCESSED_EVENTS_FILE: &str = "processed_events.txt";
pub const ORGANIZERS_FILE: &str = "organizer_list.txt";
pub const LEDGER_DB_FILE: &str = "ledger.db";
pub const TEMP_IMAGE_DIR: &str = "temp_images";

pub const HTTP_TIMEOUT_SECONDS: u64 = 30;

// Text sent to the API when a detail page lacks the field
pub const PRICE_NOT_FOUND: &str = "Price not found";
pub const DESCRIPTION_NOT_FOUND: &str = "Description not found";
pub const DEFAULT_ORGANIZER: &str = "Event Organizer";

// Organizer registration
pub const ORGANIZER_EMAIL_DOMAIN: &str = "gmail.com";
pub const ORGANIZER_PASSWORD: &str = "123123";
pub const ORGANIZER_USER_TYPE: &str = "Organizator";
pub const ORGANIZER_LAST_NAME_FALLBACK: &str = "Organization";
/// Error text the API returns when the email is already registered
pub const EMAIL_EXISTS_MARKER: &str = "E-pošta že obstaja";

pub const DEFAULT_IMAGE_EXTENSION: &str = ".png";

/// Browser-like headers sent with every request to the listing source
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("user-agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, Gecko) Chrome/136.0.0.0 Safari/537.36"),
    ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8"),
    ("accept-language", "en-GB,en;q=0.9"),
    ("sec-ch-ua", "\"Chromium\";v=\"136\", \"Brave\";v=\"136\", \"Not.A/Brand\";v=\"99\""),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "same-origin"),
    ("sec-gpc", "1"),
    ("upgrade-insecure-requests", "1"),
];
