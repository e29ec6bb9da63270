//! Fixed service endpoints.

/// Base URL of the presentation backend.
pub const BASE_API_URL: &str = "https://alai-standalone-backend.getalai.com";

/// Password-grant token endpoint.
pub const AUTH_URL: &str = "https://api.getalai.com/auth/v1/token?grant_type=password";

/// Outline generation WebSocket.
pub const OUTLINE_WS: &str =
    "wss://alai-standalone-backend.getalai.com/ws/generate-slides-outline";

/// Outline-to-slide conversion WebSocket.
pub const CREATE_SLIDES_WS: &str =
    "wss://alai-standalone-backend.getalai.com/ws/create-slides-from-outlines";

/// Per-slide variant generation WebSocket.
pub const SLIDE_VARIANTS_WS: &str =
    "wss://alai-standalone-backend.getalai.com/ws/create-and-stream-slide-variants";

/// Public viewer; share codes and presentation ids are appended.
pub const VIEW_URL: &str = "https://app.getalai.com/view";

/// Firecrawl scrape endpoint.
pub const FIRECRAWL_SCRAPE_URL: &str = "https://api.firecrawl.dev/v1/scrape";

/// Build a backend URL from a path such as `/get-presentations-list`.
pub fn api_url(path: &str) -> String {
    format!("{}{}", BASE_API_URL, path)
}

/// Viewer link for a share code (or, as a fallback, a presentation id).
pub fn view_link(code: &str) -> String {
    format!("{}/{}", VIEW_URL, code)
}
