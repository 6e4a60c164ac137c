//! Server-rendered dashboard page

use askama::Template;

use super::models::DashboardData;

const GOOGLE_AVATAR_SUFFIX: &str = "=s96-c";

/// Google profile pictures come sized at 96px; ask for a 100px variant.
pub fn display_picture_url(picture: &str) -> String {
    if picture.is_empty() || !picture.contains("googleusercontent.com") {
        return picture.to_string();
    }
    format!(
        "{}=s100",
        picture.strip_suffix(GOOGLE_AVATAR_SUFFIX).unwrap_or(picture)
    )
}

/// Dashboard page
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate<'a> {
    pub data: &'a DashboardData,
}

pub fn render_dashboard(data: &DashboardData) -> Result<String, askama::Error> {
    DashboardTemplate { data }.render()
}
