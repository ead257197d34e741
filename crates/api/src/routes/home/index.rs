use axum::response::Html;

/// Route listing served at the root path.
pub const AVAILABLE_ROUTES: [&str; 5] = [
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/2017-01-01",
    "/api/v1.0/2017-01-01/2017-01-10",
];

pub async fn index_handler() -> Html<String> {
    let mut page = String::from("Welcome to the Climate API!<br/>Available Routes:<br/>");
    page.push_str(&AVAILABLE_ROUTES.join("<br/>"));
    page.push_str("<br/>API docs: /docs");
    Html(page)
}
