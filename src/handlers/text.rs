//! Text responses: the movie fragment, the search page and text assets.

use crate::assets::AssetStore;
use crate::error::Result;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::movie::{MovieClient, MovieRecord};
use crate::routing::classifier::TextExtension;

/// Declared type of the movie fragment. The body is HTML; the header is
/// kept for compatibility with existing clients.
pub const MOVIE_FRAGMENT_CONTENT_TYPE: &str = "text/json";

const SEARCH_PAGE: &str = include_str!("search_page.html");

pub async fn movie_fragment(movies: &MovieClient, title: &str) -> Result<Response> {
    let record = movies.fetch(title).await?;

    Ok(Response::ok(
        MOVIE_FRAGMENT_CONTENT_TYPE,
        render_movie(&record),
    ))
}

/// The self-contained page served for `/`.
pub fn search_page() -> Response {
    Response::ok("text/html", SEARCH_PAGE)
}

pub async fn static_text(
    assets: &AssetStore,
    path: &str,
    extension: TextExtension,
) -> Result<Response> {
    let content = assets.read_text(path).await?;
    tracing::debug!(path, bytes = content.len(), "Serving text asset");

    Ok(Response::ok(&extension.content_type(), content))
}

/// The fallback page: `400 Not Found` with the configured page as body.
pub async fn not_found_page(assets: &AssetStore, page: &str) -> Result<Response> {
    let content = assets.read_text(page).await?;

    Ok(ResponseBuilder::new(StatusCode::BadRequest)
        .reason("Not Found")
        .content_type("text/html")
        .body(content)
        .build())
}

/// Renders a record as a ready-to-inject HTML fragment.
pub fn render_movie(record: &MovieRecord) -> String {
    format!(
        concat!(
            "<div>",
            "<h2>{title}</h2>",
            "<h3> Year: {year}</h3>",
            "<p> Director: {director}</p>",
            "<p> Genre: {genre}</p>",
            "<p> Rating: {rated}</p>",
            "<p>{plot}</p>",
            "<img src=\"{poster}\"/>",
            "</div>\n",
        ),
        title = escape_html(&record.title),
        year = escape_html(&record.year),
        director = escape_html(&record.director),
        genre = escape_html(&record.genre),
        rated = escape_html(&record.rated),
        plot = escape_html(&record.plot),
        poster = escape_html(&record.poster),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
