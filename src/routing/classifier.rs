//! Maps a request path onto the strategy that will answer it.
//!
//! Classification is a pure function of the path. The `/movie` prefix wins
//! over any extension; after that the extension picks from two closed sets
//! and everything else is `NotFound`.

use std::fmt;

/// Prefix of the movie lookup route.
pub const MOVIE_PREFIX: &str = "/movie";

/// Text assets served verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextExtension {
    Html,
    Js,
    Css,
}

/// Image assets served after re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageExtension {
    Png,
    Jpg,
    Ico,
}

/// How a request will be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceDecision {
    /// Look the title up and render it as an HTML fragment
    ApiProxy { title: String },
    /// Serve a text asset; `path` is `/` for the generated search page
    TextStatic { path: String, extension: TextExtension },
    /// Serve an image asset in the requested format
    ImageStatic { path: String, extension: ImageExtension },
    NotFound,
}

impl TextExtension {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "html" => Some(TextExtension::Html),
            "js" => Some(TextExtension::Js),
            "css" => Some(TextExtension::Css),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextExtension::Html => "html",
            TextExtension::Js => "js",
            TextExtension::Css => "css",
        }
    }

    /// `text/<extension>`; `js` yields `text/js`.
    pub fn content_type(&self) -> String {
        format!("text/{}", self.as_str())
    }
}

impl ImageExtension {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(ImageExtension::Png),
            "jpg" => Some(ImageExtension::Jpg),
            "ico" => Some(ImageExtension::Ico),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageExtension::Png => "png",
            ImageExtension::Jpg => "jpg",
            ImageExtension::Ico => "ico",
        }
    }

    pub fn content_type(&self) -> String {
        format!("image/{}", self.as_str())
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            ImageExtension::Png => image::ImageFormat::Png,
            ImageExtension::Jpg => image::ImageFormat::Jpeg,
            ImageExtension::Ico => image::ImageFormat::Ico,
        }
    }
}

impl fmt::Display for TextExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a raw request path (query string included).
///
/// # Example
///
/// ```
/// # use reelserve::routing::classifier::{classify, ImageExtension, ResourceDecision};
/// assert_eq!(
///     classify("/logo.png"),
///     ResourceDecision::ImageStatic { path: "/logo.png".into(), extension: ImageExtension::Png },
/// );
/// assert_eq!(classify("/notes.txt"), ResourceDecision::NotFound);
/// ```
pub fn classify(path: &str) -> ResourceDecision {
    if path.starts_with(MOVIE_PREFIX) {
        return match movie_title(path) {
            Some(title) => ResourceDecision::ApiProxy { title },
            None => ResourceDecision::NotFound,
        };
    }

    let resource = strip_query(path);
    let extension = file_extension(resource);

    if extension.is_empty() {
        return ResourceDecision::TextStatic {
            path: resource.to_string(),
            extension: TextExtension::Html,
        };
    }

    if let Some(extension) = TextExtension::from_extension(&extension) {
        return ResourceDecision::TextStatic {
            path: resource.to_string(),
            extension,
        };
    }

    if let Some(extension) = ImageExtension::from_extension(&extension) {
        return ResourceDecision::ImageStatic {
            path: resource.to_string(),
            extension,
        };
    }

    ResourceDecision::NotFound
}

/// Everything after the first `=`, percent-decoded.
///
/// `None` when there is no `=`, the title is empty, or it does not decode
/// to UTF-8.
fn movie_title(path: &str) -> Option<String> {
    let (_, raw) = path.split_once('=')?;
    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode(&spaced).ok()?;
    let title = decoded.trim();

    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

fn strip_query(path: &str) -> &str {
    match path.find(['?', '#']) {
        Some(end) => &path[..end],
        None => path,
    }
}

/// Lowercased text after the last `.` of the final path segment.
fn file_extension(path: &str) -> String {
    let segment = path.rsplit('/').next().unwrap_or(path);

    segment
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}
