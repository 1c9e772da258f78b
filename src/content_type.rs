/// A value for the `content-type` header.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialOrd, PartialEq)]
pub enum ContentType {
    Css,
    Csv,
    FormUrlEncoded,
    Gif,
    Html,
    JavaScript,
    Jpeg,
    Json,
    Markdown,
    None,
    OctetStream,
    Pdf,
    PlainText,
    Png,
    Svg,
    Str(&'static str),
    String(String),
}
impl ContentType {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.split(';').next().map(str::trim) {
            Some("text/css") => ContentType::Css,
            Some("text/csv") => ContentType::Csv,
            Some("application/x-www-form-urlencoded") => ContentType::FormUrlEncoded,
            Some("image/gif") => ContentType::Gif,
            Some("text/html") => ContentType::Html,
            Some("text/javascript") => ContentType::JavaScript,
            Some("image/jpeg") => ContentType::Jpeg,
            Some("application/json") => ContentType::Json,
            Some("text/markdown") => ContentType::Markdown,
            Some("") => ContentType::None,
            Some("application/octet-stream") => ContentType::OctetStream,
            Some("application/pdf") => ContentType::Pdf,
            Some("text/plain") => ContentType::PlainText,
            Some("image/png") => ContentType::Png,
            Some("image/svg+xml") => ContentType::Svg,
            _ => ContentType::String(s.to_string()),
        }
    }

    /// Guesses the content type of a file from its name, for the
    /// best-effort probe the file plugin performs.  Unknown or missing
    /// extensions are not an error; they yield `None`.
    #[must_use]
    pub fn from_file_extension(filename: &str) -> Option<Self> {
        let extension = filename.rsplit_once('.')?.1;
        match extension.to_ascii_lowercase().as_str() {
            "css" => Some(ContentType::Css),
            "csv" => Some(ContentType::Csv),
            "gif" => Some(ContentType::Gif),
            "htm" | "html" => Some(ContentType::Html),
            "js" | "mjs" => Some(ContentType::JavaScript),
            "jpg" | "jpeg" => Some(ContentType::Jpeg),
            "json" => Some(ContentType::Json),
            "md" | "markdown" => Some(ContentType::Markdown),
            "pdf" => Some(ContentType::Pdf),
            "txt" => Some(ContentType::PlainText),
            "png" => Some(ContentType::Png),
            "svg" => Some(ContentType::Svg),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Css => "text/css; charset=UTF-8",
            ContentType::Csv => "text/csv; charset=UTF-8",
            ContentType::FormUrlEncoded => "application/x-www-form-urlencoded; charset=UTF-8",
            ContentType::Gif => "image/gif",
            ContentType::Html => "text/html; charset=UTF-8",
            ContentType::JavaScript => "text/javascript; charset=UTF-8",
            ContentType::Jpeg => "image/jpeg",
            ContentType::Json => "application/json; charset=UTF-8",
            ContentType::Markdown => "text/markdown; charset=UTF-8",
            ContentType::None => "",
            ContentType::OctetStream => "application/octet-stream",
            ContentType::Pdf => "application/pdf",
            ContentType::PlainText => "text/plain; charset=UTF-8",
            ContentType::Png => "image/png",
            ContentType::Svg => "image/svg+xml; charset=UTF-8",
            ContentType::Str(s) => s,
            ContentType::String(s) => s,
        }
    }
}
impl AsRef<str> for ContentType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
impl From<String> for ContentType {
    fn from(s: String) -> Self {
        ContentType::parse(&s)
    }
}
impl From<&'static str> for ContentType {
    fn from(s: &'static str) -> Self {
        ContentType::Str(s)
    }
}
