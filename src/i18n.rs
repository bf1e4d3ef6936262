use actix_web::HttpRequest;
use derive_more::derive::Display;

/// The three content languages every course and instructor document carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Language {
    #[display("hy")]
    Hy,
    #[display("ru")]
    Ru,
    #[display("en")]
    En,
}

impl Language {
    /// Armenian is the site's primary content language.
    pub const DEFAULT: Language = Language::Hy;

    pub fn from_code(code: &str) -> Option<Language> {
        match code {
            "hy" => Some(Language::Hy),
            "ru" => Some(Language::Ru),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    /// Reads the `language` request header. Missing or unsupported values
    /// fall back to the default rather than failing the read.
    pub fn from_request(req: &HttpRequest) -> Language {
        req.headers()
            .get("language")
            .and_then(|value| value.to_str().ok())
            .and_then(Language::from_code)
            .unwrap_or(Language::DEFAULT)
    }
}
