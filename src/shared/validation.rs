use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slugs
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "summer-sale", "shoes", "t-shirts-2024"
    /// - Invalid: "-shoes", "shoes-", "summer--sale", "Shoes", "t_shirts"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for validating language codes (ISO 639-1 with optional region)
    /// - Valid: "en", "de", "pt_BR", "zh_Hans"
    /// - Invalid: "EN", "english", "en-US", "e"
    pub static ref LANGUAGE_CODE_REGEX: Regex =
        Regex::new(r"^[a-z]{2}(?:_[A-Z][A-Za-z]{1,3})?$").unwrap();
}

/// Returns true when `code` looks like a supported language code
pub fn is_language_code(code: &str) -> bool {
    LANGUAGE_CODE_REGEX.is_match(code)
}
