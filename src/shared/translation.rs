//! Language selection for translatable entities.

/// A per-language row of a translatable entity
pub trait Localized {
    fn language_code(&self) -> &str;
}

/// Pick the translation to present for `requested`.
///
/// Order: exact match, then `fallback` (the channel default language), then
/// the first translation available.
pub fn select_translation<'a, T: Localized>(
    translations: &'a [T],
    requested: &str,
    fallback: &str,
) -> Option<&'a T> {
    translations
        .iter()
        .find(|t| t.language_code() == requested)
        .or_else(|| translations.iter().find(|t| t.language_code() == fallback))
        .or_else(|| translations.first())
}
