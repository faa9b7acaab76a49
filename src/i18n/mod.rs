//! Internationalization (i18n) support
//!
//! User-facing text (banners, form labels, chart captions) lives in
//! `locales/*.yml`. Supported languages: English (en) and Spanish (es).
//!
//! Every message is looked up with an explicit locale, taken from
//! `ui.locale` in the configuration (`TENDENCIA_LANG` in the environment).
//!
//! # Usage
//!
//! ```rust,ignore
//! use tendencia::i18n::{t, normalize_locale};
//!
//! let locale = normalize_locale("es-MX");
//! let msg = t!("flow.no_data", locale = &locale);
//! ```

// Note: rust_i18n::i18n! macro is declared in lib.rs (crate root)

/// Normalize a locale code to a supported language
///
/// - es-ES, es_MX, spanish, español -> es
/// - anything else -> en
pub fn normalize_locale(locale: &str) -> &'static str {
    let lower = locale.trim().to_lowercase();

    if lower.starts_with("es") || lower == "spanish" || lower == "español" {
        "es"
    } else {
        "en"
    }
}

/// Translate a key with optional parameters
///
/// This is a re-export of rust_i18n::t! for convenience.
#[doc(inline)]
pub use rust_i18n::t;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("es"), "es");
        assert_eq!(normalize_locale("es-ES"), "es");
        assert_eq!(normalize_locale("es_MX"), "es");
        assert_eq!(normalize_locale("Spanish"), "es");

        assert_eq!(normalize_locale("en"), "en");
        assert_eq!(normalize_locale("en-US"), "en");
        assert_eq!(normalize_locale("fr"), "en");
        assert_eq!(normalize_locale(""), "en");
    }

    #[test]
    fn test_explicit_locale_translation() {
        assert_eq!(t!("chart.x_label", locale = "en"), "Date");
        assert_eq!(t!("chart.x_label", locale = "es"), "Fecha");
        assert_eq!(t!("flow.no_data", locale = "es"), "No se encontraron datos para esas palabras.");
    }

    #[test]
    fn test_interpolation() {
        let msg = t!("related.keyword", locale = "en", keyword = "sneakers");
        assert_eq!(msg, "Keyword: sneakers");
    }
}
