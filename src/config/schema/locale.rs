use super::Config;
use super::types::DEFAULT_LOCALE;
use crate::dialogue::SUPPORTED_LOCALES;

fn detect_system_locale() -> Option<String> {
    std::env::var("LANG")
        .or_else(|_| std::env::var("LC_MESSAGES"))
        .ok()
        .map(|lang| lang.trim().to_lowercase())
        .filter(|lang| !lang.is_empty())
}

/// Detect locale: `VOXPLAN_LANG` env -> config value -> system `LANG` -> `"es"`.
fn detect_locale(config_locale: &str) -> String {
    if let Ok(lang) = std::env::var("VOXPLAN_LANG") {
        let lang = lang.trim().to_lowercase();
        if !lang.is_empty() {
            return supported_or_default(&normalise_locale(&lang));
        }
    }

    if config_locale != DEFAULT_LOCALE && !config_locale.is_empty() {
        return supported_or_default(&normalise_locale(config_locale));
    }

    if let Some(system_locale) = detect_system_locale() {
        return supported_or_default(&normalise_locale(&system_locale));
    }

    DEFAULT_LOCALE.into()
}

/// Normalise `"es_ES.UTF-8"` -> `"es"`, `"en_US"` -> `"en"`, passthrough `"es"`.
fn normalise_locale(raw: &str) -> String {
    let base = raw.split('.').next().unwrap_or(raw);
    let lang = base.split(['_', '-']).next().unwrap_or(base);
    lang.to_lowercase()
}

fn supported_or_default(lang: &str) -> String {
    if SUPPORTED_LOCALES.contains(&lang) {
        lang.to_string()
    } else {
        DEFAULT_LOCALE.into()
    }
}

impl Config {
    pub fn resolved_locale(&self) -> String {
        detect_locale(&self.locale)
    }

    /// Detect locale from env -> config -> system, then set `rust_i18n::set_locale`.
    pub fn apply_locale(&self) -> String {
        let locale = self.resolved_locale();
        rust_i18n::set_locale(&locale);
        locale
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_env::with_env;
    use super::*;

    #[test]
    fn detect_locale_uses_expected_priority_order() {
        with_env(|env| {
            env.set("LANG", "en_GB.UTF-8")
                .set("LC_MESSAGES", "es_MX.UTF-8")
                .set("VOXPLAN_LANG", "en_US.UTF-8");
            assert_eq!(detect_locale("es"), "en");

            env.unset("VOXPLAN_LANG");
            assert_eq!(detect_locale("en"), "en");
            assert_eq!(detect_locale("es"), "en");

            env.unset("LANG");
            assert_eq!(detect_locale("es"), "es");

            env.unset("LC_MESSAGES");
            assert_eq!(detect_locale("es"), "es");
        });
    }

    #[test]
    fn unsupported_locales_fall_back_to_spanish() {
        with_env(|env| {
            env.set("VOXPLAN_LANG", "ja_JP.UTF-8");
            assert_eq!(detect_locale("en"), "es");
        });
    }

    #[test]
    fn normalise_locale_handles_common_formats() {
        assert_eq!(normalise_locale("es_ES.UTF-8"), "es");
        assert_eq!(normalise_locale("en_US"), "en");
        assert_eq!(normalise_locale("en-GB"), "en");
        assert_eq!(normalise_locale("ES"), "es");
        assert_eq!(normalise_locale(""), "");
    }
}
