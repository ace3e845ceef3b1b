//! Terminal output decoration.
//!
//! The merge tool prefixes its progress lines with emoji when the terminal
//! supports it. The `--color never|always|auto` flag overrides detection;
//! `auto` honors `NO_COLOR` (https://no-color.org/), `CLICOLOR`,
//! `CLICOLOR_FORCE`, and `TERM=dumb` before asking the terminal itself.

use std::env;

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => color_support(),
        };
        Self { use_color }
    }

    /// Returns `emoji` when decorations are enabled, `plain` otherwise.
    pub fn emoji<'a>(&self, emoji: &'a str, plain: &'a str) -> &'a str {
        if self.use_color {
            emoji
        } else {
            plain
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

fn color_support() -> bool {
    let var_is = |name: &str, value: &str| env::var(name).as_deref() == Ok(value);

    // NO_COLOR wins even when set to an empty string
    if env::var_os("NO_COLOR").is_some() || var_is("CLICOLOR", "0") || var_is("TERM", "dumb") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| !v.is_empty() && v != "0") {
        return true;
    }

    console::Term::stdout().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides_detection() {
        assert!(OutputConfig::from_env_and_flag("always").use_color);
        assert!(!OutputConfig::from_env_and_flag("never").use_color);
        assert!(!OutputConfig::from_env_and_flag("NEVER").use_color);
    }

    #[test]
    fn test_emoji_respects_config() {
        let on = OutputConfig { use_color: true };
        let off = OutputConfig { use_color: false };
        assert_eq!(on.emoji("✅", "[OK]"), "✅");
        assert_eq!(off.emoji("✅", "[OK]"), "[OK]");
    }
}
