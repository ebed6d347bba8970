use anyhow::{Context, Result};
use mdpress_core::PreviewOptions;
use mdpress_export::{PrintOptions, SheetOptions, Theme, WordOptions};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "MDPRESS_CONFIG";
const DEFAULT_FILE: &str = "mdpress.toml";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub preview: PreviewConfig,
    pub word: WordConfig,
    pub print: PrintConfig,
    pub sheet: SheetConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PreviewConfig {
    pub sanitize: Option<bool>,
    pub filter_input: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct WordConfig {
    pub title: Option<String>,
    pub font_family: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PrintConfig {
    pub title: Option<String>,
    pub page_size: Option<String>,
    pub margin: Option<String>,
    pub highlight_code: Option<bool>,
    pub theme: Option<Theme>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SheetConfig {
    pub sheet_name: Option<String>,
    pub font_name: Option<String>,
    pub font_size: Option<u32>,
    pub min_width: Option<usize>,
    pub max_width: Option<usize>,
}

impl Config {
    /// `--config` first, then `$MDPRESS_CONFIG`, then `./mdpress.toml` if present.
    ///
    /// An explicitly named file must exist and parse; the implicit one only has to parse.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
        if let Some(path) = named {
            return Self::load(&path);
        }
        let local = Path::new(DEFAULT_FILE);
        if local.is_file() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn preview_options(&self) -> PreviewOptions {
        let mut options = PreviewOptions::default();
        if let Some(sanitize) = self.preview.sanitize {
            options.sanitize = sanitize;
        }
        if let Some(filter_input) = self.preview.filter_input {
            options.filter_input = filter_input;
        }
        options
    }

    pub fn word_options(&self) -> WordOptions {
        let mut options = WordOptions::default();
        if let Some(title) = &self.word.title {
            options.title = title.clone();
        }
        if let Some(font_family) = &self.word.font_family {
            options.font_family = font_family.clone();
        }
        options
    }

    pub fn print_options(&self) -> PrintOptions {
        let print = &self.print;
        let defaults = PrintOptions::default();
        PrintOptions {
            title: print.title.clone().unwrap_or(defaults.title),
            page_size: print.page_size.clone().unwrap_or(defaults.page_size),
            margin: print.margin.clone().unwrap_or(defaults.margin),
            highlight_code: print.highlight_code.unwrap_or(defaults.highlight_code),
            theme: print.theme.unwrap_or(defaults.theme),
        }
    }

    pub fn sheet_options(&self) -> SheetOptions {
        let sheet = &self.sheet;
        let defaults = SheetOptions::default();
        SheetOptions {
            sheet_name: sheet.sheet_name.clone().unwrap_or(defaults.sheet_name),
            font_name: sheet.font_name.clone().unwrap_or(defaults.font_name),
            font_size: sheet.font_size.unwrap_or(defaults.font_size),
            min_width: sheet.min_width.unwrap_or(defaults.min_width),
            max_width: sheet.max_width.unwrap_or(defaults.max_width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use mdpress_export::Theme;

    #[test]
    fn empty_config_uses_library_defaults() {
        let config: Config = toml::from_str("").expect("parse");
        assert_eq!(config.word_options(), Default::default());
        assert_eq!(config.print_options(), Default::default());
        assert_eq!(config.sheet_options(), Default::default());
        assert_eq!(config.preview_options(), Default::default());
    }

    #[test]
    fn sections_override_single_fields() {
        let config: Config = toml::from_str(
            "[word]\ntitle = \"Quarterly\"\n\n[print]\ntheme = \"dark\"\nmargin = \"1in\"\n\n\
             [sheet]\nmax_width = 40\n\n[preview]\nsanitize = false\n",
        )
        .expect("parse");
        assert_eq!(config.word_options().title, "Quarterly");
        assert!(config.word_options().font_family.contains("Microsoft YaHei"));
        assert_eq!(config.print_options().theme, Theme::Dark);
        assert_eq!(config.print_options().margin, "1in");
        assert_eq!(config.print_options().page_size, "A4");
        assert_eq!(config.sheet_options().max_width, 40);
        assert_eq!(config.sheet_options().min_width, 10);
        assert!(!config.preview_options().sanitize);
        assert!(config.preview_options().filter_input);
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(toml::from_str::<Config>("[sheet]\nfont_size = \"big\"\n").is_err());
    }
}
