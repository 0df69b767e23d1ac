//! Presentation state driven by the chat controller.
//!
//! Everything a view needs to draw besides the transcript: the resolved
//! theme and font-size attributes, modal visibility, the scroll lock that
//! accompanies an open modal, and whether sending is enabled.

use crate::persistence::{FontSize, Settings, Theme};

/// Blocking panels the controller can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Settings,
    /// Crisis-support resources.
    Crisis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// `Some("dark")` when the dark theme is in effect.
    pub data_theme: Option<&'static str>,
    /// Set for every size except the default `medium`.
    pub data_font_size: Option<FontSize>,
    /// Values shown in the settings panel.
    pub settings: Settings,
    pub settings_modal: bool,
    pub crisis_modal: bool,
    pub scroll_locked: bool,
    pub send_enabled: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            data_theme: None,
            data_font_size: None,
            settings: Settings::default(),
            settings_modal: false,
            crisis_modal: false,
            scroll_locked: false,
            send_enabled: true,
        }
    }
}

impl Document {
    /// Resolve `theme` against the system preference and set the attribute.
    pub fn apply_theme(&mut self, theme: Theme, prefers_dark: bool) {
        self.settings.theme = theme;
        self.data_theme = match theme {
            Theme::Dark => Some("dark"),
            Theme::Auto if prefers_dark => Some("dark"),
            Theme::Auto | Theme::LightDefault => None,
        };
    }

    pub fn apply_font_size(&mut self, size: FontSize) {
        self.settings.font_size = size;
        self.data_font_size = (size != FontSize::Medium).then_some(size);
    }

    pub fn is_dark(&self) -> bool {
        self.data_theme == Some("dark")
    }

    pub fn show(&mut self, modal: Modal) {
        *self.modal_flag(modal) = true;
        self.scroll_locked = true;
    }

    pub fn hide(&mut self, modal: Modal) {
        *self.modal_flag(modal) = false;
        self.scroll_locked = false;
    }

    pub fn is_visible(&self, modal: Modal) -> bool {
        match modal {
            Modal::Settings => self.settings_modal,
            Modal::Crisis => self.crisis_modal,
        }
    }

    fn modal_flag(&mut self, modal: Modal) -> &mut bool {
        match modal {
            Modal::Settings => &mut self.settings_modal,
            Modal::Crisis => &mut self.crisis_modal,
        }
    }
}

// ---------------------------------------------------------------------------
// System colour scheme
// ---------------------------------------------------------------------------

/// Source of the system dark/light preference.
pub trait ColorSchemeSource {
    fn prefers_dark(&self) -> bool;
}

/// Reads `MINDFUL_COLOR_SCHEME` (`dark`/`light`), then the terminal's
/// `COLORFGBG` background colour. Unknown means light.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvColorScheme;

impl ColorSchemeSource for EnvColorScheme {
    fn prefers_dark(&self) -> bool {
        scheme_from_vars(
            std::env::var("MINDFUL_COLOR_SCHEME").ok().as_deref(),
            std::env::var("COLORFGBG").ok().as_deref(),
        )
    }
}

/// A fixed preference.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedColorScheme(pub bool);

impl ColorSchemeSource for FixedColorScheme {
    fn prefers_dark(&self) -> bool {
        self.0
    }
}

fn scheme_from_vars(explicit: Option<&str>, colorfgbg: Option<&str>) -> bool {
    match explicit.map(str::to_ascii_lowercase).as_deref() {
        Some("dark") => return true,
        Some("light") => return false,
        _ => {}
    }

    // COLORFGBG is "fg;bg" or "fg;default;bg"; the background is last.
    colorfgbg
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg < 7 || bg == 8)
}
