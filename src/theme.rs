use catppuccin::PALETTE;
use ratatui::style::Color;

const fn rgb(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colors used across the UI, named by role.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    base: Color,
    surface: Color,
    overlay: Color,
    text: Color,
    subtext: Color,
    accent: Color,
    highlight: Color,
    key: Color,
    success: Color,
    warning: Color,
    error: Color,
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: rgb(&c.base),
            surface: rgb(&c.surface1),
            overlay: rgb(&c.overlay1),
            text: rgb(&c.text),
            subtext: rgb(&c.subtext0),
            accent: rgb(&c.mauve),
            highlight: rgb(&c.lavender),
            key: rgb(&c.peach),
            success: rgb(&c.green),
            warning: rgb(&c.yellow),
            error: rgb(&c.red),
        }
    }

    pub const fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    pub const fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    pub const fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    pub const fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    /// Background of popups.
    pub const fn base(&self) -> Color {
        self.base
    }

    /// Unfocused borders and separators.
    pub const fn border(&self) -> Color {
        self.surface
    }

    /// Placeholders and hints.
    pub const fn muted(&self) -> Color {
        self.overlay
    }

    pub const fn text(&self) -> Color {
        self.text
    }

    pub const fn subtext(&self) -> Color {
        self.subtext
    }

    /// Titles.
    pub const fn accent(&self) -> Color {
        self.accent
    }

    /// Focused borders and the selected row.
    pub const fn highlight(&self) -> Color {
        self.highlight
    }

    pub const fn selection_bg(&self) -> Color {
        self.surface
    }

    /// Key names in hints.
    pub const fn key(&self) -> Color {
        self.key
    }

    pub const fn success(&self) -> Color {
        self.success
    }

    pub const fn warning(&self) -> Color {
        self.warning
    }

    pub const fn error(&self) -> Color {
        self.error
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

/// Look up a theme by its display name, defaulting to Mocha.
pub fn theme_from_name(name: &str) -> Theme {
    match name {
        "Catppuccin Latte" => Theme::catppuccin_latte(),
        "Catppuccin Frappe" => Theme::catppuccin_frappe(),
        "Catppuccin Macchiato" => Theme::catppuccin_macchiato(),
        "Catppuccin Mocha" => Theme::catppuccin_mocha(),
        other => {
            tracing::warn!(theme = other, "Unknown theme, using Catppuccin Mocha");
            Theme::catppuccin_mocha()
        }
    }
}
