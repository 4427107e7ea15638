//! Terminal styles for human output.

use console::Style;

/// Palette used by [`crate::output::HumanOutput`].
pub struct MhpTheme {
    pub accent: Style,
    pub success: Style,
    pub error: Style,
    pub warning: Style,
    pub muted: Style,

    pub header: Style,
    pub label: Style,
    pub value: Style,
    pub switch_on: Style,
    pub switch_off: Style,
    pub level: Style,
    pub position: Style,
}

impl Default for MhpTheme {
    fn default() -> Self {
        Self {
            accent: Style::new().color256(33),
            success: Style::new().color256(42),
            error: Style::new().color256(203),
            warning: Style::new().color256(214),
            muted: Style::new().color256(245),
            header: Style::new().bold().color256(33),
            label: Style::new().dim(),
            value: Style::new().bold(),
            switch_on: Style::new().bold().color256(42),
            switch_off: Style::new().dim(),
            level: Style::new().bold().color256(214),
            position: Style::new().bold().color256(33),
        }
    }
}

impl MhpTheme {
    /// Same palette with styling forced off.
    pub fn plain() -> Self {
        let plain = |style: Style| style.force_styling(false);
        let theme = Self::default();
        Self {
            accent: plain(theme.accent),
            success: plain(theme.success),
            error: plain(theme.error),
            warning: plain(theme.warning),
            muted: plain(theme.muted),
            header: plain(theme.header),
            label: plain(theme.label),
            value: plain(theme.value),
            switch_on: plain(theme.switch_on),
            switch_off: plain(theme.switch_off),
            level: plain(theme.level),
            position: plain(theme.position),
        }
    }
}
