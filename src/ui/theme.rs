use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles used by the status helpers. Every style is plain when
/// colors are off.
#[derive(Debug, Clone)]
pub struct Theme {
    pub heading: Style,
    pub ok: Style,
    pub error: Style,
    pub warn: Style,
    pub accent: Style,
    pub dim: Style,
}

impl Theme {
    pub fn new(colored: bool) -> Self {
        let pick = |style: Style| if colored { style } else { Style::new() };
        Self {
            heading: pick(Style::new().green().bold()),
            ok: pick(Style::new().green()),
            error: pick(Style::new().red().bold()),
            warn: pick(Style::new().yellow()),
            accent: pick(Style::new().blue()),
            dim: pick(Style::new().dimmed()),
        }
    }
}

/// Colors on a terminal unless `NO_COLOR` is set
fn colors_enabled() -> bool {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    !no_color && console::Term::stdout().is_term()
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(|| Theme::new(colors_enabled()))
}
