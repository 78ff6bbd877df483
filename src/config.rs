//! User configuration: keybindings and engine tunables.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/sticky-nav/config.toml` (default
//! `~/.config/sticky-nav/config.toml`).  Unknown keys and unparsable values
//! are ignored with a warning; missing ones keep their defaults.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::dom::style::{FlexDirection, Transition};
use crate::engine::easing::Easing;
use crate::engine::{Completion, EngineConfig};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    Top,
    Bottom,
    Replay,
    Quit,
}

impl Action {
    pub const ALL: &[Action] = &[
        Action::ScrollDown,
        Action::ScrollUp,
        Action::PageDown,
        Action::PageUp,
        Action::Top,
        Action::Bottom,
        Action::Replay,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollDown => "scroll_down",
            Action::ScrollUp => "scroll_up",
            Action::PageDown => "page_down",
            Action::PageUp => "page_up",
            Action::Top => "top",
            Action::Bottom => "bottom",
            Action::Replay => "replay",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// `pretty` picks arrows and short names for the status bar; otherwise
    /// the config-file spelling.
    fn render(&self, pretty: bool) -> String {
        let mut s = String::new();
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(flag) {
                s.push_str(name);
            }
        }
        let name = match (self.code, pretty) {
            (KeyCode::Char(' '), _) => "Space".into(),
            (KeyCode::Char(c), _) => c.to_string(),
            (KeyCode::Up, true) => "↑".into(),
            (KeyCode::Down, true) => "↓".into(),
            (KeyCode::PageUp, true) => "PgUp".into(),
            (KeyCode::PageDown, true) => "PgDn".into(),
            (KeyCode::Up, false) => "Up".into(),
            (KeyCode::Down, false) => "Down".into(),
            (KeyCode::PageUp, false) => "PageUp".into(),
            (KeyCode::PageDown, false) => "PageDown".into(),
            (KeyCode::Left, _) => "Left".into(),
            (KeyCode::Right, _) => "Right".into(),
            (KeyCode::Enter, _) => "Enter".into(),
            (KeyCode::Esc, _) => "Esc".into(),
            (KeyCode::Tab, _) => "Tab".into(),
            (KeyCode::Home, _) => "Home".into(),
            (KeyCode::End, _) => "End".into(),
            (KeyCode::F(n), _) => format!("F{n}"),
            (other, _) => format!("{other:?}"),
        };
        s.push_str(&name);
        s
    }

    pub fn display(&self) -> String {
        self.render(true)
    }

    /// Parse a key string like `"Ctrl+c"`, `"Shift+Down"`, `"q"`, `"End"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let (key_part, mods) = parts.split_last()?;

        for part in mods {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') && s.len() > 1 => KeyCode::F(s[1..].parse().ok()?),
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration: keybindings and engine settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(Action::ScrollDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::ScrollUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(Action::PageDown, vec![KeyBind::new(PageDown, n), KeyBind::new(Char(' '), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(PageUp, n), KeyBind::new(Char('b'), n)]);
        m.insert(Action::Top, vec![KeyBind::new(Home, n), KeyBind::new(Char('g'), n)]);
        m.insert(
            Action::Bottom,
            vec![KeyBind::new(End, n), KeyBind::new(Char('G'), KeyModifiers::SHIFT)],
        );
        m.insert(Action::Replay, vec![KeyBind::new(Char('r'), n)]);
        m.insert(Action::Quit, vec![KeyBind::new(Char('q'), n), KeyBind::new(Esc, n)]);

        m
    }

    /// Find the action that matches a key event.  When several bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<(Action, u32)> = None;
        for (&action, binds) in &self.bindings {
            for bind in binds.iter().filter(|b| b.matches(event)) {
                let mc = bind.modifiers.bits().count_ones();
                if best.map_or(true, |(_, count)| mc > count) {
                    best = Some((action, mc));
                }
            }
        }
        best.map(|(action, _)| action)
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action).and_then(|b| b.first()) {
            Some(bind) => bind.display(),
            None => "?".into(),
        }
    }

    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}: page | {}: replay | {}: quit",
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::ScrollUp),
            self.short_binding(Action::PageDown),
            self.short_binding(Action::Replay),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "config loaded");
                Self::parse_config(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "config unreadable, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Persist current config to disk.  Returns the path written.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(path)
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            if config.apply_engine_setting(key, value) {
                continue;
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::warn!(key, "config: unknown key");
                continue;
            };
            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    /// Returns whether `key` named an engine setting.
    fn apply_engine_setting(&mut self, key: &str, value: &str) -> bool {
        let engine = &mut self.engine;
        let ok = match key {
            "offset_threshold" => value
                .parse::<f64>()
                .ok()
                .and_then(|v| engine.set_offset_threshold(v).then_some(())),
            "transition_ms" => value
                .parse::<u64>()
                .ok()
                .map(|ms| engine.set_duration(Duration::from_millis(ms))),
            "transition" => value
                .parse::<Transition>()
                .ok()
                .map(|t| engine.set_transition(t)),
            "easing" => value.parse::<Easing>().ok().map(|e| engine.easing = e),
            "completion" => value.parse::<Completion>().ok().map(|c| engine.completion = c),
            "direction" => value
                .parse::<FlexDirection>()
                .ok()
                .map(|d| engine.alternate_direction = d),
            _ => return false,
        };
        if ok.is_none() {
            tracing::warn!(key, value, "config: invalid value ignored");
        }
        true
    }

    fn serialise(&self) -> String {
        let e = &self.engine;
        let mut lines = vec![
            "# sticky-nav configuration".to_string(),
            String::new(),
            "# Engine".to_string(),
            format!("offset_threshold = {}", e.offset_threshold),
            format!("transition_ms = {}", e.duration.as_millis()),
            format!("easing = {}", e.easing.as_css()),
            format!("completion = {}", e.completion.label()),
            format!("direction = {}", e.alternate_direction.as_css()),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Left, Right, Enter, Esc, Tab,".to_string(),
            "#   Home, End, PageUp, PageDown, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.render(false)).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/sticky-nav/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("sticky-nav").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press)
    }

    #[test]
    fn parses_engine_settings_and_bindings() {
        let config = AppConfig::parse_config(
            "# comment\n\
             offset_threshold = 24\n\
             transition_ms = 800\n\
             easing = ease-out\n\
             completion = transitionend\n\
             direction = column\n\
             replay = Ctrl+r, F5\n",
        );
        assert_eq!(config.engine.offset_threshold, 24.0);
        assert_eq!(config.engine.duration, Duration::from_millis(800));
        assert_eq!(config.engine.easing, Easing::EaseOut);
        assert_eq!(config.engine.completion, Completion::TransitionEnd);
        assert_eq!(config.engine.alternate_direction, FlexDirection::Column);
        assert_eq!(
            config.match_key(key(KeyCode::Char('r'), KeyModifiers::CONTROL)),
            Some(Action::Replay)
        );
        assert_eq!(config.match_key(key(KeyCode::F(5), KeyModifiers::NONE)), Some(Action::Replay));
        // The default binding was replaced.
        assert_eq!(config.match_key(key(KeyCode::Char('r'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn default_page_keys_map_to_page_actions() {
        let config = AppConfig::default();
        assert_eq!(
            config.match_key(key(KeyCode::PageDown, KeyModifiers::NONE)),
            Some(Action::PageDown)
        );
        assert_eq!(config.match_key(key(KeyCode::PageUp, KeyModifiers::NONE)), Some(Action::PageUp));
        assert_eq!(
            config.match_key(key(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(Action::PageDown)
        );
        assert_eq!(config.match_key(key(KeyCode::Char('b'), KeyModifiers::NONE)), Some(Action::PageUp));
    }

    #[test]
    fn transition_shorthand_sets_duration_and_easing() {
        let config = AppConfig::parse_config("transition = transform 0.6s ease-in\n");
        assert_eq!(config.engine.duration, Duration::from_millis(600));
        assert_eq!(config.engine.easing, Easing::EaseIn);

        let config = AppConfig::parse_config("transition = transform 1e30s linear\n");
        assert_eq!(config.engine, EngineConfig::default());

        let config = AppConfig::parse_config("transition_ms = 900000\n");
        assert_eq!(config.engine.duration, crate::engine::MAX_TRANSITION);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = AppConfig::parse_config(
            "offset_threshold = -3\noffset_threshold = inf\neasing = wobbly\nscroll_down = Hyper+x\nnonsense = 1\n",
        );
        let defaults = EngineConfig::default();
        assert_eq!(config.engine, defaults);
        assert_eq!(
            config.match_key(key(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(Action::ScrollDown)
        );
    }

    #[test]
    fn serialised_config_parses_back() {
        let mut config = AppConfig::default();
        config.engine.offset_threshold = 12.5;
        config.engine.completion = Completion::TransitionEnd;
        let reparsed = AppConfig::parse_config(&config.serialise());
        assert_eq!(reparsed.engine, config.engine);
        for action in Action::ALL {
            assert_eq!(reparsed.bindings.get(action), config.bindings.get(action), "{action:?}");
        }
    }

    #[test]
    fn shifted_capital_matches_bottom() {
        let config = AppConfig::default();
        assert_eq!(
            config.match_key(key(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Some(Action::Bottom)
        );
        assert_eq!(config.match_key(key(KeyCode::End, KeyModifiers::NONE)), Some(Action::Bottom));
    }
}
