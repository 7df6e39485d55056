//! Keybinding registry — maps key events to actions per view context, with
//! config overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// Every user-facing action a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // -- List navigation --
    NextItem,
    PrevItem,
    NextTag,
    PrevTag,
    NextMark,
    PrevMark,
    // -- List state --
    ToggleMark,
    JustRead,
    JustUnread,
    ToggleCollapse,
    CollapseAll,
    ExpandAll,
    TagRead,
    TagUnread,
    AllRead,
    AllUnread,
    // -- Search --
    Search,
    InlineSearch,
    // -- Leaving the list --
    Goto,
    Reader,
    Help,
    ForceUpdate,
    Quit,
    // -- Reader / help --
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    // -- Prompt --
    Commit,
    Cancel,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::NextItem => "Next story",
            Self::PrevItem => "Previous story",
            Self::NextTag => "Next tag",
            Self::PrevTag => "Previous tag",
            Self::NextMark => "Next marked story",
            Self::PrevMark => "Previous marked story",
            Self::ToggleMark => "Toggle mark",
            Self::JustRead => "Mark story read",
            Self::JustUnread => "Mark story unread",
            Self::ToggleCollapse => "Collapse / expand tag",
            Self::CollapseAll => "Collapse all tags",
            Self::ExpandAll => "Expand all tags",
            Self::TagRead => "Mark tag read",
            Self::TagUnread => "Mark tag unread",
            Self::AllRead => "Mark everything read",
            Self::AllUnread => "Mark everything unread",
            Self::Search => "Collect matching stories",
            Self::InlineSearch => "Mark matching stories",
            Self::Goto => "Open link in browser",
            Self::Reader => "Read story",
            Self::Help => "Show help",
            Self::ForceUpdate => "Refresh all feeds now",
            Self::Quit => "Quit / close view",
            Self::ScrollDown => "Scroll down one line",
            Self::ScrollUp => "Scroll up one line",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::Commit => "Run search",
            Self::Cancel => "Cancel",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Which kind of view is receiving keys. Contexts do not fall back to each
/// other: a key unbound in the prompt is text, not a list command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    List,
    Reader,
    Help,
    Prompt,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    /// Shift is dropped for character keys: crossterm already reports the
    /// shifted character, and terminals disagree on whether to set the flag.
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let modifiers = match code {
            KeyCode::Char(_) => modifiers - KeyModifiers::SHIFT,
            _ => modifiers,
        };
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Space", "PageDown"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "pageup" => return Some(KeySpec::plain(KeyCode::PageUp)),
        "pagedown" => return Some(KeySpec::plain(KeyCode::PageDown)),
        "home" => return Some(KeySpec::plain(KeyCode::Home)),
        "end" => return Some(KeySpec::plain(KeyCode::End)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::char(' ')),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']) {
        if let Ok(n) = n.parse::<u8>() {
            if (1..=12).contains(&n) {
                return Some(KeySpec::plain(KeyCode::F(n)));
            }
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::char(c)),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings, in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    /// Create a registry with the default bindings.
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn bind_all(&mut self, context: Context, table: &[(KeySpec, Action)]) {
        for &(key, action) in table {
            self.bind(context, key, action);
        }
    }

    fn register_defaults(&mut self) {
        use Action::*;

        self.bind_all(
            Context::List,
            &[
                (KeySpec::char('j'), NextItem),
                (KeySpec::plain(KeyCode::Down), NextItem),
                (KeySpec::char('k'), PrevItem),
                (KeySpec::plain(KeyCode::Up), PrevItem),
                (KeySpec::char('J'), NextTag),
                (KeySpec::char(']'), NextTag),
                (KeySpec::char('K'), PrevTag),
                (KeySpec::char('['), PrevTag),
                (KeySpec::char('n'), NextMark),
                (KeySpec::char('p'), PrevMark),
                (KeySpec::char('m'), ToggleMark),
                (KeySpec::char('r'), JustRead),
                (KeySpec::char('u'), JustUnread),
                (KeySpec::char('c'), ToggleCollapse),
                (KeySpec::char('C'), CollapseAll),
                (KeySpec::char('V'), ExpandAll),
                (KeySpec::char('a'), TagRead),
                (KeySpec::char('x'), TagUnread),
                (KeySpec::char('A'), AllRead),
                (KeySpec::char('X'), AllUnread),
                (KeySpec::char('/'), Search),
                (KeySpec::char('f'), InlineSearch),
                (KeySpec::char('g'), Goto),
                (KeySpec::plain(KeyCode::Enter), Reader),
                (KeySpec::char(' '), Reader),
                (KeySpec::char('h'), Help),
                (KeySpec::char('?'), Help),
                (KeySpec::char('U'), ForceUpdate),
                (KeySpec::char('q'), Quit),
            ],
        );

        self.bind_all(
            Context::Reader,
            &[
                (KeySpec::char('j'), ScrollDown),
                (KeySpec::plain(KeyCode::Down), ScrollDown),
                (KeySpec::char('k'), ScrollUp),
                (KeySpec::plain(KeyCode::Up), ScrollUp),
                (KeySpec::ctrl('d'), PageDown),
                (KeySpec::plain(KeyCode::PageDown), PageDown),
                (KeySpec::ctrl('u'), PageUp),
                (KeySpec::plain(KeyCode::PageUp), PageUp),
                (KeySpec::char('g'), Goto),
                (KeySpec::char('q'), Quit),
                (KeySpec::plain(KeyCode::Esc), Quit),
            ],
        );

        self.bind_all(
            Context::Help,
            &[
                (KeySpec::char('j'), ScrollDown),
                (KeySpec::plain(KeyCode::Down), ScrollDown),
                (KeySpec::char('k'), ScrollUp),
                (KeySpec::plain(KeyCode::Up), ScrollUp),
                (KeySpec::char('q'), Quit),
                (KeySpec::char('?'), Quit),
                (KeySpec::plain(KeyCode::Esc), Quit),
            ],
        );

        self.bind_all(
            Context::Prompt,
            &[
                (KeySpec::plain(KeyCode::Enter), Commit),
                (KeySpec::plain(KeyCode::Esc), Cancel),
            ],
        );
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Keys in the map are action names (e.g., "next_item", "quit").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). The new key
    /// replaces every old binding of the action, in each context it was
    /// bound in.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action bound to `key` in `context`.
    pub fn action_for(&self, key: KeySpec, context: Context) -> Option<Action> {
        self.lookup.get(&(context, key)).copied()
    }

    /// Convenience over [`action_for`](Self::action_for) for raw key events.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        self.action_for(KeySpec::new(code, modifiers), context)
    }

    /// Bindings of one context for the help screen: (key, description).
    pub fn bindings_for(&self, context: Context) -> Vec<(String, &'static str)> {
        self.bindings
            .iter()
            .filter(|(c, _, _)| *c == context)
            .map(|(_, key, action)| (format_key(key), action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    use Action::*;

    let action = match name.to_lowercase().replace('-', "_").as_str() {
        "next_item" => NextItem,
        "prev_item" => PrevItem,
        "next_tag" => NextTag,
        "prev_tag" => PrevTag,
        "next_mark" => NextMark,
        "prev_mark" => PrevMark,
        "toggle_mark" => ToggleMark,
        "just_read" => JustRead,
        "just_unread" => JustUnread,
        "toggle_collapse" | "toggle_collapse_tag" => ToggleCollapse,
        "collapse_all" | "set_collapse_all" => CollapseAll,
        "expand_all" | "unset_collapse_all" => ExpandAll,
        "tag_read" => TagRead,
        "tag_unread" => TagUnread,
        "all_read" => AllRead,
        "all_unread" => AllUnread,
        "search" => Search,
        "inline_search" => InlineSearch,
        "goto" => Goto,
        "reader" => Reader,
        "help" => Help,
        "force_update" => ForceUpdate,
        "quit" => Quit,
        "scroll_down" => ScrollDown,
        "scroll_up" => ScrollUp,
        "page_down" => PageDown,
        "page_up" => PageUp,
        _ => return None,
    };
    Some(action)
}

// ============================================================================
// Tests
// ============================================================================
