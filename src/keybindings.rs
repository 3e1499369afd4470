//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are data, so users can remap any action from config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NavTop,
    NavBottom,
    Refresh,
    NewItem,
    ToggleCompleted,
    EditItem,
    DeleteItem,
    Submit,
    Cancel,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::NavTop => "Jump to first item",
            Self::NavBottom => "Jump to last item",
            Self::Refresh => "Fetch todos from the server",
            Self::NewItem => "Add a todo",
            Self::ToggleCompleted => "Toggle completed",
            Self::EditItem => "Edit title",
            Self::DeleteItem => "Delete todo",
            Self::Submit => "Add / save",
            Self::Cancel => "Cancel",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    /// Browsing the item list
    List,
    /// Typing into the draft or edit row
    Input,
}

impl Context {
    /// Text entry owns plain keys, so it never inherits Global bindings.
    fn falls_back_to_global(self) -> bool {
        matches!(self, Context::List)
    }

    pub fn label(self) -> &'static str {
        match self {
            Context::Global => "Global",
            Context::List => "List",
            Context::Input => "Input",
        }
    }
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
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Backspace", "Space",
///   "Home", "End", "Delete"
/// - Modifier combos: "Ctrl+d", "Ctrl+s"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return match chars.next() {
            None => Some(KeySpec::ctrl(c)),
            Some(_) => None,
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
        "home" => return Some(KeySpec::plain(KeyCode::Home)),
        "end" => return Some(KeySpec::plain(KeyCode::End)),
        "delete" | "del" => return Some(KeySpec::plain(KeyCode::Delete)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
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
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
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
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Delete => "Delete".to_string(),
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
///
/// The same key can map to different actions in different contexts. The List
/// context falls back to Global; Input does not.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings, in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
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

    fn register_defaults(&mut self) {
        use Action::*;
        use Context::*;

        let defaults = [
            // Global
            (Global, KeySpec::plain(KeyCode::Char('q')), Quit),
            (Global, KeySpec::plain(KeyCode::Char('j')), NavDown),
            (Global, KeySpec::plain(KeyCode::Down), NavDown),
            (Global, KeySpec::plain(KeyCode::Char('k')), NavUp),
            (Global, KeySpec::plain(KeyCode::Up), NavUp),
            (Global, KeySpec::plain(KeyCode::Char('g')), NavTop),
            (Global, KeySpec::plain(KeyCode::Home), NavTop),
            (Global, KeySpec::plain(KeyCode::Char('G')), NavBottom),
            (Global, KeySpec::plain(KeyCode::End), NavBottom),
            (Global, KeySpec::plain(KeyCode::Char('r')), Refresh),
            (Global, KeySpec::plain(KeyCode::Char('T')), CycleTheme),
            (Global, KeySpec::plain(KeyCode::Char('?')), ShowHelp),
            // List
            (List, KeySpec::plain(KeyCode::Char('a')), NewItem),
            (List, KeySpec::plain(KeyCode::Char(' ')), ToggleCompleted),
            (List, KeySpec::plain(KeyCode::Char('x')), ToggleCompleted),
            (List, KeySpec::plain(KeyCode::Char('e')), EditItem),
            (List, KeySpec::plain(KeyCode::Enter), EditItem),
            (List, KeySpec::plain(KeyCode::Char('d')), DeleteItem),
            (List, KeySpec::plain(KeyCode::Delete), DeleteItem),
            // Input
            (Input, KeySpec::plain(KeyCode::Enter), Submit),
            (Input, KeySpec::ctrl('s'), Submit),
            (Input, KeySpec::plain(KeyCode::Esc), Cancel),
        ];

        for (context, key, action) in defaults {
            self.bind(context, key, action);
        }
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "nav_down").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). An override
    /// replaces every default key for that action, in every context the
    /// action was bound in.
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

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then Global where the context allows.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context.falls_back_to_global() {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// First key bound to `action`, formatted for hints like "a: add".
    pub fn key_hint(&self, action: Action) -> Option<String> {
        self.bindings
            .iter()
            .find(|(_, _, a)| *a == action)
            .map(|(_, key, _)| format_key(key))
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
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
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "nav_top" | "navtop" | "top" => Some(Action::NavTop),
        "nav_bottom" | "navbottom" | "bottom" => Some(Action::NavBottom),
        "refresh" | "fetch" => Some(Action::Refresh),
        "new_item" | "newitem" | "add" => Some(Action::NewItem),
        "toggle_completed" | "togglecompleted" | "toggle" | "complete" => {
            Some(Action::ToggleCompleted)
        }
        "edit_item" | "edititem" | "edit" => Some(Action::EditItem),
        "delete_item" | "deleteitem" | "delete" => Some(Action::DeleteItem),
        "submit" | "save" => Some(Action::Submit),
        "cancel" => Some(Action::Cancel),
        "cycle_theme" | "cycletheme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(reg: &KeybindingRegistry, code: KeyCode, context: Context) -> Option<Action> {
        reg.action_for_key(code, KeyModifiers::NONE, context)
    }

    #[test]
    fn test_default_registry_has_quit() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            lookup(&reg, KeyCode::Char('q'), Context::Global),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_default_nav_keys() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            lookup(&reg, KeyCode::Char('j'), Context::List),
            Some(Action::NavDown)
        );
        assert_eq!(
            lookup(&reg, KeyCode::Down, Context::List),
            Some(Action::NavDown)
        );
        assert_eq!(
            lookup(&reg, KeyCode::Char('k'), Context::List),
            Some(Action::NavUp)
        );
        assert_eq!(
            lookup(&reg, KeyCode::End, Context::List),
            Some(Action::NavBottom)
        );
    }

    #[test]
    fn test_list_actions() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            lookup(&reg, KeyCode::Char('a'), Context::List),
            Some(Action::NewItem)
        );
        assert_eq!(
            lookup(&reg, KeyCode::Char(' '), Context::List),
            Some(Action::ToggleCompleted)
        );
        assert_eq!(
            lookup(&reg, KeyCode::Enter, Context::List),
            Some(Action::EditItem)
        );
        assert_eq!(
            lookup(&reg, KeyCode::Char('d'), Context::List),
            Some(Action::DeleteItem)
        );
    }

    #[test]
    fn test_input_context_does_not_inherit_global() {
        let reg = KeybindingRegistry::new();
        // Typing 'q' into a title must not quit.
        assert_eq!(lookup(&reg, KeyCode::Char('q'), Context::Input), None);
        assert_eq!(lookup(&reg, KeyCode::Char('j'), Context::Input), None);
        assert_eq!(
            lookup(&reg, KeyCode::Enter, Context::Input),
            Some(Action::Submit)
        );
        assert_eq!(
            lookup(&reg, KeyCode::Esc, Context::Input),
            Some(Action::Cancel)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('s'), KeyModifiers::CONTROL, Context::Input),
            Some(Action::Submit)
        );
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, KeyCode::F(12), Context::List), None);
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());

        assert_eq!(lookup(&reg, KeyCode::Char('q'), Context::Global), None);
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::CONTROL, Context::List),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_override_replaces_all_default_keys() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("toggle".to_string(), "c".to_string());
        assert!(reg.apply_overrides(&overrides).is_empty());

        assert_eq!(
            lookup(&reg, KeyCode::Char('c'), Context::List),
            Some(Action::ToggleCompleted)
        );
        assert_eq!(lookup(&reg, KeyCode::Char(' '), Context::List), None);
        assert_eq!(lookup(&reg, KeyCode::Char('x'), Context::List), None);
        assert_eq!(
            reg.all_bindings()
                .iter()
                .filter(|(_, _, a, _)| *a == Action::ToggleCompleted)
                .count(),
            1
        );
    }

    #[test]
    fn test_apply_overrides_unknown_action() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("nonexistent_action".to_string(), "q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Unknown action"));
    }

    #[test]
    fn test_apply_overrides_bad_key() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+Alt+Shift+Q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Cannot parse key"));
    }

    #[test]
    fn test_parse_key_string_named_keys() {
        assert_eq!(
            parse_key_string("Enter"),
            Some(KeySpec::plain(KeyCode::Enter))
        );
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(
            parse_key_string("space"),
            Some(KeySpec::plain(KeyCode::Char(' ')))
        );
        assert_eq!(
            parse_key_string("Delete"),
            Some(KeySpec::plain(KeyCode::Delete))
        );
    }

    #[test]
    fn test_parse_key_string_function_keys() {
        assert_eq!(parse_key_string("F5"), Some(KeySpec::plain(KeyCode::F(5))));
        assert_eq!(parse_key_string("F0"), None);
        assert_eq!(parse_key_string("F13"), None);
    }

    #[test]
    fn test_parse_key_string_ctrl_and_chars() {
        assert_eq!(parse_key_string("Ctrl+s"), Some(KeySpec::ctrl('s')));
        assert_eq!(
            parse_key_string("/"),
            Some(KeySpec::plain(KeyCode::Char('/')))
        );
        assert_eq!(
            parse_key_string("é"),
            Some(KeySpec::plain(KeyCode::Char('é')))
        );
        assert_eq!(parse_key_string("xy"), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Char('q'))), "q");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Char(' '))), "Space");
        assert_eq!(format_key(&KeySpec::ctrl('s')), "Ctrl+s");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }

    #[test]
    fn test_key_hint_uses_first_binding() {
        let reg = KeybindingRegistry::new();
        assert_eq!(reg.key_hint(Action::NewItem).as_deref(), Some("a"));
        assert_eq!(reg.key_hint(Action::ToggleCompleted).as_deref(), Some("Space"));
    }

    #[test]
    fn test_every_action_described_and_bound() {
        let reg = KeybindingRegistry::new();
        let bindings = reg.all_bindings();
        for action in [
            Action::Quit,
            Action::Refresh,
            Action::NewItem,
            Action::ToggleCompleted,
            Action::EditItem,
            Action::DeleteItem,
            Action::Submit,
            Action::Cancel,
            Action::CycleTheme,
            Action::ShowHelp,
        ] {
            assert!(!action.describe().is_empty());
            assert!(bindings.iter().any(|(_, _, a, _)| *a == action));
        }
    }
}
