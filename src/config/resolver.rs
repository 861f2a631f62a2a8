use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{
    DetailAction, DialogAction, GlobalAction, HeroesAction, NavAction, SearchAction,
};
use crate::config::key::KeyBinding;
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to actions using the configured keybindings.
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    fn global(&self, action: GlobalAction) -> &KeyBinding {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => &kb.quit,
            GlobalAction::Help => &kb.help,
            GlobalAction::Back => &kb.back,
            GlobalAction::Dashboard => &kb.dashboard,
            GlobalAction::Heroes => &kb.heroes,
            GlobalAction::ClearMessages => &kb.clear_messages,
            GlobalAction::ResetData => &kb.reset_data,
        }
    }

    fn nav(&self, action: NavAction) -> &KeyBinding {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => &kb.up,
            NavAction::Down => &kb.down,
            NavAction::PageUp => &kb.page_up,
            NavAction::PageDown => &kb.page_down,
            NavAction::Home => &kb.home,
            NavAction::End => &kb.end,
            NavAction::Select => &kb.select,
        }
    }

    fn search(&self, action: SearchAction) -> &KeyBinding {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Focus => &kb.focus,
            SearchAction::Exit => &kb.exit,
        }
    }

    fn heroes(&self, action: HeroesAction) -> &KeyBinding {
        let kb = &self.keybindings.heroes;
        match action {
            HeroesAction::Add => &kb.add,
            HeroesAction::Delete => &kb.delete,
            HeroesAction::Reload => &kb.reload,
        }
    }

    fn detail(&self, action: DetailAction) -> &KeyBinding {
        let kb = &self.keybindings.detail;
        match action {
            DetailAction::Edit => &kb.edit,
            DetailAction::Save => &kb.save,
        }
    }

    fn dialog(&self, action: DialogAction) -> &KeyBinding {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Dismiss => &kb.dismiss,
        }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        self.global(action).matches(event)
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        self.global(action).display()
    }

    // Navigation actions
    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        self.nav(action).matches(event)
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        self.nav(action).display()
    }

    // Search actions
    pub fn matches_search(&self, event: &KeyEvent, action: SearchAction) -> bool {
        self.search(action).matches(event)
    }

    pub fn display_search(&self, action: SearchAction) -> String {
        self.search(action).display()
    }

    // Hero list actions
    pub fn matches_heroes(&self, event: &KeyEvent, action: HeroesAction) -> bool {
        self.heroes(action).matches(event)
    }

    pub fn display_heroes(&self, action: HeroesAction) -> String {
        self.heroes(action).display()
    }

    // Detail actions
    pub fn matches_detail(&self, event: &KeyEvent, action: DetailAction) -> bool {
        self.detail(action).matches(event)
    }

    pub fn display_detail(&self, action: DetailAction) -> String {
        self.detail(action).display()
    }

    // Dialog actions
    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        self.dialog(action).matches(event)
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_default_bindings() {
        let resolver = KeyResolver::default();
        assert!(resolver.matches_global(&press(KeyCode::Char('q')), GlobalAction::Quit));
        assert!(resolver.matches_nav(&press(KeyCode::Char('j')), NavAction::Down));
        assert!(resolver.matches_nav(&press(KeyCode::Down), NavAction::Down));
        assert!(resolver.matches_heroes(&press(KeyCode::Delete), HeroesAction::Delete));
        assert!(!resolver.matches_detail(&press(KeyCode::Char('x')), DetailAction::Save));
    }

    #[test]
    fn test_display() {
        let resolver = KeyResolver::default();
        assert_eq!(resolver.display_nav(NavAction::Up), "k/Up");
        assert_eq!(resolver.display_search(SearchAction::Focus), "/");
        assert_eq!(resolver.display_heroes(HeroesAction::Add), "a/n");
    }
}
