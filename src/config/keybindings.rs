use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub help: KeyBinding,
    pub back: KeyBinding,
    pub dashboard: KeyBinding,
    pub heroes: KeyBinding,
    pub clear_messages: KeyBinding,
    pub reset_data: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationKeybindings {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub home: KeyBinding,
    pub end: KeyBinding,
    pub select: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchKeybindings {
    pub focus: KeyBinding,
    pub exit: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroListKeybindings {
    pub add: KeyBinding,
    pub delete: KeyBinding,
    pub reload: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailKeybindings {
    pub edit: KeyBinding,
    pub save: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogKeybindings {
    pub dismiss: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub navigation: NavigationKeybindings,
    pub search: SearchKeybindings,
    pub heroes: HeroListKeybindings,
    pub detail: DetailKeybindings,
    pub dialog: DialogKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::char('q').into(),
            help: Key::char('?').into(),
            back: Key::new(KeyCode::Esc).into(),
            dashboard: Key::char('1').into(),
            heroes: Key::char('2').into(),
            clear_messages: Key::char('x').into(),
            reset_data: Key::char('R').into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::multiple(vec![Key::char('k'), Key::new(KeyCode::Up)]),
            down: KeyBinding::multiple(vec![Key::char('j'), Key::new(KeyCode::Down)]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: KeyBinding::multiple(vec![Key::char('g'), Key::new(KeyCode::Home)]),
            end: KeyBinding::multiple(vec![Key::char('G'), Key::new(KeyCode::End)]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for SearchKeybindings {
    fn default() -> Self {
        Self {
            focus: Key::char('/').into(),
            exit: KeyBinding::multiple(vec![Key::new(KeyCode::Esc), Key::new(KeyCode::Tab)]),
        }
    }
}

impl Default for HeroListKeybindings {
    fn default() -> Self {
        Self {
            add: KeyBinding::multiple(vec![Key::char('a'), Key::char('n')]),
            delete: KeyBinding::multiple(vec![Key::char('d'), Key::new(KeyCode::Delete)]),
            reload: Key::char('r').into(),
        }
    }
}

impl Default for DetailKeybindings {
    fn default() -> Self {
        Self {
            edit: KeyBinding::multiple(vec![Key::char('e'), Key::new(KeyCode::Enter)]),
            save: Key::char('s').into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            dismiss: KeyBinding::multiple(vec![
                Key::new(KeyCode::Enter),
                Key::new(KeyCode::Esc),
                Key::char('q'),
                Key::char('?'),
            ]),
        }
    }
}
