//! Hero-aware panels embedded in screens or in the App frame.

mod hero_search;
mod messages;

pub use hero_search::{HeroSearch, HeroSearchEvent};
pub use messages::MessagesPanel;
