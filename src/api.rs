//! Client side of the hero API.

mod client;
mod error;
mod hero_service;

pub use client::HttpClient;
pub use error::ApiError;
pub use hero_service::HeroService;
