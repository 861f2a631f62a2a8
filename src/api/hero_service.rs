use tracing::{error, warn};

use crate::api::{ApiError, HttpClient};
use crate::backend::{HEROES_URL, RESET_URL};
use crate::hero::{Hero, HeroId, NewHero};
use crate::messages::MessageLog;

/// Hero CRUD on top of [`HttpClient`].
///
/// No method ever fails: errors are reported to the log and replaced by a
/// harmless value so the screens keep working.
#[derive(Clone)]
pub struct HeroService {
    http: HttpClient,
    messages: MessageLog,
}

impl HeroService {
    pub const fn new(http: HttpClient, messages: MessageLog) -> Self {
        Self { http, messages }
    }

    pub const fn messages(&self) -> &MessageLog {
        &self.messages
    }

    fn log(&self, message: impl AsRef<str>) {
        self.messages
            .add(format!("HeroService: {}", message.as_ref()));
    }

    /// Report a failed operation and hand back `fallback` instead.
    fn handle_error<T>(&self, operation: &str, error: &ApiError, fallback: T) -> T {
        if error.is_not_found() {
            warn!(operation, %error, "Hero not found");
        } else {
            error!(operation, %error, "Hero request failed");
        }
        self.log(format!("{operation} failed: {error}"));
        fallback
    }

    pub async fn get_heroes(&self) -> Vec<Hero> {
        match self.http.get_json(HEROES_URL).await {
            Ok(heroes) => {
                self.log("fetched heroes");
                heroes
            }
            Err(e) => self.handle_error("getHeroes", &e, Vec::new()),
        }
    }

    /// Fetch one hero. A missing hero yields `None`.
    pub async fn get_hero(&self, id: HeroId) -> Option<Hero> {
        let url = format!("{HEROES_URL}/{id}");
        match self.http.get_json(&url).await {
            Ok(hero) => {
                self.log(format!("fetched hero id={id}"));
                Some(hero)
            }
            Err(e) => self.handle_error(&format!("getHero id={id}"), &e, None),
        }
    }

    /// Save the hero. Returns whether the backend accepted it.
    pub async fn update_hero(&self, hero: &Hero) -> bool {
        match self.http.put_json(HEROES_URL, hero).await {
            Ok(()) => {
                self.log(format!("updated hero id={}", hero.id));
                true
            }
            Err(e) => self.handle_error("updateHero", &e, false),
        }
    }

    pub async fn add_hero(&self, hero: NewHero) -> Option<Hero> {
        match self.http.post_json::<_, Hero>(HEROES_URL, &hero).await {
            Ok(created) => {
                self.log(format!("added hero w/ id={}", created.id));
                Some(created)
            }
            Err(e) => self.handle_error("addHero", &e, None),
        }
    }

    pub async fn delete_hero(&self, id: HeroId) -> bool {
        let url = format!("{HEROES_URL}/{id}");
        match self.http.delete(&url).await {
            Ok(()) => {
                self.log(format!("deleted hero id={id}"));
                true
            }
            Err(e) => self.handle_error("deleteHero", &e, false),
        }
    }

    /// Heroes whose name contains `term`.
    ///
    /// A blank term short-circuits to an empty list without a request.
    pub async fn search_heroes(&self, term: &str) -> Vec<Hero> {
        if term.trim().is_empty() {
            return Vec::new();
        }

        let url = format!("{HEROES_URL}/?name={}", urlencoding::encode(term));
        match self.http.get_json::<Vec<Hero>>(&url).await {
            Ok(heroes) => {
                if heroes.is_empty() {
                    self.log(format!("no heroes matching \"{term}\""));
                } else {
                    self.log(format!("found heroes matching \"{term}\""));
                }
                heroes
            }
            Err(e) => self.handle_error("searchHeroes", &e, Vec::new()),
        }
    }

    /// Restore the backend's seed data.
    pub async fn reset(&self) -> bool {
        match self.http.post(RESET_URL).await {
            Ok(()) => {
                self.log("database reset");
                true
            }
            Err(e) => self.handle_error("resetDb", &e, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::routing::get;

    use super::*;
    use crate::backend::{BackendConfig, InMemoryDb, build_router};

    fn service() -> HeroService {
        let router = build_router(Arc::new(InMemoryDb::seeded()), BackendConfig::default());
        HeroService::new(HttpClient::new(router), MessageLog::new())
    }

    fn last_message(service: &HeroService) -> String {
        service.messages().messages().pop().unwrap()
    }

    #[tokio::test]
    async fn test_get_heroes_logs() {
        let service = service();
        let heroes = service.get_heroes().await;
        assert_eq!(heroes.len(), 10);
        assert_eq!(last_message(&service), "HeroService: fetched heroes");
    }

    #[tokio::test]
    async fn test_get_hero() {
        let service = service();
        let hero = service.get_hero(HeroId(14)).await;
        assert_eq!(hero, Some(Hero::new(14, "Celeritas")));
        assert_eq!(last_message(&service), "HeroService: fetched hero id=14");
    }

    #[tokio::test]
    async fn test_get_missing_hero_is_none() {
        let service = service();
        assert_eq!(service.get_hero(HeroId(99)).await, None);
        assert_eq!(
            last_message(&service),
            "HeroService: getHero id=99 failed: Http failure response for api/heroes/99: 404 Not Found"
        );
    }

    #[tokio::test]
    async fn test_add_update_delete() {
        let service = service();

        let created = service.add_hero(NewHero::new("Zephyr")).await.unwrap();
        assert_eq!(created, Hero::new(21, "Zephyr"));

        let renamed = Hero::new(21, "Zephyrus");
        assert!(service.update_hero(&renamed).await);
        assert_eq!(service.get_hero(HeroId(21)).await, Some(renamed));

        assert!(service.delete_hero(HeroId(21)).await);
        assert_eq!(service.get_hero(HeroId(21)).await, None);

        assert_eq!(
            &service.messages().messages()[..4],
            &[
                "HeroService: added hero w/ id=21".to_string(),
                "HeroService: updated hero id=21".to_string(),
                "HeroService: fetched hero id=21".to_string(),
                "HeroService: deleted hero id=21".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_search() {
        let service = service();

        let found = service.search_heroes("mag").await;
        let names: Vec<&str> = found.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Magneta", "Magma"]);
        assert_eq!(
            last_message(&service),
            "HeroService: found heroes matching \"mag\""
        );

        assert!(service.search_heroes("xyz").await.is_empty());
        assert_eq!(
            last_message(&service),
            "HeroService: no heroes matching \"xyz\""
        );
    }

    #[tokio::test]
    async fn test_search_term_is_url_encoded() {
        let service = service();
        let found = service.search_heroes("Dr I").await;
        assert_eq!(found, vec![Hero::new(18, "Dr IQ")]);
    }

    #[tokio::test]
    async fn test_blank_search_skips_request() {
        let service = service();
        assert!(service.search_heroes("   ").await.is_empty());
        assert!(service.messages().is_empty());
    }

    #[tokio::test]
    async fn test_reset() {
        let service = service();
        service.delete_hero(HeroId(11)).await;
        assert!(service.reset().await);
        assert!(service.get_hero(HeroId(11)).await.is_some());
    }

    #[tokio::test]
    async fn test_failures_return_defaults() {
        let broken = Router::new().route("/api/heroes", get(|| async { "not json" }));
        let service = HeroService::new(HttpClient::new(broken), MessageLog::new());

        assert!(service.get_heroes().await.is_empty());
        assert!(last_message(&service).starts_with("HeroService: getHeroes failed: Http failure during parsing for api/heroes"));

        assert!(!service.update_hero(&Hero::new(1, "x")).await);
        assert!(last_message(&service).starts_with("HeroService: updateHero failed: "));
        assert!(service.add_hero(NewHero::new("y")).await.is_none());
        assert!(last_message(&service).starts_with("HeroService: addHero failed: "));
        assert!(!service.delete_hero(HeroId(1)).await);
        assert!(last_message(&service).starts_with("HeroService: deleteHero failed: "));
        assert!(!service.reset().await);
        assert!(last_message(&service).starts_with("HeroService: resetDb failed: "));
        assert!(service.search_heroes("a").await.is_empty());
        assert_eq!(
            last_message(&service),
            "HeroService: searchHeroes failed: Http failure response for api/heroes/?name=a: 404 Not Found"
        );
    }
}
