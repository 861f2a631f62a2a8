use parking_lot::RwLock;

use crate::hero::{Hero, HeroId};

/// Id handed out when the collection is empty.
pub const FIRST_ID: HeroId = HeroId(11);

const SEED: &[(u32, &str)] = &[
    (11, "Dr Nice"),
    (12, "Narco"),
    (13, "Bombasto"),
    (14, "Celeritas"),
    (15, "Magneta"),
    (16, "RubberMan"),
    (17, "Dynama"),
    (18, "Dr IQ"),
    (19, "Magma"),
    (20, "Tornado"),
];

/// Outcome of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// The hero collection held in process memory.
///
/// Stands in for a real server; nothing is persisted.
#[derive(Debug, Default)]
pub struct InMemoryDb {
    heroes: RwLock<Vec<Hero>>,
}

impl InMemoryDb {
    /// Create a database holding the seed heroes.
    pub fn seeded() -> Self {
        Self {
            heroes: RwLock::new(seed()),
        }
    }

    #[cfg(test)]
    pub fn with_heroes(heroes: Vec<Hero>) -> Self {
        Self {
            heroes: RwLock::new(heroes),
        }
    }

    pub fn reset(&self) {
        *self.heroes.write() = seed();
    }

    pub fn all(&self) -> Vec<Hero> {
        self.heroes.read().clone()
    }

    /// Heroes whose name contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<Hero> {
        let needle = term.to_lowercase();
        self.heroes
            .read()
            .iter()
            .filter(|hero| hero.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: HeroId) -> Option<Hero> {
        self.heroes.read().iter().find(|hero| hero.id == id).cloned()
    }

    /// Add a hero under a freshly generated id. `None` when no id is left.
    pub fn insert(&self, name: String) -> Option<Hero> {
        let mut heroes = self.heroes.write();
        let hero = Hero {
            id: gen_id(&heroes)?,
            name,
        };
        heroes.push(hero.clone());
        Some(hero)
    }

    /// Replace the hero with the same id, or add it when the id is unknown.
    pub fn upsert(&self, hero: Hero) -> Upsert {
        let mut heroes = self.heroes.write();
        if let Some(existing) = heroes.iter_mut().find(|h| h.id == hero.id) {
            *existing = hero;
            Upsert::Replaced
        } else {
            heroes.push(hero);
            Upsert::Inserted
        }
    }

    /// Remove a hero. Returns whether it existed.
    pub fn remove(&self, id: HeroId) -> bool {
        let mut heroes = self.heroes.write();
        let before = heroes.len();
        heroes.retain(|hero| hero.id != id);
        heroes.len() != before
    }
}

fn seed() -> Vec<Hero> {
    SEED.iter().map(|&(id, name)| Hero::new(id, name)).collect()
}

/// Highest existing id plus one, or [`FIRST_ID`] for an empty collection.
///
/// Once `u32::MAX` is taken the lowest free id from [`FIRST_ID`] up is
/// reused instead. `None` only when every such id is in use.
pub fn gen_id(heroes: &[Hero]) -> Option<HeroId> {
    let Some(HeroId(max)) = heroes.iter().map(|hero| hero.id).max() else {
        return Some(FIRST_ID);
    };
    if let Some(next) = max.checked_add(1) {
        return Some(HeroId(next));
    }

    let mut taken: Vec<u32> = heroes.iter().map(|hero| hero.id.0).collect();
    taken.sort_unstable();
    taken.dedup();
    let mut candidate = FIRST_ID.0;
    for id in taken.into_iter().filter(|&id| id >= FIRST_ID.0) {
        if id != candidate {
            break;
        }
        candidate = candidate.checked_add(1)?;
    }
    Some(HeroId(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed() {
        let db = InMemoryDb::seeded();
        let heroes = db.all();
        assert_eq!(heroes.len(), 10);
        assert_eq!(heroes[0], Hero::new(11, "Dr Nice"));
        assert_eq!(heroes[9], Hero::new(20, "Tornado"));
    }

    #[test]
    fn test_gen_id() {
        assert_eq!(gen_id(&[]), Some(FIRST_ID));
        assert_eq!(gen_id(&seed()), Some(HeroId(21)));
        assert_eq!(
            gen_id(&[Hero::new(40, "a"), Hero::new(3, "b")]),
            Some(HeroId(41))
        );
    }

    #[test]
    fn test_gen_id_after_max_reuses_lowest_free_id() {
        let mut heroes = seed();
        heroes.push(Hero::new(u32::MAX, "Max"));
        assert_eq!(gen_id(&heroes), Some(HeroId(21)));

        // Gaps are filled before the end of the seed range.
        heroes.retain(|hero| hero.id != HeroId(13));
        assert_eq!(gen_id(&heroes), Some(HeroId(13)));

        assert_eq!(gen_id(&[Hero::new(u32::MAX, "Max")]), Some(FIRST_ID));
    }

    #[test]
    fn test_insert_never_duplicates_ids() {
        let db = InMemoryDb::seeded();
        db.upsert(Hero::new(u32::MAX, "Max"));
        let first = db.insert("Next".to_string()).unwrap();
        let second = db.insert("After".to_string()).unwrap();
        assert_eq!(first.id, HeroId(21));
        assert_eq!(second.id, HeroId(22));
    }

    #[test]
    fn test_insert_after_emptying() {
        let db = InMemoryDb::with_heroes(vec![Hero::new(30, "Solo")]);
        assert!(db.remove(HeroId(30)));
        assert_eq!(db.insert("Fresh".to_string()), Some(Hero::new(11, "Fresh")));
    }

    #[test]
    fn test_search_ignores_case() {
        let db = InMemoryDb::seeded();
        let names: Vec<String> = db.search("MA").into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["Magneta", "RubberMan", "Dynama", "Magma"]);
        assert!(db.search("zzz").is_empty());
    }

    #[test]
    fn test_upsert() {
        let db = InMemoryDb::seeded();
        assert_eq!(db.upsert(Hero::new(12, "Narco II")), Upsert::Replaced);
        assert_eq!(db.get(HeroId(12)).unwrap().name, "Narco II");

        assert_eq!(db.upsert(Hero::new(99, "Newcomer")), Upsert::Inserted);
        assert_eq!(db.all().len(), 11);
    }

    #[test]
    fn test_reset_restores_seed() {
        let db = InMemoryDb::seeded();
        db.remove(HeroId(11));
        db.insert("Extra".to_string());
        db.reset();
        assert_eq!(db.all(), seed());
    }
}
