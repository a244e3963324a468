use crate::domain::{Game, GameStatus};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    TitleAz,
    TitleZa,
    DateOldest,
    #[default]
    DateNewest,
    Status,
    RatingHigh,
    RatingLow,
}

impl SortMode {
    pub const ALL: [SortMode; 7] = [
        SortMode::TitleAz,
        SortMode::TitleZa,
        SortMode::DateOldest,
        SortMode::DateNewest,
        SortMode::Status,
        SortMode::RatingHigh,
        SortMode::RatingLow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::TitleAz => "title-az",
            SortMode::TitleZa => "title-za",
            SortMode::DateOldest => "date-oldest",
            SortMode::DateNewest => "date-newest",
            SortMode::Status => "status",
            SortMode::RatingHigh => "rating-high",
            SortMode::RatingLow => "rating-low",
        }
    }

    fn compare(&self, a: &Game, b: &Game) -> Ordering {
        let rating = |g: &Game| g.rating.unwrap_or(0);
        match self {
            SortMode::TitleAz => a.title.cmp(&b.title),
            SortMode::TitleZa => b.title.cmp(&a.title),
            SortMode::DateOldest => a.date_added.cmp(&b.date_added),
            SortMode::DateNewest => b.date_added.cmp(&a.date_added),
            SortMode::Status => a.status.as_str().cmp(b.status.as_str()),
            SortMode::RatingHigh => rating(b).cmp(&rating(a)),
            SortMode::RatingLow => rating(a).cmp(&rating(b)),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort mode '{s}'"))
    }
}

/// Search text, filters and ordering applied to the catalog.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub search: String,
    pub platforms: HashSet<String>,
    pub genres: HashSet<String>,
    pub statuses: HashSet<GameStatus>,
    pub sort: SortMode,
}

impl Query {
    pub fn matches(&self, game: &Game) -> bool {
        self.matches_text(game)
            && any_in(&self.platforms, &game.platforms)
            && any_in(&self.genres, &game.genres)
            && (self.statuses.is_empty() || self.statuses.contains(&game.status))
    }

    fn matches_text(&self, game: &Game) -> bool {
        let needle = self.search.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        game.title.to_lowercase().contains(&needle)
            || game.genres.iter().any(|g| g.to_lowercase().contains(&needle))
    }
}

// An empty filter accepts everything.
fn any_in(filter: &HashSet<String>, values: &[String]) -> bool {
    filter.is_empty() || values.iter().any(|v| filter.contains(v))
}

/// Filters then stably sorts the catalog; ties keep their catalog order.
pub fn view<'a>(games: &'a [Game], query: &Query) -> Vec<&'a Game> {
    let mut matched: Vec<&Game> = games.iter().filter(|g| query.matches(g)).collect();
    matched.sort_by(|a, b| query.sort.compare(a, b));
    debug!(
        "View recomputed: {} of {} games, sorted by {}",
        matched.len(),
        games.len(),
        query.sort
    );
    matched
}

/// Uniformly picks one game still to be played (`want-to-play` or `playing`)
/// from an already filtered view.
pub fn pick_random<'a, R: Rng + ?Sized>(view: &[&'a Game], rng: &mut R) -> Option<&'a Game> {
    let eligible: Vec<&Game> = view.iter().copied().filter(|g| g.status.is_active()).collect();
    eligible.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GameDraft;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game(id: &str, title: &str, status: GameStatus, added: &str) -> Game {
        Game::new(
            id.to_string(),
            GameDraft {
                title: title.to_string(),
                status: Some(status),
                ..Default::default()
            },
            NaiveDate::parse_from_str(added, "%Y-%m-%d").unwrap(),
        )
    }

    fn titles(games: &[&Game]) -> Vec<String> {
        games.iter().map(|g| g.title.clone()).collect()
    }

    fn scenario() -> Vec<Game> {
        vec![
            game("1", "Hades", GameStatus::Completed, "2024-01-01"),
            game("2", "Celeste", GameStatus::Playing, "2024-02-01"),
        ]
    }

    fn library() -> Vec<Game> {
        let mut games = vec![
            game("1", "Hades", GameStatus::Completed, "2024-01-01"),
            game("2", "Celeste", GameStatus::Playing, "2024-02-01"),
            game("3", "Disco Elysium", GameStatus::WantToPlay, "2024-02-01"),
            game("4", "Anthem", GameStatus::Dropped, "2024-03-01"),
            game("5", "Balatro", GameStatus::WantToPlay, "2024-01-01"),
        ];
        games[0].genres = vec!["Roguelike".into(), "Action".into()];
        games[0].platforms = vec!["PC".into(), "Nintendo Switch".into()];
        games[0].rating = Some(5);
        games[1].genres = vec!["Platformer".into()];
        games[1].platforms = vec!["Nintendo Switch".into()];
        games[1].rating = Some(5);
        games[2].genres = vec!["RPG".into()];
        games[2].platforms = vec!["PC".into()];
        games[3].genres = vec!["Shooter".into(), "Action".into()];
        games[3].platforms = vec!["PlayStation 4".into()];
        games[3].rating = Some(1);
        games[4].genres = vec!["Roguelike".into()];
        games[4].platforms = vec!["PC".into(), "Mobile".into()];
        games
    }

    fn sorted(mode: SortMode) -> Query {
        Query {
            sort: mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_scenario_sorts_and_status_filter() {
        let games = scenario();
        assert_eq!(titles(&view(&games, &sorted(SortMode::TitleAz))), vec!["Celeste", "Hades"]);
        assert_eq!(titles(&view(&games, &sorted(SortMode::DateNewest))), vec!["Celeste", "Hades"]);

        let query = Query {
            statuses: HashSet::from([GameStatus::Completed]),
            ..Default::default()
        };
        assert_eq!(titles(&view(&games, &query)), vec!["Hades"]);
    }

    #[test]
    fn test_text_matches_title_or_genre_case_insensitive() {
        let games = library();
        let query = Query {
            search: "ROGUE".into(),
            sort: SortMode::TitleAz,
            ..Default::default()
        };
        assert_eq!(titles(&view(&games, &query)), vec!["Balatro", "Hades"]);

        let query = Query {
            search: "elys".into(),
            ..Default::default()
        };
        assert_eq!(titles(&view(&games, &query)), vec!["Disco Elysium"]);
    }

    #[test]
    fn test_search_text_is_not_trimmed() {
        let games = library();
        let query = Query {
            search: " ".into(),
            ..Default::default()
        };
        assert_eq!(titles(&view(&games, &query)), vec!["Disco Elysium"]);

        let query = Query {
            search: "hades ".into(),
            ..Default::default()
        };
        assert!(view(&games, &query).is_empty());
    }

    #[test]
    fn test_filters_are_or_within_and_across() {
        let games = library();
        let query = Query {
            platforms: HashSet::from(["PC".to_string(), "PlayStation 4".to_string()]),
            genres: HashSet::from(["Action".to_string()]),
            sort: SortMode::TitleAz,
            ..Default::default()
        };
        assert_eq!(titles(&view(&games, &query)), vec!["Anthem", "Hades"]);

        let query = Query {
            platforms: HashSet::from(["PC".to_string()]),
            statuses: HashSet::from([GameStatus::WantToPlay, GameStatus::Completed]),
            search: "a".into(),
            sort: SortMode::TitleAz,
            ..Default::default()
        };
        assert_eq!(titles(&view(&games, &query)), vec!["Balatro", "Hades"]);
    }

    #[test]
    fn test_sort_modes() {
        let games = library();
        assert_eq!(
            titles(&view(&games, &sorted(SortMode::TitleZa))),
            vec!["Hades", "Disco Elysium", "Celeste", "Balatro", "Anthem"]
        );
        assert_eq!(
            titles(&view(&games, &sorted(SortMode::Status))),
            vec!["Hades", "Anthem", "Celeste", "Disco Elysium", "Balatro"]
        );
        assert_eq!(
            titles(&view(&games, &sorted(SortMode::RatingLow))),
            vec!["Disco Elysium", "Balatro", "Anthem", "Hades", "Celeste"]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let games = library();
        // Hades/Balatro share 2024-01-01, Celeste/Disco share 2024-02-01.
        assert_eq!(
            titles(&view(&games, &sorted(SortMode::DateOldest))),
            vec!["Hades", "Balatro", "Celeste", "Disco Elysium", "Anthem"]
        );
        assert_eq!(
            titles(&view(&games, &sorted(SortMode::DateNewest))),
            vec!["Anthem", "Celeste", "Disco Elysium", "Hades", "Balatro"]
        );
        assert_eq!(
            titles(&view(&games, &sorted(SortMode::RatingHigh))),
            vec!["Hades", "Celeste", "Anthem", "Disco Elysium", "Balatro"]
        );
    }

    #[test]
    fn test_view_is_idempotent() {
        let games = library();
        for mode in SortMode::ALL {
            let query = Query {
                search: "e".into(),
                sort: mode,
                ..Default::default()
            };
            let first: Vec<_> = view(&games, &query).iter().map(|g| g.id.clone()).collect();
            let second: Vec<_> = view(&games, &query).iter().map(|g| g.id.clone()).collect();
            assert_eq!(first, second, "{mode}");
        }
    }

    #[test]
    fn test_pick_random_only_returns_active_games() {
        let games = library();
        let all = view(&games, &Query::default());
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let picked = pick_random(&all, &mut rng).unwrap();
            assert!(picked.status.is_active(), "picked {}", picked.title);
        }
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_pick_random_none_without_eligible_games() {
        let games = library();
        let query = Query {
            statuses: HashSet::from([GameStatus::Completed, GameStatus::Dropped]),
            ..Default::default()
        };
        let finished = view(&games, &query);
        assert_eq!(finished.len(), 2);
        assert!(pick_random(&finished, &mut StdRng::seed_from_u64(1)).is_none());
        assert!(pick_random(&[], &mut StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn test_sort_mode_parse() {
        assert_eq!("rating-high".parse::<SortMode>(), Ok(SortMode::RatingHigh));
        assert_eq!(SortMode::default(), SortMode::DateNewest);
        assert!("newest".parse::<SortMode>().is_err());
    }
}
