//! Best-effort matching of feed entries to local games.
//!
//! The upstream feed carries no durable ids, so association is a
//! heuristic on team names. The heuristic sits behind `GameMatcher` so a
//! stable-id feed can swap in without touching the poller's control
//! flow.

use crate::types::{ExternalGame, Game};

/// Trim and case-fold a team name for comparison.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Pluggable association between one feed entry and at most one local game.
pub trait GameMatcher: Send + Sync {
    fn find_match<'a>(&self, locals: &'a [Game], external: &ExternalGame) -> Option<&'a Game>;
}

/// Default heuristic: normalized home AND away names must both match
/// exactly. Locals with a blank team name never match. First match wins;
/// duplicate team-name pairs are ambiguous and resolved arbitrarily.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamNameMatcher;

impl GameMatcher for TeamNameMatcher {
    fn find_match<'a>(&self, locals: &'a [Game], external: &ExternalGame) -> Option<&'a Game> {
        let ext_home = normalize(external.home_team.as_deref()?);
        let ext_away = normalize(external.away_team.as_deref()?);

        locals.iter().find(|local| {
            !local.home_team.trim().is_empty()
                && !local.away_team.trim().is_empty()
                && normalize(&local.home_team) == ext_home
                && normalize(&local.away_team) == ext_away
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(home: &str, away: &str) -> Game {
        let mut g = Game::new(home, away);
        g.id = uuid::Uuid::new_v4();
        g
    }

    fn external(home: &str, away: &str) -> ExternalGame {
        ExternalGame {
            home_team: Some(home.to_string()),
            away_team: Some(away.to_string()),
            ..ExternalGame::default()
        }
    }

    #[test]
    fn matches_ignoring_case_and_whitespace() {
        let locals = vec![local("College A", "College B")];
        let matcher = TeamNameMatcher;
        let found = matcher.find_match(&locals, &external("college a ", " COLLEGE B"));
        assert_eq!(found.map(|g| g.id), Some(locals[0].id));
    }

    #[test]
    fn both_names_must_match() {
        let locals = vec![local("College A", "College B")];
        let matcher = TeamNameMatcher;
        assert!(matcher.find_match(&locals, &external("College A", "College C")).is_none());
        assert!(matcher.find_match(&locals, &external("College C", "College B")).is_none());
    }

    #[test]
    fn blank_local_names_never_match() {
        let locals = vec![local("", ""), Game::new("  ", "College B")];
        let matcher = TeamNameMatcher;
        assert!(matcher.find_match(&locals, &external("", "")).is_none());
        assert!(matcher.find_match(&locals, &external("  ", "College B")).is_none());
    }

    #[test]
    fn absent_external_names_never_match() {
        let locals = vec![local("College A", "College B")];
        let matcher = TeamNameMatcher;
        assert!(matcher.find_match(&locals, &ExternalGame::default()).is_none());
    }

    #[test]
    fn first_match_wins_on_duplicates() {
        let locals = vec![
            local("College A", "College B"),
            local("College A", "College B"),
        ];
        let matcher = TeamNameMatcher;
        let found = matcher.find_match(&locals, &external("College A", "College B"));
        assert_eq!(found.map(|g| g.id), Some(locals[0].id));
    }
}
