//! Player and population statistics.

use crate::puzzle::GameStatus;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Whose statistics to request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatsSubject {
    /// The current player across every puzzle.
    User,
    /// Everyone who played today's puzzle.
    Population,
}

/// Statistics returned by the statistics collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Statistics {
    /// Wins bucketed by turns taken; index 0 is a first-turn win.
    guess_distribution: Vec<u32>,
    /// Sum of the distribution.
    total_guesses: u32,
    /// The player's win rate, percent.
    user_win_rate: u32,
    /// Win rate of the requested subject, percent.
    win_rate: u32,
    /// Average guesses per win of the requested subject.
    average_guesses: u32,
}

impl Statistics {
    /// Bar widths for the distribution, as percentages of the total.
    #[instrument(skip(self))]
    pub fn percentages(&self) -> Vec<f64> {
        self.guess_distribution
            .iter()
            .map(|count| {
                if self.total_guesses == 0 {
                    0.0
                } else {
                    f64::from(*count) / f64::from(self.total_guesses) * 100.0
                }
            })
            .collect()
    }
}

/// A stored game, as far as statistics are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct GameRecord {
    /// Final or current status.
    pub status: GameStatus,
    /// Guesses submitted.
    pub guesses: u32,
}

/// Aggregates over a set of games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct Summary {
    win_rate: u32,
    average_guesses: u32,
}

/// Rounds to the nearest integer with halves rounding up.
pub fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor() as u32
}

/// Win rate and average guesses per win over finished games.
///
/// Games still in progress are ignored. Both figures are 0 when there is
/// nothing to divide by.
#[instrument(skip(records), fields(count = records.len()))]
pub fn summarize(records: &[GameRecord]) -> Summary {
    let finished = records.iter().filter(|r| r.status.is_terminal()).count() as u32;
    let won: Vec<_> = records.iter().filter(|r| r.status == GameStatus::Won).collect();
    let wins = won.len() as u32;
    let guesses: u32 = won.iter().map(|r| r.guesses).sum();

    let win_rate = if finished == 0 {
        0
    } else {
        round_half_up(f64::from(wins) / f64::from(finished) * 100.0)
    };
    let average_guesses = if wins == 0 {
        0
    } else {
        round_half_up(f64::from(guesses) / f64::from(wins))
    };

    Summary {
        win_rate,
        average_guesses,
    }
}

/// A player's win rate from their win and loss counts.
pub fn user_win_rate(won: u32, lost: u32) -> u32 {
    match won + lost {
        0 => 0,
        total => round_half_up(f64::from(won) / f64::from(total) * 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_mixed_games() {
        let records = [
            GameRecord::new(GameStatus::Won, 6),
            GameRecord::new(GameStatus::Lost, 0),
            GameRecord::new(GameStatus::Won, 3),
            GameRecord::new(GameStatus::Won, 1),
            GameRecord::new(GameStatus::InProgress, 2),
        ];
        let summary = summarize(&records);
        assert_eq!(*summary.win_rate(), 75);
        assert_eq!(*summary.average_guesses(), 3);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(*summary.win_rate(), 0);
        assert_eq!(*summary.average_guesses(), 0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(user_win_rate(1, 1), 50);
        assert_eq!(user_win_rate(2, 1), 67);
        assert_eq!(user_win_rate(0, 0), 0);
    }

    #[test]
    fn test_percentages() {
        let stats = Statistics::new(vec![1, 0, 3, 0], 4, 100, 80, 3);
        assert_eq!(stats.percentages(), vec![25.0, 0.0, 75.0, 0.0]);

        let empty = Statistics::new(vec![0; 10], 0, 0, 0, 0);
        assert!(empty.percentages().iter().all(|p| *p == 0.0));
    }

    #[test]
    fn test_subject_strings() {
        assert_eq!(StatsSubject::Population.to_string(), "population");
        assert_eq!("user".parse::<StatsSubject>().unwrap(), StatsSubject::User);
    }
}
