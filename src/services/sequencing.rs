//! Episode sequencing invariant.
//!
//! Episodes within a podcast are strictly ordered by (season, chapter) in
//! creation order: each new episode must lexicographically follow the most
//! recently created one, and a season advance resets the chapter to 1.
//!
//! This is a pure check over (last, candidate); callers must run it inside
//! the same transaction as the episode insert so two concurrent appends
//! cannot both validate against the same stale "last" episode.

use thiserror::Error;

/// A (season, chapter) position within a podcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeasonChapter {
    pub season: i32,
    pub chapter: i32,
}

impl SeasonChapter {
    #[must_use]
    pub const fn new(season: i32, chapter: i32) -> Self {
        Self { season, chapter }
    }
}

impl std::fmt::Display for SeasonChapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}E{}", self.season, self.chapter)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceViolation {
    #[error("Season and chapter must both be >= 1, got {candidate}")]
    NotPositive { candidate: SeasonChapter },

    #[error("Episode {candidate} must come after the latest episode {last}")]
    NotAfterLast {
        last: SeasonChapter,
        candidate: SeasonChapter,
    },

    #[error("Episode {candidate} opens a new season, so its chapter must be 1")]
    ChapterNotReset { candidate: SeasonChapter },
}

/// Validates a candidate (season, chapter) against the podcast's most
/// recently created episode.
///
/// With no prior episode any position with season >= 1 and chapter >= 1 is
/// accepted. Otherwise the candidate must strictly follow `last`:
/// same season with a higher chapter, or a higher season with chapter 1.
pub fn validate_append(
    last: Option<SeasonChapter>,
    candidate: SeasonChapter,
) -> Result<(), SequenceViolation> {
    if candidate.season < 1 || candidate.chapter < 1 {
        return Err(SequenceViolation::NotPositive { candidate });
    }

    let Some(last) = last else {
        return Ok(());
    };

    if candidate.season < last.season
        || (candidate.season == last.season && candidate.chapter <= last.chapter)
    {
        return Err(SequenceViolation::NotAfterLast { last, candidate });
    }

    if candidate.season > last.season && candidate.chapter != 1 {
        return Err(SequenceViolation::ChapterNotReset { candidate });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sc(season: i32, chapter: i32) -> SeasonChapter {
        SeasonChapter::new(season, chapter)
    }

    #[test]
    fn first_episode_accepts_any_valid_position() {
        assert!(validate_append(None, sc(1, 1)).is_ok());
        assert!(validate_append(None, sc(3, 7)).is_ok());
    }

    #[test]
    fn first_episode_rejects_non_positive_positions() {
        assert_eq!(
            validate_append(None, sc(0, 1)),
            Err(SequenceViolation::NotPositive { candidate: sc(0, 1) })
        );
        assert_eq!(
            validate_append(None, sc(1, 0)),
            Err(SequenceViolation::NotPositive { candidate: sc(1, 0) })
        );
        assert_eq!(
            validate_append(None, sc(-1, 2)),
            Err(SequenceViolation::NotPositive { candidate: sc(-1, 2) })
        );
    }

    #[test]
    fn next_chapter_in_same_season_is_accepted() {
        assert!(validate_append(Some(sc(1, 5)), sc(1, 6)).is_ok());
        // Gaps are allowed as long as the ordering is strict.
        assert!(validate_append(Some(sc(1, 5)), sc(1, 9)).is_ok());
    }

    #[test]
    fn same_or_earlier_position_is_rejected() {
        for candidate in [sc(1, 5), sc(1, 4), sc(1, 1)] {
            assert_eq!(
                validate_append(Some(sc(1, 5)), candidate),
                Err(SequenceViolation::NotAfterLast {
                    last: sc(1, 5),
                    candidate
                })
            );
        }
    }

    #[test]
    fn earlier_season_is_rejected() {
        assert_eq!(
            validate_append(Some(sc(2, 1)), sc(1, 9)),
            Err(SequenceViolation::NotAfterLast {
                last: sc(2, 1),
                candidate: sc(1, 9)
            })
        );
    }

    #[test]
    fn new_season_must_start_at_chapter_one() {
        assert!(validate_append(Some(sc(1, 5)), sc(2, 1)).is_ok());
        assert_eq!(
            validate_append(Some(sc(1, 5)), sc(2, 2)),
            Err(SequenceViolation::ChapterNotReset { candidate: sc(2, 2) })
        );
        // Skipping a season entirely is still a season advance.
        assert!(validate_append(Some(sc(1, 5)), sc(3, 1)).is_ok());
        assert_eq!(
            validate_append(Some(sc(1, 5)), sc(3, 4)),
            Err(SequenceViolation::ChapterNotReset { candidate: sc(3, 4) })
        );
    }
}
