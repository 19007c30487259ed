//! Chronological validation and insertion of timeline entries.

use crate::state::game::TimelineEntry;

/// Return whether a track released in `new_year` may be inserted at `position`.
///
/// `position` is an insertion index into `timeline`: `0` places the track before every
/// entry and `timeline.len()` after every entry. Equal years are accepted on both sides.
pub fn is_valid_placement(timeline: &[TimelineEntry], new_year: i32, position: usize) -> bool {
    if position > timeline.len() {
        return false;
    }

    let after_previous = position
        .checked_sub(1)
        .is_none_or(|previous| new_year >= timeline[previous].actual_year);
    let before_next = timeline
        .get(position)
        .is_none_or(|next| new_year <= next.actual_year);

    after_previous && before_next
}

/// Return a copy of `timeline` with `entry` spliced in at `position`, every entry's
/// `position` rewritten to its new index.
///
/// Callers validate the slot with [`is_valid_placement`] first.
pub fn insert(timeline: &[TimelineEntry], entry: TimelineEntry, position: usize) -> Vec<TimelineEntry> {
    let mut updated = timeline.to_vec();
    updated.insert(position.min(updated.len()), entry);

    for (index, entry) in updated.iter_mut().enumerate() {
        entry.position = index;
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, year: i32) -> TimelineEntry {
        TimelineEntry {
            track_id: id.into(),
            title: id.into(),
            artist: "artist".into(),
            album_art: String::new(),
            actual_year: year,
            guessed_year: year,
            position: 0,
        }
    }

    fn timeline(years: &[i32]) -> Vec<TimelineEntry> {
        years
            .iter()
            .enumerate()
            .map(|(index, year)| TimelineEntry {
                position: index,
                ..entry(&format!("t{index}"), *year)
            })
            .collect()
    }

    #[test]
    fn empty_timeline_accepts_first_slot() {
        assert!(is_valid_placement(&[], 1975, 0));
        assert!(!is_valid_placement(&[], 1975, 1));
    }

    #[test]
    fn bounds_are_inclusive() {
        let line = timeline(&[1970, 1980, 1990]);

        assert!(is_valid_placement(&line, 1960, 0));
        assert!(is_valid_placement(&line, 1970, 0));
        assert!(!is_valid_placement(&line, 1971, 0));

        assert!(is_valid_placement(&line, 1970, 1));
        assert!(is_valid_placement(&line, 1975, 1));
        assert!(is_valid_placement(&line, 1980, 1));
        assert!(!is_valid_placement(&line, 1985, 1));
        assert!(!is_valid_placement(&line, 1965, 1));
    }

    #[test]
    fn last_slot_requires_year_not_before_last_entry() {
        let line = timeline(&[1970, 1980]);

        assert!(is_valid_placement(&line, 1980, 2));
        assert!(is_valid_placement(&line, 2001, 2));
        assert!(!is_valid_placement(&line, 1979, 2));
        assert!(!is_valid_placement(&line, 2001, 3));
    }

    #[test]
    fn insert_renumbers_every_entry() {
        let line = timeline(&[1970, 1990]);
        let updated = insert(&line, entry("new", 1980), 1);

        let years: Vec<i32> = updated.iter().map(|e| e.actual_year).collect();
        assert_eq!(years, vec![1970, 1980, 1990]);
        for (index, entry) in updated.iter().enumerate() {
            assert_eq!(entry.position, index);
        }
        assert_eq!(updated[1].track_id, "new");
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn validated_insertions_keep_timeline_sorted() {
        let mut line = Vec::new();
        for (year, position) in [(1990, 0), (1970, 0), (1980, 1), (1980, 2), (2020, 4), (1950, 0)] {
            assert!(is_valid_placement(&line, year, position));
            line = insert(&line, entry(&year.to_string(), year), position);
        }

        assert!(line.windows(2).all(|pair| pair[0].actual_year <= pair[1].actual_year));
        assert!(line.iter().enumerate().all(|(index, e)| e.position == index));
    }
}
