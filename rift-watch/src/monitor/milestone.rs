//! Games-played milestones.

/// Milestones are every 50 games up to this value, every 100 above it.
const DENSE_MILESTONE_LIMIT: u32 = 250;

pub fn is_milestone(games: u32) -> bool {
    match games {
        0 => false,
        g if g <= DENSE_MILESTONE_LIMIT => g % 50 == 0,
        g => g % 100 == 0,
    }
}

/// Highest milestone `m` with `previous < m <= current`.
pub fn crossed_milestone(previous: u32, current: u32) -> Option<u32> {
    let highest = if current >= (DENSE_MILESTONE_LIMIT / 100 + 1) * 100 {
        current / 100 * 100
    } else if current >= 50 {
        (current / 50 * 50).min(DENSE_MILESTONE_LIMIT)
    } else {
        return None;
    };
    (highest > previous).then_some(highest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_milestone() {
        assert!(is_milestone(50));
        assert!(is_milestone(250));
        assert!(!is_milestone(0));
        assert!(!is_milestone(75));
        assert!(!is_milestone(350));
        assert!(is_milestone(300));
        assert!(is_milestone(1000));
    }

    #[test]
    fn test_crossed_milestone() {
        assert_eq!(crossed_milestone(49, 50), Some(50));
        assert_eq!(crossed_milestone(50, 51), None);
        assert_eq!(crossed_milestone(248, 252), Some(250));
        assert_eq!(crossed_milestone(260, 299), None);
        assert_eq!(crossed_milestone(299, 301), Some(300));
        assert_eq!(crossed_milestone(90, 160), Some(150));
        assert_eq!(crossed_milestone(0, 10), None);
        // season reset
        assert_eq!(crossed_milestone(400, 3), None);
    }

    #[test]
    fn test_crossed_value_is_always_a_milestone() {
        for previous in 0..700 {
            for step in 1..5 {
                if let Some(m) = crossed_milestone(previous, previous + step) {
                    assert!(is_milestone(m), "{m} is not a milestone");
                    assert!(m > previous && m <= previous + step);
                }
            }
        }
    }
}
