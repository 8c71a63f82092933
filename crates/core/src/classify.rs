//! Group classification for the view layer.

use crate::groups::Group;
use crate::types::{Tier, ViewEvent};

/// Tier for a group of `size` cells
pub fn classify(size: usize) -> Tier {
    Tier::from_group_size(size)
}

/// One `GroupClassified` event per group, in the given order
pub fn classify_groups(groups: &[Group]) -> Vec<ViewEvent> {
    groups
        .iter()
        .map(|group| ViewEvent::GroupClassified {
            cells: group.cells.clone(),
            tier: classify(group.len()),
            color: group.color,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::groups::find_all_groups;
    use crate::types::Pos;

    #[test]
    fn test_events_follow_group_order() {
        let board = Board::from_columns(
            2,
            &[vec![0, 0, 0, 0, 0], vec![1, 1, 1, 1, 1], vec![0, 0, 0, 0, 0]],
        )
        .unwrap();
        let events = classify_groups(&find_all_groups(&board));

        assert_eq!(events.len(), 3);
        match &events[1] {
            ViewEvent::GroupClassified { cells, tier, color } => {
                assert_eq!(*color, 1);
                assert_eq!(*tier, Tier::A);
                assert_eq!(cells[0], Pos::new(1, 0));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_default_tier_for_small_groups() {
        let board = Board::from_columns(2, &[vec![0, 1], vec![1, 0]]).unwrap();
        let events = classify_groups(&find_all_groups(&board));
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| matches!(
            e,
            ViewEvent::GroupClassified {
                tier: Tier::Default,
                ..
            }
        )));
    }
}
