//! Seat assignment rules keeping the two teams balanced.
//!
//! These are pure functions over the currently occupied seats so the lobby
//! logic and its tests share one source of truth for fairness.

use crate::state::session::{Position, Team};

/// Pick the seat for an incoming player given the seats already taken.
///
/// The player goes to the team with strictly fewer members (Blue on a tie)
/// and fills that team's goalie vacancy before the forward one, regardless of
/// join order.
pub fn assign_seat(seated: &[(Team, Position)]) -> (Team, Position) {
    let blue = seated.iter().filter(|(team, _)| *team == Team::Blue).count();
    let red = seated.iter().filter(|(team, _)| *team == Team::Red).count();

    let team = if blue <= red { Team::Blue } else { Team::Red };
    let has_goalie = seated
        .iter()
        .any(|(t, position)| *t == team && *position == Position::Goalie);
    let position = if has_goalie {
        Position::Forward
    } else {
        Position::Goalie
    };

    (team, position)
}

/// Seat layout used after a shuffle: slots 0 and 1 are Blue, the rest Red;
/// even slots take the goalie seat, odd slots the forward seat.
pub fn seat_for_slot(slot: usize) -> (Team, Position) {
    let team = if slot < 2 { Team::Blue } else { Team::Red };
    let position = if slot % 2 == 0 {
        Position::Goalie
    } else {
        Position::Forward
    };
    (team, position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_player_is_blue_goalie() {
        assert_eq!(assign_seat(&[]), (Team::Blue, Position::Goalie));
    }

    #[test]
    fn second_player_goes_to_red_goal() {
        let seated = [(Team::Blue, Position::Goalie)];
        assert_eq!(assign_seat(&seated), (Team::Red, Position::Goalie));
    }

    #[test]
    fn tie_prefers_blue_and_fills_its_forward_seat() {
        let seated = [(Team::Blue, Position::Goalie), (Team::Red, Position::Goalie)];
        assert_eq!(assign_seat(&seated), (Team::Blue, Position::Forward));
    }

    #[test]
    fn goalie_vacancy_is_filled_before_forward() {
        // Blue only has a forward, so the newcomer tends the blue goal.
        let seated = [(Team::Blue, Position::Forward), (Team::Red, Position::Goalie)];
        assert_eq!(assign_seat(&seated), (Team::Blue, Position::Goalie));
    }

    #[test]
    fn any_join_sequence_stays_balanced() {
        let mut seated: Vec<(Team, Position)> = Vec::new();
        for _ in 0..4 {
            seated.push(assign_seat(&seated));

            let blue: Vec<_> = seated.iter().filter(|(t, _)| *t == Team::Blue).collect();
            let red: Vec<_> = seated.iter().filter(|(t, _)| *t == Team::Red).collect();
            assert!(blue.len().abs_diff(red.len()) <= 1);

            for side in [&blue, &red] {
                let goalies = side.iter().filter(|(_, p)| *p == Position::Goalie).count();
                let forwards = side.iter().filter(|(_, p)| *p == Position::Forward).count();
                assert!(goalies <= 1);
                assert!(forwards <= 1);
            }
        }
    }

    #[test]
    fn shuffle_slots_cover_two_full_teams() {
        assert_eq!(seat_for_slot(0), (Team::Blue, Position::Goalie));
        assert_eq!(seat_for_slot(1), (Team::Blue, Position::Forward));
        assert_eq!(seat_for_slot(2), (Team::Red, Position::Goalie));
        assert_eq!(seat_for_slot(3), (Team::Red, Position::Forward));
    }
}
