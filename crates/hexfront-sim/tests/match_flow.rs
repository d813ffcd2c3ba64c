//! A full match played through the public API: approach, spot, shoot.

use hexfront_protocol::{GameResult, SceneConfig, TankAction, TankConfig, TankId, TurnEvent, Vector};
use hexfront_sim::{FirstMover, GameState, MatchConfig, ShrinkConfig, Side};

const HUNTER: TankId = TankId(1);
const PREY: TankId = TankId(2);

fn line_map() -> Vec<SceneConfig> {
    (-4..=4)
        .flat_map(|x| (-1..=1).map(move |y| Vector::new(x, y)))
        .map(|position| SceneConfig {
            position,
            variant: 0,
        })
        .collect()
}

fn duel() -> MatchConfig {
    MatchConfig {
        side1_tanks: vec![TankConfig {
            id: HUNTER,
            position: Vector::new(-2, 0),
        }],
        side2_tanks: vec![TankConfig {
            id: PREY,
            position: Vector::new(3, 0),
        }],
        hexes: line_map(),
        sites: vec![],
        drive_range: 3,
        visibility_range: 2,
        fire_range: 2,
        shrink: ShrinkConfig {
            after: 50,
            interval: 5,
            center: Vector::ZERO,
            radius: 10,
        },
        first_mover: FirstMover::Side1,
    }
}

#[test]
fn test_approach_spot_and_destroy() {
    let config = duel();
    config.validate().expect("duel scenario should be valid");
    let mut state = GameState::new(config);

    assert!(!state.tank(Side::One, HUNTER).unwrap().visible);
    assert!(!state.tank(Side::Two, PREY).unwrap().visible);

    // Turn 1: the hunter drives into range.
    let path = vec![
        Vector::new(-2, 0),
        Vector::new(-1, 0),
        Vector::new(0, 0),
        Vector::new(1, 0),
    ];
    let (hunter_log, prey_log) = state.resolve_actions(
        &[TankAction::Move {
            tank_id: HUNTER,
            path,
        }],
        &[],
    );

    assert_eq!(
        prey_log,
        vec![
            TurnEvent::NowVisible {
                tank_id: HUNTER,
                position: Vector::new(1, 0),
            },
            TurnEvent::MoveEnd {
                tank_id: HUNTER,
                from: Vector::new(0, 0),
                to: Vector::new(1, 0),
            },
        ]
    );
    assert!(
        !hunter_log
            .iter()
            .any(|e| matches!(e, TurnEvent::NowVisible { tank_id, .. } if *tank_id == HUNTER)),
        "a side never gets visibility events about its own tank"
    );
    assert!(hunter_log.contains(&TurnEvent::NowVisible {
        tank_id: PREY,
        position: Vector::new(3, 0),
    }));
    assert!(!state.result().concluded);

    // Turn 2: the prey is exactly fire_range cells away.
    let (hunter_log, prey_log) = state.resolve_actions(
        &[TankAction::Fire {
            tank_id: HUNTER,
            direction: Vector::new(1, 0),
        }],
        &[],
    );

    let hit = TurnEvent::DestroyingExplosion {
        position: Vector::new(3, 0),
        tank_id: PREY,
    };
    assert!(hunter_log.contains(&hit));
    assert!(prey_log.contains(&hit));
    assert!(prey_log.contains(&TurnEvent::Fired {
        tank_id: HUNTER,
        direction: Vector::new(1, 0),
    }));

    let outcome = state.result();
    assert!(outcome.concluded);
    assert_eq!(outcome.for_side(Side::One), GameResult::Win);
    assert_eq!(outcome.for_side(Side::Two), GameResult::Lose);
}

#[test]
fn test_radius_strictly_decreases_once_shrinking() {
    let mut config = duel();
    config.shrink = ShrinkConfig {
        after: 2,
        interval: 1,
        center: Vector::ZERO,
        radius: 6,
    };
    let mut state = GameState::new(config);

    let mut announced = Vec::new();
    for _ in 0..4 {
        let (log, _) = state.resolve_actions(&[], &[]);
        announced.extend(log.iter().filter_map(|e| match e {
            TurnEvent::BoundaryShrunk { radius } => Some(*radius),
            _ => None,
        }));
    }
    assert_eq!(announced, vec![6, 5, 4]);
    assert_eq!(state.radius(), 3);
    assert!(!state.has_cell(Vector::new(4, 0)));
    assert!(state.has_cell(Vector::new(3, 0)));
    assert_eq!(state.living_tanks(Side::Two).count(), 1);
}
