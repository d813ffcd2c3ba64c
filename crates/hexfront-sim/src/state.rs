//! The authoritative match state and turn resolution.

use std::collections::{BTreeMap, HashMap};

use hexfront_protocol::{ClientConfig, GameResult, TankAction, TankId, TurnEvent, Vector};

use crate::{MatchConfig, Side};

/// A tank on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tank {
    pub id: TankId,
    pub position: Vector,
    /// Already acted this turn.
    pub exercised: bool,
    /// Currently in view of the opposing side.
    pub visible: bool,
    pub destroyed: bool,
    /// The opposing side has been told this tank is destroyed.
    pub seen: bool,
}

impl Tank {
    fn new(id: TankId, position: Vector) -> Self {
        Self {
            id,
            position,
            exercised: false,
            visible: false,
            destroyed: false,
            seen: false,
        }
    }

    fn alive(&self) -> bool {
        !self.destroyed
    }
}

type Roster = BTreeMap<TankId, Tank>;

/// Per-side event logs for one turn, indexed by [`Side::index`].
type Logs = [Vec<TurnEvent>; 2];

/// Where a match stands after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub side1: GameResult,
    pub side2: GameResult,
    /// `false` while both sides still have a living tank.
    pub concluded: bool,
}

impl MatchOutcome {
    pub fn for_side(&self, side: Side) -> GameResult {
        match side {
            Side::One => self.side1,
            Side::Two => self.side2,
        }
    }
}

/// Cells, rosters, turn counter and boundary of one match.
///
/// Owned by exactly one match actor. Nothing in here is shared.
#[derive(Debug, Clone)]
pub struct GameState {
    config: MatchConfig,
    rosters: [Roster; 2],
    /// Mapped cells; the value is `true` when traversable.
    cells: HashMap<Vector, bool>,
    turn: u32,
    radius: u32,
    side1_first: bool,
}

impl GameState {
    /// Builds the board and seeds mutual visibility.
    ///
    /// Any two opposing tanks that start within visibility range are both
    /// marked visible, so turn one does not announce tanks that were in
    /// view from the start. The config is expected to have passed
    /// [`MatchConfig::validate`].
    pub fn new(config: MatchConfig) -> Self {
        let roster = |side: Side| -> Roster {
            config
                .tanks(side)
                .iter()
                .map(|t| (t.id, Tank::new(t.id, t.position)))
                .collect()
        };
        let mut rosters = [roster(Side::One), roster(Side::Two)];

        let range = config.visibility_range;
        let [one, two] = &mut rosters;
        for a in one.values_mut() {
            for b in two.values_mut() {
                if a.position.distance(b.position) <= range {
                    a.visible = true;
                    b.visible = true;
                }
            }
        }

        Self {
            cells: config.cell_map(),
            turn: 1,
            radius: config.shrink.radius,
            side1_first: config.first_mover.side1_first(),
            rosters,
            config,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// The view handed to `side` when the match starts.
    pub fn client_config(&self, side: Side) -> ClientConfig {
        self.config.client_config(side)
    }

    /// The turn that the next call to [`resolve_actions`](Self::resolve_actions)
    /// resolves. Starts at 1.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// The radius the next shrink will enforce.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn side1_first(&self) -> bool {
        self.side1_first
    }

    /// Whether `position` is still part of the map.
    pub fn has_cell(&self, position: Vector) -> bool {
        self.cells.contains_key(&position)
    }

    pub fn tank(&self, side: Side, id: TankId) -> Option<&Tank> {
        self.rosters[side.index()].get(&id)
    }

    pub fn living_tanks(&self, side: Side) -> impl Iterator<Item = &Tank> {
        self.rosters[side.index()].values().filter(|t| t.alive())
    }

    /// Resolves one full turn and returns each side's event log.
    ///
    /// The two half-turns run in the current first-mover order, then the
    /// boundary shrinks if scheduled. Afterwards every tank may act again,
    /// the first mover swaps and the turn counter advances.
    ///
    /// Actions naming unknown, destroyed or already exercised tanks are
    /// dropped without producing events, as are illegal paths and
    /// non-unit fire directions.
    pub fn resolve_actions(
        &mut self,
        side1: &[TankAction],
        side2: &[TankAction],
    ) -> (Vec<TurnEvent>, Vec<TurnEvent>) {
        let mut logs: Logs = Default::default();
        let order = if self.side1_first {
            [(Side::One, side1), (Side::Two, side2)]
        } else {
            [(Side::Two, side2), (Side::One, side1)]
        };

        for (side, actions) in order {
            for action in actions {
                self.apply(side, action, &mut logs);
            }
        }

        self.shrink(&mut logs);

        for roster in &mut self.rosters {
            for tank in roster.values_mut() {
                tank.exercised = false;
            }
        }
        self.side1_first = !self.side1_first;
        self.turn += 1;

        if self.config.shrink.shrinks_on(self.turn) {
            for log in &mut logs {
                log.push(TurnEvent::BoundaryWarning {
                    radius: self.radius,
                });
            }
        }

        tracing::debug!(
            turn = self.turn - 1,
            side1_events = logs[0].len(),
            side2_events = logs[1].len(),
            "turn resolved"
        );
        let [one, two] = logs;
        (one, two)
    }

    /// Scores the match from both sides.
    pub fn result(&self) -> MatchOutcome {
        let alive = Side::ALL.map(|side| self.living_tanks(side).next().is_some());
        let (side1, concluded) = match alive {
            [true, true] => (GameResult::Draw, false),
            [false, false] => (GameResult::Draw, true),
            [true, false] => (GameResult::Win, true),
            [false, true] => (GameResult::Lose, true),
        };
        MatchOutcome {
            side1,
            side2: side1.inverse(),
            concluded,
        }
    }

    // -- half-turn ---------------------------------------------------------

    fn apply(&mut self, side: Side, action: &TankAction, logs: &mut Logs) {
        let id = action.tank_id();
        let Some(tank) = self.rosters[side.index()].get_mut(&id) else {
            tracing::trace!(%side, tank = %id, "action for unknown tank dropped");
            return;
        };
        if tank.exercised || tank.destroyed {
            tracing::trace!(%side, tank = %id, "action for spent tank dropped");
            return;
        }
        tank.exercised = true;
        let position = tank.position;

        match action {
            TankAction::Move { path, .. } => self.drive(side, id, position, path, logs),
            TankAction::Fire { direction, .. } => {
                self.fire(side, id, position, *direction, logs)
            }
        }
    }

    fn drive(
        &mut self,
        side: Side,
        id: TankId,
        start: Vector,
        path: &[Vector],
        logs: &mut Logs,
    ) {
        let path = self.valid_path(start, path);
        if path.len() < 2 {
            tracing::trace!(%side, tank = %id, "move without a valid step dropped");
            return;
        }

        let seen_by_opponent = self.is_visible(side, id);
        report(
            logs,
            side,
            seen_by_opponent,
            TurnEvent::MoveStart {
                tank_id: id,
                from: path[0],
                to: path[1],
            },
        );

        for step in path.windows(3) {
            let event = TurnEvent::MoveStep {
                tank_id: id,
                from: step[0],
                via: step[1],
                to: step[2],
            };
            self.step(side, id, step[1], event, logs);
        }

        let last = path.len() - 1;
        let event = TurnEvent::MoveEnd {
            tank_id: id,
            from: path[last - 1],
            to: path[last],
        };
        self.step(side, id, path[last], event, logs);
    }

    /// Moves a tank one cell and reports the step to the opponent if the
    /// tank was or became visible to them.
    fn step(&mut self, side: Side, id: TankId, to: Vector, event: TurnEvent, logs: &mut Logs) {
        let was_visible = self.is_visible(side, id);
        if let Some(tank) = self.rosters[side.index()].get_mut(&id) {
            tank.position = to;
        }
        self.update_visibility(logs);
        let now_visible = self.is_visible(side, id);
        report(logs, side, was_visible || now_visible, event);
    }

    /// The longest legal prefix of `path`.
    ///
    /// Empty when the path is too short, too long, or does not start at
    /// `start`. Otherwise each step must be a unit move onto a free,
    /// traversable cell not already on the path.
    fn valid_path(&self, start: Vector, path: &[Vector]) -> Vec<Vector> {
        let max_points = self.config.drive_range as usize + 1;
        if path.len() < 2 || path.len() > max_points || path[0] != start {
            return Vec::new();
        }

        let mut valid = vec![start];
        let mut prev = start;
        for &next in &path[1..] {
            if prev.distance(next) != 1 || valid.contains(&next) || !self.is_traversable(next) {
                break;
            }
            valid.push(next);
            prev = next;
        }
        valid
    }

    fn fire(
        &mut self,
        side: Side,
        id: TankId,
        origin: Vector,
        direction: Vector,
        logs: &mut Logs,
    ) {
        if !direction.is_unit() {
            tracing::trace!(%side, tank = %id, %direction, "fire with non-unit direction dropped");
            return;
        }

        report(
            logs,
            side,
            self.is_visible(side, id),
            TurnEvent::Fired {
                tank_id: id,
                direction,
            },
        );

        let mut impact = origin;
        for _ in 0..self.config.fire_range {
            impact = impact + direction;
            if self.blocks_shot(impact) {
                break;
            }
        }

        // Who can see the impact is decided before anything is destroyed.
        let sees = Side::ALL.map(|viewer| self.cell_in_view(viewer, impact));

        let victim = Side::ALL.into_iter().find_map(|owner| {
            self.rosters[owner.index()]
                .values()
                .find(|t| t.alive() && t.position == impact)
                .map(|t| (owner, t.id))
        });

        let Some((owner, victim)) = victim else {
            for viewer in Side::ALL {
                if sees[viewer.index()] {
                    logs[viewer.index()].push(TurnEvent::Explosion { position: impact });
                }
            }
            return;
        };

        tracing::trace!(%side, tank = %id, %owner, victim = %victim, %impact, "tank destroyed");
        let opponent_sees = sees[owner.opponent().index()];
        if let Some(tank) = self.rosters[owner.index()].get_mut(&victim) {
            tank.destroyed = true;
            tank.seen = opponent_sees;
        }
        for viewer in Side::ALL {
            if sees[viewer.index()] {
                logs[viewer.index()].push(TurnEvent::DestroyingExplosion {
                    position: impact,
                    tank_id: victim,
                });
            }
        }
        self.update_visibility(logs);
    }

    // -- boundary ----------------------------------------------------------

    fn shrink(&mut self, logs: &mut Logs) {
        if !self.config.shrink.shrinks_on(self.turn) {
            return;
        }
        let center = self.config.shrink.center;
        let radius = self.radius;

        for side in Side::ALL {
            for tank in self.rosters[side.index()].values_mut() {
                if tank.destroyed || tank.position.distance(center) < radius {
                    continue;
                }
                tank.destroyed = true;
                let event = TurnEvent::Destroyed {
                    position: tank.position,
                    tank_id: tank.id,
                };
                if tank.visible {
                    tank.seen = true;
                    logs[side.opponent().index()].push(event.clone());
                }
                logs[side.index()].push(event);
            }
        }

        self.cells.retain(|cell, _| cell.distance(center) < radius);
        for log in logs.iter_mut() {
            log.push(TurnEvent::BoundaryShrunk { radius });
        }
        self.update_visibility(logs);

        tracing::debug!(turn = self.turn, radius, "boundary shrunk");
        self.radius = radius.saturating_sub(1);
    }

    // -- visibility --------------------------------------------------------

    /// Re-evaluates every not-yet-seen tank against the opposing side's
    /// living tanks and logs the transitions to that opposing side.
    fn update_visibility(&mut self, logs: &mut Logs) {
        let range = self.config.visibility_range;
        for viewer in Side::ALL {
            let log = &mut logs[viewer.index()];
            let (targets, watchers) = self.split_rosters(viewer.opponent());

            for tank in targets.values_mut().filter(|t| !t.seen) {
                let in_view = watchers
                    .values()
                    .any(|w| w.alive() && w.position.distance(tank.position) <= range);

                if tank.destroyed {
                    if in_view {
                        tank.seen = true;
                        log.push(TurnEvent::Destroyed {
                            position: tank.position,
                            tank_id: tank.id,
                        });
                    }
                } else if in_view && !tank.visible {
                    log.push(TurnEvent::NowVisible {
                        tank_id: tank.id,
                        position: tank.position,
                    });
                } else if !in_view && tank.visible {
                    log.push(TurnEvent::NowHidden {
                        tank_id: tank.id,
                        position: tank.position,
                    });
                }
                tank.visible = in_view;
            }
        }
    }

    /// `side`'s roster mutably, alongside its opponent's.
    fn split_rosters(&mut self, side: Side) -> (&mut Roster, &Roster) {
        let [one, two] = &mut self.rosters;
        match side {
            Side::One => (one, &*two),
            Side::Two => (two, &*one),
        }
    }

    fn is_visible(&self, side: Side, id: TankId) -> bool {
        self.tank(side, id).is_some_and(|t| t.visible)
    }

    fn cell_in_view(&self, viewer: Side, cell: Vector) -> bool {
        let range = self.config.visibility_range;
        self.living_tanks(viewer)
            .any(|t| t.position.distance(cell) <= range)
    }

    // -- occupancy ---------------------------------------------------------

    fn occupied(&self, cell: Vector) -> bool {
        Side::ALL
            .into_iter()
            .any(|side| self.living_tanks(side).any(|t| t.position == cell))
    }

    fn is_traversable(&self, cell: Vector) -> bool {
        self.cells.get(&cell) == Some(&true) && !self.occupied(cell)
    }

    /// Sites and living tanks stop a shell; unmapped cells do not.
    fn blocks_shot(&self, cell: Vector) -> bool {
        self.cells.get(&cell) == Some(&false) || self.occupied(cell)
    }
}

/// Logs an event for the acting side and, if `opponent_sees`, for the
/// opposing side as well.
fn report(logs: &mut Logs, side: Side, opponent_sees: bool, event: TurnEvent) {
    if opponent_sees {
        logs[side.opponent().index()].push(event.clone());
    }
    logs[side.index()].push(event);
}
