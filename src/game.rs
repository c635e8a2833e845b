use std::{
    cmp::Reverse,
    collections::{HashSet, VecDeque},
    marker::PhantomData,
};

use tracing::{debug_span, trace};

use crate::{
    map::{Direction, Map, PlainTile, Position, Tile, WideTile},
    Error,
};

/// A (source, destination) pair of one cell shifted by a push.
pub type CellMove = (Position, Position);

/// How boxes react when the robot walks into them.
pub trait PushRule {
    type Tile: Tile;

    const NAME: &'static str;

    /// Plans the push started by the robot entering the box cell `start`.
    ///
    /// Returns the cells to shift, ordered so that the one farthest from the
    /// robot comes first, or `None` if anything in the way is blocked.
    fn plan_push(
        map: &Map<Self::Tile>,
        start: &Position,
        dir: Direction,
    ) -> Option<Vec<CellMove>>;

    /// Moves the robot at `robot_pos` one step in `dir` if it can, and
    /// returns where the robot ends up.
    ///
    /// A blocked move leaves the map untouched and is not an error; `Err` is
    /// only returned when a cell outside the map would be written.
    fn apply_move(
        map: &mut Map<Self::Tile>,
        robot_pos: &Position,
        dir: Direction,
    ) -> Result<Position, Error> {
        let Some(target) = robot_pos.neighbor(dir).filter(|pos| map.in_bounds(pos)) else {
            trace!(%dir, "blocked by map edge");
            return Ok(robot_pos.clone());
        };

        let target_tile = map.cell_at(&target)?;
        if target_tile.is_box() {
            let Some(moves) = Self::plan_push(map, &target, dir) else {
                trace!(%dir, %target, "push blocked");
                return Ok(robot_pos.clone());
            };

            trace!(%dir, cell_n = moves.len(), "push boxes");
            for (src, dst) in moves.iter() {
                let tile = map.cell_at(src)?;
                map.set_cell(dst, tile)?;
                map.set_cell(src, Self::Tile::FLOOR)?;
            }
        } else if target_tile != Self::Tile::FLOOR {
            trace!(%dir, %target, "blocked");
            return Ok(robot_pos.clone());
        }

        map.set_cell(robot_pos, Self::Tile::FLOOR)?;
        map.set_cell(&target, Self::Tile::ROBOT)?;
        Ok(target)
    }
}

/// Boxes taking a single cell, pushed as one straight line.
#[derive(Debug)]
pub struct SinglePush;

impl PushRule for SinglePush {
    type Tile = PlainTile;

    const NAME: &'static str = "single";

    fn plan_push(
        map: &Map<PlainTile>,
        start: &Position,
        dir: Direction,
    ) -> Option<Vec<CellMove>> {
        plan_line_push(map, start, dir)
    }
}

/// Boxes two cells wide, which may stack up into a tree when pushed
/// vertically.
#[derive(Debug)]
pub struct WidePush;

impl PushRule for WidePush {
    type Tile = WideTile;

    const NAME: &'static str = "wide";

    fn plan_push(
        map: &Map<WideTile>,
        start: &Position,
        dir: Direction,
    ) -> Option<Vec<CellMove>> {
        if dir.is_vertical() {
            plan_stacked_push(map, start, dir)
        } else {
            plan_line_push(map, start, dir)
        }
    }
}

/// Walks the whole run of box cells from `start`, then checks the single cell
/// behind it.
fn plan_line_push<T: Tile>(
    map: &Map<T>,
    start: &Position,
    dir: Direction,
) -> Option<Vec<CellMove>> {
    let mut moves = Vec::new();
    let mut pos = start.clone();
    loop {
        let tile = map.tile(&pos)?;
        if tile == T::FLOOR {
            break;
        }
        if !tile.is_box() {
            return None;
        }

        let next_pos = pos.neighbor(dir)?;
        moves.push((pos, next_pos.clone()));
        pos = next_pos;
    }

    moves.reverse();
    Some(moves)
}

/// Collects every box half that has to move along with `start`, breadth
/// first. Nothing is planned if any of them would hit a wall.
fn plan_stacked_push<T: Tile>(
    map: &Map<T>,
    start: &Position,
    dir: Direction,
) -> Option<Vec<CellMove>> {
    let mut moves = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start.clone()]);
    while let Some(pos) = queue.pop_front() {
        if !seen.insert(pos.clone()) {
            continue;
        }

        let tile = map.tile(&pos)?;
        if let Some(half_pos) = tile.partner().and_then(|half_dir| pos.neighbor(half_dir)) {
            queue.push_back(half_pos);
        }

        let next_pos = pos.neighbor(dir)?;
        let next_tile = map.tile(&next_pos)?;
        if next_tile.is_wall() {
            return None;
        }
        if next_tile.is_box() {
            queue.push_back(next_pos.clone());
        }

        moves.push((pos, next_pos));
    }

    // Reverse discovery order is farthest first within each branch; a stable
    // sort on the distance keeps that and also orders cells across branches.
    moves.reverse();
    moves.sort_by_key(|(src, _)| Reverse(src.r.abs_diff(start.r)));
    Some(moves)
}

/// What an observer sees after each move of [`BoxGame::simulate_with`].
#[derive(Debug)]
pub struct Step<'a, T: Tile> {
    pub index: usize,
    pub dir: Direction,
    pub moved: bool,
    pub robot_pos: &'a Position,
    pub map: &'a Map<T>,
}

#[derive(Debug)]
pub struct BoxGame<R: PushRule> {
    map: Map<R::Tile>,
    robot_pos: Position,
    _rule: PhantomData<R>,
}

pub type PlainBoxGame = BoxGame<SinglePush>;
pub type WideBoxGame = BoxGame<WidePush>;

impl<R: PushRule> BoxGame<R> {
    pub fn new(map: Map<R::Tile>) -> Result<Self, Error> {
        map.check_box_pairs()?;
        let robot_pos = map.robot_position()?;

        Ok(Self {
            map,
            robot_pos,
            _rule: PhantomData,
        })
    }

    /// Applies one move, returning whether the robot moved.
    pub fn step(&mut self, dir: Direction) -> Result<bool, Error> {
        let next_pos = R::apply_move(&mut self.map, &self.robot_pos, dir)?;
        let moved = next_pos != self.robot_pos;
        self.robot_pos = next_pos;
        Ok(moved)
    }

    pub fn simulate(&mut self, dirs: &[Direction]) -> Result<(), Error> {
        self.simulate_with(dirs, |_| Ok(()))
    }

    pub fn simulate_with<F>(&mut self, dirs: &[Direction], mut observer: F) -> Result<(), Error>
    where
        F: FnMut(&Step<'_, R::Tile>) -> Result<(), Error>,
    {
        let _span = debug_span!(
            "simulate",
            rule = R::NAME,
            move_n = dirs.len(),
            row_n = self.map.row_n(),
            col_n = self.map.col_n()
        )
        .entered();

        for (index, dir) in dirs.iter().enumerate() {
            let moved = self.step(*dir)?;
            observer(&Step {
                index,
                dir: *dir,
                moved,
                robot_pos: &self.robot_pos,
                map: &self.map,
            })?;
        }

        Ok(())
    }

    pub fn map(&self) -> &Map<R::Tile> {
        &self.map
    }

    pub fn robot_pos(&self) -> &Position {
        &self.robot_pos
    }

    pub fn gps_sum(&self) -> usize {
        self.map.gps_sum()
    }
}
