use std::fmt::{Debug, Display};

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub r: usize,
    pub c: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.r, self.c)
    }
}

impl Position {
    pub fn new(r: usize, c: usize) -> Self {
        Self { r, c }
    }

    /// One step in `dir`, `None` if that leaves the non-negative quadrant.
    pub fn neighbor(&self, dir: Direction) -> Option<Self> {
        let (dr, dc) = dir.offset();
        Some(Self::new(
            self.r.checked_add_signed(dr)?,
            self.c.checked_add_signed(dc)?,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl TryFrom<char> for Direction {
    type Error = Error;

    fn try_from(value: char) -> std::result::Result<Self, Self::Error> {
        match value {
            '^' => Ok(Direction::Up),
            '>' => Ok(Direction::Right),
            'v' => Ok(Direction::Down),
            '<' => Ok(Direction::Left),
            other => Err(Error::InvalidCharForDirection(other)),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Direction {
    pub fn is_symbol(c: char) -> bool {
        matches!(c, '^' | '>' | 'v' | '<')
    }

    pub fn symbol(&self) -> char {
        match self {
            Direction::Up => '^',
            Direction::Right => '>',
            Direction::Down => 'v',
            Direction::Left => '<',
        }
    }

    /// Unit vector as (row delta, column delta).
    pub fn offset(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    pub fn reverse(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

/// A cell kind of the warehouse.
///
/// Both tile sets share the same floor, wall and robot semantics, they only
/// differ in how a box is laid out.
pub trait Tile: Copy + Eq + Debug + Display + TryFrom<char, Error = Error> {
    const FLOOR: Self;
    const ROBOT: Self;

    fn is_wall(&self) -> bool;

    fn is_box(&self) -> bool;

    /// The box cell whose position counts for the GPS coordinate.
    fn is_box_anchor(&self) -> bool;

    /// Where the other half of a two-cell box lies.
    fn partner(&self) -> Option<Direction> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlainTile {
    Wall,
    Robot,
    Box,
    Floor,
}

impl Display for PlainTile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tile_char = match self {
            PlainTile::Wall => '#',
            PlainTile::Robot => '@',
            PlainTile::Box => 'O',
            PlainTile::Floor => '.',
        };

        write!(f, "{}", tile_char)
    }
}

impl TryFrom<char> for PlainTile {
    type Error = Error;

    fn try_from(value: char) -> std::result::Result<Self, Self::Error> {
        match value {
            '#' => Ok(PlainTile::Wall),
            '@' => Ok(PlainTile::Robot),
            'O' => Ok(PlainTile::Box),
            '.' => Ok(PlainTile::Floor),
            other => Err(Error::InvalidCharForMap(other)),
        }
    }
}

impl Tile for PlainTile {
    const FLOOR: Self = PlainTile::Floor;
    const ROBOT: Self = PlainTile::Robot;

    fn is_wall(&self) -> bool {
        *self == PlainTile::Wall
    }

    fn is_box(&self) -> bool {
        *self == PlainTile::Box
    }

    fn is_box_anchor(&self) -> bool {
        *self == PlainTile::Box
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WideTile {
    Wall,
    BoxLeft,
    BoxRight,
    Robot,
    Floor,
}

impl Display for WideTile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tile_char = match self {
            WideTile::Wall => '#',
            WideTile::Robot => '@',
            WideTile::BoxLeft => '[',
            WideTile::BoxRight => ']',
            WideTile::Floor => '.',
        };

        write!(f, "{}", tile_char)
    }
}

impl TryFrom<char> for WideTile {
    type Error = Error;

    fn try_from(value: char) -> std::result::Result<Self, Self::Error> {
        match value {
            '#' => Ok(WideTile::Wall),
            '@' => Ok(WideTile::Robot),
            '[' => Ok(WideTile::BoxLeft),
            ']' => Ok(WideTile::BoxRight),
            '.' => Ok(WideTile::Floor),
            other => Err(Error::InvalidCharForMap(other)),
        }
    }
}

impl Tile for WideTile {
    const FLOOR: Self = WideTile::Floor;
    const ROBOT: Self = WideTile::Robot;

    fn is_wall(&self) -> bool {
        *self == WideTile::Wall
    }

    fn is_box(&self) -> bool {
        matches!(self, WideTile::BoxLeft | WideTile::BoxRight)
    }

    fn is_box_anchor(&self) -> bool {
        *self == WideTile::BoxLeft
    }

    fn partner(&self) -> Option<Direction> {
        match self {
            WideTile::BoxLeft => Some(Direction::Right),
            WideTile::BoxRight => Some(Direction::Left),
            _ => None,
        }
    }
}

/// Fixed-size warehouse grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map<T: Tile> {
    tiles: Vec<T>,
    row_n: usize,
    col_n: usize,
}

impl<T: Tile> Display for Map<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.col_n == 0 {
            return Ok(());
        }

        for row in self.tiles.chunks(self.col_n) {
            for tile in row {
                write!(f, "{}", tile)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl<T: Tile> Map<T> {
    pub fn row_n(&self) -> usize {
        self.row_n
    }

    pub fn col_n(&self) -> usize {
        self.col_n
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.r < self.row_n && pos.c < self.col_n
    }

    pub fn cell_at(&self, pos: &Position) -> Result<T, Error> {
        self.tile(pos).ok_or_else(|| Error::OutOfBounds(pos.clone()))
    }

    pub fn set_cell(&mut self, pos: &Position, tile: T) -> Result<(), Error> {
        let ind = self
            .pos_to_ind(pos)
            .ok_or_else(|| Error::OutOfBounds(pos.clone()))?;
        self.tiles[ind] = tile;
        Ok(())
    }

    /// Like [`Map::cell_at`], treating outside positions as absent.
    pub fn tile(&self, pos: &Position) -> Option<T> {
        self.pos_to_ind(pos).map(|ind| self.tiles[ind])
    }

    pub fn position_iter(&self, tile: T) -> impl Iterator<Item = Position> + use<'_, T> {
        self.tiles
            .iter()
            .enumerate()
            .filter(move |(_, this_tile)| **this_tile == tile)
            .map(|(ind, _)| self.ind_to_pos(ind))
    }

    /// Sum of `100 * row + column` over every box anchor.
    pub fn gps_sum(&self) -> usize {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_box_anchor())
            .map(|(ind, _)| {
                let pos = self.ind_to_pos(ind);
                pos.r * 100 + pos.c
            })
            .sum()
    }

    pub fn robot_position(&self) -> Result<Position, Error> {
        let mut robots = self.position_iter(T::ROBOT);
        let first = robots.next().ok_or(Error::NoRobotInMap)?;
        if let Some(second) = robots.next() {
            return Err(Error::MultipleRobots(first, second));
        }

        Ok(first)
    }

    /// Every half of a two-cell box must face its partner.
    pub fn check_box_pairs(&self) -> Result<(), Error> {
        for (ind, tile) in self.tiles.iter().enumerate() {
            if let Some(dir) = tile.partner() {
                let pos = self.ind_to_pos(ind);
                let paired = pos
                    .neighbor(dir)
                    .and_then(|other_pos| self.tile(&other_pos))
                    .and_then(|other| other.partner())
                    .is_some_and(|back| back == dir.reverse());
                if !paired {
                    return Err(Error::UnpairedBoxHalf(pos));
                }
            }
        }

        Ok(())
    }

    fn pos_to_ind(&self, pos: &Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.r * self.col_n + pos.c)
        } else {
            None
        }
    }

    fn ind_to_pos(&self, ind: usize) -> Position {
        Position::new(ind / self.col_n, ind % self.col_n)
    }
}

impl Map<PlainTile> {
    /// Doubles every cell horizontally, turning boxes into two-cell boxes.
    pub fn widen(&self) -> Map<WideTile> {
        let mut tiles = Vec::with_capacity(self.tiles.len() * 2);
        for tile in self.tiles.iter() {
            tiles.extend_from_slice(&match tile {
                PlainTile::Wall => [WideTile::Wall, WideTile::Wall],
                PlainTile::Robot => [WideTile::Robot, WideTile::Floor],
                PlainTile::Box => [WideTile::BoxLeft, WideTile::BoxRight],
                PlainTile::Floor => [WideTile::Floor, WideTile::Floor],
            });
        }

        Map::<WideTile> {
            tiles,
            row_n: self.row_n,
            col_n: self.col_n * 2,
        }
    }
}

pub struct MapBuilder<T: Tile> {
    tiles: Vec<T>,
    robot_pos: Option<Position>,
    row_n: usize,
    col_n: Option<usize>,
}

impl<T: Tile> Default for MapBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Tile> MapBuilder<T> {
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            robot_pos: None,
            row_n: 0,
            col_n: None,
        }
    }

    pub fn add_row(&mut self, text: &str) -> Result<(), Error> {
        let this_col_n = text.chars().count();
        let expect_col_n = *self.col_n.get_or_insert(this_col_n);
        if expect_col_n != this_col_n {
            return Err(Error::InconsistentRow(expect_col_n, this_col_n));
        }

        for (ind, c) in text.chars().enumerate() {
            let tile = T::try_from(c)?;
            if tile == T::ROBOT {
                let this_robot_pos = Position::new(self.row_n, ind);
                if let Some(last_robot_pos) = &self.robot_pos {
                    return Err(Error::MultipleRobots(
                        last_robot_pos.clone(),
                        this_robot_pos,
                    ));
                }
                self.robot_pos = Some(this_robot_pos);
            }
            self.tiles.push(tile);
        }
        self.row_n += 1;

        Ok(())
    }

    pub fn build(self) -> Result<Map<T>, Error> {
        if self.robot_pos.is_none() {
            return Err(Error::NoRobotInMap);
        }

        let map = Map::<T> {
            tiles: self.tiles,
            row_n: self.row_n,
            col_n: self.col_n.unwrap_or(0),
        };
        map.check_box_pairs()?;

        Ok(map)
    }
}
