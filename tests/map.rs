use warehouse::{
    game::{BoxGame, SinglePush, WideBoxGame},
    map::{Direction, Map, MapBuilder, PlainTile, Position, WideTile},
    parse_game, Error,
};

fn plain_map(rows: &[&str]) -> Map<PlainTile> {
    let mut builder = MapBuilder::<PlainTile>::new();
    for row in rows {
        builder.add_row(row).unwrap();
    }
    builder.build().unwrap()
}

#[test]
fn cell_access_is_bounds_checked() {
    let mut map = plain_map(&["#####", "#@O.#", "#####"]);

    assert!(map.in_bounds(&Position::new(2, 4)));
    assert!(!map.in_bounds(&Position::new(3, 0)));
    assert!(!map.in_bounds(&Position::new(0, 5)));
    assert_eq!(map.cell_at(&Position::new(1, 2)).unwrap(), PlainTile::Box);
    assert!(matches!(
        map.cell_at(&Position::new(1, 5)),
        Err(Error::OutOfBounds(pos)) if pos == Position::new(1, 5)
    ));

    map.set_cell(&Position::new(1, 3), PlainTile::Box).unwrap();
    assert_eq!(map.tile(&Position::new(1, 3)), Some(PlainTile::Box));
    assert!(matches!(
        map.set_cell(&Position::new(3, 1), PlainTile::Wall),
        Err(Error::OutOfBounds(_))
    ));
    assert_eq!(map.to_string(), "#####\n#@OO#\n#####\n");
}

#[test]
fn direction_symbols_resolve_to_unit_vectors() {
    let offsets = "^v<>"
        .chars()
        .map(|c| Direction::try_from(c).unwrap().offset())
        .collect::<Vec<_>>();
    assert_eq!(offsets, vec![(-1, 0), (1, 0), (0, -1), (0, 1)]);

    assert!(matches!(
        Direction::try_from('x'),
        Err(Error::InvalidCharForDirection('x'))
    ));
    assert_eq!(Position::new(0, 3).neighbor(Direction::Up), None);
    assert_eq!(
        Position::new(0, 3).neighbor(Direction::Left),
        Some(Position::new(0, 2))
    );
}

#[test]
fn builder_rejects_structural_violations() {
    let mut builder = MapBuilder::<PlainTile>::new();
    builder.add_row("#@.#").unwrap();
    assert!(matches!(
        builder.add_row("#.#"),
        Err(Error::InconsistentRow(4, 3))
    ));

    let mut builder = MapBuilder::<PlainTile>::new();
    builder.add_row("#@.#").unwrap();
    assert!(matches!(
        builder.add_row("#.@#"),
        Err(Error::MultipleRobots(first, second))
            if first == Position::new(0, 1) && second == Position::new(1, 2)
    ));

    let mut builder = MapBuilder::<PlainTile>::new();
    assert!(matches!(
        builder.add_row("#@[]#"),
        Err(Error::InvalidCharForMap('['))
    ));

    let mut builder = MapBuilder::<PlainTile>::new();
    builder.add_row("#.O.#").unwrap();
    assert!(matches!(builder.build(), Err(Error::NoRobotInMap)));

    let mut builder = MapBuilder::<WideTile>::new();
    builder.add_row("##@[.##").unwrap();
    assert!(matches!(
        builder.build(),
        Err(Error::UnpairedBoxHalf(pos)) if pos == Position::new(0, 3)
    ));

    let mut builder = MapBuilder::<WideTile>::new();
    builder.add_row("##@][##").unwrap();
    assert!(matches!(builder.build(), Err(Error::UnpairedBoxHalf(_))));
}

#[test]
fn widen_doubles_every_cell() {
    let map = plain_map(&["#####", "#@O.#", "#####"]);
    let wide = map.widen();

    assert_eq!(wide.row_n(), 3);
    assert_eq!(wide.col_n(), 10);
    assert_eq!(wide.to_string(), "##########\n##@.[]..##\n##########\n");
    assert_eq!(wide.robot_position().unwrap(), Position::new(1, 2));
    assert_eq!(wide.gps_sum(), 104);

    let game = WideBoxGame::new(wide).unwrap();
    assert_eq!(*game.robot_pos(), Position::new(1, 2));
}

#[test]
fn gps_sum_of_map_without_boxes_is_zero() {
    let map = plain_map(&["@"]);
    assert_eq!(map.gps_sum(), 0);
    assert_eq!(BoxGame::<SinglePush>::new(map).unwrap().gps_sum(), 0);
}

#[test]
fn parse_game_reads_map_then_moves() {
    let text = "#####  \n#@O.#\n#####\n\n>>\n<x^ v\n";
    let (map, move_dirs) = parse_game::<PlainTile>(text).unwrap();

    assert_eq!(map.to_string(), "#####\n#@O.#\n#####\n");
    assert_eq!(
        move_dirs,
        vec![
            Direction::Right,
            Direction::Right,
            Direction::Left,
            Direction::Up,
            Direction::Down
        ]
    );
}

#[test]
fn parse_game_reports_structural_errors() {
    let err = parse_game::<PlainTile>("#####\n#..#\n\n<").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::InconsistentRow(5, 4))
    ));

    let err = parse_game::<PlainTile>("###\n#.#\n###\n\n<").unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoRobotInMap)));
}

#[test]
fn wide_maps_can_be_read_directly() {
    let (map, move_dirs) = parse_game::<WideTile>("##@[]..##\n\n>>").unwrap();
    let mut game = WideBoxGame::new(map).unwrap();
    game.simulate(&move_dirs).unwrap();

    assert_eq!(game.map().to_string(), "##..@[]##\n");
    assert_eq!(game.gps_sum(), 5);
}
