use anyhow::{Context, Result};
use clap::Parser;
use warehouse::{game::WidePush, map::PlainTile, CLIArgs};

fn main() -> Result<()> {
    warehouse::init_tracing();
    let args = CLIArgs::parse();
    let (map, move_dirs) =
        warehouse::read_game::<PlainTile, _>(&args.input_path).with_context(|| {
            format!(
                "Failed to read game(map and move directions) from given file({}).",
                args.input_path.display()
            )
        })?;

    let coord_sum = warehouse::play::<WidePush>(map.widen(), &move_dirs, &args)?;
    println!(
        "After {} move(s), the sum of boxes' GPS coordinates in widened map is {}.",
        move_dirs.len(),
        coord_sum
    );

    Ok(())
}
