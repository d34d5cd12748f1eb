use puzzle_cube::{PuzzleConfig, run};

fn main() -> anyhow::Result<()> {
    run(PuzzleConfig::default())
}
