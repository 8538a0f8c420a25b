use anyhow::Context;
use checkers::{
    config::GameConfig,
    engine::{minimax::Minimax, RandomTieBreak},
    game::{Game, PlyOutcome},
    Result,
};

/// Self-play stops here, kings can chase each other forever.
const MAX_TURNS: u32 = 200;

fn main() -> Result<()> {
    let mut config = GameConfig::default();
    if let Some(depth) = std::env::args().nth(1) {
        config.search_depth = depth
            .parse()
            .with_context(|| format!("invalid search depth {depth:?}"))?;
    }

    let engine = Minimax::from_config(&config, RandomTieBreak::default());
    let mut game = Game::new(config, engine).context("could not start game")?;
    println!("{}\n", game.board());

    for turn in 1..=MAX_TURNS {
        let side = game.to_move();
        let outcome = game.play_engine_turn()?;

        for mve in game.engine_last_moves() {
            println!("Turn {turn}: {side} plays {mve}");
        }
        let stats = game.board().stats();
        println!(
            "{}\nBlack {} ({} kings) : Red {} ({} kings), score {:.3}\n",
            game.board(),
            stats.blacks,
            stats.black_kings,
            stats.reds,
            stats.red_kings,
            game.board().score()
        );

        if let PlyOutcome::GameOver { winner } = outcome {
            println!("Winner {winner}");
            println!("{:#?}", game.engine().stats());
            return Ok(());
        }
    }

    println!("No winner after {MAX_TURNS} turns");
    println!("{:#?}", game.engine().stats());
    Ok(())
}
