//! Jousting: eight knights, one each, last one standing wins. The owner
//! starts the round with a button; a background countdown clears the
//! unclaimed knights and ticks down before moves are allowed.

use engine::{
    Action, Color, Controller, ControllerSpec, Direction, GameCore, InfoElement, NoMovesError,
    OptionSpec, OptionValues, Piece, Ply, Vector2,
};
use standard_pack::pieces::KNIGHT;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub struct JoustingSpec;

pub static JOUSTING: JoustingSpec = JoustingSpec;

impl ControllerSpec for JoustingSpec {
    fn name(&self) -> &'static str {
        "Jousting"
    }

    fn board_size(&self) -> Vector2 {
        Vector2::new(8, 8)
    }

    fn colors(&self) -> &'static [Color] {
        &Color::PLAYABLE
    }

    fn options(&self) -> Vec<(&'static str, OptionSpec)> {
        vec![(
            "Game Start Timer",
            OptionSpec::Int {
                default: 3,
                min: Some(0),
                max: None,
            },
        )]
    }

    fn create(&self, options: OptionValues) -> Box<dyn Controller> {
        Box::new(Jousting {
            start_timer: options.int("Game Start Timer").unwrap_or(3),
            started: Arc::new(AtomicBool::new(false)),
            start_button_id: None,
        })
    }
}

pub struct Jousting {
    start_timer: i64,
    /// Shared with the countdown task, which flips it when play opens.
    started: Arc<AtomicBool>,
    start_button_id: Option<String>,
}

impl Controller for Jousting {
    fn init_board(&mut self, game: &mut GameCore) {
        let starts = [
            (Color::White, Vector2::new(0, 2)),
            (Color::Black, Vector2::new(0, 5)),
            (Color::Red, Vector2::new(2, 7)),
            (Color::Orange, Vector2::new(5, 7)),
            (Color::Yellow, Vector2::new(7, 5)),
            (Color::Green, Vector2::new(7, 2)),
            (Color::Blue, Vector2::new(5, 0)),
            (Color::Purple, Vector2::new(2, 0)),
        ];
        for (color, pos) in starts {
            game.board_mut()
                .insert(pos, Piece::new(&KNIGHT, color, Direction::North));
        }

        let button = InfoElement::button("Start Game");
        self.start_button_id = button.button_id().map(str::to_string);
        game.update_public_info(vec![button]);
    }

    fn get_plies(
        &self,
        game: &GameCore,
        color: Color,
        from_pos: Vector2,
        to_pos: Vector2,
    ) -> Result<Vec<Ply>, NoMovesError> {
        if !self.started.load(Ordering::SeqCst) {
            return Err(NoMovesError::new("The game has not started yet."));
        }

        let Some(piece) = game.board().get(&from_pos) else {
            return Ok(Vec::new());
        };
        if piece.color != color {
            return Err(NoMovesError::new("That is not your piece."));
        }

        piece.plies(from_pos, to_pos, game.data())
    }

    fn after_ply(&mut self, game: &mut GameCore) {
        if game.board().len() == 1
            && let Some(survivor) = game.board().values().next()
        {
            game.winner(vec![survivor.color], "Last Knight Standing");
        }
    }

    fn on_button(&mut self, game: &mut GameCore, button_id: &str, _color: Color) {
        if self.start_button_id.as_deref() != Some(button_id) {
            return;
        }

        let handle = game.handle();
        let started = self.started.clone();
        let ticks = self.start_timer;

        game.run_async(async move {
            // Knights nobody claimed leave the field before the countdown.
            {
                let Some(game) = handle.upgrade() else { return };
                let mut game = game.lock().await;
                let unclaimed: Vec<Vector2> = game
                    .core
                    .board()
                    .iter()
                    .filter(|(_, piece)| !game.core.players.contains_color(piece.color))
                    .map(|(pos, _)| *pos)
                    .collect();
                let clear = Ply::new(
                    "Clear Board",
                    unclaimed
                        .into_iter()
                        .map(|pos| Action::Destroy { pos })
                        .collect(),
                );
                if let Err(error) = game.apply_ply(None, &clear) {
                    tracing::error!(%error, "Failed to clear the jousting board.");
                    return;
                }
            }

            // Tick the countdown the set number of times.
            for remaining in (1..=ticks).rev() {
                {
                    let Some(game) = handle.upgrade() else { return };
                    let mut game = game.lock().await;
                    game.core.update_public_info(vec![InfoElement::text(format!(
                        "Game starting in {remaining}"
                    ))]);
                }
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            // Remove the countdown and open play.
            if let Some(game) = handle.upgrade() {
                game.lock().await.core.update_public_info(Vec::new());
            }
            started.store(true, Ordering::SeqCst);
        });
    }
}
