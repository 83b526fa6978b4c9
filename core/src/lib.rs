pub mod board;
pub mod fen;
pub mod game_state;
pub mod move_gen;
pub mod outcome;
pub mod perft;
pub mod types;
pub mod zobrist;

pub use board::*;
pub use fen::{positions, FenError};
pub use game_state::*;
pub use move_gen::*;
pub use outcome::{GameResult, Termination};
pub use perft::{perft, perft_divide};
pub use types::*;
