mod state;
mod ui;

pub use state::*;
pub use ui::*;
