mod characteristic;
mod clock;
mod display;
mod payload;
mod time;

pub use characteristic::*;
pub use clock::*;
pub use display::*;
pub use payload::*;
pub use time::*;
