pub mod terrain;
pub mod util;
