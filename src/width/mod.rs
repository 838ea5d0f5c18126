//! Display width helpers used by the default text measurer.

mod utils;

pub use utils::display_width;
