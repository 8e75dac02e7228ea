pub mod logo;
pub mod util;
