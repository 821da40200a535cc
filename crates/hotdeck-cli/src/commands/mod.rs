pub mod hotbar;
pub mod pin;
