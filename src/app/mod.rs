pub mod display;
pub mod render;
pub mod setup;

pub use display::{sync_atmosphere_settings, sync_vsync_settings};
pub use render::{apply_block_events, setup_block_render};
pub use setup::setup;
