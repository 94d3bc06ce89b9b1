pub mod audio;
pub mod camera;
pub mod constants;
pub mod controller;
pub mod layout;
pub mod select;
pub mod state;
pub mod timer;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

pub use audio::*;
pub use camera::*;
pub use constants::*;
pub use controller::*;
pub use layout::*;
pub use select::*;
pub use state::*;
pub use timer::*;
