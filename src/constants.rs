use std::path::PathBuf;

use dirs::preference_dir;

/// Competition maze is 16x16 cells.
pub const DEFAULT_MAZE_SIZE: usize = 16;

pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 60;
pub const DEFAULT_FPS: u32 = 30;

pub const MOUSE_CHAR: char = '@';
pub const TRAIL_CHAR: char = '·';

pub fn base_path() -> PathBuf {
    preference_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tmouse")
}
