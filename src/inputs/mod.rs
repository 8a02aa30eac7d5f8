pub mod keymap;

pub use keymap::shortcut_command;
