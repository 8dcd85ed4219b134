//! Tool settings: where configs live, image ordering and executable lookup.

mod file;
mod paths;
mod types;

pub use file::{
    InitOutcome, init_settings_file, load_default_settings, load_settings_file, render_settings,
    save_settings,
};
pub use paths::settings_file_path;
pub use types::{ConfSettings, ImageOrder, ImageSettings, LaunchSettings, Settings};
