//! Filtering and presentation decisions.
//!
//! Pure functions: which size filters to offer, how result lists, selections
//! and file listings are laid out, and how sizes are written.

mod escape;
mod filters;
mod render;
mod size;

pub use escape::escape_html;
pub use filters::{apply_filter, suggest_filters, FilterAffordance, SizeFilter};
pub use render::{
    magnet_control_url, render_download_link, render_file_list, render_info_not_found,
    render_results, render_selection, ControlAction, ResponseControl, ResponseFile, UserResponse,
};
pub use size::{binary_size, file_icon, is_audio, is_video, natural_size, UNKNOWN_SIZE};
