//! Progress reporting for the row batch

use indicatif::{ProgressBar, ProgressStyle};

const ROW_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} rows ({eta})";

/// Progress bar over `total` rows; hidden when `enabled` is false
pub fn create_row_progress(total: u64, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(ROW_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
