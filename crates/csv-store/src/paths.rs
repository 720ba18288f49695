use std::path::{Path, PathBuf};

pub fn weekly_path(root: &Path, ticker: &str, year: i32) -> PathBuf {
    root.join("weekly").join(format!("{ticker}_{year}.csv"))
}

pub fn filtered_path(root: &Path, ticker: &str, year: i32, threshold: u32) -> PathBuf {
    root.join("filtered")
        .join(format!("{ticker}_{year}_th{threshold}.csv"))
}

pub fn anchors_path(root: &Path, ticker: &str, year: i32, threshold: u32) -> PathBuf {
    root.join("anchors")
        .join(format!("{ticker}_{year}_th{threshold}_no_overlap.csv"))
}

pub fn excess_path(root: &Path, ticker: &str, year: i32) -> PathBuf {
    root.join("excess").join(format!("{ticker}_{year}_excess.csv"))
}

pub fn conjunction_path(root: &Path, ticker: &str) -> PathBuf {
    root.join("conjunction")
        .join(format!("{ticker}_conjunction.csv"))
}

pub fn ticker_summary_path(root: &Path, ticker: &str) -> PathBuf {
    root.join("conjunction")
        .join(format!("{ticker}_conjunction_summary.csv"))
}

pub fn overall_summary_path(root: &Path) -> PathBuf {
    root.join("conjunction").join("OVERALL_SUMMARY.csv")
}

/// Create the parent directory of an output file if it does not exist yet.
pub(crate) fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
