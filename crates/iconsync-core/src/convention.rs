//! Icon naming convention
//!
//! The upstream repository lays icons out as
//! `assets/<Icon Set Name>/SVG/ic_fluent_<name>_<size>_<variant>.svg`.
//! Only one size is indexed.

/// Which files in the working copy count as indexable icons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconConvention {
    /// Top-level directory holding all icon sets
    pub asset_root: String,

    /// Literal marker a file name must contain (e.g. `_20_`)
    pub size_marker: String,

    /// Required file extension, compared ASCII case-insensitively
    pub extension: String,
}

impl Default for IconConvention {
    fn default() -> Self {
        Self {
            asset_root: "assets".to_string(),
            size_marker: "_20_".to_string(),
            extension: ".svg".to_string(),
        }
    }
}

impl IconConvention {
    /// Checks a repository-relative path against the convention.
    ///
    /// Only the file name is inspected, so icon-set directories containing
    /// the marker do not let other sizes through.
    pub fn matches(&self, path: &str) -> bool {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        file_name.contains(&self.size_marker) && self.has_extension(file_name)
    }

    fn has_extension(&self, file_name: &str) -> bool {
        let ext_len = self.extension.len();
        file_name.len() >= ext_len
            && file_name
                .get(file_name.len() - ext_len..)
                .is_some_and(|tail| tail.eq_ignore_ascii_case(&self.extension))
    }
}
