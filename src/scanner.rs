use anyhow::Result;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions recognized as AsyncAPI documents
pub const SPEC_EXTENSIONS: [&str; 3] = ["json", "yml", "yaml"];

/// Scanner that discovers AsyncAPI spec files under a directory.
///
/// The `SpecScanner` walks the tree recursively, skipping `target` and hidden
/// directories (those starting with `.`).
///
/// # Example
///
/// ```no_run
/// use asyncapi_codegen::scanner::SpecScanner;
/// use std::path::PathBuf;
///
/// let scanner = SpecScanner::new(PathBuf::from("./specs"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} specs", result.spec_files.len());
/// ```
pub struct SpecScanner {
    root_path: PathBuf,
}

/// Result of a directory scan.
pub struct ScanResult {
    /// Discovered spec files, sorted by path
    pub spec_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

/// Whether `path` has one of the [`SPEC_EXTENSIONS`].
pub fn is_spec_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| SPEC_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

impl SpecScanner {
    /// Creates a new `SpecScanner` for the specified root directory.
    ///
    /// # Arguments
    ///
    /// * `root_path` - The root directory to scan for spec files
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all spec files.
    ///
    /// Entries that cannot be accessed are logged and added to the result as warnings;
    /// scanning continues past them. Files come back sorted so that generation order,
    /// and with it type ownership, does not depend on directory iteration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory does not exist.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.exists() {
            anyhow::bail!("Spec directory does not exist: {}", self.root_path.display());
        }

        let mut spec_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && is_spec_file(path) {
                        spec_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        spec_files.sort();
        Ok(ScanResult {
            spec_files,
            warnings,
        })
    }
}
