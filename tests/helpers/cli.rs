use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

use super::changesets::write_changelog;

/// A scratch project directory to run the binary in
pub struct CliTestHelper {
    pub temp_dir: TempDir,
    pub project_root: PathBuf,
}

impl CliTestHelper {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let project_root = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            project_root,
        }
    }

    /// The binary, run from the project root with database variables cleared
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("pgchangeset").unwrap();
        cmd.current_dir(&self.project_root)
            .env_remove("DATABASE_URL")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        write_changelog(&self.project_root, name, content)
    }
}

impl Default for CliTestHelper {
    fn default() -> Self {
        Self::new()
    }
}
