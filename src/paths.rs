use directories::ProjectDirs;
use std::path::PathBuf;

pub struct AppPaths {
    pub config: PathBuf,
}

impl AppPaths {
    pub fn from_project_dirs() -> Option<Self> {
        ProjectDirs::from("com", "tempgallery", "TempGallery").map(|dirs| Self {
            config: dirs.config_dir().to_path_buf(),
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }
}
