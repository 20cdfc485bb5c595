use osgi_vfs_api::VFS_LEAK_DEBUGGING_ENV;

/// Environment variable overriding [`MountConfig::archive_suffixes`] with a
/// comma separated list.
pub const ARCHIVE_SUFFIXES_ENV: &str = "OSGI_VFS_ARCHIVE_SUFFIXES";

/// Configuration of a [`crate::MountAdaptor`].
#[derive(Clone, Debug)]
pub struct MountConfig {
    /// File name suffixes of archives that are mounted when navigated into.
    pub archive_suffixes: Vec<String>,
    /// Capture a backtrace when a mount is created and report it if the
    /// owning file is dropped without being closed.
    pub leak_debugging: bool,
    /// Name prefix of the private temporary directory.
    pub temp_prefix: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            archive_suffixes: vec![".jar".to_string(), ".war".to_string()],
            leak_debugging: false,
            temp_prefix: "osgitmp-".to_string(),
        }
    }
}

impl MountConfig {
    /// Defaults overridden by `OSGI_VFS_LEAK_DEBUGGING` and
    /// `OSGI_VFS_ARCHIVE_SUFFIXES`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(VFS_LEAK_DEBUGGING_ENV) {
            config.leak_debugging = value == "true";
        }
        if let Ok(value) = std::env::var(ARCHIVE_SUFFIXES_ENV) {
            config = config.with_archive_suffixes(value.split(','));
        }
        config
    }

    pub fn with_archive_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.archive_suffixes = suffixes
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn with_leak_debugging(mut self, enabled: bool) -> Self {
        self.leak_debugging = enabled;
        self
    }

    pub fn with_temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    /// Whether a file called `name` is mounted when navigated into.
    pub fn is_archive(&self, name: &str) -> bool {
        self.archive_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
    }
}
