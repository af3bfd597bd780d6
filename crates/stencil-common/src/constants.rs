//! System-wide constants and default paths.

/// Default directory receiving generated compose files, the catalog and the index.
pub const DEFAULT_OUTPUT_DIR: &str = "Docker_Compose";

/// Default directory holding cloned template repositories.
pub const DEFAULT_REPO_DIR: &str = "./Unraid_Repositories";

/// Default URL of the published repository list.
pub const DEFAULT_REPOSITORY_LIST: &str =
    "https://raw.githubusercontent.com/Squidly271/AppFeed/master/repositoryList.json";

/// Default timeout, in seconds, for fetching the repository list.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Environment variable overriding the output directory.
pub const ENV_OUTPUT_DIR: &str = "DOCKER_COMPOSE_FOLDER";
/// Environment variable overriding the repository checkout directory.
pub const ENV_REPO_DIR: &str = "UNRAID_REPO_FOLDER";
/// Environment variable overriding the repository list URL.
pub const ENV_REPOSITORY_LIST: &str = "UNRAID_REPOSITORY_LIST";
/// Environment variable with extra comma-separated repository URLs.
pub const ENV_REPOSITORIES: &str = "UNRAID_REPOSITORIES";

/// Catalog file written into the output directory.
pub const CATALOG_FILE: &str = "templates.json";
/// Catalog cache written into the repository directory.
pub const SOURCE_CATALOG_FILE: &str = "unraid_templates.json";
/// Repository cache (one URL per line) written into the repository directory.
pub const REPOSITORY_CACHE_FILE: &str = "unraid_repos.csv";
/// Catalog index written into the output directory.
pub const INDEX_FILE: &str = "app_list.json";

/// File name of every generated service definition.
pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";
/// Suffix appended to a service definition replaced by a newer one.
pub const BACKUP_SUFFIX: &str = ".old";

/// Extension of template descriptor files.
pub const DESCRIPTOR_EXTENSION: &str = "xml";

/// Descriptor file names that are never templates.
pub const EXCLUDED_DESCRIPTORS: &[&str] = &["ca_profile.xml"];

/// Directory name fragments (case-insensitive) skipped during discovery.
pub const EXCLUDED_DIRS: &[&str] = &[".git", ".github", "issues", "depricated", ".history", ".idea"];

/// Network mode used when a descriptor declares none.
pub const DEFAULT_NETWORK_MODE: &str = "bridge";

/// Restart policy of every generated service.
pub const RESTART_POLICY: &str = "unless-stopped";

/// Application name used in CLI output.
pub const APP_NAME: &str = "stencil";
