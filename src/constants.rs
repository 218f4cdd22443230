//! Global Constants
//!
//! Centralized constants for scanning, port policy and exposure.
//! All magic numbers should be defined here with documentation.

/// Port policy constants
pub mod ports {
    /// Lowest valid TCP port
    pub const MIN_PORT: u16 = 1;

    /// Highest valid TCP port
    pub const MAX_PORT: u16 = 65535;

    /// How far above a framework default the resolver searches for a free port
    pub const DEFAULT_SEARCH_WINDOW: u16 = 100;
}

/// Directory scan constants
pub mod scan {
    /// Default number of directory levels examined below the scan root
    pub const DEFAULT_MAX_DEPTH: usize = 3;

    /// Directories never descended into (hidden directories are skipped too)
    pub const SKIP_DIRS: &[&str] = &[
        "node_modules",
        "venv",
        ".venv",
        "env",
        "__pycache__",
        "dist",
        "build",
        "target",
        ".git",
        ".next",
        ".nuxt",
        "vendor",
    ];

    /// Candidate project directories under $HOME, checked in order
    pub const DEFAULT_PROJECT_DIRS: &[&str] = &[
        "IdeaProjects",
        "Projects",
        "projects",
        "code",
        "Code",
        "dev",
        "src",
    ];
}

/// Config file names and keys recognized in projects
pub mod files {
    pub const ENV_FILE: &str = ".env";
    pub const PACKAGE_JSON: &str = "package.json";
    pub const PYPROJECT: &str = "pyproject.toml";
    pub const REQUIREMENTS: &str = "requirements.txt";

    /// Environment keys holding a dev server port, in lookup order
    pub const ENV_PORT_KEYS: &[&str] = &["PORT", "VITE_PORT", "DEV_PORT", "WEB_PORT", "SERVER_PORT"];

    /// Key inserted when an environment file has no port declaration yet
    pub const DEFAULT_ENV_PORT_KEY: &str = "PORT";

    /// package.json scripts searched for a port flag, in lookup order
    pub const PORT_SCRIPTS: &[&str] = &["dev", "start", "serve"];

    /// package.json scripts whose command line identifies a framework
    pub const MARKER_SCRIPTS: &[&str] = &["dev", "start"];
}

/// External exposure tool constants
pub mod exposure {
    /// Default exposure binary
    pub const DEFAULT_BINARY: &str = "tailscale";

    /// Per-invocation timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Address the exposure tool proxies to
    pub const LOCAL_HOST: &str = "127.0.0.1";

    /// Marker printed by `tailscale status` when the daemon is down
    pub const STOPPED_MARKER: &str = "Tailscale is stopped";
}

/// CORS allow-list constants
pub mod cors {
    /// Longest accepted hostname
    pub const MAX_DOMAIN_LEN: usize = 253;

    /// Indentation for inserted list elements
    pub const ELEMENT_INDENT: &str = "    ";
}
