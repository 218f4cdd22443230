//! Project-level type definitions
//!
//! Contains types used for project detection and classification.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Web framework identity, decided once at discovery time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FrameworkKind {
    #[serde(rename = "nuxt")]
    Nuxt,
    #[serde(rename = "next")]
    NextJs,
    #[serde(rename = "vite")]
    Vite,
    #[serde(rename = "react-cra")]
    Cra,
    #[serde(rename = "angular")]
    Angular,
    #[serde(rename = "vue-cli")]
    VueCli,
    #[serde(rename = "django")]
    Django,
    #[serde(rename = "fastapi")]
    FastApi,
    #[serde(rename = "flask")]
    Flask,
    #[serde(rename = "nestjs")]
    NestJs,
    #[serde(rename = "express")]
    Express,
    #[serde(rename = "unknown")]
    Unknown,
}

/// Which toolchain a framework belongs to; decides which config files apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Node,
    Python,
}

/// Frontend or backend, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    Frontend,
    Backend,
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppKind::Frontend => write!(f, "frontend"),
            AppKind::Backend => write!(f, "backend"),
        }
    }
}

impl FrameworkKind {
    /// Port the framework's dev server binds to when nothing overrides it
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::Nuxt | Self::NextJs | Self::Cra | Self::NestJs | Self::Express => Some(3000),
            Self::Vite => Some(5173),
            Self::Angular => Some(4200),
            Self::VueCli => Some(8080),
            Self::Django | Self::FastApi => Some(8000),
            Self::Flask => Some(5000),
            Self::Unknown => None,
        }
    }

    pub fn family(&self) -> Option<Family> {
        match self {
            Self::Django | Self::FastApi | Self::Flask => Some(Family::Python),
            Self::Unknown => None,
            _ => Some(Family::Node),
        }
    }

    pub fn app_kind(&self) -> Option<AppKind> {
        match self {
            Self::Nuxt | Self::NextJs | Self::Vite | Self::Cra | Self::Angular | Self::VueCli => {
                Some(AppKind::Frontend)
            }
            Self::Django | Self::FastApi | Self::Flask | Self::NestJs | Self::Express => {
                Some(AppKind::Backend)
            }
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nuxt => "nuxt",
            Self::NextJs => "next",
            Self::Vite => "vite",
            Self::Cra => "react-cra",
            Self::Angular => "angular",
            Self::VueCli => "vue-cli",
            Self::Django => "django",
            Self::FastApi => "fastapi",
            Self::Flask => "flask",
            Self::NestJs => "nestjs",
            Self::Express => "express",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FrameworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format of a project config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigFileKind {
    /// `KEY=value` environment file
    DotEnv,
    /// npm `package.json` manifest
    PackageJson,
}

impl ConfigFileKind {
    /// Whether a brand-new port declaration can be added to this format
    pub fn accepts_insert(&self) -> bool {
        matches!(self, Self::DotEnv)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub kind: ConfigFileKind,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>, kind: ConfigFileKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// An explicit port found in a project config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredPort {
    pub port: u16,
    pub file: ConfigFile,
    /// Env key (`PORT`) or manifest location (`scripts.dev`)
    pub key: String,
}

/// One discovered web application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Absolute directory; identity key within a scan
    pub path: PathBuf,
    pub name: String,
    framework: FrameworkKind,
    pub declared: Option<DeclaredPort>,
    /// Config files in priority order; the first with a port override wins
    pub config_files: Vec<ConfigFile>,
    pub cors_config: Option<PathBuf>,
}

impl Project {
    pub fn new(path: impl Into<PathBuf>, framework: FrameworkKind) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Self {
            path,
            name,
            framework,
            declared: None,
            config_files: Vec::new(),
            cors_config: None,
        }
    }

    pub fn with_config_files(mut self, files: Vec<ConfigFile>) -> Self {
        self.config_files = files;
        self
    }

    pub fn with_declared(mut self, declared: DeclaredPort) -> Self {
        self.declared = Some(declared);
        self
    }

    pub fn with_cors_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.cors_config = Some(path.into());
        self
    }

    pub fn framework(&self) -> FrameworkKind {
        self.framework
    }

    pub fn declared_port(&self) -> Option<u16> {
        self.declared.as_ref().map(|d| d.port)
    }

    /// Declared port if any, else the framework default
    pub fn effective_port(&self) -> Option<u16> {
        self.declared_port()
            .or_else(|| self.framework.default_port())
    }
}
