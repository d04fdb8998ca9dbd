use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use crate::domain::model::Coordinate;
use crate::domain::ports::DependencyResolver;
use crate::utils::error::{BuildError, Result};

/// Where a named repository reference actually lives.
#[derive(Debug, Clone)]
pub enum RepositoryLocation {
    Remote(Url),
    Local(PathBuf),
}

pub const MAVEN_CENTRAL_URL: &str = "https://repo1.maven.org/maven2";

/// Path of the conventional local Maven repository, if a home directory is
/// known.
pub fn maven_local_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".m2/repository"))
}

/// Walks the declared repositories in order for each coordinate: download
/// cache first, then local repositories, then HTTP GET against remote ones.
/// Downloads are cached so repeat builds stay offline.
pub struct HttpResolver {
    client: reqwest::Client,
    cache_dir: PathBuf,
    locations: HashMap<String, RepositoryLocation>,
}

impl HttpResolver {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        let mut locations = HashMap::new();
        let central = Url::parse(MAVEN_CENTRAL_URL).map_err(|e| {
            BuildError::InvalidConfigValue {
                field: "repositories".to_string(),
                value: MAVEN_CENTRAL_URL.to_string(),
                reason: e.to_string(),
            }
        })?;
        locations.insert(
            "mavenCentral".to_string(),
            RepositoryLocation::Remote(central),
        );
        if let Some(local) = maven_local_path() {
            locations.insert("mavenLocal".to_string(), RepositoryLocation::Local(local));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            cache_dir,
            locations,
        })
    }

    /// Registers or overrides a named repository location.
    pub fn with_location(mut self, name: &str, location: RepositoryLocation) -> Self {
        self.locations.insert(name.to_string(), location);
        self
    }

    fn location_of(&self, name: &str) -> Option<RepositoryLocation> {
        if let Some(known) = self.locations.get(name) {
            return Some(known.clone());
        }
        // Unknown names may be literal repository URLs.
        match Url::parse(name) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                Some(RepositoryLocation::Remote(url))
            }
            _ => None,
        }
    }

    async fn fetch_remote(&self, base: &Url, relative: &str, cached: &Path) -> Result<bool> {
        let full = format!("{}/{}", base.as_str().trim_end_matches('/'), relative);
        tracing::debug!("GET {}", full);

        let response = self.client.get(&full).send().await?;
        if !response.status().is_success() {
            tracing::debug!("{} -> {}", full, response.status());
            return Ok(false);
        }

        let bytes = response.bytes().await?;
        if let Some(parent) = cached.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(cached, &bytes)?;
        tracing::info!("Downloaded {} ({} bytes)", full, bytes.len());
        Ok(true)
    }
}

impl DependencyResolver for HttpResolver {
    async fn resolve(&self, coordinate: &Coordinate, repositories: &[String]) -> Result<PathBuf> {
        let relative = coordinate.repository_path();

        let cached = self.cache_dir.join(&relative);
        if cached.exists() {
            tracing::debug!("Cache hit for {}", coordinate);
            return Ok(cached);
        }

        for name in repositories {
            let Some(location) = self.location_of(name) else {
                tracing::warn!("Unknown repository \"{}\", skipping", name);
                continue;
            };
            match location {
                RepositoryLocation::Local(base) => {
                    let candidate = base.join(&relative);
                    if candidate.exists() {
                        return Ok(candidate);
                    }
                }
                RepositoryLocation::Remote(base) => {
                    match self.fetch_remote(&base, &relative, &cached).await {
                        Ok(true) => return Ok(cached),
                        Ok(false) => {}
                        Err(e) => {
                            tracing::warn!("Repository \"{}\" unreachable: {}", name, e);
                        }
                    }
                }
            }
        }

        Err(BuildError::DependencyNotFound {
            coordinate: coordinate.to_string(),
            repositories: repositories.join(", "),
        })
    }
}
