use std::path::{Path, PathBuf};

use async_trait::async_trait;
use walkdir::WalkDir;

use common::models::{BlueprintType, ToolInfo, ToolType};

pub const LATEST_VERSION: &str = "latest";
const BLUEPRINT_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("tool catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only repository of tool blueprints shared by every user.
#[async_trait]
pub trait ToolCatalog: Send + Sync + std::fmt::Debug {
    /// Total number of tools and the `[offset, offset + limit)` slice.
    async fn list(&self, offset: u64, limit: u64) -> Result<(u64, Vec<ToolInfo>), CatalogError>;

    async fn get(&self, id: &str, version: Option<&str>) -> Result<Option<ToolInfo>, CatalogError>;
}

/// Serves blueprint files found under a directory.
///
/// A tool id is the file path relative to the root with `/`
///  replaced by `@`, so ids stay a single path segment.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn tool_id(relative: &Path) -> String {
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("@")
    }

    fn relative_path(id: &str) -> Option<PathBuf> {
        let parts: Vec<&str> = id.split('@').collect();
        if parts
            .iter()
            .any(|p| p.is_empty() || *p == "." || *p == ".." || p.contains('/') || p.contains('\\'))
        {
            return None;
        }
        Some(parts.iter().collect())
    }

    fn is_blueprint(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| BLUEPRINT_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    }

    /// Blueprint paths relative to the root, in lexical order.
    ///
    /// Symlinks are not followed, so a linked directory cycle cannot
    ///  list a blueprint twice.
    fn scan(root: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() || !Self::is_blueprint(entry.path()) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(root) {
                found.push(relative.to_path_buf());
            }
        }
        found.sort();
        Ok(found)
    }

    fn load(root: &Path, relative: &Path) -> std::io::Result<ToolInfo> {
        let blueprint = std::fs::read_to_string(root.join(relative))?;
        let name = relative
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());

        Ok(ToolInfo {
            id: Self::tool_id(relative),
            node_id: None,
            tool_type: ToolType::Vm,
            blueprint,
            blueprint_type: BlueprintType::Tosca,
            name,
            description: None,
            author_name: None,
            version: Some(LATEST_VERSION.to_string()),
            self_link: None,
        })
    }
}

#[async_trait]
impl ToolCatalog for DirectoryCatalog {
    async fn list(&self, offset: u64, limit: u64) -> Result<(u64, Vec<ToolInfo>), CatalogError> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<(u64, Vec<ToolInfo>)> {
            let paths = Self::scan(&root)?;
            let total = paths.len() as u64;
            let tools = paths
                .iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .map(|relative| Self::load(&root, relative))
                .collect::<std::io::Result<Vec<_>>>()?;
            Ok((total, tools))
        })
        .await
        .map_err(|e| CatalogError::Unavailable(e.to_string()))?
        .map_err(|e| CatalogError::Unavailable(e.to_string()))
    }

    async fn get(&self, id: &str, version: Option<&str>) -> Result<Option<ToolInfo>, CatalogError> {
        // the directory only holds the current revision
        if version.is_some_and(|v| v != LATEST_VERSION) {
            return Ok(None);
        }
        let Some(relative) = Self::relative_path(id) else {
            return Ok(None);
        };
        if !Self::is_blueprint(&relative) {
            return Ok(None);
        }

        let root = self.root.clone();
        tokio::task::spawn_blocking(move || match Self::load(&root, &relative) {
            Ok(tool) => Ok(Some(tool)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CatalogError::Unavailable(e.to_string())),
        })
        .await
        .map_err(|e| CatalogError::Unavailable(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> (DirectoryCatalog, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("k8s")).unwrap();
        std::fs::write(dir.path().join("jupyter.yaml"), "tosca: jupyter").unwrap();
        std::fs::write(dir.path().join("k8s/galaxy.yml"), "tosca: galaxy").unwrap();
        std::fs::write(dir.path().join("README.md"), "not a blueprint").unwrap();
        (DirectoryCatalog::new(dir.path()), dir)
    }

    #[tokio::test]
    async fn test_list_in_path_order() {
        let (catalog, _dir) = catalog();
        let (total, tools) = catalog.list(0, 10).await.unwrap();
        assert_eq!(total, 2);
        let ids: Vec<_> = tools.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["jupyter.yaml", "k8s@galaxy.yml"]);
        assert_eq!(tools[1].name.as_deref(), Some("galaxy"));
        assert_eq!(tools[1].blueprint, "tosca: galaxy");

        let (total, tools) = catalog.list(1, 10).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(tools.len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let (catalog, _dir) = catalog();
        let tool = catalog.get("k8s@galaxy.yml", None).await.unwrap().unwrap();
        assert_eq!(tool.version.as_deref(), Some("latest"));

        assert!(catalog.get("k8s@galaxy.yml", Some("abc123")).await.unwrap().is_none());
        assert!(catalog.get("missing.yaml", None).await.unwrap().is_none());
        assert!(catalog.get("..@etc@passwd.yaml", None).await.unwrap().is_none());
        assert!(catalog.get("README.md", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_root_is_unavailable() {
        let catalog = DirectoryCatalog::new("/nonexistent/awm/tools");
        assert!(matches!(
            catalog.list(0, 10).await,
            Err(CatalogError::Unavailable(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_directory_cycle_lists_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yaml"), "tosca: a").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let catalog = DirectoryCatalog::new(dir.path());
        let (total, tools) = catalog.list(0, 100).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(tools[0].id, "a.yaml");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_blueprint_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yaml"), "tosca: a").unwrap();
        std::os::unix::fs::symlink(dir.path().join("a.yaml"), dir.path().join("b.yaml")).unwrap();

        let catalog = DirectoryCatalog::new(dir.path());
        let (total, _) = catalog.list(0, 100).await.unwrap();
        assert_eq!(total, 1);
    }
}
