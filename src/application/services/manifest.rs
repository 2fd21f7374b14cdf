//! Manifest service
//!
//! Reads a graph manifest and replays it into a `PreprocessGraph`, the way a
//! build host evaluates its configuration scripts.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::services::PreprocessGraph;
use crate::application::{
    ApplicationError, ApplicationResult, DeclaredNode, GraphManifest, IoResultExt,
    ManifestResultExt,
};
use crate::config::Settings;
use crate::domain::TreeIndex;
use crate::infrastructure::traits::FileSystem;
use crate::util::path::PathExt;

/// A populated, not yet built, graph together with its main project.
#[derive(Debug)]
pub struct LoadedGraph {
    pub graph: PreprocessGraph,
    pub main_project: String,
    pub manifest_path: PathBuf,
}

/// Service turning manifests into project graphs.
pub struct ManifestService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl ManifestService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Read and parse a manifest file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<GraphManifest> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read manifest", path)?;
        toml::from_str(&content).in_manifest(path)
    }

    /// Load a manifest, populate a graph from it and resolve the main project.
    ///
    /// `requested_main` (e.g. from the command line) wins over the manifest.
    pub fn open(&self, path: &Path, requested_main: Option<&str>) -> ApplicationResult<LoadedGraph> {
        let manifest = self.load(path)?;
        let base_dir = path.base_dir();
        let graph = self.populate(&manifest, base_dir)?;
        let main_project = self.resolve_main(&manifest, base_dir, requested_main)?;
        Ok(LoadedGraph {
            graph,
            main_project,
            manifest_path: path.to_path_buf(),
        })
    }

    /// Register the manifest's nodes, links and declared tree.
    ///
    /// Relative paths are resolved against `base_dir`.
    #[instrument(level = "debug", skip(self, manifest))]
    pub fn populate(&self, manifest: &GraphManifest, base_dir: &Path) -> ApplicationResult<PreprocessGraph> {
        let strict = manifest
            .strict_extra_mappings
            .unwrap_or(self.settings.strict_extra_mappings);
        let mut graph = PreprocessGraph::new(self.settings.root_fallback);

        for node in &manifest.nodes {
            graph.create_node(&node.project, node.version, &node.mappings)?;
        }
        for link in &manifest.links {
            let extra = self.extra_mappings(link.extra_mappings.as_deref(), base_dir, strict)?;
            graph.link_projects(&link.from, &link.to, extra)?;
        }
        if let Some(root) = &manifest.root {
            self.declare_tree(&mut graph, root, base_dir, strict)?;
        }

        debug!(
            "populated graph: {} nodes, {} links, declared root: {}",
            manifest.nodes.len(),
            manifest.links.len(),
            manifest.root.is_some()
        );
        Ok(graph)
    }

    /// Main project by precedence: requested, manifest, main project file, settings.
    pub fn resolve_main(
        &self,
        manifest: &GraphManifest,
        base_dir: &Path,
        requested_main: Option<&str>,
    ) -> ApplicationResult<String> {
        if let Some(main) = requested_main {
            return Ok(main.to_string());
        }
        if let Some(main) = &manifest.main_project {
            return Ok(main.clone());
        }
        if let Some(file) = &manifest.main_project_file {
            let path = file.resolve_against(base_dir);
            if self.fs.exists(&path) {
                let content = self
                    .fs
                    .read_to_string(&path)
                    .with_path_context("read main project file", &path)?;
                let main = content.trim();
                if !main.is_empty() {
                    debug!("main project {} from {}", main, path.display());
                    return Ok(main.to_string());
                }
                warn!("main project file {} is empty", path.display());
            } else {
                warn!("main project file {} does not exist", path.display());
            }
        }
        self.settings
            .main_project
            .clone()
            .ok_or(ApplicationError::MainProjectUnset)
    }

    fn declare_tree(
        &self,
        graph: &mut PreprocessGraph,
        root: &DeclaredNode,
        base_dir: &Path,
        strict: bool,
    ) -> ApplicationResult<()> {
        let extra = self.extra_mappings(root.extra_mappings.as_deref(), base_dir, strict)?;
        if root.inverted {
            warn!("root {} has no parent edge, ignoring inverted", root.project);
        }
        let root_idx = graph.declare_root(&root.project, root.version, &root.mappings, extra)?;

        // Queue keeps siblings in declaration order
        let mut queue: VecDeque<(&DeclaredNode, TreeIndex)> = root
            .children
            .iter()
            .map(|child| (child, root_idx))
            .collect();
        while let Some((node, parent_idx)) = queue.pop_front() {
            let extra = self.extra_mappings(node.extra_mappings.as_deref(), base_dir, strict)?;
            let idx = graph.declare_child(
                parent_idx,
                &node.project,
                node.version,
                &node.mappings,
                extra,
                node.inverted,
            )?;
            queue.extend(node.children.iter().map(|child| (child, idx)));
        }
        Ok(())
    }

    fn extra_mappings(
        &self,
        raw: Option<&Path>,
        base_dir: &Path,
        strict: bool,
    ) -> ApplicationResult<Option<PathBuf>> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        let path = raw.resolve_against(base_dir);
        if !self.fs.is_file(&path) {
            if strict {
                return Err(ApplicationError::MissingExtraMappings(path));
            }
            warn!("extra mappings file not found: {}", path.display());
        }
        Ok(Some(path))
    }
}
