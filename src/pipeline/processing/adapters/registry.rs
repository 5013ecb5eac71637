use std::path::PathBuf;
use std::sync::Arc;

use super::base::{AdapterContext, MetricsAdapter};
use super::flexjobs::FlexJobsAdapter;
use super::qualifications::QualificationsAdapter;
use super::SourceAdapter;
use crate::config::{Config, SourceConfig};
use crate::constants;
use crate::error::{PipelineError, Result};

/// An adapter together with the file it reads
pub struct RegisteredSource {
    pub adapter: Box<dyn SourceAdapter>,
    pub path: PathBuf,
}

/// Builds adapters for the configured sources, keeping configuration order
pub struct AdapterRegistry {
    sources: Vec<RegisteredSource>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let context = Arc::new(AdapterContext::new(config));
        let mut registry = Self::new();
        for source in &config.sources {
            let adapter = create_adapter(source, context.clone())?;
            registry.register(adapter, source.path.clone());
        }
        Ok(registry)
    }

    /// Append a source; its records follow every previously registered source
    pub fn register(&mut self, adapter: Box<dyn SourceAdapter>, path: PathBuf) {
        self.sources.push(RegisteredSource { adapter, path });
    }

    pub fn sources(&self) -> &[RegisteredSource] {
        &self.sources
    }

    pub fn list_sources(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.adapter.source_id()).collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Construct the adapter for one configured source, wrapped with metrics
pub fn create_adapter(
    source: &SourceConfig,
    context: Arc<AdapterContext>,
) -> Result<Box<dyn SourceAdapter>> {
    match source.kind.as_str() {
        constants::QUALIFICATIONS_KIND => {
            let titles = QualificationsAdapter::default_titles().with_overrides(&source.titles);
            let adapter = QualificationsAdapter::new(&source.name, context)
                .with_titles(titles)
                .with_require_skills(source.require_skills);
            Ok(Box::new(MetricsAdapter::new(adapter)))
        }
        constants::FLEXJOBS_KIND => {
            let titles = FlexJobsAdapter::default_titles().with_overrides(&source.titles);
            let adapter = FlexJobsAdapter::new(&source.name, context)
                .with_titles(titles)
                .with_require_skills(source.require_skills);
            Ok(Box::new(MetricsAdapter::new(adapter)))
        }
        other => Err(PipelineError::UnknownSource(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_registry_keeps_config_order() {
        let registry = AdapterRegistry::from_config(&Config::default()).unwrap();
        assert_eq!(
            registry.list_sources(),
            vec![constants::QUALIFICATIONS_SOURCE, constants::FLEXJOBS_SOURCE]
        );
        assert_eq!(
            registry.sources()[1].path,
            PathBuf::from(constants::FLEXJOBS_DEFAULT_PATH)
        );
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let source = SourceConfig {
            name: "indeed".to_string(),
            kind: "indeed".to_string(),
            path: PathBuf::from("indeed.csv"),
            require_skills: true,
            titles: HashMap::new(),
        };
        let result = create_adapter(&source, Arc::new(AdapterContext::default()));
        assert!(matches!(result, Err(PipelineError::UnknownSource(_))));
    }
}
