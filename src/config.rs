//! Engine configuration

use crate::error::ConfigError;
use crate::model::{FrameworkVersion, Marker};

/// Options controlling how the engine interprets the index.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Framework generation whose annotation names are resolved.
    pub version: FrameworkVersion,
    /// How many caller hops a creator may be from its handler.
    pub max_attribution_depth: usize,
    /// Qualified names of deadline scheduler interfaces. Implementations
    /// and subinterfaces are discovered through the index.
    pub scheduler_interfaces: Vec<String>,
    /// Qualified name of the string type (deadline names).
    pub string_type: String,
    /// Payload assumed for handlers that accept any message.
    pub object_type: String,
    /// Types under these prefixes are never deadline payloads.
    pub builtin_type_prefixes: Vec<String>,
    /// Parameter types skipped when picking a handler's payload parameter.
    pub context_parameter_types: Vec<String>,
    /// Treat `build`-named methods on payload types as creators too.
    pub include_builder_methods: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: FrameworkVersion::default(),
            max_attribution_depth: 3,
            scheduler_interfaces: vec!["org.axonframework.deadline.DeadlineManager".to_string()],
            string_type: "java.lang.String".to_string(),
            object_type: "java.lang.Object".to_string(),
            builtin_type_prefixes: vec![
                "java.".to_string(),
                "javax.".to_string(),
                "kotlin.".to_string(),
            ],
            context_parameter_types: vec![
                "org.axonframework.messaging.unitofwork.ProcessingContext".to_string(),
            ],
            include_builder_methods: true,
        }
    }
}

impl EngineConfig {
    /// Default configuration for a specific framework version.
    pub fn for_version(version: FrameworkVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Check the configuration for values that would make queries meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attribution_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.scheduler_interfaces.is_empty() {
            return Err(ConfigError::NoSchedulerInterfaces);
        }
        if self.string_type.is_empty() {
            return Err(ConfigError::Missing {
                kind: "string_type",
            });
        }
        if self.object_type.is_empty() {
            return Err(ConfigError::Missing {
                kind: "object_type",
            });
        }
        Ok(())
    }

    /// Qualified name of `marker` for the configured version.
    pub fn marker_name(&self, marker: Marker) -> Option<&'static str> {
        marker.qualified_name(self.version)
    }

    pub fn is_builtin_type(&self, qualified_name: &str) -> bool {
        self.builtin_type_prefixes
            .iter()
            .any(|prefix| qualified_name.starts_with(prefix.as_str()))
    }

    pub fn is_context_parameter(&self, qualified_name: &str) -> bool {
        self.context_parameter_types
            .iter()
            .any(|ty| ty == qualified_name)
    }
}
