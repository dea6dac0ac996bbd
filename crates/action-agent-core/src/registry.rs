use crate::tool::{ExecutionResult, FailureReason, InvalidToolName, Tool, ToolName, ToolSpec};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid tool name: {0}")]
    InvalidName(#[from] InvalidToolName),

    #[error("tool '{0}' is already registered")]
    Duplicate(String),
}

/// Trait for managing and dispatching tool calls.
///
/// Registries route tool calls chosen by the model to the tool with the
/// matching name. Unknown names never panic: they come back as an
/// [`ExecutionResult::Failure`] so the model can recover.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// Look up a tool by name.
    fn get(&self, name: &str) -> Option<Arc<dyn Tool>>;

    /// Model-facing descriptions of every registered tool, in registration order.
    fn specs(&self) -> Vec<ToolSpec>;

    /// Dispatch a tool call to the appropriate tool implementation.
    async fn dispatch(&self, name: &str, input: Value) -> ExecutionResult {
        match self.get(name) {
            Some(tool) => tool.call(input).await,
            None => ExecutionResult::failed(FailureReason::NotFound {
                resource: format!("tool '{}'", name),
            }),
        }
    }
}

/// In-memory tool registry for local and remote tools.
///
/// Tools keep their registration order so the model always sees the same
/// tool list for the same configuration.
///
/// # Example
///
/// ```rust
/// use action_agent_core::{InMemoryToolRegistry, LogActionTool, ActionLogger, MemorySink, ToolRegistry};
/// use std::sync::Arc;
///
/// let logger = ActionLogger::new(MemorySink::new());
/// let registry = InMemoryToolRegistry::new()
///     .with_tool(Arc::new(LogActionTool::new(logger)))
///     .unwrap();
///
/// assert_eq!(registry.specs()[0].name, "log_action");
/// ```
#[derive(Clone, Default)]
pub struct InMemoryToolRegistry {
    tools: Vec<(ToolName, Arc<dyn Tool>)>,
    index: HashMap<ToolName, usize>,
}

impl InMemoryToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool using the builder pattern.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, RegistryError> {
        self.register(tool)?;
        Ok(self)
    }

    /// Register a tool under its own name.
    ///
    /// Fails when the name is not a valid [`ToolName`] or is already taken.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = ToolName::parse(tool.name())?;
        if self.index.contains_key(&name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }

        tracing::debug!(tool = %name, "Registered tool");
        self.index.insert(name.clone(), self.tools.len());
        self.tools.push((name, tool));
        Ok(())
    }

    /// Register a batch of tools, skipping (and logging) any that are rejected.
    ///
    /// Returns the number of tools that were registered.
    pub fn register_all<I>(&mut self, tools: I) -> usize
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut registered = 0;
        for tool in tools {
            let name = tool.name().to_string();
            match self.register(tool) {
                Ok(()) => registered += 1,
                Err(e) => tracing::warn!(tool = %name, error = %e, "Skipping tool"),
            }
        }
        registered
    }

    pub fn contains(&self, name: &str) -> bool {
        ToolName::parse(name)
            .map(|n| self.index.contains_key(&n))
            .unwrap_or(false)
    }

    /// Names of all registered tools, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for InMemoryToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[async_trait]
impl ToolRegistry for InMemoryToolRegistry {
    fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let name = ToolName::parse(name).ok()?;
        self.index
            .get(&name)
            .map(|&idx| Arc::clone(&self.tools[idx].1))
    }

    fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|(_, tool)| tool.spec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UppercaseTool;

    #[async_trait]
    impl Tool for UppercaseTool {
        fn name(&self) -> &str {
            "uppercase"
        }

        fn description(&self) -> &str {
            "Uppercase the `text` field"
        }

        async fn call(&self, input: Value) -> ExecutionResult {
            match input.get("text").and_then(Value::as_str) {
                Some(text) => ExecutionResult::success(text.to_uppercase()),
                None => ExecutionResult::invalid_input("missing 'text'"),
            }
        }
    }

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }

        async fn call(&self, _input: Value) -> ExecutionResult {
            ExecutionResult::success(self.0)
        }
    }

    #[tokio::test]
    async fn dispatches_to_registered_tool() {
        let registry = InMemoryToolRegistry::new()
            .with_tool(Arc::new(UppercaseTool))
            .unwrap();

        let result = registry
            .dispatch("uppercase", serde_json::json!({"text": "hello"}))
            .await;
        assert_eq!(result, ExecutionResult::success("HELLO"));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_failure_not_a_panic() {
        let registry = InMemoryToolRegistry::new();
        let result = registry.dispatch("missing", Value::Null).await;
        assert!(matches!(
            result.failure_reason(),
            Some(FailureReason::NotFound { .. })
        ));
    }

    #[test]
    fn rejects_duplicates_and_bad_names() {
        let mut registry = InMemoryToolRegistry::new();
        registry.register(Arc::new(NamedTool("echo"))).unwrap();

        assert_eq!(
            registry.register(Arc::new(NamedTool("echo"))),
            Err(RegistryError::Duplicate("echo".to_string()))
        );
        assert!(matches!(
            registry.register(Arc::new(NamedTool("bad name"))),
            Err(RegistryError::InvalidName(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_all_skips_rejected_tools() {
        let mut registry = InMemoryToolRegistry::new();
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(NamedTool("b")),
            Arc::new(NamedTool("a")),
            Arc::new(NamedTool("b")),
            Arc::new(NamedTool("c.d")),
        ];

        assert_eq!(registry.register_all(tools), 2);
        assert_eq!(registry.names(), vec!["b", "a"]);
        assert!(registry.contains("a"));
        assert!(!registry.contains("c.d"));
    }

    #[test]
    fn specs_keep_registration_order() {
        let registry = InMemoryToolRegistry::new()
            .with_tool(Arc::new(NamedTool("zeta")))
            .and_then(|r| r.with_tool(Arc::new(UppercaseTool)))
            .unwrap();

        let specs = registry.specs();
        assert_eq!(specs[0].name, "zeta");
        assert_eq!(specs[1].name, "uppercase");
        assert_eq!(specs[1].description, "Uppercase the `text` field");
    }
}
