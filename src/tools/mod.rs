//! Tools module - reasoning actions
//!
//! Actions are the named, schema-typed operations the decision engine may
//! invoke. Their names are shared with renderers, which match on them.

mod analysis;
mod registry;
pub mod schema;
mod thinking;

pub use analysis::{AnalysisAction, ANALYSIS_ACTION};
pub use registry::{ActionDescriptor, ActionRegistry};
pub use schema::{ArgValue, Arguments, ParamSpec, ParamType};
pub use thinking::{ThinkingAction, THINKING_ACTION};

/// Confidence used when the engine omits it
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Action trait - interface for all invocable actions
pub trait Action: Send + Sync {
    /// Action name used in invocations
    fn name(&self) -> &str;

    /// Description of what the action does
    fn description(&self) -> &str;

    /// Ordered parameter schema
    fn parameters(&self) -> Vec<ParamSpec>;

    /// Run the action on validated arguments.
    ///
    /// Never fails: validation happens in the registry.
    fn execute(&self, args: &Arguments) -> String;

    /// Convert to a catalog entry for the engine and renderers
    fn to_descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Shared `confidence` parameter: a number in [0, 1], default 0.8
pub(crate) fn confidence_param(description: &str) -> ParamSpec {
    ParamSpec::optional("confidence", ParamType::Number, description)
        .with_default(ArgValue::Number(DEFAULT_CONFIDENCE))
        .with_range(0.0, 1.0)
}

/// Confidence as a whole percentage
#[inline]
pub(crate) fn confidence_percent(confidence: f64) -> i64 {
    (confidence * 100.0).round() as i64
}

/// Action that counts its executions, for testing
#[cfg(test)]
pub struct CountingAction {
    pub name: String,
    pub calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

#[cfg(test)]
impl CountingAction {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: Default::default(),
        }
    }
}

#[cfg(test)]
impl Action for CountingAction {
    fn name(&self) -> &str { &self.name }
    fn description(&self) -> &str { "Counting action for testing" }
    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required("value", ParamType::String, "Anything")]
    }

    fn execute(&self, args: &Arguments) -> String {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        format!("counted {}", args.text("value").unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_percent_rounds() {
        assert_eq!(confidence_percent(0.8), 80);
        assert_eq!(confidence_percent(0.856), 86);
        assert_eq!(confidence_percent(0.0), 0);
        assert_eq!(confidence_percent(1.0), 100);
    }
}
