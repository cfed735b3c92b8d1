//! Thinking action - think out loud before acting

use super::schema::{Arguments, ParamSpec, ParamType};
use super::{confidence_param, confidence_percent, Action, DEFAULT_CONFIDENCE};

pub const THINKING_ACTION: &str = "thinking_tool";

/// Records a visible thought: a plan, a decomposition, a reflection
pub struct ThinkingAction;

impl Action for ThinkingAction {
    fn name(&self) -> &str { THINKING_ACTION }

    fn description(&self) -> &str {
        "Think out loud about the problem. Use it to break down complex problems, \
         plan a strategy before acting, reflect on what you have learned, or weigh \
         different approaches. The thought is shown to the user."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("title", ParamType::String, "Short, descriptive title of the thought"),
            ParamSpec::required("thought", ParamType::String, "The complete, detailed thought"),
            ParamSpec::optional("action", ParamType::String, "Next action you plan to take"),
            confidence_param("Your confidence in this thought (0-1)"),
        ]
    }

    fn execute(&self, args: &Arguments) -> String {
        let title = args.text("title").unwrap_or_default();
        let confidence = args.number("confidence").unwrap_or(DEFAULT_CONFIDENCE);

        format!(
            "Thought '{}' recorded (confidence: {}%)",
            title,
            confidence_percent(confidence)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::schema::validate;
    use serde_json::json;

    fn run(raw: serde_json::Value) -> String {
        let action = ThinkingAction;
        let args = validate(action.name(), &action.parameters(), &raw).unwrap();
        action.execute(&args)
    }

    #[test]
    fn test_thinking_confirmation() {
        let out = run(json!({
            "title": "Analyzing the problem",
            "thought": "Find the most expensive services first.",
            "action": "Ask for the service list",
            "confidence": 0.9
        }));
        assert_eq!(out, "Thought 'Analyzing the problem' recorded (confidence: 90%)");
    }

    #[test]
    fn test_thinking_default_confidence() {
        let out = run(json!({"title": "Plan", "thought": "step one"}));
        assert_eq!(out, "Thought 'Plan' recorded (confidence: 80%)");
    }

    #[test]
    fn test_thinking_contains_title_and_percent() {
        for (title, confidence) in [("a", 0.0), ("Edge 'quoted'", 1.0), ("mid", 0.333), ("x", 0.005)] {
            let out = run(json!({"title": title, "thought": "t", "confidence": confidence}));
            assert!(out.contains(title));
            assert!(out.contains(&format!("{}%", (confidence * 100.0_f64).round() as i64)));
        }
    }
}
