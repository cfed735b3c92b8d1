//! Analysis action - interpret results that were obtained

use super::schema::{ArgValue, Arguments, ParamSpec, ParamType};
use super::{confidence_param, confidence_percent, Action, DEFAULT_CONFIDENCE};

pub const ANALYSIS_ACTION: &str = "analyze_tool";

/// Next action assumed when the engine gives none
pub const DEFAULT_NEXT_ACTION: &str = "continue";

/// Records a visible analysis of data the agent has gathered
pub struct AnalysisAction;

impl Action for AnalysisAction {
    fn name(&self) -> &str { ANALYSIS_ACTION }

    fn description(&self) -> &str {
        "Analyze results you have obtained. Use it to interpret data, draw \
         conclusions, spot patterns, and decide next steps based on evidence. \
         The analysis is shown to the user."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("title", ParamType::String, "Short title of the analysis"),
            ParamSpec::required("analysis_result", ParamType::String, "The data or results being analyzed"),
            ParamSpec::required("analysis", ParamType::String, "Your detailed analysis and interpretation"),
            ParamSpec::optional("next_action", ParamType::String, "What you recommend doing next")
                .with_default(ArgValue::Text(DEFAULT_NEXT_ACTION.to_string())),
            confidence_param("Your confidence in the analysis (0-1)"),
        ]
    }

    fn execute(&self, args: &Arguments) -> String {
        let title = args.text("title").unwrap_or_default();
        let confidence = args.number("confidence").unwrap_or(DEFAULT_CONFIDENCE);

        format!(
            "Analysis '{}' completed (confidence: {}%)",
            title,
            confidence_percent(confidence)
        )
    }
}
