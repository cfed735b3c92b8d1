//! Terminal rendering of conversations.
//!
//! Reasoning actions are matched by name and rendered as reasoning panels;
//! every other action result falls back to a generic input/output block.

use colored::*;
use serde_json::Value;

use crate::agent::{Conversation, InvocationRecord, Message, Role};
use crate::tools::schema::{number_value, text_value};
use crate::tools::{confidence_percent, ANALYSIS_ACTION, DEFAULT_CONFIDENCE, THINKING_ACTION};

/// Render every message of a conversation, skipping the system message.
pub fn render_conversation(conversation: &Conversation) -> String {
    conversation
        .iter()
        .filter(|m| m.role != Role::System)
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a single message.
pub fn render_message(message: &Message) -> String {
    match (message.role, message.invocation.as_ref()) {
        (Role::System, _) => format!("{}", "(system instructions)".dimmed()),
        (Role::User, _) => format!("{}: {}", "You".blue().bold(), message.content),
        (Role::Agent, _) => format!("{}: {}", "Agent".green().bold(), message.content),
        (Role::ActionResult, Some(record)) if record.error.is_none() => match record.name.as_str() {
            THINKING_ACTION => render_thinking(record),
            ANALYSIS_ACTION => render_analysis(record),
            _ => render_generic(record, &message.content),
        },
        (Role::ActionResult, Some(record)) => render_generic(record, &message.content),
        (Role::ActionResult, None) => format!("{} {}", "⚙".cyan(), message.content),
    }
}

fn render_thinking(record: &InvocationRecord) -> String {
    let args = &record.arguments;
    let mut out = format!(
        "  {} {}\n",
        "∴".magenta(),
        format!("Thought: {}", text_arg(args, "title")).magenta().bold()
    );
    out.push_str(&indent(&text_arg(args, "thought")));

    let action = text_arg(args, "action");
    if !action.is_empty() {
        out.push_str(&format!("\n    {} {}", "Next action:".bold(), action));
    }
    out.push_str(&format!("\n    {}", confidence_line(args)));
    out
}

fn render_analysis(record: &InvocationRecord) -> String {
    let args = &record.arguments;
    let mut out = format!(
        "  {} {}\n",
        "◆".yellow(),
        format!("Analysis: {}", text_arg(args, "title")).yellow().bold()
    );

    let result = text_arg(args, "analysis_result");
    if !result.is_empty() {
        out.push_str(&format!("    {}\n{}\n", "Result:".bold(), indent(&result)));
    }

    let analysis = text_arg(args, "analysis");
    if !analysis.is_empty() {
        out.push_str(&format!("    {}\n{}\n", "Analysis:".bold(), indent(&analysis)));
    }

    let next = text_arg(args, "next_action");
    if !next.is_empty() {
        out.push_str(&format!("    {} {}\n", "Next action:".bold(), next));
    }
    out.push_str(&format!("    {}", confidence_line(args)));
    out
}

fn render_generic(record: &InvocationRecord, output: &str) -> String {
    let input = serde_json::to_string_pretty(&record.arguments).unwrap_or_default();
    let header = format!("⚙ {}", record.name);
    let (header, output) = if record.error.is_some() {
        (header.red().bold(), output.red())
    } else {
        (header.cyan().bold(), output.normal())
    };

    format!(
        "  {}\n    {}\n{}\n    {} {}",
        header,
        "Input:".bold(),
        indent(&input),
        "Output:".bold(),
        output
    )
}

/// Display text for an argument, coerced the way the registry reads it.
fn text_arg(args: &Value, key: &str) -> String {
    args.get(key).and_then(text_value).unwrap_or_default()
}

fn confidence_line(args: &Value) -> ColoredString {
    let confidence = args
        .get("confidence")
        .and_then(number_value)
        .unwrap_or(DEFAULT_CONFIDENCE);
    format!("Confidence: {}%", confidence_percent(confidence)).italic()
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_step(msg: &str) {
    println!("  {} {}", "•".green(), msg);
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg.green());
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠️ ".yellow().bold(), msg.yellow());
}

pub fn print_error(msg: &str) {
    println!("  {} {}", "❌".red().bold(), msg.red());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ActionInvocation;
    use crate::error::ActionError;
    use serde_json::json;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_render_thinking_panel() {
        plain();
        let inv = ActionInvocation::new(
            THINKING_ACTION,
            json!({"title": "Plan", "thought": "Split it up", "action": "Ask for data", "confidence": 0.9}),
        );
        let out = render_message(&Message::action_result(inv, 0, "ok"));

        assert!(out.contains("Thought: Plan"));
        assert!(out.contains("Split it up"));
        assert!(out.contains("Next action: Ask for data"));
        assert!(out.contains("Confidence: 90%"));
    }

    #[test]
    fn test_render_matches_recorded_result_for_coerced_arguments() {
        plain();
        let registry = std::sync::Arc::new(crate::tools::ActionRegistry::with_reasoning_actions());
        let engine = crate::agent::llm::FakeEngine::new(vec![
            crate::agent::Decision::Invoke(vec![ActionInvocation::new(
                THINKING_ACTION,
                json!({"title": 42, "thought": "x", "confidence": "0.9"}),
            )]),
            crate::agent::Decision::answer("done"),
        ]);
        let agent = crate::agent::AgentLoop::new(engine, registry, 5);

        let conv = tokio_test::block_on(agent.run(Conversation::from_user("q"))).unwrap();
        let result = &conv.messages()[2];
        assert_eq!(result.content, "Thought '42' recorded (confidence: 90%)");

        let out = render_message(result);
        assert!(out.contains("Thought: 42"));
        assert!(out.contains("Confidence: 90%"));
    }

    #[test]
    fn test_render_analysis_default_confidence() {
        plain();
        let inv = ActionInvocation::new(
            ANALYSIS_ACTION,
            json!({"title": "Sales", "analysis_result": "Jan: 10k", "analysis": "Growing"}),
        );
        let out = render_message(&Message::action_result(inv, 0, "ok"));

        assert!(out.contains("Analysis: Sales"));
        assert!(out.contains("Result:"));
        assert!(out.contains("Jan: 10k"));
        assert!(!out.contains("Next action:"));
        assert!(out.contains("Confidence: 80%"));
    }

    #[test]
    fn test_render_failure_falls_back_to_generic() {
        plain();
        let inv = ActionInvocation::new(THINKING_ACTION, json!({"title": "x"}));
        let err = ActionError::MissingRequiredArgument {
            action: THINKING_ACTION.to_string(),
            argument: "thought".to_string(),
        };
        let out = render_message(&Message::action_failure(inv, 0, &err));

        assert!(out.contains("⚙ thinking_tool"));
        assert!(out.contains("missing_required_argument"));
        assert!(!out.contains("Thought:"));
    }

    #[test]
    fn test_render_conversation_skips_system() {
        plain();
        let mut conv = Conversation::from_user("Hello");
        conv.ensure_system("secret instructions");
        conv.push(Message::agent("Hi")).unwrap();

        let out = render_conversation(&conv);
        assert!(!out.contains("secret"));
        assert!(out.contains("You: Hello"));
        assert!(out.contains("Agent: Hi"));
    }
}
