//! Prompt templates for the completion message.

/// Closing phrase every task summary ends with.
pub const CLOSING_PHRASE: &str = "Ready for next task!";

const SUMMARY_PROMPT: &str = r#"Based on this conversation, generate a brief one-sentence summary of what the AI assistant accomplished, followed by "Ready for next task!"

Conversation context:
{context}

Requirements:
- Start with "I've completed the following task:"
- Continue with what was accomplished (e.g., "I created user login system", "I fixed database connection", "I added dark mode toggle")
- End with{name} Ready for next task!"
- Keep the summary under 15 words total
- Be specific about the main deliverable
- Return ONLY the completion message
- Do NOT include quotes or formatting

Example: "I've completed the following task: added JWT authentication. Ready for next task!""#;

const GENERIC_PROMPT: &str = r#"Generate a short, friendly completion message for when an AI coding assistant finishes a task.

Requirements:
- Keep it under 10 words
- Make it positive and future focused
- Use natural, conversational language
- Focus on completion/readiness
- Do NOT include quotes, formatting, or explanations
- Return ONLY the completion message text
{name_instruction}
{examples}

Generate ONE completion message:"#;

const PLAIN_EXAMPLES: &str =
    r#"Examples of the style: "Work complete!", "All done!", "Task finished!", "Ready for your next move!""#;

/// Build the completion prompt.
///
/// With non-blank `context` the provider is asked for a short task summary;
/// otherwise for a generic completion phrase. The engineer name, when set,
/// is left to the model to use "about 30% of the time".
pub fn completion_prompt(context: Option<&str>, engineer_name: Option<&str>) -> String {
    let context = context.map(str::trim).filter(|c| !c.is_empty());
    let name = engineer_name.map(str::trim).filter(|n| !n.is_empty());

    match context {
        Some(context) => {
            let name_part = name.map(|n| format!(" {n},")).unwrap_or_default();
            fill(SUMMARY_PROMPT, &[("{context}", context), ("{name}", name_part.as_str())])
        }
        None => {
            let (name_instruction, examples) = match name {
                Some(n) => (
                    format!(
                        "- Sometimes (about 30% of the time) include the engineer's name '{n}' in a natural way."
                    ),
                    format!(
                        "Examples of the style:\n- Standard: \"Work complete!\", \"All done!\", \"Task finished!\", \"Ready for your next move!\"\n- Personalized: \"{n}, all set!\", \"Ready for you, {n}!\", \"Complete, {n}!\", \"{n}, we're done!\""
                    ),
                ),
                None => (String::new(), PLAIN_EXAMPLES.to_string()),
            };
            fill(
                GENERIC_PROMPT,
                &[("{name_instruction}", name_instruction.as_str()), ("{examples}", examples.as_str())],
            )
        }
    }
}

/// Substitute placeholders in one pass over `template`. Inserted values are
/// never scanned, so braces in transcript text or names come through as-is.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match slots.iter().find(|(key, _)| tail.starts_with(*key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
