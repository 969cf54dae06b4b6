use chrono::NaiveDate;

/// Build the extraction prompt for one user message.
///
/// Relative dates ("tomorrow", "next Friday") only make sense against a
/// reference day, so `today` is embedded in the prompt.
pub fn build_prompt(message: &str, today: NaiveDate) -> String {
    format!(
        r#"You are the helper layer for a restaurant reservation chatbot.

User message: "{message}"

Interpret the user message relative to today's date.
Today's date is {today}.

Examples:
- "tomorrow" = today + 1 day
- "day after tomorrow" = today + 2 days
- "next Friday" = the next upcoming Friday
- "20th of November" = the next upcoming November 20, even if next year

Extract the user's intent and details.
Return ONLY a JSON object with this exact shape:

{{
  "intent": "new_reservation" | "modify_reservation" | "cancel_reservation" | "confirm_reservation" | "small_talk" | "unknown",
  "date": string | null,
  "time": string | null,
  "guests": number | null,
  "name": string | null,
  "notes": string
}}

Rules:
- "date" is YYYY-MM-DD, "time" is 24h HH:MM.
- If you are not sure about a field, set it to null.
- "notes" is a short explanation of what you inferred.
- Respond with ONLY the JSON, no explanation, no markdown, no extra text.
"#,
        message = message.replace('"', "'"),
        today = today.format("%Y-%m-%d"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_message_and_date() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let prompt = build_prompt("table for 2 \"tomorrow\"", today);
        assert!(prompt.contains("Today's date is 2026-10-16."));
        assert!(prompt.contains("User message: \"table for 2 'tomorrow'\""));
        assert!(prompt.contains("\"intent\": \"new_reservation\""));
    }
}
