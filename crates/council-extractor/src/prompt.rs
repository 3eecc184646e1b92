//! LLM prompt engineering for decision extraction

/// JSON schema the LLM output is constrained to
pub const DECISIONS_SCHEMA: &str = r#"{
  "type": "array",
  "items": {
    "type": "object",
    "properties": {
      "title": { "type": "string" },
      "content": { "type": "string" },
      "location": { "type": "array", "items": { "type": "number" }, "nullable": true },
      "summary": { "type": "string" }
    },
    "required": ["title", "content", "location", "summary"]
  }
}"#;

/// Builds prompts for the LLM to extract decisions
pub struct PromptBuilder {
    minutes: String,
    part: Option<(usize, usize)>,
}

impl PromptBuilder {
    /// Create a new prompt builder for a block of minutes text
    pub fn new(minutes: impl Into<String>) -> Self {
        Self {
            minutes: minutes.into(),
            part: None,
        }
    }

    /// Mark the text as part `index` (0-based) of `total` pieces of one meeting
    pub fn with_part(mut self, index: usize, total: usize) -> Self {
        if total > 1 {
            self.part = Some((index, total));
        }
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(EXAMPLE);
        prompt.push_str("\n\n");

        if let Some((index, total)) = self.part {
            prompt.push_str(&format!(
                "The minutes are long and are given in pieces. This is piece {} of {}. \
                 Extract only the decisions that appear in this piece.\n\n",
                index + 1,
                total
            ));
        }

        prompt.push_str("Minutes:\n");
        prompt.push_str("---\n");
        prompt.push_str(&self.minutes);
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You summarize decisions made at municipal council meetings.
Read the council meeting minutes below and extract every decision the council made
(motions carried, by-laws enacted, approvals, referrals). Each decision is an object:

{
  "title": "short plain-language title",
  "content": "the motion text as written in the minutes",
  "location": [latitude, longitude] or null,
  "summary": "one or two sentences a resident without background could follow"
}

Rules:
- One decision per motion; do not merge unrelated motions
- The title must make sense to someone who has never read council minutes
- Copy the motion wording into content without rewording it
- Only give a location when the decision concerns an identifiable address, site or
  neighbourhood; express it as decimal latitude and longitude, otherwise use null
- Ignore procedural motions (adjournment, adopting the agenda, approving prior minutes)"#;

const EXAMPLE: &str = r#"Example. From this motion:

THAT Council approve a grant of $250,000 to the Riverside Community Centre Association
for roof replacement at 1200 Riverside Drive, to be funded from the 2026 capital budget.

you would output:

{
  "title": "Grant for the Riverside Community Centre roof",
  "content": "THAT Council approve a grant of $250,000 to the Riverside Community Centre Association for roof replacement at 1200 Riverside Drive, to be funded from the 2026 capital budget.",
  "location": [49.2606, -123.1140],
  "summary": "Council gave the Riverside Community Centre $250,000 from the capital budget to replace its roof."
}"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (JSON array only, no additional text):
[
  { "title": "...", "content": "...", "location": [0.0, 0.0] or null, "summary": "..." }
]

Return an empty array if the minutes contain no decisions."#;
