// Name-recognition LLM prompt templates.

pub const NAME_EXTRACTION_SYSTEM: &str = "\
You are a precise named-entity recognizer for resumes. \
You MUST respond with valid JSON only — no markdown fences, no explanations. \
Only report names of people. Never report companies, schools, products, or places. \
Copy every name exactly as it is written in the text.";

pub const NAME_EXTRACTION_PROMPT: &str = r#"List every person name that appears in the following resume text, in the order they first appear.

RESUME TEXT:
{resume_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "persons": ["string"]
}

RULES:
1. Each entry must be copied verbatim from the text, including capitalization.
2. Do NOT include titles such as "Dr." or "Mr." unless they are part of the written name.
3. If there are no person names, return {"persons": []}.
4. Return ONLY the JSON object — nothing else, no code fences."#;
