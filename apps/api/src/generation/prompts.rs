// Prompt templates for the content assistant.
// Placeholders are `{name}`; fill with `fill` before sending.

/// Job description prompt. Replace `{title}`, `{company}`, `{location}`,
/// `{salary}` and `{job_type}` before sending.
pub const DESCRIPTION_PROMPT_TEMPLATE: &str = r#"Create a professional and compelling job description for the following position:

Job Title: {title}
Company: {company}
Location: {location}
Salary Range: {salary}
Employment Type: {job_type}

Please create a comprehensive job description that includes:
1. A brief company overview (you can make reasonable assumptions about the company)
2. Role overview and key responsibilities
3. What we're looking for in a candidate
4. What the company offers
5. Growth opportunities

Make it engaging, professional, and attractive to potential candidates. The description should be 3-4 paragraphs long and highlight why this is an exciting opportunity.

Do not include requirements or skills list as those will be added separately."#;

/// Résumé builder prompt. Replace `{brief}` before sending.
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Reply with a single JSON object and nothing else: no prose, no markdown fences.

Write a polished, professional résumé for the candidate described below.
Use only facts present in the description. Where a field is unknown, use an empty string.

CANDIDATE DESCRIPTION:
{brief}

Return a JSON object with this EXACT schema (no extra fields):
{
  "personalInfo": {
    "name": "string",
    "email": "string",
    "phone": "string",
    "location": "string",
    "summary": "2-3 sentence professional summary"
  },
  "experience": [
    {"title": "string", "company": "string", "duration": "2021 - Present", "description": "string"}
  ],
  "education": [
    {"degree": "string", "school": "string", "year": "2015 - 2019"}
  ],
  "skills": ["string"]
}"#;

/// Substitutes `{key}` placeholders in one pass over `template`.
/// Inserted values are never rescanned; unknown `{...}` text is kept verbatim.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let value = tail.find('}').and_then(|end| {
            let key = &tail[1..end];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (end, *value))
        });
        match value {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
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
