// All prompt templates for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Tailoring prompt. Fill `{factuality}`, `{job_description}` and `{resume}` before sending.
pub const TAILOR_PROMPT_TEMPLATE: &str = r####"Role: You are an expert ATS (Applicant Tracking System) optimizer and career coach.
Task: Rewrite the applicant's resume so it aligns with the job description below.
{factuality}

Output the full rewritten resume in Markdown using EXACTLY this layout:
- The first line is "# " followed by the applicant's full name.
- The second line holds the contact details (email, phone, location, links) joined with " | ".
- Every section starts with a "## " heading, e.g. "## Summary", "## Experience", "## Skills", "## Education".
- Every role or degree starts with a "### " line naming the title, organization, and dates.
- Achievements and skills are "- " bullets.
- Do NOT wrap the output in code fences.
- Do NOT add commentary before or after the resume.

---
JOB DESCRIPTION:
{job_description}

---
ORIGINAL RESUME:
{resume}
"####;

/// Answers prompt. Fill `{factuality}`, `{job_description}`, `{resume}` and `{questions}`.
pub const ANSWERS_PROMPT_TEMPLATE: &str = r#"Role: You are a professional job applicant.
Task: Answer the following job application questions based strictly on my resume and the job context.
Style: Professional, concise, and persuasive.
{factuality}

Return one object per question, in the order asked, repeating the question text verbatim.

---
JOB DESCRIPTION:
{job_description}

---
MY RESUME:
{resume}

---
QUESTIONS:
{questions}
"#;

/// Job detail extraction prompt. Fill `{job_description}`.
pub const JOB_DETAILS_PROMPT_TEMPLATE: &str = r#"Extract the company name and the job title from this job description. Return JSON.

TEXT: {job_description}"#;

/// Stands in for the résumé body when the résumé arrives as an attached document.
pub const ATTACHED_RESUME_TEMPLATE: &str =
    "The original resume is attached as a document named \"{file_name}\". Read all of it.";

/// Substitutes `{name}` placeholders in one pass over `template`.
///
/// Inserted values are never scanned again, so a job description or résumé
/// that happens to contain `{resume}` is sent verbatim. Unknown placeholders
/// are left as they are.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let matched = values.iter().find(|(name, _)| {
            tail.strip_prefix(*name)
                .is_some_and(|after| after.starts_with('}'))
        });
        match matched {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tailor_template_keeps_full_layout() {
        assert!(TAILOR_PROMPT_TEMPLATE.contains("\"# \" followed by"));
        assert!(TAILOR_PROMPT_TEMPLATE.contains("\"## \" heading"));
        assert!(TAILOR_PROMPT_TEMPLATE.contains("### "));
        assert!(TAILOR_PROMPT_TEMPLATE.ends_with("{resume}\n"));
    }

    #[test]
    fn test_fill_replaces_each_placeholder() {
        let filled = fill(
            "A {x} and {y}, {x} again",
            &[("x", "one"), ("y", "two")],
        );
        assert_eq!(filled, "A one and two, one again");
    }

    #[test]
    fn test_fill_does_not_expand_inserted_values() {
        let filled = fill(
            "JD: {job_description}\nCV: {resume}",
            &[("job_description", "Paste {resume} here"), ("resume", "Jane")],
        );
        assert_eq!(filled, "JD: Paste {resume} here\nCV: Jane");
    }

    #[test]
    fn test_fill_leaves_unknown_and_unclosed_braces() {
        assert_eq!(fill("{other} {x", &[("x", "1")]), "{other} {x");
        assert_eq!(fill("{{x}}", &[("x", "1")]), "{1}");
    }
}
