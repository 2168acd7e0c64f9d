// Cross-cutting prompt fragments shared by every generation path.
// Each feature keeps its own prompt templates next to it.

/// System instruction for every call that writes on the applicant's behalf.
pub const RESUME_WRITER_SYSTEM: &str = "You are a professional resume writer.";

/// Keeps generated content anchored to the applicant's real history.
pub const FACTUALITY_INSTRUCTION: &str = "\
    Keep every fact true to the applicant's resume. \
    Do NOT invent employers, titles, dates, degrees, or metrics. \
    Highlight the skills, keywords, and experiences that match the job description.";
