// Prompt constants for resume content generation.
// Reuses the JSON-only system prompt from llm_client::prompts.

/// Generation prompt template.
/// Replace: {full_name}, {headline}, {education}, {skills}, {experience}, {projects}
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"You are an expert resume writer for students and early-career creators.
Write ATS-friendly content.
Return ONLY valid JSON with the exact keys:

{
  "summary": "string (2-3 lines)",
  "experienceBullets": ["string", "string", "string"],
  "projectBullets": ["string", "string", "string"],
  "skillsClean": ["string", "string", "string", "string", "string"]
}

Guidelines:
- Use strong action verbs.
- No emojis.
- Keep bullets realistic and not exaggerated.
- If experience is empty or fresher, create bullets based on projects/education.
- Use the user data below.

USER DATA:
Full Name: {full_name}
Headline: {headline}
Education: {education}
Skills: {skills}
Experience: {experience}
Projects: {projects}"#;

/// Role used in the offline summary when the headline is blank.
pub const OFFLINE_DEFAULT_ROLE: &str = "Student / Fresher";

/// Stand-in for the skill list in the offline summary when the user listed none.
pub const OFFLINE_DEFAULT_FOUNDATION: &str = "core skills";

pub const OFFLINE_EXPERIENCE_BULLETS: [&str; 3] = [
    "Built responsive UI screens and reusable components with clean, readable code.",
    "Improved user experience by fixing UI bugs and polishing layouts for mobile and desktop.",
    "Worked on small-to-medium features end-to-end: UI, basic API integration, and testing.",
];

pub const OFFLINE_PROJECT_BULLETS: [&str; 3] = [
    "Created a resume builder app with form-based inputs, save/load functionality, and template preview.",
    "Built modern landing pages with strong UI hierarchy and performance-friendly components.",
    "Implemented authentication and secure data storage using Supabase policies (RLS).",
];
