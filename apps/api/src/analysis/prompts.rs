//! Prompt construction for the analysis call.
//! Each feature that needs LLM calls keeps its prompts alongside it.

/// Fixed instruction prefix for the ATS analysis task. Constant across
/// requests so analyzer behavior stays reproducible.
pub const ATS_ANALYSIS_PROMPT: &str = "You are an ATS resume analyzer. \
    Analyze this resume for structure, skills, formatting, \
    and give a score with improvement suggestions.";

/// Joins the instruction template and the extracted resume text.
/// Pure — no I/O, no suspension. An empty extraction still produces a valid
/// (if low-value) prompt; whether to proceed is the pipeline's call.
pub fn build_prompt(template: &str, extracted: &str) -> String {
    format!("{template}\n\n{extracted}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_is_template_blank_line_text() {
        let prompt = build_prompt("Analyze this.", "Resume body");
        assert_eq!(prompt, "Analyze this.\n\nResume body");
    }

    #[test]
    fn test_build_prompt_is_referentially_transparent() {
        let a = build_prompt(ATS_ANALYSIS_PROMPT, "same text");
        let b = build_prompt(ATS_ANALYSIS_PROMPT, "same text");
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_prompt_differs_when_extraction_differs() {
        let a = build_prompt(ATS_ANALYSIS_PROMPT, "candidate one");
        let b = build_prompt(ATS_ANALYSIS_PROMPT, "candidate two");
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_extraction_still_builds() {
        let prompt = build_prompt(ATS_ANALYSIS_PROMPT, "");
        assert!(prompt.starts_with(ATS_ANALYSIS_PROMPT));
        assert!(prompt.ends_with("\n\n"));
    }
}
