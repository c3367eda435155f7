//! Dynamic system prompt assembly.

use crate::config::UserLevel;

const BASE_PROMPT: &str = "\
You are a research assistant with extensive knowledge.

IMPORTANT INSTRUCTIONS:
1. First, try to answer using your built-in knowledge
2. Use web_search ONLY when you need current information, specific data, or verification
3. Use scrape_webpage ONLY when the user provides a specific URL to analyze
4. After using a tool ONCE, provide your final comprehensive answer immediately
5. DO NOT call multiple tools in sequence - one tool call is enough

Output Format Requirements:
- Write in clean, plain text format suitable for terminal display
- NO markdown tables - use simple aligned text instead
- NO asterisks for bold - use UPPERCASE or simple emphasis
- Structure with clear headings using numbers or bullets
- Include sources when you used web_search
- Be comprehensive but well-organized
";

/// Build the system prompt for a given user expertise level.
pub fn system_prompt(level: UserLevel) -> String {
    let style = match level {
        UserLevel::Expert => {
            "Use technical terminology and detailed analysis. Assume advanced knowledge."
        }
        UserLevel::Beginner => {
            "Explain concepts in simple terms with examples. Avoid jargon."
        }
        UserLevel::General => {
            "Professional, objective, and informative. Balance technical accuracy with accessibility."
        }
    };
    format!("{BASE_PROMPT}\nCommunication Style: {style}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_level_gets_a_distinct_suffix() {
        let expert = system_prompt(UserLevel::Expert);
        let beginner = system_prompt(UserLevel::Beginner);
        let general = system_prompt(UserLevel::General);

        assert!(expert.contains("technical terminology"));
        assert!(beginner.contains("simple terms"));
        assert!(general.contains("Professional"));
        assert_ne!(expert, beginner);
    }

    #[test]
    fn base_instructions_always_present() {
        for level in [UserLevel::Expert, UserLevel::Beginner, UserLevel::General] {
            let prompt = system_prompt(level);
            assert!(prompt.contains("web_search"));
            assert!(prompt.contains("one tool call is enough"));
        }
    }
}
