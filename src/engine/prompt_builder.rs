use crate::model::advice::AdvicePrompt;
use crate::model::catalog::Item;

const MENTOR_SYSTEM_PROMPT: &str = "You are Vesemir. Give concise, tactical advice (under 50 words) \
for the specific quest/item. Focus on missables and combat tips. Be grumpy.";

const CODEX_SYSTEM_PROMPT: &str = "You are the Witcher's Codex. Answer questions about monsters, \
locations, and lore in The Witcher 3. Keep answers concise.";

/// Formats prompts for the advice service. Only text, no networking.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn item_advice(item: &Item) -> AdvicePrompt {
        let mut prompt = String::new();
        prompt.push_str("Advice for: ");
        prompt.push_str(&item.title);
        prompt.push_str(". Details: ");
        prompt.push_str(&item.long_desc);

        AdvicePrompt {
            prompt,
            system: MENTOR_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn codex(question: &str) -> AdvicePrompt {
        AdvicePrompt {
            prompt: question.trim().to_string(),
            system: CODEX_SYSTEM_PROMPT.to_string(),
        }
    }
}
