//! Prompt construction for the agent.

use crate::domain::PromptContext;

const ANSWER_LANGUAGE: &str = "Responda em português brasileiro.";

/// What to do with extracted text.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPlan {
    /// No instruction: the extracted text is the result, the agent is not called.
    ExtractedTextOnly,
    /// Ask the agent with this prompt.
    Ask(String),
}

/// Decide whether and how to ask the agent about `extracted`.
pub fn plan(extracted: &str, ctx: &PromptContext) -> PromptPlan {
    let Some(instruction) = ctx.instruction() else {
        return PromptPlan::ExtractedTextOnly;
    };

    let mut prompt = String::new();
    if let Some(context) = ctx.context() {
        prompt.push_str(&format!("Contexto: {}\n\n", context.trim()));
    }
    prompt.push_str(&format!("Texto extraído da imagem: {}\n\n", extracted));
    prompt.push_str(&format!("Pergunta do usuário: {}\n\n", instruction));
    prompt.push_str(ANSWER_LANGUAGE);

    PromptPlan::Ask(prompt)
}

/// Fixed evaluative prompt used by the real-estate analysis endpoint.
pub fn assessment_prompt(extracted: &str) -> String {
    format!(
        "Este texto foi extraído de uma imagem de um anúncio ou documento imobiliário: {}. \
         O que isso significa? Avalie o imóvel descrito, destacando localização, preço, \
         área, características relevantes e possíveis pontos de atenção para quem pretende \
         comprar ou alugar. {}",
        extracted, ANSWER_LANGUAGE
    )
}
