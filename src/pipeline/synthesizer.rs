use crate::error::Result;
use crate::pipeline::prompt::PromptTemplate;
use crate::pipeline::types::RetrievedDocument;
use crate::services::GenerationService;
use std::sync::Arc;

/// Answer used when the generation service returns no text.
pub const NO_ANSWER: &str = "Could not generate an answer.";

/// Produces a natural-language answer grounded in retrieved documents.
pub struct AnswerSynthesizer {
    generation: Arc<dyn GenerationService>,
    model: String,
    template: PromptTemplate,
}

impl AnswerSynthesizer {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        model: impl Into<String>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            generation,
            model: model.into(),
            template,
        }
    }

    pub async fn synthesize(
        &self,
        query: &str,
        documents: &[RetrievedDocument],
        system_prompt: Option<&str>,
    ) -> Result<String> {
        let context = render_context(documents);
        let prompt = self
            .template
            .render(&[("context", context.as_str()), ("query", query)]);
        let prompt = match system_prompt.filter(|p| !p.trim().is_empty()) {
            Some(system) => format!("{}\n\n{}", system, prompt),
            None => prompt,
        };

        let answer = self.generation.generate(&self.model, &prompt).await?;
        Ok(answer.unwrap_or_else(|| NO_ANSWER.to_string()))
    }
}

/// One labeled block per document, separated by blank lines.
pub fn render_context(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                "[Document {}] {}\nURL: {}\ncontent:\n{}",
                i + 1,
                doc.title,
                doc.url,
                doc.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoGeneration {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GenerationService for EchoGeneration {
        async fn generate(&self, _model: &str, prompt: &str) -> Result<Option<String>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn generation(reply: Option<&str>) -> Arc<EchoGeneration> {
        Arc::new(EchoGeneration {
            reply: reply.map(str::to_string),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn docs() -> Vec<RetrievedDocument> {
        vec![
            RetrievedDocument {
                title: "Travel Policy".to_string(),
                content: "Economy class only.".to_string(),
                url: "https://example.com/travel".to_string(),
            },
            RetrievedDocument {
                title: "Expense Guide".to_string(),
                content: "Submit within 30 days.".to_string(),
                url: String::new(),
            },
        ]
    }

    #[test]
    fn test_render_context_blocks() {
        assert_eq!(
            render_context(&docs()),
            "[Document 1] Travel Policy\nURL: https://example.com/travel\n\
             content:\nEconomy class only.\n\n\
             [Document 2] Expense Guide\nURL: \ncontent:\nSubmit within 30 days."
        );
    }

    #[tokio::test]
    async fn test_synthesize_sends_context_and_query() {
        let service = generation(Some("Fly economy."));
        let synthesizer = AnswerSynthesizer::new(
            Arc::clone(&service) as Arc<dyn GenerationService>,
            "m",
            PromptTemplate::new("answer", "C={{context}}\nQ={{query}}"),
        );

        let answer = synthesizer.synthesize("Which class?", &docs(), None).await.unwrap();

        assert_eq!(answer, "Fly economy.");
        let prompts = service.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("C=[Document 1] Travel Policy"));
        assert!(prompts[0].ends_with("Q=Which class?"));
    }

    #[tokio::test]
    async fn test_synthesize_prepends_system_prompt() {
        let service = generation(Some("ok"));
        let synthesizer = AnswerSynthesizer::new(
            Arc::clone(&service) as Arc<dyn GenerationService>,
            "m",
            PromptTemplate::new("answer", "Q={{query}}"),
        );

        synthesizer
            .synthesize("q", &docs(), Some("Answer in one sentence."))
            .await
            .unwrap();

        assert_eq!(service.prompts.lock().unwrap()[0], "Answer in one sentence.\n\nQ=q");
    }

    #[tokio::test]
    async fn test_synthesize_without_text_uses_fallback() {
        let synthesizer = AnswerSynthesizer::new(
            generation(None),
            "m",
            PromptTemplate::answer_from_context(),
        );

        let answer = synthesizer.synthesize("q", &docs(), None).await.unwrap();
        assert_eq!(answer, NO_ANSWER);
    }
}
