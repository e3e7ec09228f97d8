//! Prompt templates for grounded answers

use crate::types::RetrievedContext;

/// Fixed answering policy placed at the top of every prompt
pub const INSTRUCTIONS: &str = "Aşağıdaki içerik parçalarına dayanarak soruyu yanıtla.
Tıbbi sorular dışında bir soru gelirse \"Benim alanım değil ama\" dedikten sonra bildiğin kadarıyla cevap ver.
**Kısa değil, kapsamlı** bir yanıt ver: önce 1–2 cümlelik özet, ardından **madde işaretleri** ile detaylar.
Yetersiz bilgi varsa \"Bilmiyorum\" veya \"Belgelerde yeterli bilgi yok\" de.
Tıbbi tavsiye verme; genel bilgilendirme yap ve uzman görüşüne yönlendir.
Cevabın sonunda \"Kaynaklar:\" altında başlık ve URL ver.";

/// Prompt builder for RAG queries
///
/// Output depends only on the question and the contexts; contexts are used
/// in full and in the order given.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Concatenate context passages, each labelled with its rank
    pub fn build_context(contexts: &[RetrievedContext]) -> String {
        contexts
            .iter()
            .map(|c| format!("Passaj {}:\n{}", c.rank, c.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// One `- title — url` (or `- title`) line per context
    pub fn format_sources_list(contexts: &[RetrievedContext]) -> String {
        contexts
            .iter()
            .map(|c| format!("- {}", c.source_line()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the full grounded prompt
    pub fn build_rag_prompt(question: &str, contexts: &[RetrievedContext]) -> String {
        format!(
            "{instructions}

Bağlam:
{context}

Soru:
{question}

Cevap ve ardından \"Kaynaklar:\":
Kaynaklar:
{sources}",
            instructions = INSTRUCTIONS,
            context = Self::build_context(contexts),
            question = question,
            sources = Self::format_sources_list(contexts),
        )
    }
}
