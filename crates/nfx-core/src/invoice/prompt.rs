//! Extraction prompt.

/// Cut `text` to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Build the instruction sent to the model for one document.
///
/// The caller is expected to have truncated `document_text` already.
pub fn build_prompt(document_text: &str) -> String {
    format!(
        r#"Você é um especialista em análise de Notas Fiscais brasileiras.
Extraia APENAS as seguintes informações do texto da NF fornecido:

DADOS OBRIGATÓRIOS:
- Número da NF
- Data de emissão
- CNPJ do emitente
- Razão social do emitente
- CNPJ do destinatário (se houver)
- Razão social do destinatário
- Valor total da NF
- Valor do ICMS (se houver)
- Valor do IPI (se houver)

PRODUTOS/SERVIÇOS (primeiros 3 itens):
- Descrição do produto/serviço
- Quantidade
- Valor unitário
- Valor total do item

FORMATO DE RESPOSTA (JSON):
{{
    "numero_nf": "",
    "data_emissao": "",
    "cnpj_emitente": "",
    "razao_social_emitente": "",
    "cnpj_destinatario": "",
    "razao_social_destinatario": "",
    "valor_total": "",
    "valor_icms": "",
    "valor_ipi": "",
    "itens": [
        {{
            "descricao": "",
            "quantidade": "",
            "valor_unitario": "",
            "valor_total": ""
        }}
    ]
}}

TEXTO DA NOTA FISCAL:
{document_text}

RESPOSTA (apenas JSON válido):
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::{HEADER_FIELDS, ITEMS_FIELD, ITEM_FIELDS};

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_truncate_multibyte() {
        // each of these is two bytes in UTF-8
        let text = "ÇÃÕÉÍ";
        assert_eq!(truncate_chars(text, 2), "ÇÃ");
        assert_eq!(truncate_chars(text, 0), "");
    }

    #[test]
    fn test_prompt_names_every_field() {
        let prompt = build_prompt("NOTA FISCAL 123");

        for field in HEADER_FIELDS.iter().chain(ITEM_FIELDS.iter()) {
            assert!(prompt.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
        assert!(prompt.contains(&format!("\"{}\"", ITEMS_FIELD)));
    }

    #[test]
    fn test_prompt_embeds_text_once() {
        let prompt = build_prompt("CNPJ 12.345.678/0001-90 {não é json}");

        assert_eq!(prompt.matches("CNPJ 12.345.678/0001-90 {não é json}").count(), 1);
        assert!(prompt.trim_end().ends_with("RESPOSTA (apenas JSON válido):"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_prompt("x"), build_prompt("x"));
    }

    #[test]
    fn test_example_shape_is_valid_json() {
        let prompt = build_prompt("");
        let start = prompt.find('{').unwrap();
        let end = prompt.rfind('}').unwrap();
        let example: serde_json::Value = serde_json::from_str(&prompt[start..=end]).unwrap();

        assert_eq!(example.as_object().unwrap().len(), HEADER_FIELDS.len() + 1);
        assert_eq!(example[ITEMS_FIELD][0].as_object().unwrap().len(), ITEM_FIELDS.len());
    }
}
