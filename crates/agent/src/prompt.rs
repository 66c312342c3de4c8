//! Fixed instruction templates for draft extraction.
//!
//! Keys must come back in English (matching the draft schema); values may
//! stay Japanese. The model is told to omit unknown fields entirely rather
//! than guess; absent keys are what drives the dialogue.

pub const SYSTEM_JA: &str = r#"あなたはユーザーの日本語の注文依頼を、厳密な JSON の注文オブジェクトに変換するアシスタントです。
出力は JSON のみ。説明文やコードブロックは出力しないでください。
JSONのキー名は必ず英語（スキーマと一致）とし、値は日本語で構いません。
入力に書かれていない情報を推測で補わないでください。不明な項目はキーごと省略します。
日付: YYYY-MM-DD。currency: [JPY, USD, EUR]。payment_method: [CARD, BANK_TRANSFER, CASH]。
価格は数値、小数2桁。items[].qty は正の整数。

スキーマ:
{
  "template_id": "invoice_default_v1",
  "issue_date": "YYYY-MM-DD",
  "due_date": "YYYY-MM-DD (optional)",
  "seller": {"name": "...", "email": "...", "phone": "...", "address": "...", "tax_id": "..."},
  "buyer":  {"name": "...", "email": "...", "phone": "...", "address": "...", "tax_id": "..."},
  "currency": "JPY|USD|EUR",
  "payment_method": "CARD|BANK_TRANSFER|CASH",
  "items": [
    {"sku": "...", "name": "...", "qty": 1, "unit_price": 1000.00, "discount": 0}
  ],
  "tax_rate_pct": 10.0,
  "shipping_fee": 0,
  "notes": "..."
}
"#;

pub const JSON_ONLY_HINT_JA: &str = "上記スキーマに従い、JSONのみ出力してください。";

/// Wraps the user's request text. The JSON-only hint is omitted on the
/// fallback reattempt, where some models comply better without it.
pub fn extraction_prompt(request: &str, json_only: bool) -> String {
    let mut prompt = format!("ユーザー依頼:\n{request}\n");
    if json_only {
        prompt.push('\n');
        prompt.push_str(JSON_ONLY_HINT_JA);
    }
    prompt
}
