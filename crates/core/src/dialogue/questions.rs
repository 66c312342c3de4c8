use crate::dialogue::field::{Field, ItemField};

/// Prompt used when a stored answer failed strict validation and the same
/// field has to be asked again.
pub const RETRY_QUESTION: &str = "入力を確認できませんでした。もう一度ご回答ください。";

/// Maps a field to its localized prompt. Fields without a dedicated entry
/// get a generic templated prompt naming the field. Pure lookup, no state.
pub fn next_question(field: &Field) -> String {
    let fixed = match field {
        Field::BuyerName => "請求先（買い手）の会社名または氏名を教えてください。",
        Field::SellerName => "発行者（売り手）の会社名または氏名を教えてください。",
        Field::Item { index: 0, attr: ItemField::Sku } => "商品の型番（SKU）を教えてください。",
        Field::Item { index: 0, attr: ItemField::Name } => {
            "商品名（例：スマートフォン機種名）を教えてください。"
        }
        Field::Item { index: 0, attr: ItemField::Qty } => "数量はいくつですか？（半角の正の整数）",
        Field::Item { index: 0, attr: ItemField::UnitPrice } => {
            "単価はいくらですか？（税抜/税込のどちらでも。半角数字、例：49800）"
        }
        Field::Currency => "通貨を選んでください（JPY / USD / EUR）。",
        Field::PaymentMethod => "お支払い方法は？（銀行振込 / クレジットカード / 現金）",
        other => return format!("{other} を教えてください。"),
    };
    fixed.to_string()
}

#[cfg(test)]
mod tests {
    use crate::dialogue::field::{Field, ItemField};

    use super::next_question;

    #[test]
    fn unit_price_has_its_dedicated_prompt() {
        let question = next_question(&Field::Item { index: 0, attr: ItemField::UnitPrice });
        assert!(question.contains("単価"));
    }

    #[test]
    fn fields_outside_the_table_get_the_generic_template() {
        let question = next_question(&Field::Item { index: 2, attr: ItemField::Discount });
        assert_eq!(question, "items[2].discount を教えてください。");
    }
}
