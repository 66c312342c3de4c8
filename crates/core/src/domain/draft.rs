use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Partially-filled order under construction.
///
/// Every field is optional: a draft is always constructible no matter how
/// little the extraction found, and it is never validated. Serialization
/// omits unset fields, so the serialized draft is exactly the state a caller
/// carries between dialogue turns. Deserialization additionally accepts the
/// Japanese key aliases the extraction model occasionally emits.
///
/// Drafts are replaced, never mutated: each dialogue turn produces a fresh
/// value via [`apply_single_answer`](crate::apply_single_answer).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "テンプレート")]
    pub template_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "注文番号",
        alias = "請求書番号",
        alias = "見積番号"
    )]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "発行日")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "支払期日", alias = "期日")]
    pub due_date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "売り手",
        alias = "発行者",
        alias = "販売者",
        alias = "請求元"
    )]
    pub seller: Option<PartyDraft>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "買い手",
        alias = "請求先",
        alias = "顧客",
        alias = "購入者"
    )]
    pub buyer: Option<PartyDraft>,
    /// Free-form until promotion; synonym mapping happens in [`crate::normalize`].
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "通貨")]
    pub currency: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "支払方法",
        alias = "お支払い方法"
    )]
    pub payment_method: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "明細",
        alias = "商品明細",
        alias = "内訳"
    )]
    pub items: Option<Vec<OrderItemDraft>>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "消費税率", alias = "税率")]
    pub tax_rate_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "送料", alias = "配送料")]
    pub shipping_fee: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "備考", alias = "特記事項")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyDraft {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "名称",
        alias = "会社名",
        alias = "氏名"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "メール",
        alias = "メールアドレス"
    )]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "電話", alias = "電話番号")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "住所")]
    pub address: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "税番号",
        alias = "法人番号",
        alias = "インボイス番号"
    )]
    pub tax_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItemDraft {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "SKU",
        alias = "型番",
        alias = "品番"
    )]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "品名", alias = "商品名")]
    pub name: Option<String>,
    /// Signed at the draft level so a nonpositive extracted quantity
    /// survives into the dialogue-level requiredness check.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "数量", alias = "個数")]
    pub qty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "単価")]
    pub unit_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "値引", alias = "割引")]
    pub discount: Option<Decimal>,
}

impl OrderDraft {
    pub(crate) fn seller_mut(&mut self) -> &mut PartyDraft {
        self.seller.get_or_insert_with(PartyDraft::default)
    }

    pub(crate) fn buyer_mut(&mut self) -> &mut PartyDraft {
        self.buyer.get_or_insert_with(PartyDraft::default)
    }

    /// Default-constructs items up to `index` so an answer can land in a
    /// draft that has no item structure yet.
    pub(crate) fn item_mut(&mut self, index: usize) -> &mut OrderItemDraft {
        let items = self.items.get_or_insert_with(Vec::new);
        if items.len() <= index {
            items.resize_with(index + 1, OrderItemDraft::default);
        }
        &mut items[index]
    }
}
