use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// One leaf value of a draft, addressed the way the dialogue addresses it:
/// a dotted/indexed path such as `items[0].unit_price`.
///
/// The typed form is deliberate: an answer can only ever target a declared
/// field, so a typo'd identifier is a parse error instead of a silently
/// created orphan key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    SellerName,
    BuyerName,
    Currency,
    PaymentMethod,
    Item { index: usize, attr: ItemField },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemField {
    Sku,
    Name,
    Qty,
    UnitPrice,
    Discount,
}

impl ItemField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sku => "sku",
            Self::Name => "name",
            Self::Qty => "qty",
            Self::UnitPrice => "unit_price",
            Self::Discount => "discount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SellerName => f.write_str("seller.name"),
            Self::BuyerName => f.write_str("buyer.name"),
            Self::Currency => f.write_str("currency"),
            Self::PaymentMethod => f.write_str("payment_method"),
            Self::Item { index, attr } => write!(f, "items[{index}].{}", attr.as_str()),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown field identifier `{0}`")]
pub struct FieldParseError(pub String);

impl FromStr for Field {
    type Err = FieldParseError;

    /// Parses the path syntax. Bare top-level identifiers are canonicalized
    /// first: `seller` means `seller.name`, `buyer` means `buyer.name`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        match trimmed {
            "seller" | "seller.name" => return Ok(Self::SellerName),
            "buyer" | "buyer.name" => return Ok(Self::BuyerName),
            "currency" => return Ok(Self::Currency),
            "payment_method" => return Ok(Self::PaymentMethod),
            _ => {}
        }

        let unknown = || FieldParseError(trimmed.to_string());
        let rest = trimmed.strip_prefix("items[").ok_or_else(unknown)?;
        let (index, attr) = rest.split_once("].").ok_or_else(unknown)?;
        let index = index.parse::<usize>().map_err(|_| unknown())?;
        let attr = match attr {
            "sku" => ItemField::Sku,
            "name" => ItemField::Name,
            "qty" => ItemField::Qty,
            "unit_price" => ItemField::UnitPrice,
            "discount" => ItemField::Discount,
            _ => return Err(unknown()),
        };
        Ok(Self::Item { index, attr })
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
