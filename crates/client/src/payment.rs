//! Payment selection carried with the quote. It never affects totals.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "À Vista")]
    Cash,
    #[serde(rename = "Cartão de Crédito")]
    CreditCard,
    #[serde(rename = "Boleto")]
    Boleto,
    #[serde(rename = "PIX")]
    Pix,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [Self::Cash, Self::CreditCard, Self::Boleto, Self::Pix];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cash => "À Vista",
            Self::CreditCard => "Cartão de Crédito",
            Self::Boleto => "Boleto",
            Self::Pix => "PIX",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentCondition {
    #[serde(rename = "7 Dias")]
    Days7,
    #[serde(rename = "14 Dias")]
    Days14,
    #[serde(rename = "21 Dias")]
    Days21,
    #[serde(rename = "30 Dias")]
    Days30,
}

impl PaymentCondition {
    pub const ALL: [PaymentCondition; 4] = [Self::Days7, Self::Days14, Self::Days21, Self::Days30];

    pub fn days(self) -> u32 {
        match self {
            Self::Days7 => 7,
            Self::Days14 => 14,
            Self::Days21 => 21,
            Self::Days30 => 30,
        }
    }

    pub fn label(self) -> String {
        format!("{} Dias", self.days())
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Nothing selected until the rep picks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub method: Option<PaymentMethod>,
    pub condition: Option<PaymentCondition>,
}

impl PaymentTerms {
    pub fn is_complete(&self) -> bool {
        self.method.is_some() && self.condition.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for m in PaymentMethod::ALL {
            assert_eq!(PaymentMethod::from_label(m.label()), Some(m));
        }
        assert_eq!(PaymentCondition::from_label("21 Dias"), Some(PaymentCondition::Days21));
        assert_eq!(PaymentCondition::from_label("60 Dias"), None);
    }

    #[test]
    fn serializes_with_display_labels() {
        let terms = PaymentTerms {
            method: Some(PaymentMethod::CreditCard),
            condition: Some(PaymentCondition::Days30),
        };
        assert_eq!(
            serde_json::to_value(terms).unwrap(),
            serde_json::json!({ "method": "Cartão de Crédito", "condition": "30 Dias" })
        );
        assert!(terms.is_complete());
        assert!(!PaymentTerms::default().is_complete());
    }
}
