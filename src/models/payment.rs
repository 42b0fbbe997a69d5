use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Paypal,
    Bitcoin,
    Ethereum,
    Xbox,
    Amazon,
    Etsy,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Paypal,
        PaymentMethod::Bitcoin,
        PaymentMethod::Ethereum,
        PaymentMethod::Xbox,
        PaymentMethod::Amazon,
        PaymentMethod::Etsy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Bitcoin => "bitcoin",
            PaymentMethod::Ethereum => "ethereum",
            PaymentMethod::Xbox => "xbox",
            PaymentMethod::Amazon => "amazon",
            PaymentMethod::Etsy => "etsy",
        }
    }

    /// Label shown on order history rows.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Paypal => "PayPal",
            PaymentMethod::Bitcoin => "Bitcoin",
            PaymentMethod::Ethereum => "Ethereum",
            PaymentMethod::Xbox => "Xbox Gift Card",
            PaymentMethod::Amazon => "Amazon Gift Card",
            PaymentMethod::Etsy => "Etsy Gift Card",
        }
    }

    pub fn is_gift_card(&self) -> bool {
        matches!(
            self,
            PaymentMethod::Xbox | PaymentMethod::Amazon | PaymentMethod::Etsy
        )
    }

    pub fn reference_placeholder(&self) -> &'static str {
        match self {
            PaymentMethod::Paypal => "Enter your PayPal transaction ID",
            PaymentMethod::Bitcoin => "Enter your Bitcoin transaction ID (TxID)",
            PaymentMethod::Ethereum => "Enter your Ethereum transaction hash",
            PaymentMethod::Xbox => "Enter your Xbox gift card code (XXXXX-XXXXX-XXXXX)",
            PaymentMethod::Amazon => "Enter your Amazon gift card claim code",
            PaymentMethod::Etsy => "Enter your Etsy gift card code",
        }
    }

    /// Where to send the money, falling back to a contact hint when the
    /// admin has not configured the method yet.
    pub fn details(&self, settings: Option<&PaymentSettings>) -> String {
        let configured = settings.map(|s| match self {
            PaymentMethod::Paypal => s.paypal_email.as_str(),
            PaymentMethod::Bitcoin => s.bitcoin_wallet.as_str(),
            PaymentMethod::Ethereum => s.ethereum_wallet.as_str(),
            PaymentMethod::Xbox => s.xbox_instructions.as_str(),
            PaymentMethod::Amazon => s.amazon_instructions.as_str(),
            PaymentMethod::Etsy => s.etsy_instructions.as_str(),
        });

        match configured.map(str::trim) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => match self {
                PaymentMethod::Paypal => "Contact admin for PayPal details".to_string(),
                PaymentMethod::Bitcoin => "Contact admin for Bitcoin wallet".to_string(),
                PaymentMethod::Ethereum => "Contact admin for Ethereum wallet".to_string(),
                PaymentMethod::Xbox => {
                    "Send your Xbox gift card code to admin via email".to_string()
                }
                PaymentMethod::Amazon => {
                    "Send your Amazon gift card code to admin via email".to_string()
                }
                PaymentMethod::Etsy => {
                    "Send your Etsy gift card code to admin via email".to_string()
                }
            },
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| AppError::validation(format!("Unknown payment method '{wanted}'")))
    }
}

/// Admin-managed payment destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettings {
    pub paypal_email: String,
    pub bitcoin_wallet: String,
    pub ethereum_wallet: String,
    pub xbox_instructions: String,
    pub amazon_instructions: String,
    pub etsy_instructions: String,
}
