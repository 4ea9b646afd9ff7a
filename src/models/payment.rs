use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment rails an overlay can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Pix,
    Paypal,
    Picpay,
    Mercadopago,
    Venmo,
    Cashapp,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Pix,
        PaymentMethod::Paypal,
        PaymentMethod::Picpay,
        PaymentMethod::Mercadopago,
        PaymentMethod::Venmo,
        PaymentMethod::Cashapp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Picpay => "picpay",
            PaymentMethod::Mercadopago => "mercadopago",
            PaymentMethod::Venmo => "venmo",
            PaymentMethod::Cashapp => "cashapp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Paypal => "PayPal",
            PaymentMethod::Picpay => "PicPay",
            PaymentMethod::Mercadopago => "Mercado Pago",
            PaymentMethod::Venmo => "Venmo",
            PaymentMethod::Cashapp => "Cash App",
        }
    }

    /// Profile URL prefix for methods that resolve to a web page. Pix has none.
    pub fn profile_base(&self) -> Option<&'static str> {
        match self {
            PaymentMethod::Pix => None,
            PaymentMethod::Paypal => Some("https://paypal.me/"),
            PaymentMethod::Picpay => Some("https://picpay.me/"),
            PaymentMethod::Mercadopago => Some("https://www.mercadopago.com.br/"),
            PaymentMethod::Venmo => Some("https://venmo.com/u/"),
            PaymentMethod::Cashapp => Some("https://cash.app/"),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPaymentMethod(pub String);

impl fmt::Display for UnknownPaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown payment method: {}", self.0)
    }
}

impl std::error::Error for UnknownPaymentMethod {}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| UnknownPaymentMethod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_names() {
        assert_eq!("pix".parse::<PaymentMethod>(), Ok(PaymentMethod::Pix));
        assert_eq!("paypal".parse::<PaymentMethod>(), Ok(PaymentMethod::Paypal));
        assert!("PayPal".parse::<PaymentMethod>().is_err());
        assert!(" pix".parse::<PaymentMethod>().is_err());
        assert_eq!("cashapp".parse::<PaymentMethod>(), Ok(PaymentMethod::Cashapp));
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_wire_name_matches_display() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method));
        }
    }
}
