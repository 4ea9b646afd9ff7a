use crate::models::payment::PaymentMethod;

/// Turns a raw payment identifier into something a scanner or viewer can follow.
///
/// Unknown methods pass the identifier through untouched so the overlay still
/// renders something.
pub fn resolve(method: &str, identifier: &str) -> String {
    match method.parse::<PaymentMethod>() {
        Ok(method) => resolve_method(method, identifier),
        Err(_) => identifier.to_string(),
    }
}

pub fn resolve_method(method: PaymentMethod, identifier: &str) -> String {
    match method.profile_base() {
        Some(base) => format!("{base}{identifier}"),
        None if is_payment_uri(identifier) => identifier.to_string(),
        None => format!("pix:{identifier}"),
    }
}

/// A Pix identifier that already carries a scheme came from a scanned QR code.
pub fn is_payment_uri(identifier: &str) -> bool {
    identifier.starts_with("http") || identifier.starts_with("pix:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pix_key_gets_scheme() {
        assert_eq!(resolve("pix", "user@example.com"), "pix:user@example.com");
    }

    #[test]
    fn test_scanned_pix_passes_through() {
        assert_eq!(
            resolve("pix", "https://scanned.example/x"),
            "https://scanned.example/x"
        );
        assert_eq!(resolve("pix", "pix:abc-123"), "pix:abc-123");
    }

    #[test]
    fn test_profile_urls() {
        assert_eq!(resolve("paypal", "jdoe"), "https://paypal.me/jdoe");
        assert_eq!(resolve("picpay", "jdoe"), "https://picpay.me/jdoe");
        assert_eq!(
            resolve("mercadopago", "jdoe"),
            "https://www.mercadopago.com.br/jdoe"
        );
        assert_eq!(resolve("venmo", "jdoe"), "https://venmo.com/u/jdoe");
        assert_eq!(resolve("cashapp", "$jdoe"), "https://cash.app/$jdoe");
    }

    #[test]
    fn test_unknown_method_is_passthrough() {
        assert_eq!(resolve("bitcoin", "bc1qxyz"), "bc1qxyz");
        assert_eq!(resolve("", ""), "");
    }
}
