//! Card data in, encrypted card data out.
//!
//! Both types serialise as JSON with the field names the gateway uses, so the
//! binary can read and write them directly.

use serde::{Deserialize, Serialize};

/// Raw card data supplied by the caller.
///
/// Values are embedded verbatim into the plaintext payloads. They are not
/// validated or escaped; callers must not pass `"` or control characters.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    /// Primary account number, digits only or already grouped.
    pub number: String,
    /// Expiry month as entered, e.g. `"03"`.
    pub expiry_month: String,
    /// Expiry year as entered, e.g. `"2030"`.
    pub expiry_year: String,
    /// Card security code.
    pub cvc: String,
}

impl std::fmt::Debug for CardData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Card data must never reach logs, not even through `{:?}`.
        f.write_str("CardData([REDACTED])")
    }
}

/// Four independently encrypted compact tokens, one per card field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedCardData {
    pub encrypted_card_number: String,
    pub encrypted_expiry_month: String,
    pub encrypted_expiry_year: String,
    pub encrypted_security_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_data_reads_camel_case() {
        let card: CardData = serde_json::from_str(
            r#"{"number":"4111111111111111","expiryMonth":"03","expiryYear":"2030","cvc":"737"}"#,
        )
        .unwrap();
        assert_eq!(card.expiry_month, "03");
        assert_eq!(card.expiry_year, "2030");
    }

    #[test]
    fn card_data_redacted_in_debug() {
        let card = CardData {
            number: "4111111111111111".into(),
            expiry_month: "03".into(),
            expiry_year: "2030".into(),
            cvc: "737".into(),
        };
        let dbg = format!("{card:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("4111"));
    }

    #[test]
    fn encrypted_card_data_uses_gateway_keys() {
        let out = EncryptedCardData {
            encrypted_card_number: "a".into(),
            encrypted_expiry_month: "b".into(),
            encrypted_expiry_year: "c".into(),
            encrypted_security_code: "d".into(),
        };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["encryptedCardNumber"], "a");
        assert_eq!(json["encryptedExpiryMonth"], "b");
        assert_eq!(json["encryptedExpiryYear"], "c");
        assert_eq!(json["encryptedSecurityCode"], "d");
    }
}
