//! Plaintext payloads for the four card fields.
//!
//! Payloads are flat JSON objects written field by field in a fixed order.
//! Values are inserted verbatim, without escaping, because the gateway
//! expects byte-exact payloads. The number and cvc payloads also carry the
//! secured-fields referrer and a fixed set of field-interaction values the
//! gateway's fraud checks look for; those must not change.

use chrono::{DateTime, Utc};
use common::CardData;

use crate::codec::base64_std;
use crate::config::EncryptorConfig;

/// Prefix of the secured-fields page URL used as the payload referrer.
pub const SECURED_FIELDS_BASE: &str =
    "https://checkoutshopper-live.adyen.com/checkoutshopper/securedfields/";

/// Secured-fields release segment of the referrer URL.
pub const SECURED_FIELDS_VERSION: &str = "4.5.0";

const NUMBER_ACTIVATION: [(&str, &str); 2] = [("numberBind", "1"), ("activate", "3")];

const NUMBER_INTERACTION: [(&str, &str); 4] = [
    ("numberFieldFocusCount", "3"),
    (
        "numberFieldLog",
        "fo@44070,cl@44071,KN@44082,fo@44324,cl@44325,cl@44333,KN@44346,KN@44347,KN@44348,KN@44350,KN@44351,KN@44353,KN@44354,KN@44355,KN@44356,KN@44358,fo@44431,cl@44432,KN@44434,KN@44436,KN@44438,KN@44440,KN@44440",
    ),
    ("numberFieldClickCount", "4"),
    ("numberFieldKeyCount", "16"),
];

const CVC_ACTIVATION: [(&str, &str); 2] = [("cvcBind", "1"), ("activate", "4")];

const CVC_INTERACTION: [(&str, &str); 7] = [
    ("cvcFieldFocusCount", "4"),
    (
        "cvcFieldLog",
        "fo@122,cl@123,KN@136,KN@138,KN@140,fo@11204,cl@11205,ch@11221,bl@11221,fo@33384,bl@33384,fo@50318,cl@50319,cl@50321,KN@50334,KN@50336,KN@50336",
    ),
    ("cvcFieldClickCount", "4"),
    ("cvcFieldKeyCount", "6"),
    ("cvcFieldChangeCount", "1"),
    ("cvcFieldBlurCount", "2"),
    ("deactivate", "2"),
];

/// Payload generation time, rendered as `YYYY-MM-DDTHH:mm:ss.sssZ`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTime(String);

impl GenerationTime {
    /// Current wall-clock time. Only the process edge should call this.
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<DateTime<Utc>> for GenerationTime {
    fn from(t: DateTime<Utc>) -> Self {
        Self(t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
    }
}

/// The four plaintext buffers, ready for encryption.
#[derive(Clone, PartialEq, Eq)]
pub struct Payloads {
    pub number: Vec<u8>,
    pub expiry_month: Vec<u8>,
    pub expiry_year: Vec<u8>,
    pub cvc: Vec<u8>,
}

impl std::fmt::Debug for Payloads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Payloads([REDACTED])")
    }
}

/// Referrer URL of the secured-fields page for `config`.
///
/// The `d` parameter is the padded standard-alphabet base64 of the domain.
pub fn referrer(config: &EncryptorConfig) -> String {
    format!(
        "{SECURED_FIELDS_BASE}{}/{SECURED_FIELDS_VERSION}/securedFields.html?type=card&d={}",
        config.origin_key,
        base64_std(config.domain.as_bytes())
    )
}

/// Regroup every run of 16 ASCII digits as `dddd dddd dddd dddd`.
///
/// Runs are matched left to right without overlap; everything else is copied
/// unchanged, so a 15-digit number comes back as is and a 19-digit number has
/// only its first 16 digits grouped.
pub fn format_card_number(number: &str) -> String {
    let bytes = number.as_bytes();
    let mut out = String::with_capacity(number.len() + 3);
    let mut copied = 0;
    let mut i = 0;

    while i + 16 <= bytes.len() {
        if bytes[i..i + 16].iter().all(u8::is_ascii_digit) {
            out.push_str(&number[copied..i]);
            for (g, group) in number[i..i + 16].as_bytes().chunks(4).enumerate() {
                if g > 0 {
                    out.push(' ');
                }
                // Each group is four ASCII digits.
                group.iter().for_each(|&b| out.push(char::from(b)));
            }
            i += 16;
            copied = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&number[copied..]);
    out
}

/// Build the four payloads for `card` at time `now`.
pub fn build_payloads(card: &CardData, config: &EncryptorConfig, now: &GenerationTime) -> Payloads {
    let referrer = referrer(config);
    let number = format_card_number(&card.number);
    let ts = now.as_str();

    let mut number_fields = vec![("number", number.as_str()), ("generationtime", ts)];
    number_fields.extend(NUMBER_ACTIVATION);
    number_fields.push(("referrer", referrer.as_str()));
    number_fields.extend(NUMBER_INTERACTION);

    let mut cvc_fields = vec![("cvc", card.cvc.as_str()), ("generationtime", ts)];
    cvc_fields.extend(CVC_ACTIVATION);
    cvc_fields.push(("referrer", referrer.as_str()));
    cvc_fields.extend(CVC_INTERACTION);

    Payloads {
        number: flat_object(&number_fields),
        expiry_month: flat_object(&[
            ("expiryMonth", card.expiry_month.as_str()),
            ("generationtime", ts),
        ]),
        expiry_year: flat_object(&[
            ("expiryYear", card.expiry_year.as_str()),
            ("generationtime", ts),
        ]),
        cvc: flat_object(&cvc_fields),
    }
}

/// Write `{"k1":"v1","k2":"v2",...}` with no escaping.
fn flat_object(fields: &[(&str, &str)]) -> Vec<u8> {
    let mut out = String::from("{");
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        out.push_str(key);
        out.push_str("\":\"");
        out.push_str(value);
        out.push('"');
    }
    out.push('}');
    out.into_bytes()
}
