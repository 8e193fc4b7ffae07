//! Payment events recorded with masked payer identifiers.
//!
//! The raw identifier (`vpa`, e.g. `name@bank`) never reaches the chain.
//! Only its masked form is persisted:
//!
//! ```text
//! { "meta": {"type": "UPI_MASKEDMETA", "version": 1}, "amount": 100,
//!   "maskedVpa": "na**@bank", "reference": null, "payer": null, "note": null }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};

use crate::error::{LedgerError, LedgerResult};

/// `data.meta.type` of payment blocks.
pub const PAYMENT_META_TYPE: &str = "UPI_MASKEDMETA";
/// `data.meta.version` of payment blocks.
pub const PAYMENT_META_VERSION: u32 = 1;

/// A payment to record.
///
/// Every field is optional at the type level so that a missing amount is a
/// [`LedgerError::Validation`] rather than a deserialization failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    /// Required. A JSON number, or a string holding one.
    pub amount: Option<Value>,
    /// Raw payer identifier; masked before persistence.
    pub vpa: Option<String>,
    /// Identifier the caller has already masked.
    pub masked_vpa: Option<String>,
    /// Opaque caller metadata; a `maskedVpa` inside it wins over the other sources.
    pub masked_meta: Option<Map<String, Value>>,
    pub reference: Option<String>,
    pub payer: Option<String>,
    pub note: Option<String>,
}

impl PaymentEvent {
    pub fn new(amount: impl Into<Value>) -> Self {
        Self {
            amount: Some(amount.into()),
            ..Self::default()
        }
    }

    pub fn with_vpa(mut self, vpa: impl Into<String>) -> Self {
        self.vpa = Some(vpa.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_payer(mut self, payer: impl Into<String>) -> Self {
        self.payer = Some(payer.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// The validated amount.
    pub fn amount(&self) -> LedgerResult<Number> {
        match &self.amount {
            None | Some(Value::Null) => Err(LedgerError::Validation("amount is required".into())),
            Some(Value::Number(n)) => Ok(n.clone()),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .ok_or_else(|| {
                    LedgerError::Validation(format!("amount {s:?} is not a finite number"))
                }),
            Some(other) => Err(LedgerError::Validation(format!(
                "amount must be a number, got {other}"
            ))),
        }
    }

    /// The identifier to persist, if any.
    pub fn masked_identifier(&self) -> Option<String> {
        let from_meta = self
            .masked_meta
            .as_ref()
            .and_then(|meta| meta.get("maskedVpa"))
            .and_then(Value::as_str);

        non_empty(from_meta)
            .or_else(|| non_empty(self.masked_vpa.as_deref()))
            .map(str::to_owned)
            .or_else(|| non_empty(self.vpa.as_deref()).map(mask_identifier))
    }

    /// Build the block payload. Fails before anything is mined or written.
    ///
    /// `amount` is the only required field; an event with no identifier at
    /// all is recorded without `maskedVpa` or `maskedMeta`.
    pub fn to_payload(&self) -> LedgerResult<Value> {
        let amount = self.amount()?;

        let mut payload = Map::new();
        payload.insert(
            "meta".into(),
            json!({ "type": PAYMENT_META_TYPE, "version": PAYMENT_META_VERSION }),
        );
        payload.insert("amount".into(), Value::Number(amount));
        if let Some(masked) = self.masked_identifier() {
            payload.insert("maskedVpa".into(), Value::String(masked));
        }
        if let Some(meta) = &self.masked_meta {
            payload.insert("maskedMeta".into(), Value::Object(meta.clone()));
        }
        for (key, value) in [
            ("reference", &self.reference),
            ("payer", &self.payer),
            ("note", &self.note),
        ] {
            let value = non_empty(value.as_deref()).map_or(Value::Null, |s| Value::String(s.into()));
            payload.insert(key.into(), value);
        }

        Ok(Value::Object(payload))
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Mask a payment identifier.
///
/// `local@domain` keeps the first two characters of `local` and the whole
/// domain; the rest of `local` becomes `*`, at least one of them. Anything
/// else keeps only its last two characters.
///
/// ```
/// use seal_ledger::mask_identifier;
///
/// assert_eq!(mask_identifier("name@bank.com"), "na**@bank.com");
/// assert_eq!(mask_identifier("ab@upi"), "ab*@upi");
/// assert_eq!(mask_identifier("9876543210"), "********10");
/// ```
pub fn mask_identifier(value: &str) -> String {
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            let head: String = local.chars().take(2).collect();
            let hidden = local.chars().count().saturating_sub(2).max(1);
            format!("{head}{}@{domain}", "*".repeat(hidden))
        }
        _ => {
            let keep_from = value.chars().count().saturating_sub(2);
            value
                .chars()
                .enumerate()
                .map(|(i, c)| if i < keep_from { '*' } else { c })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn masks_local_part() {
        assert_eq!(mask_identifier("name@bank.com"), "na**@bank.com");
        assert_eq!(mask_identifier("alexander@okaxis"), "al*******@okaxis");
        assert_eq!(mask_identifier("a@upi"), "a*@upi");
    }

    #[test]
    fn masks_everything_but_the_tail_without_a_domain() {
        assert_eq!(mask_identifier("abcdef"), "****ef");
        assert_eq!(mask_identifier("ab"), "ab");
        assert_eq!(mask_identifier(""), "");
        assert_eq!(mask_identifier("@bank"), "***nk");
        assert_eq!(mask_identifier("user@"), "***r@");
    }

    #[test]
    fn keeps_everything_after_the_first_at() {
        assert_eq!(mask_identifier("name@bank@x"), "na**@bank@x");
    }

    #[test]
    fn amount_is_required() {
        let err = PaymentEvent::default().to_payload().unwrap_err();
        assert!(matches!(err, LedgerError::Validation(m) if m.contains("required")));
    }

    #[test]
    fn amount_must_be_finite() {
        assert!(PaymentEvent::new(f64::NAN).to_payload().is_err());
        assert!(PaymentEvent::new("inf").to_payload().is_err());
        assert!(PaymentEvent::new("ten").to_payload().is_err());
        assert!(PaymentEvent::new(true).to_payload().is_err());
    }

    #[test]
    fn numeric_string_amount_is_converted() {
        let payload = PaymentEvent::new("12.5").to_payload().unwrap();
        assert_eq!(payload["amount"], json!(12.5));
    }

    #[test]
    fn payload_shape() {
        let payload = PaymentEvent::new(250)
            .with_vpa("name@bank.com")
            .with_reference("ref-1")
            .to_payload()
            .unwrap();

        assert_eq!(
            payload,
            json!({
                "meta": { "type": "UPI_MASKEDMETA", "version": 1 },
                "amount": 250,
                "maskedVpa": "na**@bank.com",
                "reference": "ref-1",
                "payer": null,
                "note": null,
            })
        );
    }

    #[test]
    fn raw_vpa_never_in_payload() {
        let payload = PaymentEvent::new(1).with_vpa("secretname@bank").to_payload().unwrap();
        assert!(!payload.to_string().contains("secretname"));
    }

    #[test]
    fn masked_meta_takes_precedence() {
        let event: PaymentEvent = serde_json::from_value(json!({
            "amount": 5,
            "vpa": "someone@bank",
            "maskedVpa": "so*****@bank",
            "maskedMeta": { "maskedVpa": "xx***@meta", "channel": "qr" }
        }))
        .unwrap();

        let payload = event.to_payload().unwrap();
        assert_eq!(payload["maskedVpa"], json!("xx***@meta"));
        assert_eq!(payload["maskedMeta"]["channel"], json!("qr"));
    }

    #[test]
    fn caller_masked_value_is_kept_verbatim() {
        let event = PaymentEvent {
            masked_vpa: Some("ab***@bank".into()),
            ..PaymentEvent::new(1)
        };
        assert_eq!(event.masked_identifier().as_deref(), Some("ab***@bank"));
    }

    #[test]
    fn empty_strings_are_absent() {
        let payload = PaymentEvent::new(1)
            .with_vpa("")
            .with_note("")
            .to_payload()
            .unwrap();
        assert!(payload.get("maskedVpa").is_none());
        assert!(payload.get("maskedMeta").is_none());
        assert_eq!(payload["note"], Value::Null);
    }

    #[test]
    fn amount_only_event_is_accepted() {
        let payload = PaymentEvent::new(12).to_payload().unwrap();
        assert_eq!(payload["amount"], json!(12));
        assert_eq!(payload["meta"]["type"], json!(PAYMENT_META_TYPE));
        assert!(payload.get("maskedVpa").is_none());
        assert!(payload.get("maskedMeta").is_none());
    }

    proptest! {
        #[test]
        fn masked_address_keeps_head_and_domain(
            local in "[a-z0-9.]{1,20}",
            domain in "[a-z]{1,10}",
        ) {
            let masked = mask_identifier(&format!("{local}@{domain}"));
            let head: String = local.chars().take(2).collect();
            let stars = local.len().saturating_sub(2).max(1);

            prop_assert!(masked.starts_with(&head));
            let domain_suffix = format!("@{domain}");
            prop_assert!(masked.ends_with(&domain_suffix));
            prop_assert_eq!(masked.len(), head.len() + stars + 1 + domain.len());
        }

        #[test]
        fn bare_value_keeps_length_and_tail(value in "[a-zA-Z0-9]{0,30}") {
            let masked = mask_identifier(&value);
            prop_assert_eq!(masked.len(), value.len());
            let tail = value.len().saturating_sub(2);
            prop_assert_eq!(&masked[tail..], &value[tail..]);
            prop_assert!(masked[..tail].chars().all(|c| c == '*'));
        }
    }
}
