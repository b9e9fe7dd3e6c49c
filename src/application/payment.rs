use crate::config::PixSettings;
use crate::domain::billing::Billing;
use crate::domain::errors::DomainError;
use crate::domain::money::Money;
use crate::domain::ports::PaymentSection;
use crate::pix::{self, PixConfig};

/// Billing-level values win over the system-wide defaults, field by field.
pub fn resolve_pix_config(billing: &Billing, defaults: &PixSettings) -> PixConfig {
    fn pick(own: &Option<String>, fallback: &Option<String>) -> Option<String> {
        own.as_ref()
            .filter(|v| !v.trim().is_empty())
            .or(fallback.as_ref())
            .cloned()
    }

    PixConfig {
        key: pick(&billing.pix_key, &defaults.key),
        merchant_name: pick(&billing.pix_merchant_name, &defaults.merchant_name),
        merchant_city: pick(&billing.pix_merchant_city, &defaults.merchant_city),
        reference: None,
    }
}

/// Build the invoice payment block, or `None` when payments are not
/// configured for this billing.
pub fn payment_section(
    config: &PixConfig,
    amount: Money,
) -> Result<Option<PaymentSection>, DomainError> {
    let payload = match pix::encode(config, Some(amount)) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("PIX payment section skipped: {}", e);
            return Ok(None);
        }
    };

    let qr_png = pix::render_png(&payload).map_err(|e| DomainError::Render(e.to_string()))?;

    Ok(Some(PaymentSection {
        qr_png,
        pix_key: pix::normalized_key(config).unwrap_or_default(),
        payload,
    }))
}
