use crate::error::FareError;
use crate::xml_element::XmlElement;

/// Attribute value marking the charge line that carries the total fare.
pub const TOTAL_AMOUNT: &str = "TotalAmount";

const SERVICE_CHARGES: &str = "ServiceCharges";

/// Sum every charge line tagged `TotalAmount` (under any attribute name).
/// Returns 0.0 when there is none.
pub fn total_price<'a, I>(charges: I) -> Result<f64, FareError>
where
    I: IntoIterator<Item = &'a XmlElement>,
{
    let mut price = 0.0;
    for charge in charges
        .into_iter()
        .filter(|charge| charge.has_attribute_value(TOTAL_AMOUNT))
    {
        price += parse_amount(charge.text.as_deref())?;
    }
    Ok(price)
}

fn parse_amount(text: Option<&str>) -> Result<f64, FareError> {
    let raw = text.ok_or_else(|| FareError::field_format(SERVICE_CHARGES, "", "empty amount"))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|e| FareError::field_format(SERVICE_CHARGES, raw, e))
}
