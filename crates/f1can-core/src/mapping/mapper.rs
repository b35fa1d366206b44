use super::error::MappingError;
use super::profile::SignalRule;
use super::signals::SignalSource;

/// A converted value ready for the frame encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedValue {
    pub id: u32,
    pub length: u8,
    pub raw: u64,
}

/// Apply `rules` to `record`, one output per rule, in rule order.
///
/// Mapping is all-or-nothing: the first rejected value fails the record.
///
/// # Examples
/// ```
/// use f1can_core::mapping::{ConversionProfile, Revision, map_record};
/// use f1can_core::protocols::f1::CarTelemetry;
///
/// let profile = ConversionProfile::for_revision(Revision::Obd2);
/// let car = CarTelemetry { speed: 300, ..CarTelemetry::default() };
/// let values = map_record(&car, &profile.telemetry)?;
/// assert_eq!(values[0].raw, 255);
/// # Ok::<(), f1can_core::mapping::MappingError>(())
/// ```
///
/// # Errors
/// `MappingError::Overflow` when a rule with the reject policy sees a value
/// outside its output width.
pub fn map_record<R: SignalSource>(
    record: &R,
    rules: &[SignalRule<R::Signal>],
) -> Result<Vec<MappedValue>, MappingError> {
    rules
        .iter()
        .map(|rule| {
            let value = record.value(rule.signal);
            let raw = rule
                .conversion
                .apply(value, rule.length)
                .ok_or_else(|| MappingError::Overflow {
                    signal: rule.signal.to_string(),
                    value,
                    length: rule.length,
                })?;
            Ok(MappedValue {
                id: rule.id,
                length: rule.length,
                raw,
            })
        })
        .collect()
}
