//! Display state for one message's weather result: which unit is shown and
//! the number shown in it.

use crate::core::units::{TemperatureUnit, convert};

/// Placeholder drawn in place of the number while no temperature is known.
pub const UNKNOWN_VALUE: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureDisplay {
    pub unit: TemperatureUnit,
    pub value: Option<f64>,
}

impl Default for TemperatureDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperatureDisplay {
    pub const fn new() -> Self {
        Self {
            unit: TemperatureUnit::Fahrenheit,
            value: None,
        }
    }

    /// Records a raw temperature from the tool result. Only the first one
    /// counts: later snapshots of the same message must not undo a toggle.
    pub fn observe(&mut self, temperature: Option<f64>) {
        if self.value.is_none() {
            self.value = temperature;
        }
    }

    /// Switches to the other unit, converting the shown value.
    /// Returns false (and changes nothing) while no value is known.
    pub fn toggle_unit(&mut self) -> bool {
        let Some(value) = self.value else {
            return false;
        };
        let target = self.unit.opposite();
        self.value = Some(convert(value, target));
        self.unit = target;
        true
    }

    /// The shown value rounded to a whole degree.
    pub fn rounded(&self) -> Option<i64> {
        self.value.map(|v| v.round() as i64)
    }

    /// `"{location}: {value}°{unit}"`.
    pub fn summary(&self, location: &str) -> String {
        match self.rounded() {
            Some(value) => format!("{location}: {value}°{}", self.unit),
            None => format!("{location}: {UNKNOWN_VALUE}°{}", self.unit),
        }
    }

    /// Label of the switch button: always names the unit not currently shown.
    pub fn switch_label(&self) -> String {
        format!("Switch to °{}", self.unit.opposite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed(temp: f64) -> TemperatureDisplay {
        let mut display = TemperatureDisplay::new();
        display.observe(Some(temp));
        display
    }

    #[test]
    fn test_starts_fahrenheit_and_unset() {
        let display = TemperatureDisplay::new();
        assert_eq!(display.unit, TemperatureUnit::Fahrenheit);
        assert_eq!(display.value, None);
    }

    #[test]
    fn test_summary_before_toggle() {
        assert_eq!(observed(21.0).summary("Belgrade"), "Belgrade: 21°F");
    }

    #[test]
    fn test_summary_after_one_toggle() {
        let mut display = observed(21.0);
        assert!(display.toggle_unit());
        assert_eq!(display.unit, TemperatureUnit::Celsius);
        assert_eq!(display.summary("Belgrade"), "Belgrade: -6°C");
    }

    #[test]
    fn test_double_toggle_restores_rounded_value() {
        for temp in [21.0, -3.4, 0.0, 72.5, 104.9] {
            let mut display = observed(temp);
            let before = display.rounded();
            display.toggle_unit();
            display.toggle_unit();
            assert_eq!(display.rounded(), before, "temp {temp}");
            assert_eq!(display.unit, TemperatureUnit::Fahrenheit);
        }
    }

    #[test]
    fn test_toggle_without_value_is_noop() {
        let mut display = TemperatureDisplay::new();
        assert!(!display.toggle_unit());
        assert_eq!(display.unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_later_observation_does_not_overwrite() {
        let mut display = observed(21.0);
        display.toggle_unit();
        display.observe(Some(21.0));
        assert_eq!(display.unit, TemperatureUnit::Celsius);
        assert_eq!(display.rounded(), Some(-6));
    }

    #[test]
    fn test_missing_temperature_degrades() {
        let mut display = TemperatureDisplay::new();
        display.observe(None);
        assert_eq!(display.summary("Belgrade"), "Belgrade: --°F");
    }

    #[test]
    fn test_switch_label_names_opposite_unit() {
        let mut display = observed(50.0);
        assert_eq!(display.switch_label(), "Switch to °C");
        display.toggle_unit();
        assert_eq!(display.switch_label(), "Switch to °F");
    }

    #[test]
    fn test_rounding_never_prints_negative_zero() {
        let display = observed(-0.4);
        assert_eq!(display.summary("X"), "X: 0°F");
    }
}
