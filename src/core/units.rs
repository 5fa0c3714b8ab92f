use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn opposite(self) -> TemperatureUnit {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Converts `value`, expressed in the other unit, into `target`.
pub fn convert(value: f64, target: TemperatureUnit) -> f64 {
    match target {
        TemperatureUnit::Fahrenheit => value * 9.0 / 5.0 + 32.0,
        TemperatureUnit::Celsius => (value - 32.0) * 5.0 / 9.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[f64] = &[
        -459.67, -40.0, -6.111, 0.0, 0.5, 21.0, 32.0, 37.5, 98.6, 212.0, 1.0e6,
    ];

    #[test]
    fn test_known_points() {
        assert_eq!(convert(0.0, TemperatureUnit::Fahrenheit), 32.0);
        assert_eq!(convert(100.0, TemperatureUnit::Fahrenheit), 212.0);
        assert_eq!(convert(212.0, TemperatureUnit::Celsius), 100.0);
        assert_eq!(convert(-40.0, TemperatureUnit::Celsius), -40.0);
    }

    #[test]
    fn test_fahrenheit_to_celsius_and_back() {
        for &x in SAMPLES {
            let back = convert(convert(x, TemperatureUnit::Celsius), TemperatureUnit::Fahrenheit);
            assert!((back - x).abs() <= 1e-9 * x.abs().max(1.0), "{x} -> {back}");
        }
    }

    #[test]
    fn test_celsius_to_fahrenheit_and_back() {
        for &x in SAMPLES {
            let back = convert(convert(x, TemperatureUnit::Fahrenheit), TemperatureUnit::Celsius);
            assert!((back - x).abs() <= 1e-9 * x.abs().max(1.0), "{x} -> {back}");
        }
    }

    #[test]
    fn test_opposite_and_symbol() {
        assert_eq!(TemperatureUnit::default(), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::Fahrenheit.opposite(), TemperatureUnit::Celsius);
        assert_eq!(TemperatureUnit::Celsius.opposite(), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::Celsius.to_string(), "C");
    }
}
