//! Per-sentence count normalization
//!
//! Raw per-parse values of one feature become either the values themselves
//! (absolute counts) or their offset from the sentence's most typical value
//! (relative counts). Zero results are dropped by the caller.

use crate::feature::Value;

/// How per-parse values are exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountMode {
    Absolute,
    #[default]
    Relative,
}

impl CountMode {
    pub fn from_absolute(absolute: bool) -> Self {
        if absolute { Self::Absolute } else { Self::Relative }
    }
}

/// The value subtracted under relative counting.
///
/// Each value `v` adds weight 2 to `v` and weight 1 to `v - 1`. Ties go to
/// the value first entered into the table.
pub fn mode_value(values: &[Value]) -> Value {
    let mut gains: Vec<(Value, u32)> = Vec::with_capacity(values.len() * 2);
    let mut add = |value: Value, gain: u32| match gains.iter_mut().find(|(v, _)| *v == value) {
        Some((_, g)) => *g += gain,
        None => gains.push((value, gain)),
    };
    for &v in values {
        add(v, 2);
        add(v - 1.0, 1);
    }
    let mut best: Option<(Value, u32)> = None;
    for &(value, gain) in &gains {
        if best.is_none_or(|(_, g)| gain > g) {
            best = Some((value, gain));
        }
    }
    best.map_or(0.0, |(value, _)| value)
}

/// Export values for one feature across a sentence's parses, in place
pub fn normalize(values: &mut [Value], mode: CountMode) {
    if mode == CountMode::Relative {
        let mode = mode_value(values);
        for v in values.iter_mut() {
            *v -= mode;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_counts_subtract_mode() {
        let mut values = [0.0, 0.0, 1.0];
        assert_eq!(mode_value(&values), 0.0);
        normalize(&mut values, CountMode::Relative);
        assert_eq!(values, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_relative_counts_can_go_negative() {
        let mut values = [2.0, 2.0, 1.0, 2.0];
        normalize(&mut values, CountMode::Relative);
        assert_eq!(values, [0.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_ties_go_to_first_inserted() {
        // 2 collects 1 from 3 and 2 from itself
        assert_eq!(mode_value(&[3.0, 2.0]), 2.0);
        assert_eq!(mode_value(&[2.0, 3.0]), 2.0);
        // 5 and 1 both collect 2
        assert_eq!(mode_value(&[5.0, 1.0]), 5.0);
        assert_eq!(mode_value(&[1.0, 5.0]), 1.0);
    }

    #[test]
    fn test_absolute_counts_untouched() {
        let mut values = [3.0, 0.0, -1.5];
        normalize(&mut values, CountMode::Absolute);
        assert_eq!(values, [3.0, 0.0, -1.5]);
    }
}
