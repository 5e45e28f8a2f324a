//! Luhn checksum validation for order numbers.

/// Validate an order number: digits only, non-empty, passing the Luhn
/// checksum. Runs before any storage access.
pub fn is_valid(number: &str) -> bool {
    if number.is_empty() {
        return false;
    }

    let mut sum = 0u32;
    let mut double = false;
    for ch in number.chars().rev() {
        let Some(mut digit) = ch.to_digit(10) else {
            return false;
        };
        if double {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        double = !double;
    }

    sum % 10 == 0
}
