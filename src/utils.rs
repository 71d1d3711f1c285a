use std::env::var;

/// Get the value of ENV var, or a default
///
/// Only when:
/// - It is set
/// - It is not empty
pub fn env_var_or_else(var_name: &'static str, or_else: fn() -> String) -> String {
    if let Ok(value) = var(var_name) {
        if !value.is_empty() {
            return value;
        }
    }

    or_else()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_when_unset() {
        let value = env_var_or_else("TRAVELEASE_DOES_NOT_EXIST", || String::from("fallback"));

        assert_eq!("fallback", value);
    }
}
