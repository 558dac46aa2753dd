//! Field validators and serde helpers shared by request bodies.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// Rejects negative amounts.
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative"));
    }
    Ok(())
}

/// Rejects zero and negative amounts.
pub fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("positive"));
    }
    Ok(())
}

/// Rejects rates outside 0 to 100.
pub fn percent(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("percent"));
    }
    Ok(())
}

/// Distinguishes an absent field from an explicit `null` in PATCH bodies.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// absent is `None`, `null` is `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(-0), true)]
    #[case(dec!(0.01), true)]
    #[case(dec!(-0.01), false)]
    fn test_non_negative(#[case] value: Decimal, #[case] ok: bool) {
        assert_eq!(non_negative(&value).is_ok(), ok);
    }

    #[rstest]
    #[case(dec!(0), false)]
    #[case(dec!(0.001), true)]
    #[case(dec!(-5), false)]
    fn test_positive(#[case] value: Decimal, #[case] ok: bool) {
        assert_eq!(positive(&value).is_ok(), ok);
    }

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(18), true)]
    #[case(dec!(100), true)]
    #[case(dec!(100.01), false)]
    #[case(dec!(-1), false)]
    fn test_percent(#[case] value: Decimal, #[case] ok: bool) {
        assert_eq!(percent(&value).is_ok(), ok);
    }

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        email: Option<Option<String>>,
    }

    #[test]
    fn test_double_option() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.email, None);
        let cleared: Patch = serde_json::from_str(r#"{"email":null}"#).unwrap();
        assert_eq!(cleared.email, Some(None));
        let set: Patch = serde_json::from_str(r#"{"email":"a@b.in"}"#).unwrap();
        assert_eq!(set.email, Some(Some("a@b.in".to_string())));
    }
}
