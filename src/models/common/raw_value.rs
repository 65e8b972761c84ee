use serde::{Deserialize, Deserializer};
use std::fmt;

/// 客户端提交的原始标量值
///
/// 表单和 JSON 客户端对同一字段可能发送数字或字符串，这里统一保留文本形式，
/// 交给业务层解析和校验。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue(pub String);

impl RawValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, Visitor};

        struct RawVisitor;

        impl<'de> Visitor<'de> for RawVisitor {
            type Value = RawValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a number or a string")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: Error,
            {
                Ok(RawValue(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: Error,
            {
                Ok(RawValue(value.to_string()))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: Error,
            {
                Ok(RawValue(value.to_string()))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                Ok(RawValue(value.to_string()))
            }
        }

        deserializer.deserialize_any(RawVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        review: RawValue,
    }

    #[test]
    fn test_accepts_number_and_string() {
        let body: Body = serde_json::from_str(r#"{"review": 6}"#).unwrap();
        assert_eq!(body.review.as_str(), "6");

        let body: Body = serde_json::from_str(r#"{"review": "7"}"#).unwrap();
        assert_eq!(body.review.as_str(), "7");

        let body: Body = serde_json::from_str(r#"{"review": -1}"#).unwrap();
        assert_eq!(body.review.as_str(), "-1");
    }

    #[test]
    fn test_rejects_non_scalar() {
        assert!(serde_json::from_str::<Body>(r#"{"review": [1]}"#).is_err());
    }
}
