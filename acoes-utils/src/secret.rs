use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};
use zeroize::Zeroize;

/// 敏感配置值（密码、连接串等）
///
/// 格式化时只输出占位符，丢弃时清零内存
///
#[derive(Clone, Deserialize, Eq, PartialEq, Default)]
pub struct Secret(String);

impl Secret {
    /// 格式化时显示的占位符
    pub const REDACTED: &'static str = "<SECRET>";

    /// 构造
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// 取出明文
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// 明文是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Zeroize for Secret {
    fn zeroize(&mut self) {
        self.0.zeroize()
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.zeroize()
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(Secret::REDACTED)
    }
}

impl Display for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(Secret::REDACTED)
    }
}

impl Serialize for Secret {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::secret::Secret;
    use rand::distributions::Alphanumeric;
    use rand::Rng;
    use zeroize::Zeroize;

    #[test]
    fn redacted() {
        let plain = random_string();
        let secret = Secret::new(&plain);
        assert_eq!(secret.expose(), plain);
        assert_eq!(format!("{:?}", secret), Secret::REDACTED);
        assert_eq!(secret.to_string(), Secret::REDACTED);
        assert!(!format!("{:?}", Some(&secret)).contains(&plain));
    }

    #[test]
    fn zeroize() {
        let mut secret = Secret::new(random_string());
        secret.zeroize();
        assert!(secret.is_empty());
    }

    #[test]
    fn deserialize_from_plain_string() -> serde_json::Result<()> {
        let plain = random_string();
        let secret: Secret = serde_json::from_str(&serde_json::to_string(&plain)?)?;
        assert_eq!(secret.expose(), plain);
        assert_eq!(serde_json::to_string(&secret)?, serde_json::to_string(&plain)?);
        Ok(())
    }

    fn random_string() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(24)
            .map(char::from)
            .collect()
    }
}
