use serde::{de::Visitor, Deserialize};

/// A size in bytes, written as `1024`, `"512b"`, `"8kb"` or `"10MB"`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BytesSize(pub usize);

impl BytesSize {
    #[inline]
    pub fn u64(&self) -> u64 {
        self.0 as u64
    }
}

pub struct BytesSizeVisitor;

impl<'de> Visitor<'de> for BytesSizeVisitor {
    type Value = BytesSize;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a size in bytes, such as `12kb` or `1024`")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(BytesSize(v as usize))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        if v < 0 {
            return Err(E::custom(format!("negative size, `{}`", v)));
        }
        Ok(BytesSize(v as usize))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        let v = v.trim();
        if v.is_empty() {
            return Ok(BytesSize(0));
        }

        let idx = v.find(|c: char| !c.is_ascii_digit()).unwrap_or(v.len());
        let (nums, units) = v.split_at(idx);
        let num: usize = match nums.parse() {
            Ok(num) => num,
            Err(_) => {
                return Err(E::custom(format!("bad number value, `{}`", nums)));
            }
        };

        let unit: usize = match units.to_lowercase().trim() {
            "" | "b" => 1,
            "k" | "kb" => 1024,
            "m" | "mb" => 1024 * 1024,
            "g" | "gb" => 1024 * 1024 * 1024,
            _ => {
                return Err(E::custom(format!("bad unit, `{}` not in `b,k,m,g`", units)));
            }
        };

        match num.checked_mul(unit) {
            Some(amount) => Ok(BytesSize(amount)),
            None => Err(E::custom(format!("size overflows, `{}`", v))),
        }
    }
}

impl<'de> Deserialize<'de> for BytesSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(BytesSizeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::BytesSize;

    #[derive(Deserialize, Default, Debug)]
    struct Sizes {
        a: BytesSize,
        b: BytesSize,
        c: BytesSize,
    }

    #[test]
    fn size_in_bytes() {
        let sizes: Sizes = toml::from_str(
            r#"
a = "1kb"
b = 300
c = "2 MB"
"#,
        )
        .unwrap();
        assert_eq!(sizes.a, BytesSize(1024));
        assert_eq!(sizes.b, BytesSize(300));
        assert_eq!(sizes.c, BytesSize(2 * 1024 * 1024));

        assert!(toml::from_str::<Sizes>("a = \"1tb\"\nb = 1\nc = 1").is_err());
    }
}
