use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

use crate::error::HeaderError;

type Values = SmallVec<[String; 1]>;

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[!#$%&'*+\-.^_`|~0-9A-Za-z]+$").unwrap());

/// Header names only the framework may write.
pub const PROTECTED_HEADERS: &[&str] = &[
    "Content-Type",
    "Content-Length",
    "Transfer-Encoding",
    "Location",
    "Connection",
];

#[inline]
pub fn is_token(name: &str) -> bool {
    TOKEN.is_match(name)
}

/// CR, LF and NUL are never allowed in a value, they would let a value
/// terminate the header block.
#[inline]
pub fn is_valid_value(value: &str) -> bool {
    !value.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0)
}

/// `content-type` -> `Content-Type`. Names that are not tokens are returned
/// unchanged.
pub fn canonical_name(name: &str) -> String {
    if !is_token(name) {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// Case-insensitive multi-value header collection owned by a transport.
///
/// Entries keep their insertion order. Mutation is only possible from inside
/// this crate; handlers go through [`Header`].
#[derive(Debug, Default, Clone)]
pub struct HeaderMap {
    entries: Vec<(String, Values)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        match self.position(name) {
            Some(idx) => !self.entries[idx].1.is_empty(),
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(|v| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(idx) => self.entries[idx].1.as_slice(),
            None => &[],
        }
    }

    /// Every `(name, value)` pair, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, vs)| vs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn add(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(idx) => {
                self.entries[idx].1.push(value.to_string());
            }
            None => {
                let mut vs = Values::new();
                vs.push(value.to_string());
                self.entries.push((canonical_name(name), vs));
            }
        }
    }

    pub(crate) fn set(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(idx) => {
                let vs = &mut self.entries[idx].1;
                vs.clear();
                vs.push(value.to_string());
            }
            None => {
                self.add(name, value);
            }
        }
    }

    pub(crate) fn remove(&mut self, name: &str) {
        if let Some(idx) = self.position(name) {
            self.entries.remove(idx);
        }
    }
}

/// Validation applied to every header mutation a handler makes.
pub trait HeaderPolicy: Send + Sync {
    fn check_name(&self, name: &str) -> Result<(), HeaderError>;

    fn check_value(&self, name: &str, value: &str) -> Result<(), HeaderError>;
}

/// Token names, no CR/LF/NUL in values, no writes to [`PROTECTED_HEADERS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPolicy;

impl HeaderPolicy for DefaultPolicy {
    fn check_name(&self, name: &str) -> Result<(), HeaderError> {
        if !is_token(name) {
            return Err(HeaderError::InvalidName(name.to_string()));
        }
        if PROTECTED_HEADERS
            .iter()
            .any(|p| p.eq_ignore_ascii_case(name))
        {
            return Err(HeaderError::Protected(canonical_name(name)));
        }
        Ok(())
    }

    fn check_value(&self, name: &str, value: &str) -> Result<(), HeaderError> {
        if !is_valid_value(value) {
            return Err(HeaderError::InvalidValue(canonical_name(name)));
        }
        Ok(())
    }
}

/// Restricted view over the headers of a pending response.
///
/// Obtained from [`crate::ResponseWriter::header`]. Once the response has
/// been committed every mutation fails with [`HeaderError::Committed`] and
/// leaves the headers untouched.
pub struct Header<'a> {
    map: &'a mut HeaderMap,
    committed: bool,
    policy: &'a dyn HeaderPolicy,
}

impl<'a> Header<'a> {
    pub(crate) fn new(map: &'a mut HeaderMap, committed: bool, policy: &'a dyn HeaderPolicy) -> Self {
        Self {
            map,
            committed,
            policy,
        }
    }

    fn check(&self, name: &str, value: Option<&str>) -> Result<(), HeaderError> {
        if self.committed {
            return Err(HeaderError::Committed);
        }
        self.policy.check_name(name)?;
        if let Some(value) = value {
            self.policy.check_value(name, value)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name)
    }

    pub fn values(&self, name: &str) -> Vec<&str> {
        self.map.get_all(name).iter().map(|v| v.as_str()).collect()
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Replaces every value of `name`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.check(name, Some(value))?;
        self.map.set(name, value);
        Ok(())
    }

    pub fn add(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.check(name, Some(value))?;
        self.map.add(name, value);
        Ok(())
    }

    pub fn del(&mut self, name: &str) -> Result<(), HeaderError> {
        self.check(name, None)?;
        self.map.remove(name);
        Ok(())
    }
}
