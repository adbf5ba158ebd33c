//! `Cookie` request headers and `Set-Cookie` response headers.
//!
//! Parsing follows the cookie syntax of RFC 6265: names are tokens, values
//! are cookie octets optionally wrapped in double quotes. Anything else is a
//! [`CookieError`], which callers treat as a validation failure of an
//! otherwise well framed request.

use std::fmt;
use std::str::FromStr;

use micro_wire::protocol::ErrorClass;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CookieError {
    #[error("cookie pair {pair:?} has no '='")]
    MissingSeparator { pair: String },

    #[error("invalid cookie name {name:?}")]
    InvalidName { name: String },

    #[error("invalid value for cookie {name}")]
    InvalidValue { name: String },

    #[error("invalid cookie attribute {attribute}: {reason}")]
    InvalidAttribute { attribute: String, reason: String },
}

impl CookieError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }
}

/// A single `name=value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, CookieError> {
        let name = name.into();
        let value = value.into();
        if !is_token(&name) {
            return Err(CookieError::InvalidName { name });
        }
        if !value.bytes().all(is_cookie_octet) {
            return Err(CookieError::InvalidValue { name });
        }
        Ok(Self { name, value })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn parse_pair(pair: &str) -> Result<Self, CookieError> {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(CookieError::MissingSeparator { pair: pair.to_string() });
        };
        let value = value.trim();
        let value = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value);
        Self::new(name.trim(), value)
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Parses the value of a `Cookie` request header, e.g. `"a=1; b=2"`.
///
/// Empty segments (a trailing `;`) are ignored; every other segment must be a
/// valid pair.
///
/// ```
/// use micro_wire_server::cookie::parse_cookie_header;
///
/// let cookies = parse_cookie_header("theme=dark; lang=en").unwrap();
/// assert_eq!(cookies[1].name(), "lang");
/// assert_eq!(cookies[1].value(), "en");
/// ```
pub fn parse_cookie_header(header: &str) -> Result<Vec<Cookie>, CookieError> {
    header.split(';').map(str::trim).filter(|pair| !pair.is_empty()).map(Cookie::parse_pair).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

impl FromStr for SameSite {
    type Err = CookieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            _ => Err(CookieError::InvalidAttribute { attribute: "SameSite".to_string(), reason: format!("unknown value {s:?}") }),
        }
    }
}

/// A `Set-Cookie` header value: a cookie plus its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    cookie: Cookie,
    path: Option<String>,
    domain: Option<String>,
    max_age: Option<i64>,
    expires: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, CookieError> {
        Ok(Self::from(Cookie::new(name, value)?))
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Sets `Expires` to an already formatted HTTP date.
    #[must_use]
    pub fn with_expires(mut self, date: impl Into<String>) -> Self {
        self.expires = Some(date.into());
        self
    }

    #[must_use]
    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    #[must_use]
    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn cookie(&self) -> &Cookie {
        &self.cookie
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn expires(&self) -> Option<&str> {
        self.expires.as_deref()
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }
}

impl From<Cookie> for SetCookie {
    fn from(cookie: Cookie) -> Self {
        Self {
            cookie,
            path: None,
            domain: None,
            max_age: None,
            expires: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cookie)?;
        if let Some(path) = &self.path {
            write!(f, "; Path={path}")?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={domain}")?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={max_age}")?;
        }
        if let Some(expires) = &self.expires {
            write!(f, "; Expires={expires}")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={same_site}")?;
        }
        Ok(())
    }
}

impl FromStr for SetCookie {
    type Err = CookieError;

    /// Attribute names are matched case-insensitively; unknown attributes are
    /// ignored as user agents do.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';').map(str::trim);
        let pair = parts.next().unwrap_or_default();
        let mut set_cookie = Self::from(Cookie::parse_pair(pair)?);

        for attribute in parts.filter(|part| !part.is_empty()) {
            let (name, value) = match attribute.split_once('=') {
                Some((name, value)) => (name.trim(), Some(value.trim())),
                None => (attribute, None),
            };

            match (name.to_ascii_lowercase().as_str(), value) {
                ("path", Some(value)) => set_cookie.path = Some(value.to_string()),
                ("domain", Some(value)) => set_cookie.domain = Some(value.to_string()),
                ("expires", Some(value)) => set_cookie.expires = Some(value.to_string()),
                ("max-age", Some(value)) => {
                    let seconds = value.parse::<i64>().map_err(|e| CookieError::InvalidAttribute {
                        attribute: "Max-Age".to_string(),
                        reason: format!("{value:?} is not an integer: {e}"),
                    })?;
                    set_cookie.max_age = Some(seconds);
                }
                ("samesite", Some(value)) => set_cookie.same_site = Some(value.parse()?),
                ("secure", _) => set_cookie.secure = true,
                ("httponly", _) => set_cookie.http_only = true,
                _ => {}
            }
        }

        Ok(set_cookie)
    }
}

fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}
