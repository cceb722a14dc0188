//! Cookies attached to a response.

use std::fmt;

/// The `Max-Age` attribute of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxAge {
    /// No attribute: the cookie lives until the browser session ends
    Unset,
    /// Delete the cookie now (`Max-Age=0`)
    Expire,
    /// Explicit lifetime in seconds
    Seconds(i64),
}

impl MaxAge {
    /// Map a signed duration onto the attribute.
    ///
    /// Negative durations delete the cookie. Zero, and anything shorter than
    /// a second, omits the attribute.
    pub fn from_duration(max_age: chrono::Duration) -> Self {
        if max_age < chrono::Duration::zero() {
            return MaxAge::Expire;
        }
        match max_age.num_seconds() {
            0 => MaxAge::Unset,
            secs => MaxAge::Seconds(secs),
        }
    }
}

/// A cookie to set on the client.
///
/// Only name, value and `Max-Age` are emitted; path, domain and security
/// attributes are left to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub max_age: MaxAge,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, max_age: MaxAge) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age,
        }
    }

    /// Cookie that tells the client to drop `name`.
    pub fn expired(name: impl Into<String>) -> Self {
        Self::new(name, "", MaxAge::Expire)
    }

    /// The `Set-Cookie` header value, or `None` when the name is not a valid token.
    ///
    /// Bytes not allowed in a cookie value are dropped; values with spaces
    /// or commas are quoted.
    pub fn header_value(&self) -> Option<String> {
        if !is_valid_name(&self.name) {
            return None;
        }
        let mut out = format!("{}={}", self.name, sanitize_value(&self.value));
        match self.max_age {
            MaxAge::Unset => {}
            MaxAge::Expire => out.push_str("; Max-Age=0"),
            MaxAge::Seconds(secs) => out.push_str(&format!("; Max-Age={}", secs)),
        }
        Some(out)
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header_value().unwrap_or_default())
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
        })
}

fn sanitize_value(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|&c| (' '..='~').contains(&c) && c != '"' && c != ';' && c != '\\')
        .collect();
    if cleaned.contains(' ') || cleaned.contains(',') {
        format!("\"{}\"", cleaned)
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_max_age_from_duration() {
        assert_eq!(MaxAge::from_duration(Duration::zero()), MaxAge::Unset);
        assert_eq!(MaxAge::from_duration(Duration::milliseconds(500)), MaxAge::Unset);
        assert_eq!(MaxAge::from_duration(Duration::seconds(-1)), MaxAge::Expire);
        assert_eq!(MaxAge::from_duration(Duration::milliseconds(-1)), MaxAge::Expire);
        assert_eq!(MaxAge::from_duration(Duration::hours(24)), MaxAge::Seconds(86_400));
    }

    #[test]
    fn test_header_value() {
        let cookie = Cookie::new("sid", "abc", MaxAge::Seconds(60));
        assert_eq!(cookie.header_value().unwrap(), "sid=abc; Max-Age=60");

        let cookie = Cookie::new("sid", "abc", MaxAge::Unset);
        assert_eq!(cookie.header_value().unwrap(), "sid=abc");

        assert_eq!(Cookie::expired("sid").header_value().unwrap(), "sid=; Max-Age=0");
    }

    #[test]
    fn test_value_sanitizing() {
        let cookie = Cookie::new("n", "a b", MaxAge::Unset);
        assert_eq!(cookie.to_string(), "n=\"a b\"");

        let cookie = Cookie::new("n", "x;y\"z\n", MaxAge::Unset);
        assert_eq!(cookie.to_string(), "n=xyz");
    }

    #[test]
    fn test_invalid_name() {
        assert!(Cookie::new("", "v", MaxAge::Unset).header_value().is_none());
        assert!(Cookie::new("a b", "v", MaxAge::Unset).header_value().is_none());
        assert!(Cookie::new("a=b", "v", MaxAge::Unset).header_value().is_none());
    }
}
