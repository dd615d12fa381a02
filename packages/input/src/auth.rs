//! Basic authentication utilities.

use std::io::Write;

use base64::prelude::BASE64_STANDARD;
use base64::write::EncoderWriter;
use http::HeaderValue;

use crate::error::{InputError, Result};

/// Builds a `Basic` authorization header value. The result is marked
/// sensitive so it never shows up in debug output.
pub fn basic_auth<U, P>(username: U, password: Option<P>) -> Result<HeaderValue>
where
    U: std::fmt::Display,
    P: std::fmt::Display,
{
    let mut buf = b"Basic ".to_vec();
    {
        let mut encoder = EncoderWriter::new(&mut buf, &BASE64_STANDARD);
        let _ = write!(encoder, "{username}:");
        if let Some(password) = password {
            let _ = write!(encoder, "{password}");
        }
    }
    let mut header = HeaderValue::from_bytes(&buf)
        .map_err(|_| InputError::Config("basic auth credentials are not header-safe".into()))?;
    header.set_sensitive(true);
    Ok(header)
}

#[cfg(test)]
mod tests {
    use base64::prelude::BASE64_STANDARD;
    use base64::Engine;

    use super::*;

    #[test]
    fn encodes_user_and_password() {
        let header = basic_auth("user", Some("pass")).expect("valid credentials");
        let expected = format!("Basic {}", BASE64_STANDARD.encode("user:pass"));
        assert_eq!(header.to_str().expect("ascii header"), expected);
        assert!(header.is_sensitive());
    }

    #[test]
    fn password_is_optional() {
        let header = basic_auth("user", None::<&str>).expect("valid credentials");
        let expected = format!("Basic {}", BASE64_STANDARD.encode("user:"));
        assert_eq!(header.to_str().expect("ascii header"), expected);
    }
}
