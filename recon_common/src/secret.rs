use std::{
    fmt,
    fmt::{Debug, Display},
};

const REDACTED: &str = "****";

/// A wrapper around sensitive values (refresh tokens, client secrets) that redacts them in `Debug` and `Display`
/// output, so credential bundles and configs can be logged freely. Call [`Secret::reveal`] at the point where the
/// raw value actually goes on the wire.
#[derive(Clone, Default)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn reveal(&self) -> &T {
        &self.0
    }

    /// Unwrap the secret, for handing the value to an API that takes ownership.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn secrets_never_leak_through_formatting() {
        let secret = Secret::new("refresh-token-value".to_string());
        assert_eq!(format!("{secret:?}"), "****");
        assert_eq!(format!("{secret}"), "****");
        // Nested in a derived Debug, the value stays hidden too.
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Bundle {
            token: Secret<String>,
        }
        let debug = format!("{:?}", Bundle { token: secret });
        assert!(!debug.contains("refresh-token-value"));
        assert!(debug.contains("****"));
    }

    #[test]
    fn reveal_and_into_inner_expose_the_value() {
        let secret = Secret::new("hush".to_string());
        assert_eq!(secret.reveal(), "hush");
        assert_eq!(secret.into_inner(), "hush");
    }
}
