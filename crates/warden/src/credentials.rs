//! Password check hook.
//!
//! Warden doesn't store or compare passwords itself. The login flow hands
//! the submitted password and the stored credential to a
//! [`CredentialVerifier`], which the service supplies. There is no
//! default: wire a verifier for whatever hashing scheme the user
//! collection uses.

/// Decides whether a submitted password matches a stored credential.
///
/// # Example
///
/// ```rust
/// use warden::CredentialVerifier;
///
/// /// Compares against a precomputed digest.
/// struct DigestVerifier<F: Fn(&str) -> String + Send + Sync + 'static>(F);
///
/// impl<F: Fn(&str) -> String + Send + Sync + 'static> CredentialVerifier for DigestVerifier<F> {
///     fn verify(&self, submitted: &str, stored: &str) -> bool {
///         (self.0)(submitted) == stored
///     }
/// }
/// ```
pub trait CredentialVerifier: Send + Sync + 'static {
    /// `submitted` is the NFKD-normalized password from the login input;
    /// `stored` is the user's credential field as loaded from the
    /// primary store.
    fn verify(&self, submitted: &str, stored: &str) -> bool;
}
