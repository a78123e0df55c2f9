//! # credex-cli — Operator CLI for credex
//!
//! ## Subcommands
//!
//! - `credex token mint` — Mint an offer URL with a given secret.
//! - `credex token check` — Run the redemption checks on an offer URL
//!   without a server.
//! - `credex key generate` — Generate an issuer JWK for `ISSUER_KEY`.
//!
//! ```bash
//! credex token mint --secret "$HMAC_SECRET" --base-url https://issuer.example
//! credex token check --secret "$HMAC_SECRET" 'https://issuer.example/offer?id=…'
//! credex key generate --output issuer.jwk
//! ```

pub mod key;
pub mod token;
