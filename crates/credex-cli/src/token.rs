//! # Token Subcommand
//!
//! Offline minting and checking of offer tokens. A token minted here
//! redeems against any server running with the same `HMAC_SECRET`.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use url::Url;

use credex_core::{ExchangeError, Timestamp};
use credex_crypto::HmacSecret;
use credex_protocol::config::{DEFAULT_OFFER_TTL_SECS, MAX_TTL_SECS};
use credex_protocol::offer::{check_token, sign};
use credex_protocol::OfferToken;
use credex_vc::local::DID_KEY_METHOD;
use credex_vc::{DidToolkit, LocalToolkit};

/// Arguments for the `credex token` subcommand.
#[derive(Args, Debug)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands.
#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Mint a redeemable offer URL.
    Mint {
        /// The server's HMAC secret.
        #[arg(long)]
        secret: String,
        /// Offer id. Defaults to the DID of a freshly generated key.
        #[arg(long)]
        id: Option<String>,
        /// Base URL the offer is redeemed at.
        #[arg(long, default_value = "http://localhost:8080")]
        base_url: String,
        /// Token lifetime in seconds.
        #[arg(long, default_value_t = DEFAULT_OFFER_TTL_SECS)]
        ttl: i64,
    },

    /// Check an offer URL the way the server would redeem it.
    Check {
        /// The server's HMAC secret.
        #[arg(long)]
        secret: String,
        /// Check as of this RFC 3339 time instead of now.
        #[arg(long)]
        at: Option<String>,
        /// The offer URL.
        #[arg(value_name = "URL")]
        url: String,
    },
}

/// Execute the token subcommand.
pub fn run_token(args: &TokenArgs) -> Result<u8> {
    match &args.command {
        TokenCommand::Mint {
            secret,
            id,
            base_url,
            ttl,
        } => cmd_mint(secret, id.as_deref(), base_url, *ttl),
        TokenCommand::Check { secret, at, url } => cmd_check(secret, at.as_deref(), url),
    }
}

fn cmd_mint(secret: &str, id: Option<&str>, base_url: &str, ttl: i64) -> Result<u8> {
    let secret = parse_secret(secret)?;
    let id = match id {
        Some(id) => id.to_string(),
        None => {
            let toolkit = LocalToolkit::new();
            let key = toolkit.generate_key()?;
            toolkit.key_to_did(DID_KEY_METHOD, &key)?.to_string()
        }
    };
    let url = mint_url(&secret, &id, base_url, ttl, Timestamp::now())?;
    tracing::info!(offer_id = %id, "offer token minted");
    println!("{url}");
    Ok(0)
}

fn cmd_check(secret: &str, at: Option<&str>, url: &str) -> Result<u8> {
    let secret = parse_secret(secret)?;
    let now = match at {
        Some(at) => Timestamp::parse(at).with_context(|| format!("invalid --at value {at:?}"))?,
        None => Timestamp::now(),
    };
    let url = Url::parse(url).with_context(|| format!("invalid offer URL {url:?}"))?;
    match check_url(&secret, &url, now) {
        Ok(()) => {
            println!("OK: token is valid");
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {e}");
            Ok(1)
        }
    }
}

fn parse_secret(secret: &str) -> Result<HmacSecret> {
    HmacSecret::new(secret.as_bytes().to_vec()).context("--secret must not be empty")
}

/// Sign `id` with an expiry `ttl` seconds after `now` and build its URL.
pub fn mint_url(
    secret: &HmacSecret,
    id: &str,
    base_url: &str,
    ttl: i64,
    now: Timestamp,
) -> Result<Url> {
    if !(1..=MAX_TTL_SECS).contains(&ttl) {
        bail!("--ttl must be between 1 and {MAX_TTL_SECS} seconds, got {ttl}");
    }
    let expires = now
        .plus(chrono::Duration::seconds(ttl))?
        .to_canonical_string();
    let token = OfferToken {
        id: id.to_string(),
        signature: sign(secret, id, &expires)?,
        expires,
    };
    token
        .url(base_url)
        .with_context(|| format!("invalid base URL {base_url:?}"))
}

/// Run the redemption checks on the `id`, `expires`, and `hmac` query
/// parameters of `url`.
pub fn check_url(secret: &HmacSecret, url: &Url, now: Timestamp) -> Result<(), ExchangeError> {
    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default()
    };
    check_token(secret, &param("id"), &param("expires"), &param("hmac"), now)
}
