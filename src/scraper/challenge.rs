//! Proof-of-work gate handling.
//!
//! Douban occasionally answers a request with an intermediate page served from
//! `sec.douban.com`. The page embeds a token, a challenge string and a redirect
//! target in hidden inputs; the client must find a nonce whose SHA-512 digest
//! (over `challenge + nonce`) starts with `difficulty` hex zeros and post it back.

use regex::Regex;
use sha2::{Digest, Sha512};

use super::ScraperError;

/// Leading hex zeros required when the gate page does not say otherwise
pub const DEFAULT_DIFFICULTY: usize = 4;

/// Parameters scraped from a gate page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Value of the hidden `tok` input
    pub token: String,
    /// Value of the hidden `cha` input, the string being hashed
    pub challenge: String,
    /// Value of the hidden `red` input, where the site sends us afterwards
    pub redirect: String,
    /// Number of leading `'0'` hex digits the digest must have
    pub difficulty: usize,
}

/// Compiled patterns for reading a gate page
#[derive(Debug)]
pub struct ChallengePatterns {
    token: Regex,
    challenge: Regex,
    redirect: Regex,
    difficulty: Regex,
}

impl Default for ChallengePatterns {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengePatterns {
    pub fn new() -> Self {
        Self {
            token: Regex::new(r#"id="tok"[^>]*value="([^"]+)""#).unwrap(),
            challenge: Regex::new(r#"id="cha"[^>]*value="([^"]+)""#).unwrap(),
            redirect: Regex::new(r#"id="red"[^>]*value="([^"]+)""#).unwrap(),
            difficulty: Regex::new(r"difficulty\s*=\s*(\d+)").unwrap(),
        }
    }

    /// Pull the challenge parameters out of a gate page body
    ///
    /// Fails with [`ScraperError::ChallengeParseError`] when any of the token,
    /// challenge or redirect inputs is missing. A missing, zero or unparsable
    /// difficulty falls back to [`DEFAULT_DIFFICULTY`].
    pub fn parse(&self, html: &str) -> Result<Challenge, ScraperError> {
        let token = capture(&self.token, html);
        let challenge = capture(&self.challenge, html);
        let redirect = capture(&self.redirect, html);

        if token.is_empty() || challenge.is_empty() || redirect.is_empty() {
            return Err(ScraperError::ChallengeParseError);
        }

        let difficulty = capture(&self.difficulty, html)
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_DIFFICULTY);

        Ok(Challenge {
            token,
            challenge,
            redirect,
            difficulty,
        })
    }
}

fn capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Find the smallest positive nonce satisfying the challenge
///
/// The search has no upper bound; a large difficulty means a long search.
pub fn solve(challenge: &str, difficulty: usize) -> u64 {
    let target = "0".repeat(difficulty);
    let mut nonce: u64 = 1;
    loop {
        if digest_hex(challenge, nonce).starts_with(&target) {
            return nonce;
        }
        nonce += 1;
    }
}

/// Hex-encoded SHA-512 of `challenge` followed by the decimal nonce
pub fn digest_hex(challenge: &str, nonce: u64) -> String {
    let digest = Sha512::digest(format!("{}{}", challenge, nonce).as_bytes());
    hex::encode(digest)
}

fn leading_zeros(hex: &str) -> usize {
    hex.chars().take_while(|c| *c == '0').count()
}

/// Whether `nonce` is an accepted answer for `challenge` at `difficulty`
pub fn verify(challenge: &str, difficulty: usize, nonce: u64) -> bool {
    leading_zeros(&digest_hex(challenge, nonce)) >= difficulty
}
