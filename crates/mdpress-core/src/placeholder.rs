use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;

const TOKEN_OPEN: char = '⟦';
const TOKEN_CLOSE: char = '⟧';

/// One protected span: the token that stands in for it and the exact text it replaced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Placeholder {
    pub token: String,
    pub original: String,
}

/// Token allocator scoped to a single parse or render call.
///
/// Tokens have the shape `⟦KIND_salt_index⟧`. The salt is drawn once per arena and is
/// guaranteed not to occur in the text the arena was created for, so a token can never
/// collide with user content or with the tokens of another arena.
#[derive(Debug)]
pub struct PlaceholderArena {
    salt: String,
    entries: Vec<Placeholder>,
}

impl PlaceholderArena {
    pub fn new(text: &str) -> Self {
        Self {
            salt: fresh_salt(text),
            entries: Vec::new(),
        }
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Stores `original` and returns the token that replaces it.
    pub fn push(&mut self, kind: &str, original: impl Into<String>) -> String {
        let token = self.token(kind, self.entries.len());
        self.entries.push(Placeholder {
            token: token.clone(),
            original: original.into(),
        });
        token
    }

    fn token(&self, kind: &str, index: usize) -> String {
        format!(
            "{}{}_{}_{}{}",
            TOKEN_OPEN, kind, self.salt, index, TOKEN_CLOSE
        )
    }

    /// Swaps every `from` token in `text` for a fresh `to` token whose original is
    /// `render(entry)`.
    pub fn reissue<F>(&mut self, text: &str, from: &str, to: &str, mut render: F) -> String
    where
        F: FnMut(&Placeholder) -> String,
    {
        let base = self.entries.len();
        let mut fresh = Vec::new();
        let out = self.expand(text, from, |entry| {
            let token = self.token(to, base + fresh.len());
            fresh.push(Placeholder {
                token: token.clone(),
                original: render(entry),
            });
            token
        });
        self.entries.extend(fresh);
        out
    }

    pub fn into_entries(self) -> Vec<Placeholder> {
        self.entries
    }

    /// Replaces every token of `kind` issued by this arena with `render(entry)`.
    ///
    /// Tokens of other kinds, other salts, or unknown indices are left untouched.
    pub fn expand<F>(&self, text: &str, kind: &str, mut render: F) -> String
    where
        F: FnMut(&Placeholder) -> String,
    {
        let prefix = format!("{}{}_{}_", TOKEN_OPEN, kind, self.salt);
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(pos) = rest.find(&prefix) {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + prefix.len()..];
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            let entry = after[digits..]
                .strip_prefix(TOKEN_CLOSE)
                .and_then(|tail| {
                    let index: usize = after[..digits].parse().ok()?;
                    self.entries.get(index).map(|entry| (entry, tail))
                });
            match entry {
                Some((entry, tail)) => {
                    out.push_str(&render(entry));
                    rest = tail;
                }
                None => {
                    out.push_str(&prefix);
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn fresh_salt(text: &str) -> String {
    let mut attempt: u64 = 0;
    loop {
        let seed = RandomState::new().hash_one((text.len(), attempt));
        let salt = base36(seed);
        if !text.contains(&salt) {
            return salt;
        }
        attempt += 1;
    }
}

fn base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::with_capacity(13);
    loop {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
        if value == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
