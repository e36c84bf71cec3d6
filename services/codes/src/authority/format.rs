use rand::RngExt;

use crate::error::CodesServiceError;

/// Uppercase letters and digits minus `I`, `O`, `1` and `0`.
pub const DEFAULT_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const DEFAULT_SYMBOLS: usize = 9;
pub const DEFAULT_GROUP_SIZE: usize = 3;
pub const DEFAULT_SEPARATOR: char = '-';

/// Shape of a human-enterable code: `symbols` characters drawn from
/// `alphabet`, split into groups of `group_size` joined by `separator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFormat {
    alphabet: Vec<u8>,
    symbols: usize,
    group_size: usize,
    separator: char,
}

impl CodeFormat {
    pub fn new(
        alphabet: &str,
        symbols: usize,
        group_size: usize,
        separator: char,
    ) -> Result<Self, CodesServiceError> {
        let invalid = |msg: &str| Err(CodesServiceError::InvalidFormat(msg.to_owned()));

        if alphabet.is_empty() {
            return invalid("alphabet is empty");
        }
        if !alphabet.bytes().all(|b| b.is_ascii_graphic()) {
            return invalid("alphabet must be printable ASCII");
        }
        let mut seen = [false; 128];
        for b in alphabet.bytes() {
            if std::mem::replace(&mut seen[b as usize], true) {
                return invalid("alphabet contains duplicate symbols");
            }
        }
        if !separator.is_ascii_graphic() {
            return invalid("separator must be printable ASCII");
        }
        if alphabet.contains(separator) {
            return invalid("separator appears in alphabet");
        }
        if symbols == 0 || group_size == 0 {
            return invalid("symbols and group size must be positive");
        }
        if symbols % group_size != 0 {
            return invalid("symbols must be a multiple of group size");
        }

        Ok(Self {
            alphabet: alphabet.as_bytes().to_vec(),
            symbols,
            group_size,
            separator,
        })
    }

    pub fn alphabet_len(&self) -> usize {
        self.alphabet.len()
    }

    /// Length of a formatted code including separators (11 for `XXX-XXX-XXX`).
    pub fn formatted_len(&self) -> usize {
        let groups = self.symbols / self.group_size;
        self.symbols + groups - 1
    }

    /// Canonical form of a typed code: surrounding whitespace dropped and,
    /// when the alphabet is single-case, letters folded to that case.
    pub fn normalize(&self, input: &str) -> String {
        let input = input.trim();
        let upper = self.alphabet.iter().any(u8::is_ascii_uppercase);
        let lower = self.alphabet.iter().any(u8::is_ascii_lowercase);
        match (upper, lower) {
            (true, false) => input.to_ascii_uppercase(),
            (false, true) => input.to_ascii_lowercase(),
            _ => input.to_owned(),
        }
    }

    /// Draw one formatted candidate.
    pub fn draw<R: RngExt>(&self, rng: &mut R) -> String {
        let mut out = String::with_capacity(self.formatted_len());
        for i in 0..self.symbols {
            if i > 0 && i % self.group_size == 0 {
                out.push(self.separator);
            }
            out.push(self.alphabet[rng.random_range(0..self.alphabet.len())] as char);
        }
        out
    }

    /// Whether `value` has exactly the shape `draw` produces.
    pub fn is_well_formed(&self, value: &str) -> bool {
        if value.len() != self.formatted_len() {
            return false;
        }
        let mut groups = 0;
        for group in value.split(self.separator) {
            groups += 1;
            if group.len() != self.group_size
                || !group.bytes().all(|b| self.alphabet.contains(&b))
            {
                return false;
            }
        }
        groups == self.symbols / self.group_size
    }
}

impl Default for CodeFormat {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.as_bytes().to_vec(),
            symbols: DEFAULT_SYMBOLS,
            group_size: DEFAULT_GROUP_SIZE,
            separator: DEFAULT_SEPARATOR,
        }
    }
}
