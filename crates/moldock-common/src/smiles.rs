//! Syntactic SMILES validation.
//!
//! A lightweight structural check, not a chemistry engine: it accepts strings
//! that look like SMILES (legal atom symbols, balanced branches and bracket
//! atoms, well-formed ring closures) and rejects everything else. Valence and
//! aromaticity are left to the docking backend.

/// Organic-subset atoms allowed outside bracket atoms.
const ORGANIC_UPPER: &[u8] = b"BCNOPSFI";
/// Aromatic atoms allowed outside bracket atoms.
const AROMATIC_LOWER: &[u8] = b"bcnops";

/// Check whether a string is syntactically plausible SMILES.
///
/// Pure function, no side effects. Returns `false` for anything that could
/// not be a SMILES string; a `true` result does not guarantee the molecule
/// is chemically sensible.
pub fn is_valid_smiles(smiles: &str) -> bool {
    let bytes = smiles.as_bytes();
    if bytes.is_empty() {
        return false;
    }

    let mut depth: i32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                // Bracket atom: non-empty run of isotope/symbol/charge characters.
                let start = i + 1;
                let mut j = start;
                while j < bytes.len() && bytes[j] != b']' {
                    let c = bytes[j];
                    if !(c.is_ascii_alphanumeric() || c == b'+' || c == b'-' || c == b'@') {
                        return false;
                    }
                    j += 1;
                }
                if j == start || j >= bytes.len() {
                    return false;
                }
                i = j + 1;
            }
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
                i += 1;
            }
            b'%' => {
                // Two-digit ring closure, e.g. %12
                if i + 2 >= bytes.len()
                    || !bytes[i + 1].is_ascii_digit()
                    || !bytes[i + 2].is_ascii_digit()
                {
                    return false;
                }
                i += 3;
            }
            c if c.is_ascii_uppercase() => {
                // Two-letter halogens first, then the organic subset.
                if (c == b'C' && bytes.get(i + 1) == Some(&b'l'))
                    || (c == b'B' && bytes.get(i + 1) == Some(&b'r'))
                {
                    i += 2;
                } else if ORGANIC_UPPER.contains(&c) {
                    i += 1;
                } else {
                    return false;
                }
            }
            c if c.is_ascii_lowercase() => {
                if !AROMATIC_LOWER.contains(&c) {
                    return false;
                }
                i += 1;
            }
            c if c.is_ascii_digit() => i += 1,
            b'=' | b'#' | b'-' | b'/' | b'\\' | b'.' | b':' | b'*' => i += 1,
            _ => return false,
        }
    }

    depth == 0
}
