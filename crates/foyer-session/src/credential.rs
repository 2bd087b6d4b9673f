//! Credential generation.
//!
//! A credential is the secret a player receives at registration and must
//! present on login. It is set once and never reissued.

use rand::seq::SliceRandom;
use rand::Rng;

/// Length of every generated credential, in characters.
pub const CREDENTIAL_LEN: usize = 20;

const DIGIT_COUNT: usize = 5;
const SYMBOL_COUNT: usize = 5;

const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "~!@#$%^&*()_+`-={}|[]\\:\"<>?,./";

/// Generates a fresh credential.
///
/// The result is [`CREDENTIAL_LEN`] characters long with no character
/// repeated: five digits, five symbols, and letters of both cases for the
/// rest, in random order.
pub fn generate_credential() -> String {
    let mut rng = rand::rng();
    let mut chars = Vec::with_capacity(CREDENTIAL_LEN);

    let mut lower: Vec<char> = LOWER.chars().collect();
    let mut upper: Vec<char> = UPPER.chars().collect();
    // One of each case first, so both are always present.
    chars.push(draw(&mut rng, &mut lower));
    chars.push(draw(&mut rng, &mut upper));

    let mut letters = lower;
    letters.append(&mut upper);
    let letter_count = CREDENTIAL_LEN - DIGIT_COUNT - SYMBOL_COUNT - 2;
    draw_many(&mut rng, &mut letters, letter_count, &mut chars);
    draw_many(&mut rng, &mut DIGITS.chars().collect(), DIGIT_COUNT, &mut chars);
    draw_many(&mut rng, &mut SYMBOLS.chars().collect(), SYMBOL_COUNT, &mut chars);

    chars.shuffle(&mut rng);
    chars.into_iter().collect()
}

/// Removes and returns one random character from `pool`.
fn draw(rng: &mut impl Rng, pool: &mut Vec<char>) -> char {
    let index = rng.random_range(0..pool.len());
    pool.swap_remove(index)
}

fn draw_many(rng: &mut impl Rng, pool: &mut Vec<char>, count: usize, out: &mut Vec<char>) {
    for _ in 0..count {
        out.push(draw(rng, pool));
    }
}
