//! Labeled integer sequences.
//!
//! A sequence of length `limit` is built by walking the 1-based positions
//! `1..=limit` and replacing each position according to which of the two
//! divisors divide it. The divisors are [`NonZeroU64`], so a zero divisor has
//! to be rejected by whoever builds them; it can never reach the modulo below.


use core::num::NonZeroU64;

/// The shape of a single sequence position.
///
/// Produced by [`classify`]; turned into text with [`Element::render`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Element {
    /// Divisible by neither divisor; rendered as the position itself.
    Number(u64),
    /// Divisible by the first divisor only.
    First,
    /// Divisible by the second divisor only.
    Second,
    /// Divisible by both divisors; rendered as both labels, first label
    /// first, with no separator.
    Both,
}

impl Element {
    /// Renders this element using the two labels of the sequence.
    pub fn render(self, label1: &str, label2: &str) -> String {
        match self {
            Self::Number(position) => position.to_string(),
            Self::First => label1.to_owned(),
            Self::Second => label2.to_owned(),
            Self::Both => {
                let mut both = String::with_capacity(label1.len() + label2.len());
                both.push_str(label1);
                both.push_str(label2);
                both
            }
        }
    }
}

/// Classifies a 1-based `position` by divisibility.
#[inline]
pub const fn classify(position: u64, divisor1: NonZeroU64, divisor2: NonZeroU64) -> Element {
    match (
        position % divisor1.get() == 0,
        position % divisor2.get() == 0,
    ) {
        (true, true) => Element::Both,
        (true, false) => Element::First,
        (false, true) => Element::Second,
        (false, false) => Element::Number(position),
    }
}

/// Generates the labeled sequence for positions `1..=limit`.
///
/// The result always has exactly `limit` elements, in position order, and is
/// freshly allocated on every call; identical arguments always yield an
/// identical sequence. A `limit` of zero yields an empty sequence.
///
/// # Example
/// ```
/// use core::num::NonZeroU64;
/// use fizzbuzz::generate;
///
/// let three = NonZeroU64::new(3).unwrap();
/// let five = NonZeroU64::new(5).unwrap();
///
/// let sequence = generate(three, five, 6, "fizz", "buzz");
/// assert_eq!(sequence, ["1", "2", "fizz", "4", "buzz", "fizz"]);
/// ```
pub fn generate(
    divisor1: NonZeroU64,
    divisor2: NonZeroU64,
    limit: u64,
    label1: &str,
    label2: &str,
) -> Vec<String> {
    (1..=limit)
        .map(|position| classify(position, divisor1, divisor2).render(label1, label2))
        .collect()
}
