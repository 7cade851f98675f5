//! Amounts in words, Indian numbering
//!
//! Rupees are grouped as crore (10^7), lakh (10^5), thousand and hundreds.
//! Each group of up to three digits is spelled with the usual ones/tens
//! tables. The sign of the amount is ignored.

use crate::models::Money;

const ONES: [&str; 20] = [
    "",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;

/// 0..=99 in title case; empty for zero
fn two(n: u64) -> String {
    let n = n % 100;
    if n < 20 {
        return ONES[n as usize].to_string();
    }
    let (tens, ones) = ((n / 10) as usize, (n % 10) as usize);
    if ones == 0 {
        TENS[tens].to_string()
    } else {
        format!("{} {}", TENS[tens], ONES[ones])
    }
}

/// 0..=999 in title case; empty for zero
fn three(n: u64) -> String {
    let n = n % 1000;
    let (hundreds, rest) = (n / 100, n % 100);
    match (hundreds, rest) {
        (0, _) => two(rest),
        (h, 0) => format!("{} Hundred", ONES[h as usize]),
        (h, r) => format!("{} Hundred {}", ONES[h as usize], two(r)),
    }
}

/// Whole rupees in title case with Indian grouping; empty for zero
///
/// A crore count above 999 is itself grouped, giving e.g.
/// "One Thousand Crore".
fn indian_words(rupees: u64) -> String {
    let crore = rupees / CRORE;
    let lakh = (rupees % CRORE) / LAKH;
    let thousand = (rupees % LAKH) / THOUSAND;
    let hundred = rupees % THOUSAND;

    let mut parts: Vec<String> = Vec::new();
    if crore > 0 {
        parts.push(format!("{} Crore", indian_words(crore)));
    }
    if lakh > 0 {
        parts.push(format!("{} Lakh", three(lakh)));
    }
    if thousand > 0 {
        parts.push(format!("{} Thousand", three(thousand)));
    }
    if hundred > 0 {
        parts.push(three(hundred));
    }
    parts.join(" ")
}

/// Lowercase everything, then capitalize the first letter
fn sentence_case(words: &str) -> String {
    let lower = words.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn split(amount: Money) -> (u64, u64) {
    let paise = amount.paise().unsigned_abs();
    (paise / 100, paise % 100)
}

/// Render an amount as a sentence, e.g. "One lakh rupees only."
///
/// # Examples
/// ```
/// use gstbill_cli::display::words::to_sentence;
/// use gstbill_cli::models::Money;
///
/// assert_eq!(to_sentence(Money::from_rupees(100000.0)), "One lakh rupees only.");
/// assert_eq!(
///     to_sentence(Money::from_rupees(1234.56)),
///     "One thousand two hundred thirty four rupees and Fifty six paise only."
/// );
/// ```
pub fn to_sentence(amount: Money) -> String {
    let (rupees, paise) = split(amount);

    let words = indian_words(rupees);
    let phrase = if words.is_empty() {
        "Zero".to_string()
    } else {
        sentence_case(&words)
    };

    if paise > 0 {
        format!(
            "{} rupees and {} paise only.",
            phrase,
            sentence_case(&two(paise))
        )
    } else {
        format!("{} rupees only.", phrase)
    }
}

/// Render an amount in the title-case cheque style,
/// e.g. "Indian Rupees One Lakh only"
pub fn to_title_words(amount: Money) -> String {
    let (rupees, paise) = split(amount);

    let words = indian_words(rupees);
    let words = if words.is_empty() { "Zero".to_string() } else { words };

    if paise > 0 {
        format!("Indian Rupees {} and {} Paise only", words, two(paise))
    } else {
        format!("Indian Rupees {} only", words)
    }
}
