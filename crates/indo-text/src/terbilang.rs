//! Indonesian cardinal numbers ("terbilang")

/// Words for 0..=11; zero is spelled as nothing
const BASE_WORDS: [&str; 12] = [
    "", "Satu", "Dua", "Tiga", "Empat", "Lima", "Enam", "Tujuh", "Delapan", "Sembilan",
    "Sepuluh", "Sebelas",
];

/// First value without a spelling
pub const UNSPELLABLE_FROM: u64 = 1_000_000_000_000;

/// Spell a non-negative integer in Indonesian
///
/// The output is title-cased word by word (`"Dua Puluh Satu"`) with single
/// spaces and no trailing blanks. Zero spells as the empty string. Values of
/// one trillion and above have no spelling and come back as plain digits.
///
/// # Examples
/// ```
/// use indo_text::to_words;
/// assert_eq!(to_words(21), "Dua Puluh Satu");
/// assert_eq!(to_words(2023), "Dua Ribu Dua Puluh Tiga");
/// assert_eq!(to_words(0), "");
/// ```
pub fn to_words(n: u64) -> String {
    if n >= UNSPELLABLE_FROM {
        return n.to_string();
    }
    spell(n).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Recursive expansion; may leave doubled or trailing spaces
fn spell(n: u64) -> String {
    match n {
        0..=11 => BASE_WORDS[n as usize].to_string(),
        12..=19 => format!("{} Belas", spell(n - 10)),
        20..=99 => format!("{} Puluh {}", spell(n / 10), spell(n % 10)),
        100..=199 => format!("Seratus {}", spell(n - 100)),
        200..=999 => format!("{} Ratus {}", spell(n / 100), spell(n % 100)),
        1_000..=1_999 => format!("Seribu {}", spell(n - 1_000)),
        2_000..=999_999 => format!("{} Ribu {}", spell(n / 1_000), spell(n % 1_000)),
        1_000_000..=999_999_999 => {
            format!("{} Juta {}", spell(n / 1_000_000), spell(n % 1_000_000))
        }
        _ => format!(
            "{} Miliar {}",
            spell(n / 1_000_000_000),
            spell(n % 1_000_000_000)
        ),
    }
}

/// Spell a monetary amount as `"<Words> Rupiah"`
///
/// The amount is rounded to whole rupiah first; negative amounts spell their
/// magnitude. Zero reads `"Nol Rupiah"`.
pub fn rupiah_words(amount: f64) -> String {
    let rounded = if amount.is_finite() {
        amount.abs().round() as u64
    } else {
        0
    };

    if rounded == 0 {
        return "Nol Rupiah".to_string();
    }

    format!("{} Rupiah", capitalize_first(&to_words(rounded)))
}

/// Uppercase the first character, leaving the rest untouched
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
