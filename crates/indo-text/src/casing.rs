//! Title-casing for names, titles and institution lines

/// Acronyms kept uppercase by default
pub const DEFAULT_ACRONYMS: [&str; 3] = ["UPT", "RSBG", "NIP"];

/// Title-case every space-separated word
///
/// Words are lowercased first, then their first character is uppercased, so
/// `"PENGURUS BARANG"` becomes `"Pengurus Barang"`.
pub fn title_case(s: &str) -> String {
    title_case_with_acronyms(s, &[])
}

/// Title-case while keeping listed acronyms in uppercase
///
/// Acronyms match case-insensitively against whole words.
///
/// # Arguments
/// * `s` - Text to convert
/// * `acronyms` - Words that stay fully uppercase (e.g. `["UPT", "RSBG"]`)
///
/// # Examples
/// ```
/// use indo_text::title_case_with_acronyms;
/// assert_eq!(
///     title_case_with_acronyms("pengurus barang upt rsbg tuban", &["UPT", "RSBG"]),
///     "Pengurus Barang UPT RSBG Tuban"
/// );
/// ```
pub fn title_case_with_acronyms(s: &str, acronyms: &[&str]) -> String {
    s.split(' ')
        .map(|word| {
            if acronyms.iter().any(|a| a.eq_ignore_ascii_case(word)) {
                word.to_uppercase()
            } else {
                capitalize_word(&word.to_lowercase())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
