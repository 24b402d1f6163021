/// Usernames handed out to new staff: the lowercased ASCII letters of the
/// last name followed by a two-digit suffix, `smith01` through `smith99`.
pub fn staff_username_candidates(last_name: &str) -> impl Iterator<Item = String> {
    let mut base: String = last_name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if base.is_empty() {
        base = "staff".to_string();
    }

    (1..=99).map(move |n| format!("{}{:02}", base, n))
}
