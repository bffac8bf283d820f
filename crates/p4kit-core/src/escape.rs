/// Characters that carry meaning inside a view line and must be percent-encoded.
const VIEW_SPECIAL_CHARS: [char; 5] = ['@', '#', '*', '%', ' '];

/// Escapes a depot path so it can be placed on a branch view line.
///
/// Paths without any special character come back byte-identical. Every
/// special character becomes `%` followed by the lowercase hex of its code
/// point, unpadded.
pub fn view_escape(path: &str) -> String {
    if !path.contains(&VIEW_SPECIAL_CHARS[..]) {
        return path.to_string();
    }

    let mut escaped = String::with_capacity(path.len() + 8);
    for c in path.chars() {
        if VIEW_SPECIAL_CHARS.contains(&c) {
            escaped.push_str(&format!("%{:x}", c as u32));
        } else {
            escaped.push(c);
        }
    }
    escaped
}
