/// Collapse every whitespace run (spaces, tabs, newlines) into a single
/// space and trim the ends. Applied to titles and bodies before storage so
/// later comparisons are whitespace-insensitive.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
