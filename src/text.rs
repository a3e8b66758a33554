/// Returns the text between the first occurrence of `left` and the last
/// occurrence of `right` that follows it.
///
/// The search for `right` starts where the match of `left` ends, so a
/// `right` that only occurs earlier (or overlaps `left`) is not found.
/// Returns an empty string when either marker is missing.
///
/// ```
/// use pqlink::text::read_between;
///
/// assert_eq!(read_between("inbox/id/AQQkAD/end", "/id/", "/"), "AQQkAD");
/// assert_eq!(read_between("inbox/id/AQQkAD", "/id/AQQ", "d/AQQk"), "");
/// ```
pub fn read_between<'a>(source: &'a str, left: &str, right: &str) -> &'a str {
    let start = match source.find(left) {
        Some(i) => i + left.len(),
        None => return "",
    };
    let rest = &source[start..];
    match rest.rfind(right) {
        Some(end) => &rest[..end],
        None => "",
    }
}
