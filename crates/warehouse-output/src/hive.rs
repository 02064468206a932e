//! Hive-style partition directory names.

/// Directory value used for null or empty partition values.
pub const HIVE_DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// `column=value` directory name for one partition.
pub fn partition_dir_name(column: &str, value: Option<&str>) -> String {
    let value = match value {
        Some(v) if !v.is_empty() => escape_partition_value(v),
        _ => HIVE_DEFAULT_PARTITION.to_string(),
    };
    format!("{column}={value}")
}

/// Percent-encode characters that are unsafe in a path segment, the way
/// Hive escapes partition values.
pub fn escape_partition_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if needs_escape(ch) {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn needs_escape(ch: char) -> bool {
    ch.is_control()
        || matches!(
            ch,
            '"' | '#' | '%' | '\'' | '*' | '/' | ':' | '=' | '?' | '\\' | '{' | '[' | ']' | '^'
        )
}
