//! Built-in rule and file-selection data.
//!
//! Everything here is plain data: adding a rule means adding a row, not code.
//! Row order is the application order.

/// The default customer reference table, as `(pattern, replacement)` rows.
pub const BUILTIN_RULES: &[(&str, &str)] = &[
    // Company names
    (r"\b10th\s+Magnitude\b", "ManagedServiceProvider"),
    (r"\b10M\b", "MSP"),
    (r"\b10m\b", "msp"),
    // Customer A
    (r"\bEstee\s+Lauder\b", "Customer-A"),
    (r"\bEsteeCloud\b", "CustomerA-Cloud"),
    (r"\bELC\b", "CUST-A"),
    (r"\belc-", "cust-a-"),
    // Customer B
    (r"\bHelmerich\s+&\s+Payne\b", "Customer-B"),
    (r"\bHelmerich\s+and\s+Payne\b", "Customer-B"),
    (r"\bH&P\b", "CUST-B"),
    (r"\bhp-", "cust-b-"),
    // Customer C
    (r"\bChildren's\s+Mercy\b", "Customer-C"),
    (r"\bCMH\b", "CUST-C"),
    (r"\bcmh-", "cust-c-"),
    // Project-specific prefix
    (r"\bpgo-", "app-"),
];

/// Extensions that are always treated as text, without inspecting content.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "md", "txt", "json", "ps1", "sh", "py", "js", "ts", "yaml", "yml", "xml", "html", "css", "sql",
    "kql", "bicep", "tf", "hcl", "ini", "conf", "config",
];

/// Directory names pruned from traversal.
pub const SKIP_DIRS: &[&str] = &[".git", "node_modules", ".vscode", ".idea", "__pycache__"];

/// Normalizes a user-supplied extension: trims it, drops a leading dot and lowercases it.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}
