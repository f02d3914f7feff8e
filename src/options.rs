// Flag sets each sftp command accepts
pub const TRANSFER_FLAGS: &str = "afPpr";
pub const RESUME_FLAGS: &str = "Ppr";
pub const LS_FLAGS: &str = "1afhlnrSt";
pub const DF_FLAGS: &str = "hi";
pub const LN_FLAGS: &str = "s";

/// Build the option token for a command.
///
/// Keeps the requested flags that `accepted` contains, in the order they
/// were requested, and prefixes them with `-`. Anything else is dropped
/// without complaint. Returns an empty string when nothing survives.
pub fn filter_flags(accepted: &str, requested: &str) -> String {
    let flags: String = requested.chars().filter(|c| accepted.contains(*c)).collect();
    if flags.is_empty() {
        String::new()
    } else {
        format!("-{}", flags)
    }
}
