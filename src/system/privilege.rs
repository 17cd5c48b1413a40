//! Privilege checks.

/// Whether the process runs with an effective uid of 0.
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

/// The non-root user who invoked the tool through sudo, if any.
pub fn invoking_user() -> Option<String> {
    invoking_user_from(std::env::var("SUDO_USER").ok())
}

fn invoking_user_from(sudo_user: Option<String>) -> Option<String> {
    sudo_user
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty() && u != "root")
}
