use vcsrun::types::{split_arguments, Invocation};

/// An invocation of `sh -c <script>`.
///
/// The script is quoted so it survives the runner's shell-word splitting
/// as a single argument.
pub fn sh(script: &str) -> Invocation {
    let quoted = shlex_quote(script);
    debug_assert_eq!(
        split_arguments(&format!("-c {quoted}")).ok(),
        Some(vec!["-c".to_string(), script.to_string()])
    );
    Invocation::new("sh", format!("-c {quoted}"))
}

/// The argument string for the interactive runner when its tool is `sh`.
pub fn sh_arguments(script: &str) -> String {
    format!("-c {}", shlex_quote(script))
}

fn shlex_quote(s: &str) -> String {
    // Test scripts never contain NUL, the only input `try_quote` rejects.
    shlex::try_quote(s)
        .expect("test script contains a NUL byte")
        .into_owned()
}

/// Whether a process with this pid still exists (`kill -0`).
pub fn pid_is_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
