mod common;
use common::reqpad_cmd;

fn help_output(args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
    let output = reqpad_cmd().args(args).output()?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if !output.status.success() {
        return Err(format!(
            "Command failed for args {args:?}. stderr: {}, stdout: {stdout}",
            String::from_utf8_lossy(&output.stderr)
        )
        .into());
    }
    Ok(stdout)
}

#[test]
fn test_help_root() -> Result<(), Box<dyn std::error::Error>> {
    for args in [&["help"][..], &["--help"][..]] {
        let stdout = help_output(args)?;
        for expected in ["Usage: reqpad", "env", "auth", "request", "--debug"] {
            if !stdout.contains(expected) {
                return Err(format!("Help for {args:?} missing '{expected}':\n{stdout}").into());
            }
        }
    }
    Ok(())
}

#[test]
fn test_request_run_help() -> Result<(), Box<dyn std::error::Error>> {
    let stdout = help_output(&["request", "run", "--help"])?;
    for expected in ["--source", "--name", "--all", "--env", "--variable", "--output"] {
        if !stdout.contains(expected) {
            return Err(format!("Help missing '{expected}':\n{stdout}").into());
        }
    }
    Ok(())
}

#[test]
fn test_env_help() -> Result<(), Box<dyn std::error::Error>> {
    let stdout = help_output(&["env", "--help"])?;
    if !stdout.contains("list") || !stdout.contains("vars") {
        return Err(format!("Unexpected env help:\n{stdout}").into());
    }
    Ok(())
}

#[test]
fn test_version() -> Result<(), Box<dyn std::error::Error>> {
    let stdout = help_output(&["--version"])?;
    if !stdout.contains(env!("CARGO_PKG_VERSION")) {
        return Err(format!("Unexpected version output: {stdout}").into());
    }
    Ok(())
}

#[test]
fn test_no_args_without_collection_prints_help() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join(format!("reqpad_no_collection_{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let output = reqpad_cmd().current_dir(&dir).output()?;
    let _ = std::fs::remove_dir_all(&dir);

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() || !stdout.contains("Usage: reqpad") {
        return Err(format!("Expected help output, got: {stdout}").into());
    }
    Ok(())
}

#[test]
fn test_subcommand_usage_error_is_not_run_as_default() -> Result<(), Box<dyn std::error::Error>> {
    let output = reqpad_cmd()
        .args(["-d", "request", "list", "--bogus"])
        .output()?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if output.status.success() || !stderr.contains("--bogus") {
        return Err(format!("Expected a usage error naming '--bogus', got: {stderr}").into());
    }
    if !stderr.contains("request list") {
        return Err(format!("Usage error should come from 'request list': {stderr}").into());
    }
    Ok(())
}
