use std::{fs, process::Command};

fn main() {
  println!("cargo:rerun-if-changed=.git/HEAD");

  let branch = git(&["rev-parse", "--abbrev-ref", "HEAD"]).or_else(branch_from_head);
  let commit = git(&["rev-parse", "HEAD"]);

  println!(
    "cargo:rustc-env=GIT_BRANCH={}",
    branch.unwrap_or_else(|| "unknown".to_string())
  );
  println!(
    "cargo:rustc-env=GIT_COMMIT={}",
    commit.unwrap_or_else(|| "unknown".to_string())
  );
}

fn git(args: &[&str]) -> Option<String> {
  let output = Command::new("git").args(args).output().ok()?;
  if !output.status.success() {
    return None;
  }
  let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
  (!value.is_empty()).then_some(value)
}

// Fallback when the git binary is unavailable
fn branch_from_head() -> Option<String> {
  let head = fs::read_to_string(".git/HEAD").ok()?;
  head
    .strip_prefix("ref: ")
    .and_then(|r| r.trim().rsplit('/').next())
    .map(str::to_string)
}
