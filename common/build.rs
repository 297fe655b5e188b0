// Stamps the build with the short commit hash, exposed as BUILD_VERSION.

use std::process::Command;

fn main() {
    let commit_hash = match option_env!("STAKEMINT_COMMIT_HASH") {
        Some(hash) => hash.chars().take(7).collect(),
        None => match Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
        {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            // not a git checkout
            _ => "unknown".to_string(),
        },
    };

    let build_version = format!("{}-{}", env!("CARGO_PKG_VERSION"), commit_hash);
    println!("cargo:rerun-if-env-changed=STAKEMINT_COMMIT_HASH");
    println!("cargo:rustc-env=BUILD_VERSION={build_version}");
}
