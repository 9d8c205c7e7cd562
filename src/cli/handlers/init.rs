use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io;
use crate::io::sync::{Git, VersionControl};

use super::initial_files;

/// Create `path` empty if it does not exist. Existing content is kept.
fn touch(path: &Path) -> std::io::Result<()> {
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

pub fn cmd_init(
    args: &InitArgs,
    dir: &Path,
    config_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)
        .map_err(|e| format!("could not create {}: {}", dir.display(), e))?;

    let rendered = config_io::render_config(args.git)?;
    if !config_io::write_new_config(config_path, &rendered)? {
        println!("Keeping existing config {}", config_path.display());
        if args.git {
            config_io::enable_sync_in_file(config_path)?;
        }
    }

    // File names may have been customised in an existing config
    let config = config_io::load_config(config_path)?;
    let files = initial_files(dir, &config, config_path.to_path_buf());
    for path in &files[..2] {
        touch(path).map_err(|e| format!("could not create {}: {}", path.display(), e))?;
    }
    println!("Initialized todo directory {}", dir.display());

    if args.git {
        let git = Git::new(dir);
        git.init()?;
        match git.commit(&files, "TODO: initial commit") {
            Ok(_) => println!("Initialized git repository in {}", dir.display()),
            Err(e) => tracing::warn!(error = %e, "could not make the initial commit"),
        }
    }

    Ok(())
}
