// quick/src/cli/status.rs
//! Renders lifecycle events from the core as terminal output.
use colored::Colorize;
use quick_core::LifecycleEvent;

/// Event handler printing progress the way each verbosity level expects.
pub fn printer(verbose: u8, quiet: bool) -> impl FnMut(&LifecycleEvent) + 'static {
    move |event| {
        if quiet {
            return;
        }
        match event {
            LifecycleEvent::SyncFetching {
                position,
                total,
                filename,
            } => println!("[{position}/{total}] Fetching {filename}"),
            LifecycleEvent::InstallStarted {
                name,
                version,
                upgrade,
            } => {
                if *upgrade {
                    println!("Upgrading {} to {}", name.bold(), version);
                } else {
                    println!("Installing {} {}", name.bold(), version);
                }
            }
            LifecycleEvent::InstallFinished { name, upgrade } => {
                let action = if *upgrade { "upgraded" } else { "installed" };
                println!(" {}", format!("{name} is {action}.").green());
            }
            LifecycleEvent::AlreadyLatest { name, .. } => {
                println!("{name} is the latest version.")
            }
            LifecycleEvent::DownloadFailed { url, error, .. } => {
                println!(" {} {}: {}", "✖".red(), url, error)
            }
            LifecycleEvent::RemoveStarted { name } => println!("Removing {}", name.bold()),
            LifecycleEvent::RemoveFinished {
                name,
                file_count,
                size_bytes,
            } => println!(
                " {} ({} files, {})",
                format!("{name} is removed.").green(),
                file_count,
                format_size(*size_bytes)
            ),
            LifecycleEvent::DownloadStarted { url, .. } if verbose > 0 => {
                println!(" Fetching {url}")
            }
            LifecycleEvent::Extracting {
                archive, target, ..
            } if verbose > 0 => println!(
                " Uncompressing {} to {}",
                archive.display(),
                target.display()
            ),
            LifecycleEvent::LinkCreated { link, source } if verbose > 0 => println!(
                " Creating a symbolic link {} -> {}",
                link.display(),
                source.display()
            ),
            LifecycleEvent::DesktopEntryWritten { path } if verbose > 0 => {
                println!(" Creating a desktop file {}", path.display())
            }
            _ => {}
        }
    }
}

pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if size >= GB {
        format!("{:.1}GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.1}MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.1}KB", size as f64 / KB as f64)
    } else {
        format!("{size}B")
    }
}
