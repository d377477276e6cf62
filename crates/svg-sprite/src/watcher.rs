//! File watching for incremental rebuilds.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use svg_sprite_plugin::is_svg_path;
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// SVG file was created or modified
    Changed(PathBuf),

    /// SVG file was deleted
    Removed(PathBuf),
}

/// Watches a directory tree for SVG changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for `root`.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(root: &Path) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(std::io::Error::other)?;

        std::thread::spawn(move || {
            // Editors often emit several events per save; drop repeats of the
            // same event within the debounce window
            let debounce = Duration::from_millis(50);
            let mut last: Option<(WatchEvent, std::time::Instant)> = None;

            while let Ok(event) = sync_rx.recv() {
                for path in event.paths {
                    let Some(watch_event) = classify_event(&path, &event.kind) else {
                        continue;
                    };

                    let now = std::time::Instant::now();
                    if let Some((prev, at)) = &last {
                        if *prev == watch_event && now.duration_since(*at) < debounce {
                            continue;
                        }
                    }
                    last = Some((watch_event.clone(), now));

                    if async_tx.blocking_send(watch_event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    if !is_svg_path(path) {
        return None;
    }

    match kind {
        EventKind::Create(_) | EventKind::Modify(_) => {
            if path.exists() {
                Some(WatchEvent::Changed(path.to_path_buf()))
            } else {
                // Renamed away
                Some(WatchEvent::Removed(path.to_path_buf()))
            }
        }
        EventKind::Remove(_) => Some(WatchEvent::Removed(path.to_path_buf())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, RemoveKind};
    use notify::EventKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn ignores_non_svg_files() {
        let kind = EventKind::Create(CreateKind::File);
        assert_eq!(classify_event(Path::new("/tmp/notes.txt"), &kind), None);
    }

    #[test]
    fn classifies_removals() {
        let kind = EventKind::Remove(RemoveKind::File);
        assert_eq!(
            classify_event(Path::new("/tmp/home.svg"), &kind),
            Some(WatchEvent::Removed(PathBuf::from("/tmp/home.svg")))
        );
    }

    #[tokio::test]
    async fn watches_svg_changes() {
        let temp = tempdir().unwrap();
        let icon = temp.path().join("home.svg");

        let (watcher, mut rx) = FileWatcher::new(temp.path()).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&icon, "<svg/>").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        assert!(matches!(event.unwrap(), Some(WatchEvent::Changed(path)) if path.ends_with("home.svg")));
    }
}
