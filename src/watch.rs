use std::{path::Path, sync::mpsc::Receiver, time::Duration};

use notify::{DebouncedEvent, RecursiveMode, Watcher};

use crate::{error::Error, shader::ShaderStage};

const DEBOUNCE: Duration = Duration::from_millis(200);

/// Calls `rebuild` every time a shader source in `directory` changes. Blocks until the watcher
/// shuts down.
pub fn watch_shader_changes(directory: &Path, mut rebuild: impl FnMut()) -> Result<(), Error> {
    let watch_error = |source| Error::Watch {
        path: directory.to_path_buf(),
        source,
    };

    let (sender, receiver) = std::sync::mpsc::channel();
    let mut watcher = notify::PollWatcher::new(sender, DEBOUNCE).map_err(watch_error)?;
    watcher
        .watch(directory, RecursiveMode::NonRecursive)
        .map_err(watch_error)?;

    info!("watching {} for changes", directory.display());
    rebuild_on_changes(&receiver, rebuild);
    info!("stopped watching {}", directory.display());
    Ok(())
}

/// Runs `rebuild` for every burst of shader source events until the channel closes.
///
/// Events already queued when a burst starts are folded into one rebuild. Events that arrive
/// while `rebuild` runs are handled afterwards, so an edit saved mid-pass gets its own pass.
fn rebuild_on_changes(receiver: &Receiver<DebouncedEvent>, mut rebuild: impl FnMut()) {
    while let Ok(event) = receiver.recv() {
        if let DebouncedEvent::Error(error, path) = &event {
            warn!(?path, "watcher error: {error}");
            continue;
        }

        if !touches_shader_source(&event) {
            continue;
        }

        debug!(?event, "shader source changed");

        // fold the rest of this burst into the same rebuild
        while receiver.try_recv().is_ok() {}

        rebuild();
    }
}

/// Compiled outputs and unrelated files don't trigger a rebuild.
fn touches_shader_source(event: &DebouncedEvent) -> bool {
    let is_source = |path: &Path| ShaderStage::from_path(path).is_some();
    match event {
        DebouncedEvent::Create(path)
        | DebouncedEvent::Write(path)
        | DebouncedEvent::Chmod(path)
        | DebouncedEvent::Remove(path) => is_source(path),
        DebouncedEvent::Rename(from, to) => is_source(from) || is_source(to),
        DebouncedEvent::NoticeWrite(_)
        | DebouncedEvent::NoticeRemove(_)
        | DebouncedEvent::Rescan
        | DebouncedEvent::Error(_, _) => false,
    }
}
