//! File-watcher observer factory (spec §9 design notes, §4.9): the core
//! only requires a callback `on_change(relative_path, kind)`, with the
//! observer implementation selected by a mode tag. Anything beyond that
//! contract — hot reload, multi-handler dispatch, MCP notification
//! fan-out — is the tool layer's job and stays out of scope here.

mod debouncer;
mod error;

pub use debouncer::Debouncer;
pub use error::WatchError;

use notify::{Event, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;

/// The kind of filesystem change reported to `on_change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// An observer mode tag (spec §9): "implementations must provide an
/// observer factory taking a mode tag... invalid or unknown tags fall
/// back to auto."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverMode {
    Auto,
    Polling,
    PlatformNative,
    PlatformSpecific(&'static str),
}

impl ObserverMode {
    /// Parse a mode tag, falling back to `Auto` for anything unrecognized.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "polling" => ObserverMode::Polling,
            "platform-native" => ObserverMode::PlatformNative,
            "auto" => ObserverMode::Auto,
            _ => ObserverMode::Auto,
        }
    }
}

/// A running watcher. Dropping it stops the watch.
pub enum BuiltWatcher {
    Recommended(RecommendedWatcher),
    Poll(PollWatcher),
}

/// Build a watcher for `root` using the observer selected by `mode`,
/// invoking `on_change` for every filesystem event. `Auto` and
/// `PlatformNative` use `notify`'s recommended (platform-native) watcher;
/// `Polling` and any unrecognized `PlatformSpecific` tag use
/// `notify::PollWatcher`.
pub fn build_watcher<F>(mode: ObserverMode, root: &Path, mut on_change: F) -> Result<BuiltWatcher, WatchError>
where
    F: FnMut(&Path, ChangeKind) + Send + 'static,
{
    let handler = move |res: notify::Result<Event>| {
        let Ok(event) = res else { return };
        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Modify(_) => ChangeKind::Modified,
            EventKind::Remove(_) => ChangeKind::Deleted,
            _ => return,
        };
        for path in &event.paths {
            on_change(path, kind);
        }
    };

    let watcher = match mode {
        ObserverMode::Auto | ObserverMode::PlatformNative => {
            let mut watcher = RecommendedWatcher::new(handler, notify::Config::default())?;
            watcher.watch(root, RecursiveMode::Recursive)?;
            BuiltWatcher::Recommended(watcher)
        }
        ObserverMode::Polling | ObserverMode::PlatformSpecific(_) => {
            let config = notify::Config::default().with_poll_interval(std::time::Duration::from_secs(1));
            let mut watcher = PollWatcher::new(handler, config)?;
            watcher.watch(root, RecursiveMode::Recursive)?;
            BuiltWatcher::Poll(watcher)
        }
    };

    Ok(watcher)
}
