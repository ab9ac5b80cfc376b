//! Per-region loading indicators
//!
//! A call that names a target region shows that region's indicator when it
//! starts and hides it when it ends. [`LoadingGuard`] ties the hide to scope
//! exit, so success, failure and a dropped future all release the region.

use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::{Print, Stylize},
    terminal::{Clear, ClearType},
};
use std::collections::BTreeSet;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

/// Something that can show and hide a loading state for a named region
pub trait LoadingIndicator: Send + Sync {
    fn show(&self, target_id: &str);
    fn hide(&self, target_id: &str);
}

/// Indicator that does nothing, for headless use
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndicator;

impl LoadingIndicator for NoopIndicator {
    fn show(&self, _target_id: &str) {}
    fn hide(&self, _target_id: &str) {}
}

/// Shows the indicator on creation and hides it on drop
pub struct LoadingGuard {
    indicator: Arc<dyn LoadingIndicator>,
    target_id: Option<String>,
}

impl LoadingGuard {
    /// Starts loading for `target_id`; a `None` target is a no-op guard
    pub fn acquire(indicator: Arc<dyn LoadingIndicator>, target_id: Option<&str>) -> Self {
        if let Some(id) = target_id {
            indicator.show(id);
        }
        Self {
            indicator,
            target_id: target_id.map(str::to_string),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if let Some(ref id) = self.target_id {
            self.indicator.hide(id);
        }
    }
}

/// Single status line on stderr listing the regions still loading
///
/// Regions are reference counted so overlapping calls for one region keep it
/// listed until the last one finishes. Drawing is skipped when stderr is not a
/// terminal, but the bookkeeping still runs.
#[derive(Debug, Default)]
pub struct TerminalIndicator {
    active: Mutex<Vec<String>>,
}

impl TerminalIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regions currently shown as loading, sorted and deduplicated
    pub fn active_regions(&self) -> Vec<String> {
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn redraw(&self) {
        let mut stderr = io::stderr();
        if !stderr.is_terminal() {
            return;
        }
        let regions = self.active_regions();
        let _ = queue!(stderr, MoveToColumn(0), Clear(ClearType::CurrentLine));
        if !regions.is_empty() {
            let _ = queue!(
                stderr,
                Print("⟳ ".cyan()),
                Print(format!("Loading {}...", regions.join(", ")).dim())
            );
        }
        let _ = stderr.flush();
    }
}

impl LoadingIndicator for TerminalIndicator {
    fn show(&self, target_id: &str) {
        {
            let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
            active.push(target_id.to_string());
        }
        self.redraw();
    }

    fn hide(&self, target_id: &str) {
        {
            let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(pos) = active.iter().position(|id| id == target_id) {
                active.remove(pos);
            }
        }
        self.redraw();
    }
}
