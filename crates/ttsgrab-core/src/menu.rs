//! Context-menu toggle entry: keeps its title in step with the enabled flag.

use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub fn menu_title(enabled: bool) -> &'static str {
    if enabled {
        "TTS Interceptor: Enabled ✓"
    } else {
        "TTS Interceptor: Disabled ✗"
    }
}

/// Current title of the toggle entry. Cheap to clone.
#[derive(Clone)]
pub struct ContextMenu {
    title: Arc<RwLock<&'static str>>,
}

impl ContextMenu {
    /// Follows `enabled` until its sender is dropped.
    pub fn spawn(mut enabled: watch::Receiver<bool>) -> (Self, JoinHandle<()>) {
        let title = Arc::new(RwLock::new(menu_title(*enabled.borrow_and_update())));
        let menu = Self {
            title: Arc::clone(&title),
        };
        let handle = tokio::spawn(async move {
            while enabled.changed().await.is_ok() {
                let next = menu_title(*enabled.borrow_and_update());
                match title.write() {
                    Ok(mut t) => *t = next,
                    Err(poisoned) => *poisoned.into_inner() = next,
                }
                tracing::info!("menu title: {}", next);
            }
        });
        (menu, handle)
    }

    pub fn title(&self) -> &'static str {
        match self.title.read() {
            Ok(t) => *t,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EnabledState;
    use crate::store::open_memory;
    use std::time::Duration;

    #[test]
    fn titles() {
        assert_eq!(menu_title(true), "TTS Interceptor: Enabled ✓");
        assert_eq!(menu_title(false), "TTS Interceptor: Disabled ✗");
    }

    #[tokio::test]
    async fn title_follows_state() {
        let store = open_memory().await.unwrap();
        let state = EnabledState::load(store, false).await;
        let (menu, _h) = ContextMenu::spawn(state.subscribe());
        assert_eq!(menu.title(), menu_title(false));

        state.toggle().await.unwrap();
        for _ in 0..50 {
            if menu.title() == menu_title(true) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(menu.title(), menu_title(true));
    }
}
