use crate::config::NOTIFICATION_TTL_MS;
use gloo_timers::callback::Timeout;
use yew::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient message shown after an action succeeds or fails.
#[derive(Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notification {
            title: title.into(),
            description: description.into(),
            kind: NotificationKind::Success,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notification {
            title: title.into(),
            description: description.into(),
            kind: NotificationKind::Error,
        }
    }
}

/// Holds the visible notification and the callbacks that change it.
#[derive(Clone)]
pub struct NotificationHandle {
    pub current: Option<Notification>,
    /// Show a notification, replacing any visible one.
    pub show: Callback<Notification>,
    pub dismiss: Callback<()>,
}

/// Custom hook for a single auto-dismissing notification slot.
#[hook]
pub fn use_notification() -> NotificationHandle {
    let current = use_state(|| None::<Notification>);
    // Replacing the handle drops the previous timer, which cancels it.
    let timer = use_mut_ref(|| None::<Timeout>);

    let show = {
        let current = current.clone();
        let timer = timer.clone();
        Callback::from(move |notification: Notification| {
            current.set(Some(notification));
            let clear = current.clone();
            *timer.borrow_mut() = Some(Timeout::new(NOTIFICATION_TTL_MS, move || {
                clear.set(None);
            }));
        })
    };

    let dismiss = {
        let current = current.clone();
        let timer = timer.clone();
        Callback::from(move |_| {
            timer.borrow_mut().take();
            current.set(None);
        })
    };

    NotificationHandle {
        current: (*current).clone(),
        show,
        dismiss,
    }
}
