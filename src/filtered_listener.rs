use crate::eventbus::{ActivityListener, PadActivity};

/// Wraps a listener and forwards only activity matching a user-supplied predicate.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&PadActivity) -> bool + Send + Sync>,
    inner: Box<dyn ActivityListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&PadActivity) -> bool + Send + Sync + 'static,
        inner: impl ActivityListener + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner: Box::new(inner),
        }
    }
}

impl ActivityListener for FilteredListener {
    fn on_activity(&mut self, activity: &PadActivity) {
        if (self.predicate)(activity) {
            self.inner.on_activity(activity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::GamePadAction;
    use crate::port::PadKind;
    use std::sync::{Arc, Mutex};

    #[test]
    fn forwards_matching_activity_only() {
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        let mut l = FilteredListener::new(
            |a: &PadActivity| a.actions.contains(&GamePadAction::PressFire),
            move |_: &PadActivity| *sink.lock().unwrap() += 1,
        );
        let mut a = PadActivity {
            slot: 3,
            kind: PadKind::Joystick,
            port: None,
            actions: vec![GamePadAction::PullUp],
        };
        l.on_activity(&a);
        a.actions.push(GamePadAction::PressFire);
        l.on_activity(&a);
        assert_eq!(*count.lock().unwrap(), 1);
    }
}
