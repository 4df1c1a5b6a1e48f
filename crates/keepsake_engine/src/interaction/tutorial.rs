//! How-to-interact hint over the gallery
//!
//! Fades in shortly after the gallery is built. It hides on a timer, or on
//! the first pointer press or wheel turn once input is accepted. Hidden
//! that way it never returns; leaving the gallery early only hides it.

use crate::core::config::InteractionConfig;
use crate::events::{PresentationEvent, Scheduler, TimerHandle};
use crate::stage::Stage;

/// Tutorial hint state, kept for the whole session
#[derive(Debug, Default)]
pub struct Tutorial {
    timers: Vec<TimerHandle>,
    visible: bool,
    accepts_input: bool,
    dismissed: bool,
}

impl Tutorial {
    /// Hint that has not been shown yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the hint is on screen
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the hint was seen through to its dismissal
    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Schedule the hint for a freshly built gallery
    pub fn start(&mut self, config: &InteractionConfig, scheduler: &mut Scheduler<PresentationEvent>) {
        if self.dismissed || !self.timers.is_empty() {
            return;
        }
        self.timers = vec![
            scheduler.post_after(config.tutorial_show_delay, PresentationEvent::ShowTutorial),
            scheduler.post_after(config.tutorial_input_delay, PresentationEvent::AcceptTutorialInput),
            scheduler.post_after(config.tutorial_auto_dismiss, PresentationEvent::DismissTutorial),
        ];
    }

    /// Handle one of the hint's timers; false for any other event
    pub fn handle_timer(
        &mut self,
        event: PresentationEvent,
        scheduler: &mut Scheduler<PresentationEvent>,
        stage: &mut dyn Stage,
    ) -> bool {
        match event {
            PresentationEvent::ShowTutorial => {
                if !self.dismissed && !self.visible {
                    self.visible = true;
                    stage.show_tutorial();
                }
            }
            PresentationEvent::AcceptTutorialInput => self.accepts_input = true,
            PresentationEvent::DismissTutorial => self.dismiss(scheduler, stage),
            _ => return false,
        }
        true
    }

    /// Pointer press or wheel turn inside the gallery
    pub fn user_input(&mut self, scheduler: &mut Scheduler<PresentationEvent>, stage: &mut dyn Stage) {
        if self.accepts_input && !self.dismissed {
            self.dismiss(scheduler, stage);
        }
    }

    /// Drop pending timers and hide the hint without marking it seen
    pub fn cancel(&mut self, scheduler: &mut Scheduler<PresentationEvent>, stage: &mut dyn Stage) {
        for timer in self.timers.drain(..) {
            scheduler.cancel(timer);
        }
        if self.visible {
            self.visible = false;
            stage.dismiss_tutorial();
        }
        self.accepts_input = false;
    }

    fn dismiss(&mut self, scheduler: &mut Scheduler<PresentationEvent>, stage: &mut dyn Stage) {
        self.cancel(scheduler, stage);
        self.dismissed = true;
        log::debug!("Gallery tutorial dismissed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct HintStage {
        shown: usize,
        hidden: usize,
    }

    impl Stage for HintStage {
        fn show_tutorial(&mut self) {
            self.shown += 1;
        }

        fn dismiss_tutorial(&mut self) {
            self.hidden += 1;
        }
    }

    fn advance(
        tutorial: &mut Tutorial,
        scheduler: &mut Scheduler<PresentationEvent>,
        stage: &mut HintStage,
        time: f64,
    ) {
        for event in scheduler.advance_to(time) {
            assert!(tutorial.handle_timer(event, scheduler, stage));
        }
    }

    #[test]
    fn test_hint_shows_then_hides_on_its_own() {
        let (mut tutorial, mut scheduler, mut stage) = (Tutorial::new(), Scheduler::new(), HintStage::default());
        tutorial.start(&InteractionConfig::default(), &mut scheduler);
        assert_eq!(scheduler.pending_count(), 3);

        advance(&mut tutorial, &mut scheduler, &mut stage, 0.9);
        assert_eq!(stage.shown, 0);
        advance(&mut tutorial, &mut scheduler, &mut stage, 1.0);
        assert!(tutorial.is_visible());
        assert_eq!(stage.shown, 1);

        advance(&mut tutorial, &mut scheduler, &mut stage, 5.0);
        assert!(!tutorial.is_visible());
        assert!(tutorial.is_dismissed());
        assert_eq!(stage.hidden, 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_early_input_is_ignored_then_later_input_dismisses() {
        let (mut tutorial, mut scheduler, mut stage) = (Tutorial::new(), Scheduler::new(), HintStage::default());
        tutorial.start(&InteractionConfig::default(), &mut scheduler);

        advance(&mut tutorial, &mut scheduler, &mut stage, 2.0);
        tutorial.user_input(&mut scheduler, &mut stage);
        assert!(tutorial.is_visible());

        advance(&mut tutorial, &mut scheduler, &mut stage, 3.5);
        tutorial.user_input(&mut scheduler, &mut stage);
        assert!(tutorial.is_dismissed());
        assert_eq!(stage.hidden, 1);
        assert_eq!(scheduler.pending_count(), 0);

        tutorial.user_input(&mut scheduler, &mut stage);
        advance(&mut tutorial, &mut scheduler, &mut stage, 10.0);
        assert_eq!(stage.hidden, 1);
    }

    #[test]
    fn test_cancel_hides_without_marking_seen() {
        let (mut tutorial, mut scheduler, mut stage) = (Tutorial::new(), Scheduler::new(), HintStage::default());
        let config = InteractionConfig::default();
        tutorial.start(&config, &mut scheduler);
        advance(&mut tutorial, &mut scheduler, &mut stage, 1.5);

        tutorial.cancel(&mut scheduler, &mut stage);
        assert_eq!(stage.hidden, 1);
        assert!(!tutorial.is_dismissed());
        assert_eq!(scheduler.pending_count(), 0);

        tutorial.start(&config, &mut scheduler);
        advance(&mut tutorial, &mut scheduler, &mut stage, 3.0);
        assert_eq!(stage.shown, 2);
    }

    #[test]
    fn test_dismissed_hint_never_restarts() {
        let (mut tutorial, mut scheduler, mut stage) = (Tutorial::new(), Scheduler::new(), HintStage::default());
        let config = InteractionConfig::default();
        tutorial.start(&config, &mut scheduler);
        advance(&mut tutorial, &mut scheduler, &mut stage, 6.0);
        assert!(tutorial.is_dismissed());

        tutorial.start(&config, &mut scheduler);
        assert_eq!(scheduler.pending_count(), 0);
    }
}
