//! Merge phase: scene conditionals and story events.

use world_rules::{PendingStoryEvent, RuleKey, StoryEventSource};

use super::DeltaWorker;

impl<'a> DeltaWorker<'a> {
    /// Merge the `then` payload of every matching conditional of the active
    /// scene into the working delta, in declaration order.
    ///
    /// A conditional is marked fired as soon as its payload merges and never
    /// merges again. A `then.prompt` is not merged; it becomes a pending story
    /// event whose delivery is tracked on its own. Returns the ids that merged.
    pub fn apply_conditional_overrides(&mut self) -> Vec<String> {
        let scenario = self.scenario;
        let scene_id = self.state.scene_id.clone();
        let Some(scene) = scenario.scene(&scene_id) else {
            tracing::warn!(
                scene = %scene_id,
                "active scene not in scenario, skipping conditionals"
            );
            return Vec::new();
        };

        let mut fired = Vec::new();
        for conditional in &scene.conditionals {
            if conditional.id.is_empty() {
                tracing::warn!(scene = %scene_id, "conditional without an id ignored");
                continue;
            }
            if self.state.has_fired(&scene_id, &conditional.id)
                || !conditional.when.matches(&*self.state)
            {
                continue;
            }

            self.delta.merge_conditional(&conditional.then);
            self.state.mark_fired(&scene_id, &conditional.id);

            if let Some(text) = conditional.then.story_prompt() {
                self.pending.push(PendingStoryEvent::new(
                    RuleKey::new(scene_id.as_str(), conditional.id.as_str()),
                    text,
                    StoryEventSource::Conditional,
                ));
            }

            tracing::info!(scene = %scene_id, conditional = %conditional.id, "conditional fired");
            fired.push(conditional.id.clone());
        }
        fired
    }

    /// Hand every fired, undelivered story event to the sink.
    ///
    /// Delivery order: the session's backlog from earlier turns, prompts of
    /// conditionals fired this turn, then matching story events of the active
    /// scene. A scene story event is marked fired when it first matches. An
    /// event is marked delivered when the sink accepts it; a refused event is
    /// logged and goes back to the backlog. Returns the delivered ids.
    pub fn queue_story_events(&mut self) -> Vec<String> {
        let scenario = self.scenario;
        let scene_id = self.state.scene_id.clone();

        let mut outbox = std::mem::take(&mut self.state.story_backlog);
        outbox.append(&mut self.pending);

        if let Some(scene) = scenario.scene(&scene_id) {
            for event in &scene.story_events {
                if event.id.is_empty() {
                    tracing::warn!(scene = %scene_id, "story event without an id ignored");
                    continue;
                }
                if self.state.has_fired(&scene_id, &event.id) {
                    continue;
                }
                let text = event.prompt.trim();
                if text.is_empty() || !event.when.matches(&*self.state) {
                    continue;
                }
                self.state.mark_fired(&scene_id, &event.id);
                outbox.push(PendingStoryEvent::new(
                    RuleKey::new(scene_id.as_str(), event.id.as_str()),
                    text,
                    StoryEventSource::SceneEvent,
                ));
            }
        }

        let mut queued = Vec::new();
        for event in outbox {
            if self.state.delivered.contains(&event.key) {
                continue;
            }
            match self.sink.enqueue(self.state.session_id, &event.text) {
                Ok(()) => {
                    tracing::info!(
                        session = %self.state.session_id,
                        scene = %event.key.scene,
                        event = %event.key.id,
                        source = ?event.source,
                        "story event queued"
                    );
                    self.state.mark_delivered(event.key.clone());
                    queued.push(event.key.id);
                }
                Err(err) => {
                    tracing::error!(
                        session = %self.state.session_id,
                        scene = %event.key.scene,
                        event = %event.key.id,
                        error = %err,
                        "failed to queue story event, keeping it for a later turn"
                    );
                    if !self.state.is_backlogged(&event.key) {
                        self.state.story_backlog.push(event);
                    }
                }
            }
        }
        queued
    }
}
