//! Import run state machine
//!
//! One [`ImportRun`] tracks the lifecycle of a single import attempt. All
//! status transitions are driven by pushed events; the run never polls. Each
//! analysis or import attempt bumps a generation counter so completion events
//! from a superseded attempt are detectably stale and ignored.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{ImportPayload, LogEntry, PushEvent, RunSummary};
use crate::actions::{ActionItem, normalize};

/// Lifecycle states of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    #[default]
    Idle,
    Uploading,
    Analyzing,
    Analyzed,
    Importing,
    Completed,
    CompletedWithErrors,
    Error,
}

impl ImportStatus {
    /// Parse a wire status string; unknown strings are ignored by callers.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "idle" => Some(Self::Idle),
            "uploading" => Some(Self::Uploading),
            "analyzing" => Some(Self::Analyzing),
            "analyzed" => Some(Self::Analyzed),
            "importing" => Some(Self::Importing),
            "completed" => Some(Self::Completed),
            "completed_with_errors" => Some(Self::CompletedWithErrors),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Uploading => "uploading",
            Self::Analyzing => "analyzing",
            Self::Analyzed => "analyzed",
            Self::Importing => "importing",
            Self::Completed => "completed",
            Self::CompletedWithErrors => "completed_with_errors",
            Self::Error => "error",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Uploading => "Uploading",
            Self::Analyzing => "Analyzing",
            Self::Analyzed => "Analysis complete",
            Self::Importing => "Importing",
            Self::Completed => "Completed",
            Self::CompletedWithErrors => "Completed with errors",
            Self::Error => "Error",
        }
    }

    /// Statuses that end a phase. These must never be swallowed by the
    /// progress rate limiter.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Analyzed | Self::Completed | Self::CompletedWithErrors | Self::Error
        )
    }

    /// Statuses that end the whole run.
    pub fn is_run_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::CompletedWithErrors | Self::Error)
    }
}

/// State of one import attempt: status, detected actions, selection, filter,
/// result, and logs. Owned by the session driving the run.
#[derive(Debug, Default)]
pub struct ImportRun {
    pub status: ImportStatus,
    pub progress_percent: f32,
    pub message: String,
    pub detected_actions: Vec<ActionItem>,
    /// Summary counts reported with the most recent analysis.
    pub analysis_summary: Option<RunSummary>,
    pub result: Option<ImportPayload>,
    pub logs: Vec<LogEntry>,
    /// Normalized action types excluded from execution by configuration.
    disabled_types: HashSet<String>,
    /// Transient view filter of normalized action types; empty means no filter.
    type_filter: HashSet<String>,
    generation: u64,
}

impl ImportRun {
    pub fn new<I, S>(disabled_action_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            disabled_types: disabled_action_types
                .into_iter()
                .map(|t| normalize(t.as_ref()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a fresh analysis attempt. Returns the generation events from this
    /// attempt must carry to be applied.
    pub fn begin_analysis(&mut self) -> u64 {
        self.generation += 1;
        self.result = None;
        self.analysis_summary = None;
        self.progress_percent = 0.0;
        self.message.clear();
        self.generation
    }

    /// Start an import attempt over the current analysis.
    pub fn begin_import(&mut self) -> u64 {
        self.generation += 1;
        self.result = None;
        self.progress_percent = 0.0;
        self.generation
    }

    /// Restart the wizard: back to the initial state, keeping only the
    /// configured disabled types. Pending events from prior attempts become
    /// stale.
    pub fn reset(&mut self) {
        let disabled = std::mem::take(&mut self.disabled_types);
        let generation = self.generation + 1;
        *self = Self {
            disabled_types: disabled,
            generation,
            ..Default::default()
        };
    }

    /// Apply one pushed event stamped with the generation of the attempt it
    /// belongs to. Returns false when the event was stale and ignored.
    pub fn apply_event(&mut self, generation: u64, event: &PushEvent) -> bool {
        if generation != self.generation {
            log::debug!(
                "ignoring stale event from generation {} (current {})",
                generation,
                self.generation
            );
            return false;
        }

        match event {
            PushEvent::Progress(progress) => {
                if let Some(status) = ImportStatus::from_wire(&progress.status) {
                    self.status = status;
                }
                self.progress_percent = progress.progress.clamp(0.0, 100.0);
                if !progress.message.is_empty() {
                    self.message = progress.message.clone();
                }
            }
            PushEvent::Log(entry) => self.logs.push(entry.clone()),
            PushEvent::AnalysisComplete(payload) => {
                self.status = ImportStatus::Analyzed;
                self.progress_percent = 100.0;
                self.analysis_summary = Some(payload.summary.clone());
                self.detected_actions = payload
                    .actions
                    .iter()
                    .map(|action| {
                        let selected = !self.disabled_types.contains(&action.action_type);
                        ActionItem::new(
                            &action.action_type,
                            action.object_name.clone(),
                            action.path.clone(),
                            action.message.clone(),
                            action.attributes.clone(),
                            selected,
                        )
                    })
                    .collect();
            }
            PushEvent::ImportComplete(payload) => {
                let errors = payload.summary.effective_error_count(&payload.details);
                self.status = if payload.success && errors == 0 {
                    ImportStatus::Completed
                } else {
                    ImportStatus::CompletedWithErrors
                };
                self.progress_percent = 100.0;
                self.result = Some(payload.clone());
            }
            PushEvent::Error { message } => {
                self.status = ImportStatus::Error;
                self.message = message.clone();
            }
        }

        true
    }

    /// Whether an action's type is excluded from execution by configuration.
    pub fn is_disabled(&self, item: &ActionItem) -> bool {
        self.disabled_types.contains(&item.action_type)
    }

    /// Replace the transient type filter. An empty set clears it.
    pub fn set_type_filter<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.type_filter = types.into_iter().map(|t| normalize(t.as_ref())).collect();
    }

    pub fn clear_type_filter(&mut self) {
        self.type_filter.clear();
    }

    fn is_visible(&self, item: &ActionItem) -> bool {
        self.type_filter.is_empty() || self.type_filter.contains(&item.action_type)
    }

    /// Actions matching the current filter. Filtering narrows visibility only;
    /// it never mutates selection.
    pub fn visible_actions(&self) -> Vec<&ActionItem> {
        self.detected_actions
            .iter()
            .filter(|item| self.is_visible(item))
            .collect()
    }

    /// Toggle one action's selection. No-op for configuration-disabled types.
    pub fn toggle_action(&mut self, id: Uuid) -> bool {
        let disabled = &self.disabled_types;
        match self
            .detected_actions
            .iter_mut()
            .find(|item| item.id == id && !disabled.contains(&item.action_type))
        {
            Some(item) => {
                item.selected = !item.selected;
                true
            }
            None => false,
        }
    }

    /// Select every enabled action; restricted to the visible subset while a
    /// filter is active.
    pub fn select_all(&mut self) {
        self.set_selection_on_scope(true);
    }

    /// Deselect every enabled action; restricted to the visible subset while a
    /// filter is active.
    pub fn deselect_all(&mut self) {
        self.set_selection_on_scope(false);
    }

    fn set_selection_on_scope(&mut self, selected: bool) {
        let filter = self.type_filter.clone();
        let disabled = self.disabled_types.clone();
        for item in &mut self.detected_actions {
            if disabled.contains(&item.action_type) {
                continue;
            }
            if filter.is_empty() || filter.contains(&item.action_type) {
                item.selected = selected;
            }
        }
    }

    pub fn selected_actions(&self) -> Vec<&ActionItem> {
        self.detected_actions
            .iter()
            .filter(|item| item.selected)
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.detected_actions.iter().filter(|i| i.selected).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::events::{
        ActionOutcome, AnalysisPayload, DetectedAction, ProgressEvent, RunSummary,
    };
    use serde_json::json;

    fn detected(action_type: &str, name: &str) -> DetectedAction {
        DetectedAction {
            action_type: normalize(action_type),
            object_name: name.to_string(),
            path: "OU=Students,DC=school,DC=org".to_string(),
            message: String::new(),
            attributes: json!({}),
        }
    }

    fn analyzed_run(disabled: &[&str], actions: Vec<DetectedAction>) -> ImportRun {
        let mut run = ImportRun::new(disabled.iter().copied());
        let generation = run.begin_analysis();
        let payload = AnalysisPayload {
            actions,
            ..Default::default()
        };
        assert!(run.apply_event(generation, &PushEvent::AnalysisComplete(payload)));
        run
    }

    fn progress(status: &str, pct: f32) -> PushEvent {
        PushEvent::Progress(ProgressEvent {
            status: status.to_string(),
            progress: pct,
            message: String::new(),
        })
    }

    #[test]
    fn test_status_transitions_follow_events() {
        let mut run = ImportRun::new(Vec::<String>::new());
        let generation = run.begin_analysis();

        run.apply_event(generation, &progress("uploading", 10.0));
        assert_eq!(run.status, ImportStatus::Uploading);

        run.apply_event(generation, &progress("analyzing", 50.0));
        assert_eq!(run.status, ImportStatus::Analyzing);
        assert_eq!(run.progress_percent, 50.0);

        run.apply_event(
            generation,
            &PushEvent::AnalysisComplete(AnalysisPayload::default()),
        );
        assert_eq!(run.status, ImportStatus::Analyzed);
        assert_eq!(run.progress_percent, 100.0);
    }

    #[test]
    fn test_unknown_wire_status_keeps_current_state() {
        let mut run = ImportRun::new(Vec::<String>::new());
        let generation = run.begin_analysis();
        run.apply_event(generation, &progress("analyzing", 30.0));
        run.apply_event(generation, &progress("reticulating", 60.0));
        assert_eq!(run.status, ImportStatus::Analyzing);
        assert_eq!(run.progress_percent, 60.0);
    }

    #[test]
    fn test_scenario_d_disabled_types_start_unselected() {
        let actions = vec![
            detected("CREATE_USER", "a"),
            detected("CREATE_USER", "b"),
            detected("CREATE_USER", "c"),
            detected("UPDATE_USER", "d"),
            detected("UPDATE_USER", "e"),
            detected("MOVE_USER", "f"),
            detected("MOVE_USER", "g"),
            detected("DELETE_USER", "h"),
            detected("DELETE_USER", "i"),
            detected("DELETE_USER", "j"),
        ];
        let run = analyzed_run(&["DELETE_USER"], actions);

        assert_eq!(run.detected_actions.len(), 10);
        assert_eq!(run.selected_count(), 7);
        let disabled: Vec<_> = run
            .detected_actions
            .iter()
            .filter(|i| run.is_disabled(i))
            .collect();
        assert_eq!(disabled.len(), 3);
        assert!(disabled.iter().all(|i| !i.selected));
    }

    #[test]
    fn test_disabled_actions_resist_all_toggles() {
        let mut run = analyzed_run(
            &["DELETE_USER"],
            vec![detected("CREATE_USER", "a"), detected("DELETE_USER", "b")],
        );
        let disabled_id = run
            .detected_actions
            .iter()
            .find(|i| i.is_type("DELETE_USER"))
            .unwrap()
            .id;

        assert!(!run.toggle_action(disabled_id));
        run.select_all();
        assert!(!run.detected_actions.iter().any(|i| i.is_type("DELETE_USER") && i.selected));

        // Under a filter that matches the disabled type, bulk select still
        // leaves it untouched.
        run.set_type_filter(["DELETE_USER"]);
        run.select_all();
        assert!(!run.detected_actions.iter().any(|i| i.is_type("DELETE_USER") && i.selected));
    }

    #[test]
    fn test_disabled_matching_spans_representations() {
        // Config spells the code "01", the wire sends "1"; both normalize to
        // the same identity.
        let run = analyzed_run(&["01"], vec![detected("1", "a"), detected("2", "b")]);
        assert_eq!(run.selected_count(), 1);
    }

    #[test]
    fn test_filter_narrows_bulk_ops_without_touching_selection() {
        let mut run = analyzed_run(
            &[],
            vec![
                detected("CREATE_USER", "a"),
                detected("UPDATE_USER", "b"),
                detected("UPDATE_USER", "c"),
            ],
        );

        run.set_type_filter(["UPDATE_USER"]);
        assert_eq!(run.visible_actions().len(), 2);

        run.deselect_all();
        // Only the visible subset changed.
        assert!(run.detected_actions.iter().find(|i| i.object_name == "a").unwrap().selected);
        assert_eq!(run.selected_count(), 1);

        run.clear_type_filter();
        run.deselect_all();
        assert_eq!(run.selected_count(), 0);
    }

    #[test]
    fn test_reanalysis_replaces_action_collection() {
        let mut run = analyzed_run(&[], vec![detected("CREATE_USER", "a")]);
        let old_ids: Vec<_> = run.detected_actions.iter().map(|i| i.id).collect();

        let generation = run.begin_analysis();
        let payload = AnalysisPayload {
            actions: vec![detected("UPDATE_USER", "b"), detected("UPDATE_USER", "c")],
            ..Default::default()
        };
        run.apply_event(generation, &PushEvent::AnalysisComplete(payload));

        assert_eq!(run.detected_actions.len(), 2);
        assert!(run.detected_actions.iter().all(|i| !old_ids.contains(&i.id)));
    }

    #[test]
    fn test_stale_generation_events_are_ignored() {
        let mut run = ImportRun::new(Vec::<String>::new());
        let first = run.begin_analysis();
        let second = run.begin_analysis();
        assert_ne!(first, second);

        // Late completion from the superseded attempt.
        let stale = PushEvent::AnalysisComplete(AnalysisPayload {
            actions: vec![detected("CREATE_USER", "stale")],
            ..Default::default()
        });
        assert!(!run.apply_event(first, &stale));
        assert!(run.detected_actions.is_empty());
        assert_eq!(run.status, ImportStatus::Idle);
    }

    #[test]
    fn test_scenario_e_failed_import_is_completed_with_errors() {
        let mut run = analyzed_run(&[], vec![detected("CREATE_USER", "a")]);
        let generation = run.begin_import();

        let payload = ImportPayload {
            success: false,
            summary: RunSummary {
                error_count: Some(1),
                success_count: Some(1),
                ..Default::default()
            },
            details: vec![
                ActionOutcome {
                    action_type: "CREATE_USER".to_string(),
                    object_name: "a".to_string(),
                    path: String::new(),
                    success: true,
                    message: String::new(),
                },
                ActionOutcome {
                    action_type: "CREATE_USER".to_string(),
                    object_name: "b".to_string(),
                    path: String::new(),
                    success: false,
                    message: "already exists".to_string(),
                },
            ],
        };
        run.apply_event(generation, &PushEvent::ImportComplete(payload));

        assert_eq!(run.status, ImportStatus::CompletedWithErrors);
        let result = run.result.as_ref().unwrap();
        assert!(!result.details.is_empty());
        assert_eq!(result.summary.success_count, Some(1));
    }

    #[test]
    fn test_clean_import_completes() {
        let mut run = analyzed_run(&[], vec![detected("CREATE_USER", "a")]);
        let generation = run.begin_import();
        let payload = ImportPayload {
            success: true,
            summary: RunSummary::default(),
            details: Vec::new(),
        };
        run.apply_event(generation, &PushEvent::ImportComplete(payload));
        assert_eq!(run.status, ImportStatus::Completed);
    }

    #[test]
    fn test_error_event_carries_message() {
        let mut run = ImportRun::new(Vec::<String>::new());
        let generation = run.begin_analysis();
        run.apply_event(
            generation,
            &PushEvent::Error {
                message: "connection lost".to_string(),
            },
        );
        assert_eq!(run.status, ImportStatus::Error);
        assert_eq!(run.message, "connection lost");
    }

    #[test]
    fn test_reset_returns_to_initial_state() {
        let mut run = analyzed_run(&["DELETE_USER"], vec![detected("CREATE_USER", "a")]);
        let old_generation = run.generation();
        run.reset();

        assert_eq!(run.status, ImportStatus::Idle);
        assert!(run.detected_actions.is_empty());
        assert!(run.logs.is_empty());
        assert!(run.generation() > old_generation);
        // Configuration survives the restart.
        let generation = run.begin_analysis();
        run.apply_event(
            generation,
            &PushEvent::AnalysisComplete(AnalysisPayload {
                actions: vec![detected("DELETE_USER", "x")],
                ..Default::default()
            }),
        );
        assert_eq!(run.selected_count(), 0);
    }

    #[test]
    fn test_logs_accumulate_in_order() {
        let mut run = ImportRun::new(Vec::<String>::new());
        let generation = run.begin_analysis();
        for i in 0..3 {
            run.apply_event(
                generation,
                &PushEvent::Log(LogEntry {
                    timestamp: None,
                    level: crate::run::events::LogLevel::Info,
                    message: format!("line {}", i),
                }),
            );
        }
        let lines: Vec<_> = run.logs.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(lines, vec!["line 0", "line 1", "line 2"]);
    }
}
