use super::classifier::Category;
use super::types::ChangeKind;
use crate::actor::messages::SyncJob;
use crate::core::ActiveTemplate;
use crate::reload::message::Notification;

/// Side effect of one classified change.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Arm the debounced injection
    Sync(SyncJob),
    /// Push to every live client
    Notify(Notification),
    /// Re-read fixtures; `test_data_changed` follows on success
    ReloadFixtures,
}

/// Map one category to the actions it causes.
///
/// A save on the active template yields exactly one `Sync` and one
/// `template_changed`. Editors that save by rename produce `created` for the
/// active path, which is treated the same way plus a list refresh.
pub fn route(category: Category, active: Option<&ActiveTemplate>) -> Vec<Action> {
    match category {
        Category::Template { path, name, kind } => {
            let job = active
                .filter(|a| a.template == path)
                .map(|a| SyncJob {
                    template: a.template.clone(),
                    config: a.config.clone(),
                });

            let mut actions = Vec::with_capacity(3);
            match kind {
                ChangeKind::Modified => {
                    actions.extend(job.map(Action::Sync));
                    actions.push(Action::Notify(Notification::template_changed(name)));
                }
                ChangeKind::Created => {
                    if let Some(job) = job {
                        actions.push(Action::Sync(job));
                        actions.push(Action::Notify(Notification::template_changed(name)));
                    }
                    actions.push(Action::Notify(Notification::TemplateListChanged));
                }
                ChangeKind::Deleted => {
                    actions.push(Action::Notify(Notification::TemplateListChanged));
                }
            }
            actions
        }
        Category::UiChanged => vec![Action::Notify(Notification::UiChanged)],
        Category::FixturesChanged => vec![Action::ReloadFixtures],
    }
}
