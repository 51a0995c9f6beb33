use serde::{Deserialize, Serialize};

use crate::observable::{Derived, Observable, ReadOnly};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    #[default]
    Dashboard,
    Repositories,
    Snapshots,
    BackupJobs,
    Settings,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Dashboard,
        Page::Repositories,
        Page::Snapshots,
        Page::BackupJobs,
        Page::Settings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Repositories => "Repositories",
            Page::Snapshots => "Snapshots",
            Page::BackupJobs => "Backup Jobs",
            Page::Settings => "Settings",
        }
    }
}

/// Which page the UI shows. No history is kept.
#[derive(Clone, Default)]
pub struct NavigationStore {
    current: Observable<Page>,
}

impl NavigationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> ReadOnly<Page> {
        self.current.read_only()
    }

    pub fn current_title(&self) -> Derived<&'static str> {
        self.current.map(|page: &Page| page.title())
    }

    pub fn navigate_to(&self, page: Page) {
        self.current.set(page);
    }

    pub fn go_to_dashboard(&self) {
        self.navigate_to(Page::Dashboard);
    }

    pub fn go_to_repositories(&self) {
        self.navigate_to(Page::Repositories);
    }

    pub fn go_to_snapshots(&self) {
        self.navigate_to(Page::Snapshots);
    }

    pub fn go_to_backup_jobs(&self) {
        self.navigate_to(Page::BackupJobs);
    }

    pub fn go_to_settings(&self) {
        self.navigate_to(Page::Settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn title_emits_immediately_and_on_change() {
        let nav = NavigationStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let subscription = nav
            .current_title()
            .subscribe(move |title: &&'static str| sink.lock().push(*title));
        nav.go_to_backup_jobs();
        nav.navigate_to(Page::Settings);
        subscription.unsubscribe();
        nav.go_to_snapshots();

        assert_eq!(*seen.lock(), vec!["Dashboard", "Backup Jobs", "Settings"]);
        assert_eq!(nav.current_page().get(), Page::Snapshots);
    }

    #[test]
    fn page_ids_are_kebab_case() {
        let ids: Vec<String> = Page::ALL
            .iter()
            .map(|page| serde_json::to_value(page).unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            ids,
            vec!["dashboard", "repositories", "snapshots", "backup-jobs", "settings"]
        );
    }
}
