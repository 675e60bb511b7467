use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;

use hintsweeper_common::results::{
    Category, ResultEntry, ResultGroup, ResultRecord, ScoreboardView, SectionBody, SectionView,
};

use crate::logic::FinishedGame;

/// Every result of one game room, oldest first. Lives as long as the room;
/// restarts keep it.
#[derive(Debug, Default)]
pub struct Scoreboard {
    results: Vec<ResultRecord>,
    next_id: u64,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, game: FinishedGame) -> ResultRecord {
        self.next_id += 1;
        let record = ResultRecord {
            id: self.next_id,
            win: game.win,
            width: game.params.width,
            height: game.params.height,
            mines: game.correct_flags,
            mines_total: game.params.mines,
            duration: game.duration,
            hints: game.hints,
            timed: game.params.timed,
            penalty: game.penalty,
            created_at: Utc::now(),
        };
        info!("Recorded result #{}: {}", record.id, record.summary());
        self.results.push(record.clone());
        record
    }

    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    pub fn latest(&self) -> Option<&ResultRecord> {
        self.results.iter().max_by_key(|record| record.id)
    }

    /// Group results by category. The latest result's category comes first,
    /// the rest follow in ascending category order.
    pub fn view(&self) -> ScoreboardView {
        let latest = self.latest().map(|record| record.id);

        let mut categories: BTreeMap<Category, Vec<&ResultRecord>> = BTreeMap::new();
        for record in &self.results {
            categories.entry(record.category()).or_default().push(record);
        }

        let first = self.latest().map(ResultRecord::category);
        let mut sections = Vec::with_capacity(categories.len());
        if let Some(category) = first
            && let Some(records) = categories.remove(&category)
        {
            sections.push(section(category, records, latest));
        }
        sections.extend(
            categories
                .into_iter()
                .map(|(category, records)| section(category, records, latest)),
        );

        ScoreboardView { sections }
    }
}

fn section(category: Category, mut records: Vec<&ResultRecord>, latest: Option<u64>) -> SectionView {
    records.sort_by_key(|record| (record.rank(), record.id));

    let body = match category {
        Category::QuickLoss => SectionBody::Flat {
            entries: records.iter().map(|record| entry(record, latest)).collect(),
        },
        Category::Board { .. } => {
            let (wins, losses): (Vec<_>, Vec<_>) = records.iter().partition(|record| record.win);
            SectionBody::Split {
                wins: group("Wins", "No wins", wins.into_iter().map(|record| entry(record, latest))),
                losses: group(
                    "Losses",
                    "No losses",
                    losses.into_iter().map(|record| entry(record, latest)),
                ),
            }
        }
    };

    SectionView {
        header: category.header(),
        category,
        body,
    }
}

fn entry(record: &ResultRecord, latest: Option<u64>) -> ResultEntry {
    ResultEntry {
        line: record.line(),
        latest: Some(record.id) == latest,
        record: record.clone(),
    }
}

fn group(title: &str, empty: &str, entries: impl Iterator<Item = ResultEntry>) -> ResultGroup {
    let entries: Vec<ResultEntry> = entries.collect();
    ResultGroup {
        title: if entries.is_empty() { empty } else { title }.to_string(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hintsweeper_common::params::GameParams;

    fn finished(win: bool, width: usize, mines: usize, duration: u32, penalty: u32) -> FinishedGame {
        FinishedGame {
            win,
            params: GameParams {
                width,
                height: width,
                mines,
                timed: false,
            },
            correct_flags: 0,
            duration,
            hints: penalty / 10,
            penalty,
        }
    }

    fn ids(section: &SectionView) -> Vec<u64> {
        section.entries().iter().map(|entry| entry.record.id).collect()
    }

    #[test]
    fn quick_loss_on_default_board() {
        let mut scoreboard = Scoreboard::new();
        let record = scoreboard.record(finished(false, 10, 20, 3, 0));
        assert!(!record.win);
        assert_eq!(record.mines, 0);
        assert_eq!(record.mines_total, 20);

        let view = scoreboard.view();
        assert_eq!(view.sections.len(), 1);
        let section = &view.sections[0];
        assert_eq!(section.header, "Unlucky start/quick loss:");
        assert!(matches!(section.body, SectionBody::Flat { .. }));
        assert!(section.entries()[0].latest);
    }

    #[test]
    fn wins_and_losses_sorted_by_rank() {
        let mut scoreboard = Scoreboard::new();
        scoreboard.record(finished(true, 10, 20, 50, 0));
        scoreboard.record(finished(true, 10, 20, 20, 10));
        scoreboard.record(finished(false, 10, 20, 40, 0));
        scoreboard.record(finished(true, 10, 20, 35, 0));

        let view = scoreboard.view();
        assert_eq!(view.sections.len(), 1);
        let SectionBody::Split { wins, losses } = &view.sections[0].body else {
            panic!("expected split body");
        };
        assert_eq!(wins.title, "Wins");
        assert_eq!(
            wins.entries.iter().map(|e| e.record.id).collect::<Vec<_>>(),
            vec![2, 4, 1]
        );
        assert_eq!(losses.title, "Losses");
        assert_eq!(losses.entries.len(), 1);
    }

    #[test]
    fn empty_groups_get_no_titles() {
        let mut scoreboard = Scoreboard::new();
        scoreboard.record(finished(false, 10, 20, 40, 0));
        let SectionBody::Split { wins, losses } = &scoreboard.view().sections[0].body else {
            panic!("expected split body");
        };
        assert_eq!(wins.title, "No wins");
        assert!(wins.entries.is_empty());
        assert_eq!(losses.title, "Losses");
    }

    #[test]
    fn latest_category_first_then_ascending() {
        let mut scoreboard = Scoreboard::new();
        scoreboard.record(finished(true, 20, 100, 300, 0));
        scoreboard.record(finished(false, 5, 5, 2, 0));
        scoreboard.record(finished(true, 5, 5, 30, 0));
        scoreboard.record(finished(true, 10, 20, 90, 0));

        let view = scoreboard.view();
        let headers: Vec<&str> = view.sections.iter().map(|s| s.header.as_str()).collect();
        assert_eq!(
            headers,
            vec![
                "10 x 10, 20 mines:",
                "Unlucky start/quick loss:",
                "5 x 5, 5 mines:",
                "20 x 20, 100 mines:",
            ]
        );
        assert_eq!(ids(&view.sections[0]), vec![4]);
        assert!(view.sections[0].entries()[0].latest);
        assert!(
            view.sections[1..]
                .iter()
                .flat_map(|s| s.entries())
                .all(|entry| !entry.latest)
        );
    }

    #[test]
    fn latest_is_highest_id() {
        let mut scoreboard = Scoreboard::new();
        assert!(scoreboard.latest().is_none());
        assert!(scoreboard.view().sections.is_empty());
        scoreboard.record(finished(true, 5, 5, 30, 0));
        scoreboard.record(finished(true, 5, 5, 31, 0));
        assert_eq!(scoreboard.latest().map(|r| r.id), Some(2));
        assert_eq!(scoreboard.results().len(), 2);
    }
}
