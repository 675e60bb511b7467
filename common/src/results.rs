use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::format_duration;

/// Losses faster than this land in the quick-loss bucket.
pub const QUICK_LOSS_SECONDS: u32 = 10;

const COMPLIMENTS: [&str; 11] = [
    "Way to go",
    "Impressive",
    "Quite a feat",
    "Great job",
    "Amazing",
    "Nice",
    "Wonderful",
    "Great",
    "Incredible",
    "Excellent",
    "Perfect",
];

/// Snapshot of a finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Increases with every recorded result; the largest id is the latest.
    pub id: u64,
    pub win: bool,
    pub width: usize,
    pub height: usize,
    /// Mines that carried a flag when the game ended.
    pub mines: usize,
    pub mines_total: usize,
    /// Seconds the clock actually ran.
    pub duration: u32,
    pub hints: u32,
    pub timed: bool,
    pub penalty: u32,
    pub created_at: DateTime<Utc>,
}

impl ResultRecord {
    pub fn is_quick_loss(&self) -> bool {
        !self.win && self.duration < QUICK_LOSS_SECONDS
    }

    pub fn total_seconds(&self) -> u32 {
        self.duration + self.penalty
    }

    pub fn category(&self) -> Category {
        if self.is_quick_loss() {
            Category::QuickLoss
        } else {
            Category::Board {
                width: self.width,
                height: self.height,
                mines_total: self.mines_total,
            }
        }
    }

    /// Ascending rank inside a category; quick losses always come first.
    pub fn rank(&self) -> i64 {
        if self.is_quick_loss() {
            return i64::MIN;
        }
        (self.width * self.height * self.mines_total) as i64 * self.total_seconds() as i64
    }

    /// The line shown on the scoreboard.
    pub fn line(&self) -> String {
        let mut line = format_duration(self.total_seconds() as u64);
        if self.penalty > 0 {
            line += &format!(" ({} penalty)", format_duration(self.penalty as u64));
        }

        if !self.win {
            line += &format!(", {} out of {} correct", self.mines, self.mines_total);
        } else if self.hints > 0 {
            line += &format!(
                ". {} hint{} used for a total penalty time of {}.",
                self.hints,
                if self.hints > 1 { "s" } else { "" },
                format_duration(self.penalty as u64)
            );
        } else {
            line += &format!(". No hints used! {}!", self.compliment());
        }

        if self.timed {
            line += " [timed]";
        }
        line
    }

    /// Compact form for logs, e.g. `10x10 (lost, 3/20), 12+10`.
    pub fn summary(&self) -> String {
        let outcome = if self.win {
            "won".to_string()
        } else {
            format!("lost, {}/{}", self.mines, self.mines_total)
        };
        format!(
            "{}x{} ({}), {}+{}",
            self.width, self.height, outcome, self.duration, self.penalty
        )
    }

    fn compliment(&self) -> &'static str {
        COMPLIMENTS[(self.id as usize) % COMPLIMENTS.len()]
    }
}

/// Scoreboard bucket a result is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Category {
    QuickLoss,
    #[serde(rename_all = "camelCase")]
    Board {
        width: usize,
        height: usize,
        mines_total: usize,
    },
}

impl Category {
    pub fn header(&self) -> String {
        match self {
            Category::QuickLoss => "Unlucky start/quick loss:".to_string(),
            Category::Board {
                width,
                height,
                mines_total,
            } => format!("{} x {}, {} mines:", width, height, mines_total),
        }
    }

    pub fn rank(&self) -> i64 {
        match self {
            Category::QuickLoss => i64::MIN,
            Category::Board {
                width,
                height,
                mines_total,
            } => (width * height * mines_total) as i64,
        }
    }

    fn sort_key(&self) -> (i64, usize, usize, usize) {
        match *self {
            Category::QuickLoss => (i64::MIN, 0, 0, 0),
            Category::Board {
                width,
                height,
                mines_total,
            } => (self.rank(), width, height, mines_total),
        }
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub line: String,
    /// Set on the most recently recorded result.
    pub latest: bool,
    pub record: ResultRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultGroup {
    /// "Wins", "No wins", "Losses" or "No losses".
    pub title: String,
    pub entries: Vec<ResultEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "camelCase")]
pub enum SectionBody {
    /// Quick losses: one list, no win/loss sub-headers.
    Flat { entries: Vec<ResultEntry> },
    Split {
        wins: ResultGroup,
        losses: ResultGroup,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionView {
    pub header: String,
    pub category: Category,
    pub body: SectionBody,
}

impl SectionView {
    pub fn entries(&self) -> Vec<&ResultEntry> {
        match &self.body {
            SectionBody::Flat { entries } => entries.iter().collect(),
            SectionBody::Split { wins, losses } => {
                wins.entries.iter().chain(&losses.entries).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardView {
    pub sections: Vec<SectionView>,
}
