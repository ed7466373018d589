//! # Statistics モジュール
//!
//! 試行結果の集計と確率への変換を行います。
//!
//! 1試行につき、各艦種（または経路戦略）は「機雷のみ」「網のみ」「両方」「安全」の
//! いずれか1つに分類されます。集計値（[`TrialTally`]）は加算で結合できるため、
//! 並列ワーカーごとの集計を最後に足し合わせても結果は変わりません。

use serde::Serialize;
use std::ops::Add;

/// 1試行の分類結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    MineOnly,
    NetOnly,
    Both,
    Safe,
}

impl Outcome {
    pub fn classify(mine_hit: bool, net_hit: bool) -> Self {
        match (mine_hit, net_hit) {
            (true, true) => Outcome::Both,
            (true, false) => Outcome::MineOnly,
            (false, true) => Outcome::NetOnly,
            (false, false) => Outcome::Safe,
        }
    }
}

/// 分類ごとの試行数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrialTally {
    pub mine_hits: u64,
    pub net_hits: u64,
    pub both_hits: u64,
    pub safe: u64,
}

impl TrialTally {
    /// 1試行分の集計
    pub fn single(outcome: Outcome) -> Self {
        let mut tally = Self::default();
        tally.record(outcome);
        tally
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::MineOnly => self.mine_hits += 1,
            Outcome::NetOnly => self.net_hits += 1,
            Outcome::Both => self.both_hits += 1,
            Outcome::Safe => self.safe += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.mine_hits + self.net_hits + self.both_hits + self.safe
    }

    pub fn any_hits(&self) -> u64 {
        self.mine_hits + self.net_hits + self.both_hits
    }
}

impl Add for TrialTally {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            mine_hits: self.mine_hits + other.mine_hits,
            net_hits: self.net_hits + other.net_hits,
            both_hits: self.both_hits + other.both_hits,
            safe: self.safe + other.safe,
        }
    }
}

/// 艦種または経路戦略ごとの結果統計
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeStatistics {
    pub mine_hit_prob: f64,
    pub net_hit_prob: f64,
    pub both_hit_prob: f64,
    pub any_hit_prob: f64,
    pub safe_prob: f64,
    pub counts: TrialTally,
}

impl OutcomeStatistics {
    /// 集計値を確率へ変換（試行数0なら全て0）
    pub fn from_tally(counts: TrialTally) -> Self {
        let total = counts.total();
        if total == 0 {
            return Self {
                mine_hit_prob: 0.0,
                net_hit_prob: 0.0,
                both_hit_prob: 0.0,
                any_hit_prob: 0.0,
                safe_prob: 0.0,
                counts,
            };
        }

        let total = total as f64;
        Self {
            mine_hit_prob: counts.mine_hits as f64 / total,
            net_hit_prob: counts.net_hits as f64 / total,
            both_hit_prob: counts.both_hits as f64 / total,
            any_hit_prob: counts.any_hits() as f64 / total,
            safe_prob: counts.safe as f64 / total,
            counts,
        }
    }

    pub fn trials(&self) -> u64 {
        self.counts.total()
    }
}
